/*!
# Go Lexical Analyzer

logos-based tokenizer for the supported Go subset, with Go's automatic
semicolon insertion applied as a post-pass over the raw token stream.
Comments are dropped.
*/

use logos::Logos;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::{LineIndex, Position};

/// Go token types
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[logos(skip r"[ \t\r\f]+")]
pub enum TokenType {
    // Keywords
    #[token("break")]
    Break,
    #[token("case")]
    Case,
    #[token("chan")]
    Chan,
    #[token("const")]
    Const,
    #[token("continue")]
    Continue,
    #[token("default")]
    Default,
    #[token("defer")]
    Defer,
    #[token("else")]
    Else,
    #[token("fallthrough")]
    Fallthrough,
    #[token("for")]
    For,
    #[token("func")]
    Func,
    #[token("go")]
    Go,
    #[token("goto")]
    Goto,
    #[token("if")]
    If,
    #[token("import")]
    Import,
    #[token("interface")]
    Interface,
    #[token("map")]
    Map,
    #[token("package")]
    Package,
    #[token("range")]
    Range,
    #[token("return")]
    Return,
    #[token("select")]
    Select,
    #[token("struct")]
    Struct,
    #[token("switch")]
    Switch,
    #[token("type")]
    Type,
    #[token("var")]
    Var,

    // Arithmetic and bitwise operators
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("<<")]
    Shl,
    #[token(">>")]
    Shr,
    #[token("&^")]
    AndNot,

    // Compound assignment
    #[token("+=")]
    PlusAssign,
    #[token("-=")]
    MinusAssign,
    #[token("*=")]
    StarAssign,
    #[token("/=")]
    SlashAssign,
    #[token("%=")]
    PercentAssign,
    #[token("&=")]
    AmpAssign,
    #[token("|=")]
    PipeAssign,
    #[token("^=")]
    CaretAssign,
    #[token("<<=")]
    ShlAssign,
    #[token(">>=")]
    ShrAssign,
    #[token("&^=")]
    AndNotAssign,

    // Logical, comparison and channel operators
    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
    #[token("<-")]
    Arrow,
    #[token("++")]
    Inc,
    #[token("--")]
    Dec,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<")]
    Less,
    #[token(">")]
    Greater,
    #[token("<=")]
    LessEq,
    #[token(">=")]
    GreaterEq,
    #[token("!")]
    Not,
    #[token("=")]
    Assign,
    #[token(":=")]
    Define,
    #[token("...")]
    Ellipsis,

    // Delimiters
    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,
    #[token("[")]
    LeftBracket,
    #[token("]")]
    RightBracket,
    #[token("{")]
    LeftBrace,
    #[token("}")]
    RightBrace,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token(".")]
    Dot,
    #[token(":")]
    Colon,
    #[token("~")]
    Tilde,

    // Literals
    #[regex(r"[0-9][0-9_]*|0[xX][0-9a-fA-F_]+|0[oO][0-7_]+|0[bB][01_]+")]
    IntLiteral,
    #[regex(r"[0-9][0-9_]*\.[0-9_]*([eE][+-]?[0-9_]+)?|\.[0-9][0-9_]*([eE][+-]?[0-9_]+)?|[0-9][0-9_]*[eE][+-]?[0-9_]+")]
    FloatLiteral,
    #[regex(r"([0-9][0-9_]*|[0-9][0-9_]*\.[0-9_]*([eE][+-]?[0-9_]+)?|\.[0-9][0-9_]*([eE][+-]?[0-9_]+)?|[0-9][0-9_]*[eE][+-]?[0-9_]+)i")]
    ImagLiteral,
    #[regex(r"'(\\[^\n]|[^'\\\n])+'")]
    CharLiteral,
    #[regex(r#""([^"\\\n]|\\[^\n])*""#)]
    StringLiteral,
    #[regex(r"`[^`]*`")]
    RawStringLiteral,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", priority = 1)]
    Identifier,

    // Comments
    #[regex(r"//[^\n]*")]
    LineComment,
    #[regex(r"/\*([^*]|\*+[^*/])*\*+/")]
    BlockComment,

    #[token("\n")]
    Newline,

    // End of file
    Eof,
}

impl TokenType {
    /// Tokens after which a newline becomes a semicolon.
    fn ends_statement(self) -> bool {
        matches!(
            self,
            TokenType::Identifier
                | TokenType::IntLiteral
                | TokenType::FloatLiteral
                | TokenType::ImagLiteral
                | TokenType::CharLiteral
                | TokenType::StringLiteral
                | TokenType::RawStringLiteral
                | TokenType::Break
                | TokenType::Continue
                | TokenType::Fallthrough
                | TokenType::Return
                | TokenType::Inc
                | TokenType::Dec
                | TokenType::RightParen
                | TokenType::RightBracket
                | TokenType::RightBrace
        )
    }
}

impl TokenType {
    /// Source spelling for fixed tokens, a category name for the rest.
    pub fn as_str(self) -> &'static str {
        match self {
            TokenType::Break => "break",
            TokenType::Case => "case",
            TokenType::Chan => "chan",
            TokenType::Const => "const",
            TokenType::Continue => "continue",
            TokenType::Default => "default",
            TokenType::Defer => "defer",
            TokenType::Else => "else",
            TokenType::Fallthrough => "fallthrough",
            TokenType::For => "for",
            TokenType::Func => "func",
            TokenType::Go => "go",
            TokenType::Goto => "goto",
            TokenType::If => "if",
            TokenType::Import => "import",
            TokenType::Interface => "interface",
            TokenType::Map => "map",
            TokenType::Package => "package",
            TokenType::Range => "range",
            TokenType::Return => "return",
            TokenType::Select => "select",
            TokenType::Struct => "struct",
            TokenType::Switch => "switch",
            TokenType::Type => "type",
            TokenType::Var => "var",
            TokenType::Plus => "+",
            TokenType::Minus => "-",
            TokenType::Star => "*",
            TokenType::Slash => "/",
            TokenType::Percent => "%",
            TokenType::Amp => "&",
            TokenType::Pipe => "|",
            TokenType::Caret => "^",
            TokenType::Shl => "<<",
            TokenType::Shr => ">>",
            TokenType::AndNot => "&^",
            TokenType::PlusAssign => "+=",
            TokenType::MinusAssign => "-=",
            TokenType::StarAssign => "*=",
            TokenType::SlashAssign => "/=",
            TokenType::PercentAssign => "%=",
            TokenType::AmpAssign => "&=",
            TokenType::PipeAssign => "|=",
            TokenType::CaretAssign => "^=",
            TokenType::ShlAssign => "<<=",
            TokenType::ShrAssign => ">>=",
            TokenType::AndNotAssign => "&^=",
            TokenType::AndAnd => "&&",
            TokenType::OrOr => "||",
            TokenType::Arrow => "<-",
            TokenType::Inc => "++",
            TokenType::Dec => "--",
            TokenType::EqEq => "==",
            TokenType::NotEq => "!=",
            TokenType::Less => "<",
            TokenType::Greater => ">",
            TokenType::LessEq => "<=",
            TokenType::GreaterEq => ">=",
            TokenType::Not => "!",
            TokenType::Assign => "=",
            TokenType::Define => ":=",
            TokenType::Ellipsis => "...",
            TokenType::LeftParen => "(",
            TokenType::RightParen => ")",
            TokenType::LeftBracket => "[",
            TokenType::RightBracket => "]",
            TokenType::LeftBrace => "{",
            TokenType::RightBrace => "}",
            TokenType::Comma => ",",
            TokenType::Semicolon => ";",
            TokenType::Dot => ".",
            TokenType::Colon => ":",
            TokenType::Tilde => "~",
            TokenType::IntLiteral
            | TokenType::FloatLiteral
            | TokenType::ImagLiteral
            | TokenType::CharLiteral => "literal",
            TokenType::StringLiteral | TokenType::RawStringLiteral => "string literal",
            TokenType::Identifier => "identifier",
            TokenType::LineComment | TokenType::BlockComment => "comment",
            TokenType::Newline => "newline",
            TokenType::Eof => "EOF",
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token with position information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub token_type: TokenType,
    pub value: String,
    pub position: Position,
}

impl Token {
    pub fn new(token_type: TokenType, value: String, position: Position) -> Self {
        Self { token_type, value, position }
    }
}

/// Go lexer
#[derive(Debug, Default)]
pub struct GoLexer;

impl GoLexer {
    pub fn new() -> Self {
        Self
    }

    /// Tokenize Go source code. The result always ends with `Eof`.
    pub fn tokenize(&self, input: &str) -> Result<Vec<Token>, (String, Position)> {
        let lines = LineIndex::new(input);
        let mut tokens: Vec<Token> = Vec::new();
        let mut lexer = TokenType::lexer(input);

        while let Some(result) = lexer.next() {
            let span = lexer.span();
            let text = lexer.slice();
            let position = lines.to_position(span.start);
            let token_type = match result {
                Ok(token_type) => token_type,
                Err(_) => {
                    return Err((format!("unexpected character '{}'", text), position));
                }
            };

            match token_type {
                TokenType::LineComment => continue,
                TokenType::BlockComment if !text.contains('\n') => continue,
                TokenType::Newline | TokenType::BlockComment => {
                    Self::insert_semicolon(&mut tokens, position);
                }
                _ => tokens.push(Token::new(token_type, text.to_string(), position)),
            }
        }

        let end = lines.to_position(input.len());
        Self::insert_semicolon(&mut tokens, end);
        tokens.push(Token::new(TokenType::Eof, String::new(), end));
        Ok(tokens)
    }

    fn insert_semicolon(tokens: &mut Vec<Token>, position: Position) {
        if tokens.last().is_some_and(|t| t.token_type.ends_statement()) {
            tokens.push(Token::new(TokenType::Semicolon, "\n".to_string(), position));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn types(src: &str) -> Vec<TokenType> {
        GoLexer::new().tokenize(src).unwrap().into_iter().map(|t| t.token_type).collect()
    }

    #[test]
    fn test_semicolon_insertion() {
        assert_eq!(
            types("x := 1\nreturn\n"),
            vec![
                TokenType::Identifier,
                TokenType::Define,
                TokenType::IntLiteral,
                TokenType::Semicolon,
                TokenType::Return,
                TokenType::Semicolon,
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn test_no_semicolon_after_operator() {
        assert_eq!(
            types("a +\nb"),
            vec![
                TokenType::Identifier,
                TokenType::Plus,
                TokenType::Identifier,
                TokenType::Semicolon,
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn test_literals_and_comments() {
        let tokens = GoLexer::new()
            .tokenize("s[1:5:10] // trailing\n\"a\\\"b\" `raw` 'x' 1.5 2i 0x1F")
            .unwrap();
        let kinds: Vec<_> = tokens.iter().map(|t| t.token_type).collect();
        assert!(kinds.contains(&TokenType::StringLiteral));
        assert!(kinds.contains(&TokenType::RawStringLiteral));
        assert!(kinds.contains(&TokenType::CharLiteral));
        assert!(kinds.contains(&TokenType::FloatLiteral));
        assert!(kinds.contains(&TokenType::ImagLiteral));
        assert!(!kinds.contains(&TokenType::LineComment));
        let hex = tokens.iter().find(|t| t.value == "0x1F").unwrap();
        assert_eq!(hex.token_type, TokenType::IntLiteral);
    }

    #[test]
    fn test_positions_are_one_based() {
        let tokens = GoLexer::new().tokenize("package main\n\nfunc f() {}").unwrap();
        let func = tokens.iter().find(|t| t.token_type == TokenType::Func).unwrap();
        assert_eq!(func.position.line, 3);
        assert_eq!(func.position.column, 1);
    }

    #[test]
    fn test_unexpected_character() {
        let err = GoLexer::new().tokenize("a := $").unwrap_err();
        assert!(err.0.contains('$'));
        assert_eq!(err.1.column, 6);
    }
}
