/*!
# Go Parser

Parser and printer for the Go subset handled by the reducer.

## Usage

```rust,ignore
use goreduce::parser::{GoParser, print_tree};

let tree = GoParser::new().parse_text("package main\n\nfunc main() {}\n")?;
assert_eq!(print_tree(&tree), "package main\n\nfunc main() {\n}\n");
```
*/

pub mod ast;
pub mod lexer;
pub mod printer;
pub mod syntax;

pub use ast::{Node, NodeId, Tree};
pub use lexer::{GoLexer, Token, TokenType};
pub use printer::{print_node, print_tree};
pub use syntax::SyntaxAnalyzer;

use std::path::Path;

use thiserror::Error;

use crate::core::{read_source_file, Position, ReduceError};

/// Syntax errors. The reducer only ever sees these for the initial input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("{position}: {message}")]
    Lexical { message: String, position: Position },

    #[error("{position}: expected {expected}, found {found}")]
    Unexpected {
        expected: String,
        found: String,
        position: Position,
    },

    #[error("{position}: {construct} is not supported")]
    Unsupported { construct: String, position: Position },
}

impl ParseError {
    pub fn position(&self) -> Position {
        match self {
            ParseError::Lexical { position, .. }
            | ParseError::Unexpected { position, .. }
            | ParseError::Unsupported { position, .. } => *position,
        }
    }
}

/// Main Go parser
#[derive(Debug, Default)]
pub struct GoParser;

impl GoParser {
    pub fn new() -> Self {
        Self
    }

    /// Parses Go source from a string
    pub fn parse_text(&self, input: &str) -> Result<Tree, ParseError> {
        SyntaxAnalyzer::parse(input)
    }

    /// Reads and parses a Go file, stripping a UTF-8 BOM if present
    pub fn parse_file<P: AsRef<Path>>(&self, file_path: P) -> Result<Tree, ReduceError> {
        let content = read_source_file(file_path.as_ref())?;
        Ok(self.parse_text(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_text_reports_position() {
        let err = GoParser::new().parse_text("package main\n\nfunc main() {\n\t@\n}\n").unwrap_err();
        assert!(matches!(err, ParseError::Lexical { .. }));
        assert_eq!(err.position().line, 4);
        assert!(err.to_string().starts_with("4:2: "), "{err}");
    }

    #[test]
    fn test_parse_file_strips_bom() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"\xEF\xBB\xBFpackage main\n").unwrap();
        let tree = GoParser::new().parse_file(file.path()).unwrap();
        assert_eq!(print_tree(&tree), "package main\n");
    }

    #[test]
    fn test_parse_file_missing() {
        let err = GoParser::new().parse_file("/nonexistent/input.go").unwrap_err();
        assert!(matches!(err, ReduceError::Io(_)));
    }
}
