/*!
# Reducer Configuration

Settings for a reduction run, loaded from TOML (or YAML by extension).
Command-line flags override file values.

```toml
max_passes = 500
timeout_secs = 600

[rules]
literal-zero = false

[oracle]
match = "undefined: foo"
command = ["go", "vet", "{}"]
```
*/

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Reduction rules that can be toggled individually
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleKind {
    /// `if a { b }` -> `{ b }`
    IfBody,
    /// `if a {...} else c` -> `c`
    IfElse,
    /// Untyped constant use -> its initializer
    ConstInline,
    /// String literal -> `""`, integer literal -> `0`
    LiteralZero,
    /// `a[b:c]` -> `a`
    SliceBase,
    /// Drop one slice bound
    SliceBounds,
    /// `T{a, b}` -> `T{}`
    CompositeEmpty,
    /// `a + b` -> `a` or `b`
    BinaryOperand,
    /// `(a)`, `*a`, `-a` -> `a`
    UnwrapOperand,
    /// `a[b]` -> `a`
    IndexBase,
    /// `go f()` / `defer f()` -> `f()`
    CallStmt,
    /// Statement removal
    StmtRemove,
    /// Nested block splicing
    BlockInline,
}

impl RuleKind {
    pub const ALL: [RuleKind; 13] = [
        RuleKind::IfBody,
        RuleKind::IfElse,
        RuleKind::ConstInline,
        RuleKind::LiteralZero,
        RuleKind::SliceBase,
        RuleKind::SliceBounds,
        RuleKind::CompositeEmpty,
        RuleKind::BinaryOperand,
        RuleKind::UnwrapOperand,
        RuleKind::IndexBase,
        RuleKind::CallStmt,
        RuleKind::StmtRemove,
        RuleKind::BlockInline,
    ];

    pub fn name(self) -> &'static str {
        match self {
            RuleKind::IfBody => "if-body",
            RuleKind::IfElse => "if-else",
            RuleKind::ConstInline => "const-inline",
            RuleKind::LiteralZero => "literal-zero",
            RuleKind::SliceBase => "slice-base",
            RuleKind::SliceBounds => "slice-bounds",
            RuleKind::CompositeEmpty => "composite-empty",
            RuleKind::BinaryOperand => "binary-operand",
            RuleKind::UnwrapOperand => "unwrap-operand",
            RuleKind::IndexBase => "index-base",
            RuleKind::CallStmt => "call-stmt",
            RuleKind::StmtRemove => "stmt-remove",
            RuleKind::BlockInline => "block-inline",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|rule| rule.name() == name)
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How candidates are judged
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleConfig {
    /// Regular expression the command output must match
    #[serde(rename = "match", default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    /// Custom command; `{}` is replaced by the candidate file path.
    /// Empty means `go build` (or `go run` with `run = true`).
    #[serde(default)]
    pub command: Vec<String>,

    /// Use `go run` instead of `go build`
    #[serde(default)]
    pub run: bool,

    /// Name the candidate is written under inside the work directory
    #[serde(default = "default_file_name")]
    pub file_name: String,
}

fn default_file_name() -> String {
    "main.go".to_string()
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            pattern: None,
            command: Vec::new(),
            run: false,
            file_name: default_file_name(),
        }
    }
}

/// Main reducer configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReducerConfig {
    /// Upper bound on passes; `None` runs to a fixpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_passes: Option<usize>,

    /// Wall-clock budget in seconds, checked between passes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Per-rule toggles keyed by rule name; missing rules are enabled
    #[serde(default)]
    pub rules: BTreeMap<String, bool>,

    #[serde(default)]
    pub oracle: OracleConfig,
}

impl Default for ReducerConfig {
    fn default() -> Self {
        Self {
            max_passes: None,
            timeout_secs: None,
            rules: RuleKind::ALL.iter().map(|rule| (rule.name().to_string(), true)).collect(),
            oracle: OracleConfig::default(),
        }
    }
}

impl ReducerConfig {
    /// Load configuration from a TOML file, or YAML for `.yaml`/`.yml`
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );
        if is_yaml {
            return Self::load_from_yaml(path);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read reducer config from {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config from {}", path.display()))?;

        config.check()?;
        Ok(config)
    }

    /// Load configuration from YAML file
    pub fn load_from_yaml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read reducer config from {}", path.display()))?;

        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML config from {}", path.display()))?;

        config.check()?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content =
            toml::to_string_pretty(self).context("Failed to serialize reducer config to TOML")?;

        std::fs::write(&path, content).with_context(|| {
            format!("Failed to write reducer config to {}", path.as_ref().display())
        })?;

        Ok(())
    }

    pub fn is_rule_enabled(&self, rule: RuleKind) -> bool {
        self.rules.get(rule.name()).copied().unwrap_or(true)
    }

    pub fn set_rule_enabled(&mut self, rule: RuleKind, enabled: bool) {
        self.rules.insert(rule.name().to_string(), enabled);
    }

    /// Non-fatal problems with the configuration
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        for name in self.rules.keys() {
            if RuleKind::from_name(name).is_none() {
                warnings.push(format!("Unknown rule '{}'", name));
            }
        }

        if self.max_passes == Some(0) {
            warnings.push("max_passes = 0 disables reduction".to_string());
        }

        if RuleKind::ALL.iter().all(|rule| !self.is_rule_enabled(*rule)) {
            warnings.push("All rules are disabled".to_string());
        }

        warnings
    }

    /// Fatal problems: a pattern that does not compile
    fn check(&self) -> Result<()> {
        if let Some(pattern) = &self.oracle.pattern {
            regex::Regex::new(pattern)
                .with_context(|| format!("Invalid oracle pattern '{}'", pattern))?;
        }
        if self.oracle.command.first().is_some_and(|program| program.is_empty()) {
            anyhow::bail!("Oracle command has an empty program name");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = ReducerConfig::default();
        assert_eq!(config.rules.len(), RuleKind::ALL.len());
        assert!(RuleKind::ALL.iter().all(|rule| config.is_rule_enabled(*rule)));
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_rule_names_round_trip() {
        for rule in RuleKind::ALL {
            assert_eq!(RuleKind::from_name(rule.name()), Some(rule));
            let json = serde_json::to_string(&rule).unwrap();
            assert_eq!(json, format!("\"{}\"", rule.name()));
        }
        assert_eq!(RuleKind::from_name("nope"), None);
    }

    #[test]
    fn test_config_file_roundtrip() {
        let mut config = ReducerConfig::default();
        config.max_passes = Some(10);
        config.set_rule_enabled(RuleKind::LiteralZero, false);
        config.oracle.pattern = Some("undefined: x".to_string());

        let temp_file = NamedTempFile::new().unwrap();
        config.save_to_file(temp_file.path()).unwrap();

        let loaded = ReducerConfig::load_from_file(temp_file.path()).unwrap();
        assert_eq!(loaded, config);
        assert!(!loaded.is_rule_enabled(RuleKind::LiteralZero));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: ReducerConfig = toml::from_str("[rules]\nif-body = false\n").unwrap();
        assert!(!config.is_rule_enabled(RuleKind::IfBody));
        assert!(config.is_rule_enabled(RuleKind::IfElse));
        assert_eq!(config.oracle.file_name, "main.go");
        assert_eq!(config.max_passes, None);
    }

    #[test]
    fn test_yaml_config() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "max_passes: 3\noracle:\n  match: \"panic\"\n  run: true").unwrap();

        let config = ReducerConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.max_passes, Some(3));
        assert!(config.oracle.run);
        assert_eq!(config.oracle.pattern.as_deref(), Some("panic"));
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[oracle]\nmatch = \"(unclosed\"").unwrap();
        assert!(ReducerConfig::load_from_file(file.path()).is_err());
    }

    #[test]
    fn test_unknown_rule_warning() {
        let mut config = ReducerConfig::default();
        config.rules.insert("rename-everything".to_string(), true);
        let warnings = config.validate();
        assert_eq!(warnings, vec!["Unknown rule 'rename-everything'".to_string()]);
    }
}
