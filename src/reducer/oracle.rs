/*!
# Oracles

An oracle decides whether a candidate program still shows the property being
reduced for. Any `FnMut(&str) -> bool` is an oracle; `CommandOracle` runs an
external command on the candidate and matches its output.
*/

use regex::Regex;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;
use tracing::{debug, trace};

use crate::config::OracleConfig;
use crate::core::{ReduceError, ReduceResult};

pub trait Oracle {
    /// Judges one candidate. `Err` aborts the run; a rejection is `Ok(false)`.
    fn accepts(&mut self, candidate: &str) -> ReduceResult<bool>;
}

impl<F> Oracle for F
where
    F: FnMut(&str) -> bool,
{
    fn accepts(&mut self, candidate: &str) -> ReduceResult<bool> {
        Ok(self(candidate))
    }
}

/// Placeholder for the candidate path in command arguments
pub const FILE_PLACEHOLDER: &str = "{}";

/// Runs a command on each candidate and accepts when the combined
/// stdout and stderr match a pattern.
pub struct CommandOracle {
    dir: TempDir,
    file: PathBuf,
    program: String,
    args: Vec<String>,
    pattern: Regex,
}

impl CommandOracle {
    pub fn new(config: &OracleConfig) -> ReduceResult<Self> {
        let pattern = config
            .pattern
            .as_deref()
            .ok_or_else(|| ReduceError::Oracle("no match pattern configured".to_string()))?;
        let pattern = Regex::new(pattern)
            .map_err(|e| ReduceError::Oracle(format!("invalid match pattern: {}", e)))?;

        let mut command = config.command.clone();
        if command.is_empty() {
            let verb = if config.run { "run" } else { "build" };
            command = vec!["go".to_string(), verb.to_string(), FILE_PLACEHOLDER.to_string()];
        }
        let program = command.remove(0);

        let dir = tempfile::Builder::new().prefix("goreduce").tempdir()?;
        let file = dir.path().join(&config.file_name);
        debug!("Oracle work directory: {}", dir.path().display());

        Ok(Self {
            dir,
            file,
            program,
            args: command,
            pattern,
        })
    }

    pub fn work_dir(&self) -> &Path {
        self.dir.path()
    }

    /// The command line as it will be run, with the placeholder substituted.
    pub fn command_line(&self) -> Vec<String> {
        let file = self.file.to_string_lossy();
        std::iter::once(self.program.clone())
            .chain(self.args.iter().map(|arg| arg.replace(FILE_PLACEHOLDER, &file)))
            .collect()
    }
}

impl Oracle for CommandOracle {
    fn accepts(&mut self, candidate: &str) -> ReduceResult<bool> {
        std::fs::write(&self.file, candidate)?;

        let line = self.command_line();
        let output = Command::new(&line[0])
            .args(&line[1..])
            .current_dir(self.dir.path())
            .output()
            .map_err(|e| ReduceError::Oracle(format!("failed to run {}: {}", self.program, e)))?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        let matched = self.pattern.is_match(&text);
        trace!(status = ?output.status.code(), matched, "oracle output:\n{}", text);
        Ok(matched)
    }
}
