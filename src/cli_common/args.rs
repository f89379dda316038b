//! Общие аргументы командной строки

use clap::Parser;
use std::path::PathBuf;

use crate::config::ReducerConfig;

/// Общие аргументы для всех CLI команд
#[derive(Parser, Debug, Clone, Default)]
pub struct CommonArgs {
    /// Enable verbose output (every rejected trial is logged)
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Аргументы оракула
#[derive(Parser, Debug, Clone, Default)]
pub struct OracleArgs {
    /// Regular expression the command output must match
    #[arg(short = 'm', long = "match", value_name = "REGEX")]
    pub pattern: Option<String>,

    /// Use `go run` instead of `go build`
    #[arg(short, long)]
    pub run: bool,

    /// Custom command to run on each candidate; `{}` is the candidate file
    #[arg(long, num_args = 1.., value_name = "CMD", allow_hyphen_values = true)]
    pub call: Vec<String>,
}

/// Аргументы для работы с выводом
#[derive(Parser, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Write the reduced program here instead of overwriting the input
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Report format (text, json)
    #[arg(short = 'f', long, default_value = "text")]
    pub format: String,

    /// Pretty print JSON output
    #[arg(long)]
    pub pretty: bool,
}

impl CommonArgs {
    /// Определяет уровень логирования на основе флагов
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Проверяет, нужно ли выводить информацию
    pub fn should_print(&self) -> bool {
        !self.quiet
    }
}

impl OracleArgs {
    /// Переносит флаги оракула поверх значений из файла конфигурации
    pub fn apply(&self, config: &mut ReducerConfig) {
        if let Some(pattern) = &self.pattern {
            config.oracle.pattern = Some(pattern.clone());
        }
        if self.run {
            config.oracle.run = true;
        }
        if !self.call.is_empty() {
            config.oracle.command = self.call.clone();
        }
    }
}
