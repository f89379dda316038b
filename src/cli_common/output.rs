//! Модуль для форматирования и вывода результатов

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::str::FromStr;

use crate::core::{ReductionReport, StopReason};

use super::format_duration;

/// Формат вывода отчёта
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(anyhow::anyhow!("Unknown output format: {}", s)),
        }
    }
}

/// Writer для вывода результатов
pub struct OutputWriter {
    writer: Box<dyn Write>,
    format: OutputFormat,
    pretty: bool,
}

impl OutputWriter {
    /// Создает writer для stdout
    pub fn stdout(format: OutputFormat) -> Self {
        Self::new(Box::new(io::stdout()), format)
    }

    /// Создает writer для файла
    pub fn file(path: &Path, format: OutputFormat) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self::new(Box::new(file), format))
    }

    pub fn new(writer: Box<dyn Write>, format: OutputFormat) -> Self {
        Self {
            writer,
            format,
            pretty: false,
        }
    }

    /// Включает pretty-печать для JSON
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Записывает сериализуемый объект
    pub fn write_object<T: Serialize>(&mut self, obj: &T) -> Result<()> {
        let json = if self.pretty || self.format == OutputFormat::Text {
            serde_json::to_string_pretty(obj)?
        } else {
            serde_json::to_string(obj)?
        };
        writeln!(self.writer, "{}", json)?;
        Ok(())
    }

    /// Записывает строку
    pub fn write_line(&mut self, line: &str) -> Result<()> {
        writeln!(self.writer, "{}", line)?;
        Ok(())
    }

    /// Записывает заголовок
    pub fn write_header(&mut self, header: &str) -> Result<()> {
        writeln!(self.writer, "\n{}", header.bold().blue())?;
        writeln!(self.writer, "{}", "=".repeat(header.len()).blue())?;
        Ok(())
    }

    /// Записывает элемент списка
    pub fn write_list_item(&mut self, item: &str) -> Result<()> {
        writeln!(self.writer, "  • {}", item)?;
        Ok(())
    }

    /// Записывает итоговый отчёт о редукции
    pub fn write_report(&mut self, report: &ReductionReport) -> Result<()> {
        match self.format {
            OutputFormat::Json => self.write_object(report),
            OutputFormat::Text => {
                self.write_header("Reduction")?;
                for change in &report.changes {
                    self.write_list_item(&change.to_string())?;
                }

                let stopped = match report.stop_reason {
                    StopReason::Fixpoint => "no further change".green(),
                    StopReason::PassLimit => "pass limit reached".yellow(),
                    StopReason::Timeout => "time budget spent".yellow(),
                };
                self.write_line(&format!(
                    "\n{} ({}, {} passes, {})",
                    report.summary().bold(),
                    stopped,
                    report.passes,
                    format_duration(report.elapsed)
                ))
            }
        }
    }

    /// Завершает запись и сбрасывает буфер
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuleKind;
    use crate::core::{Change, Position};
    use std::time::Duration;

    fn report() -> ReductionReport {
        ReductionReport {
            changes: vec![Change::new(
                Position::new(4, 2, 30),
                "ExprStmt",
                RuleKind::StmtRemove,
                "ExprStmt removed",
            )],
            passes: 2,
            oracle_calls: 5,
            lines_before: 6,
            lines_after: 5,
            stop_reason: StopReason::Fixpoint,
            elapsed: Duration::from_millis(12),
        }
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("txt".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert!("sarif".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_json_report_file() {
        let temp = tempfile::NamedTempFile::new().unwrap();
        let mut writer = OutputWriter::file(temp.path(), OutputFormat::Json).unwrap();
        writer.write_report(&report()).unwrap();
        writer.flush().unwrap();
        drop(writer);

        let text = std::fs::read_to_string(temp.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["oracle_calls"], 5);
        assert_eq!(value["stop_reason"], "fixpoint");
        assert_eq!(value["changes"][0]["rule"], "stmt-remove");
        assert_eq!(value["elapsed"], 12);
    }

    #[test]
    fn test_text_report_lists_changes() {
        colored::control::set_override(false);
        let temp = tempfile::NamedTempFile::new().unwrap();
        let mut writer = OutputWriter::file(temp.path(), OutputFormat::Text).unwrap();
        writer.write_report(&report()).unwrap();
        writer.flush().unwrap();
        drop(writer);

        let text = std::fs::read_to_string(temp.path()).unwrap();
        assert!(text.contains("  • 4:2: ExprStmt: ExprStmt removed"));
        assert!(text.contains("1 lines removed in 1 changes (5 oracle calls)"));
        assert!(text.contains("no further change"));
    }
}
