//! Общий модуль для CLI
//!
//! Содержит функциональность командной строки goreduce:
//! - Инициализация логирования
//! - Форматирование вывода и отчёта
//! - Индикатор прогресса

use anyhow::Result;
use colored::Colorize;
use std::path::Path;
use tracing_subscriber::EnvFilter;

pub mod args;
pub mod output;
pub mod progress;

pub use args::{CommonArgs, OracleArgs, OutputArgs};
pub use output::{OutputFormat, OutputWriter};
pub use progress::ReductionProgress;

/// Инициализирует систему логирования
///
/// `RUST_LOG` дополняет уровень, выбранный флагами.
pub fn init_logging(level: tracing::Level) -> Result<()> {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Выводит заголовок CLI утилиты
pub fn print_header(name: &str, version: &str, description: &str) {
    eprintln!("{} {} - {}", "🔧".blue(), name.bold().blue(), version.dimmed());
    eprintln!("{}\n", description.dimmed());
}

/// Выводит успешное завершение операции
pub fn print_success(message: &str) {
    eprintln!("{} {}", "✅".green(), message.green());
}

/// Выводит предупреждение
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠️".yellow(), message.yellow());
}

/// Выводит ошибку
pub fn print_error(message: &str) {
    eprintln!("{} {}", "❌".red(), message.red());
}

/// Проверяет существование входного файла
pub fn validate_path(path: &Path, description: &str) -> Result<()> {
    if !path.is_file() {
        return Err(anyhow::anyhow!(
            "{} does not exist: {}",
            description,
            path.display()
        ));
    }
    Ok(())
}

/// Форматирует продолжительность в человекочитаемый вид
pub fn format_duration(duration: std::time::Duration) -> String {
    let secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if secs == 0 {
        format!("{}ms", millis)
    } else if secs < 60 {
        format!("{}.{:03}s", secs, millis)
    } else {
        let mins = secs / 60;
        let secs = secs % 60;
        format!("{}m {}s", mins, secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        use std::time::Duration;

        assert_eq!(format_duration(Duration::from_millis(500)), "500ms");
        assert_eq!(format_duration(Duration::from_secs(1)), "1.000s");
        assert_eq!(format_duration(Duration::from_secs(65)), "1m 5s");
    }

    #[test]
    fn test_validate_path() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(validate_path(file.path(), "Input").is_ok());

        let dir = tempfile::tempdir().unwrap();
        let err = validate_path(&dir.path().join("missing.go"), "Input").unwrap_err();
        assert!(err.to_string().starts_with("Input does not exist"));
        assert!(validate_path(dir.path(), "Input").is_err());
    }
}
