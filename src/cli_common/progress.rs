//! Модуль для отображения прогресса редукции

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::core::Change;

/// Спиннер с последним принятым изменением
pub struct ReductionProgress {
    bar: ProgressBar,
    changes: usize,
}

impl ReductionProgress {
    /// Создает спиннер; при `visible == false` ничего не выводится
    pub fn new(visible: bool) -> Self {
        let bar = if visible {
            ProgressBar::new_spinner()
        } else {
            ProgressBar::hidden()
        };
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} [{elapsed}] {msg}") {
            bar.set_style(style);
        }
        bar.enable_steady_tick(Duration::from_millis(120));
        bar.set_message("Checking the original program...");
        Self { bar, changes: 0 }
    }

    pub fn set_message(&self, message: impl Into<String>) {
        self.bar.set_message(message.into());
    }

    /// Отмечает принятое изменение
    pub fn record(&mut self, change: &Change) {
        self.changes += 1;
        self.bar
            .set_message(format!("{} changes, last: {}", self.changes, change.description));
    }

    pub fn changes(&self) -> usize {
        self.changes
    }

    /// Убирает спиннер
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuleKind;
    use crate::core::Position;

    #[test]
    fn test_hidden_progress_counts_changes() {
        let mut progress = ReductionProgress::new(false);
        let change = Change::new(Position::zero(), "BasicLit", RuleKind::LiteralZero, "1 -> 0");
        progress.record(&change);
        progress.record(&change);
        assert_eq!(progress.changes(), 2);
        progress.finish();
    }
}
