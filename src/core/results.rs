/*!
# Reduction Results

Records produced for the reporting collaborator: one `Change` per accepted
trial and a `ReductionReport` for a whole run.
*/

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::Position;
use crate::config::RuleKind;

/// One accepted change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    /// Location of the affected node in the source the change was made on
    pub position: Position,
    /// Short tag naming the node kind (e.g. `IfStmt`)
    pub kind: String,
    /// Rule that produced the change
    pub rule: RuleKind,
    /// Human-readable before -> after description
    pub description: String,
}

impl Change {
    pub fn new(position: Position, kind: impl Into<String>, rule: RuleKind, description: impl Into<String>) -> Self {
        Self {
            position,
            kind: kind.into(),
            rule,
            description: description.into(),
        }
    }
}

impl std::fmt::Display for Change {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.position.is_known() {
            write!(f, "{}: {}: {}", self.position, self.kind, self.description)
        } else {
            write!(f, "{}: {}", self.kind, self.description)
        }
    }
}

/// Why the driver stopped iterating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StopReason {
    /// A full pass produced no change
    Fixpoint,
    /// The configured pass limit was reached
    PassLimit,
    /// The wall-clock budget expired between passes
    Timeout,
}

/// Summary of a reduction run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReductionReport {
    pub changes: Vec<Change>,
    pub passes: usize,
    pub oracle_calls: usize,
    pub lines_before: usize,
    pub lines_after: usize,
    pub stop_reason: StopReason,
    #[serde(with = "duration_millis")]
    pub elapsed: Duration,
}

impl ReductionReport {
    pub fn lines_removed(&self) -> usize {
        self.lines_before.saturating_sub(self.lines_after)
    }

    pub fn summary(&self) -> String {
        format!(
            "{} lines removed in {} changes ({} oracle calls)",
            self.lines_removed(),
            self.changes.len(),
            self.oracle_calls
        )
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}
