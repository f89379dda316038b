/*!
# Error System for goreduce

A rejected trial is not an error: it is the normal `Ok(false)` outcome of the
oracle gate. The variants below are the conditions that abort a reduction run.
*/

use thiserror::Error;

use crate::parser::ParseError;

pub type ReduceResult<T> = Result<T, ReduceError>;

#[derive(Error, Debug)]
pub enum ReduceError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// An undo unit did not find the state it installed, or a rule tried to
    /// edit a slot that does not exist. Always a bug in a rule.
    #[error("invariant violated: {0}")]
    Invariant(String),

    /// The symbol index no longer describes the tree.
    #[error("stale symbol index: {0}")]
    StaleIndex(String),

    #[error("oracle failed: {0}")]
    Oracle(String),

    #[error("the original program does not satisfy the oracle")]
    InitialRejected,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ReduceError {
    pub fn invariant(message: impl Into<String>) -> Self {
        Self::Invariant(message.into())
    }

    pub fn stale(message: impl Into<String>) -> Self {
        Self::StaleIndex(message.into())
    }

    /// Errors that point at a bug in the engine rather than at the input.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Invariant(_) | Self::StaleIndex(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_errors_are_flagged() {
        assert!(ReduceError::invariant("x").is_internal());
        assert!(ReduceError::stale("x").is_internal());
        assert!(!ReduceError::Oracle("exit".into()).is_internal());
    }

    #[test]
    fn messages_name_the_condition() {
        let err = ReduceError::invariant("node 4 changed under undo");
        assert_eq!(err.to_string(), "invariant violated: node 4 changed under undo");
    }
}
