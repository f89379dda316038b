/*!
# Core Module

Positions, the engine error type and change records.
*/

pub mod errors;
pub mod position;
pub mod results;
pub mod fs_utils;

pub use errors::{ReduceError, ReduceResult};
pub use position::{count_lines, LineIndex, Position};
pub use results::{Change, ReductionReport, StopReason};
pub use fs_utils::read_source_file;
