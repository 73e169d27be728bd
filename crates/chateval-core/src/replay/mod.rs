//! Scripted multi-turn replay building blocks
//!
//! This module holds the pure pieces of batch replay: turn grouping modes
//! and their send table, line splitting, result file naming, and the result
//! sink. The orchestrator drives them line by line.

pub mod naming;
mod policy;
mod sink;
mod splitter;

pub use naming::output_path;
pub use policy::{Dispatch, TurnMode};
pub use sink::OutputSink;
pub use splitter::{THIRD_TURN_DELIMITER, TURN_DELIMITER, split_turns};
