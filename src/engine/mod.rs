//! Timer predictor / alarm engine
//!
//! The logic-bearing core of the client: extrapolating displayed time
//! between authoritative snapshots, detecting alarm threshold crossings,
//! and formatting clock text.

pub mod format;
pub mod predictor;

// Re-export main types
pub use format::{format_time, split_time, time_from_fields};
pub use predictor::{Predictor, TickOutcome};
