//! Shared timer state structures
//!
//! This module contains the shared timer document and the partial-update
//! patch that control actions push into the store.

pub mod patch;
pub mod snapshot;

// Re-export main types
pub use patch::TimerPatch;
pub use snapshot::{Direction, Lap, TimerSnapshot};
