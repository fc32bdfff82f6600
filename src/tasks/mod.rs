//! Background tasks module
//!
//! This module contains the per-selected-timer loop that runs alongside the
//! interactive front-end.

pub mod timer_loop;

// Re-export main types
pub use timer_loop::{timer_loop, TimerCommand, TimerFrame};
