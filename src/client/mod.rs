//! Client-side session and timer contexts
//!
//! Explicit context objects replace hidden module-level state: a
//! `SessionContext` lives while a session is joined, a `TimerContext` lives
//! while one timer is selected.

pub mod controls;
pub mod prefs;
pub mod session;
pub mod timer;

// Re-export main types
pub use session::{SessionClient, SessionContext};
pub use timer::TimerContext;
