//! Authoritative store contract and the in-process implementation
//!
//! The hosted document store behind the real deployment is opaque; this
//! module models its contract (keyed snapshots, merge-semantics partial
//! updates, subscribe-for-changes) over tokio watch channels.

pub mod memory;

use thiserror::Error;

// Re-export main types
pub use memory::{MemoryStore, SessionInfo, TimerEntry};

/// Store failure taxonomy. Nothing here is fatal to the process; write
/// failures degrade to briefly-stale local state.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session {0} not found")]
    SessionNotFound(String),
    #[error("timer {0} not found")]
    TimerNotFound(String),
    #[error("store lock poisoned")]
    Poisoned,
}
