//! Sync Timer - a shared-session countdown/stopwatch client
//!
//! Users create or join a session, create named timers inside it, and
//! control start/pause/lap/reverse/speed/alarm for a selected timer. The
//! authoritative state lives in a keyed snapshot store with change
//! notification; this crate predicts displayed time between snapshots and
//! detects alarm crossings locally.

pub mod client;
pub mod config;
pub mod engine;
pub mod state;
pub mod store;
pub mod tasks;
pub mod ui;
pub mod view;

// Re-export commonly used types
pub use client::SessionClient;
pub use config::Config;
pub use engine::Predictor;
pub use state::TimerSnapshot;
pub use store::MemoryStore;
