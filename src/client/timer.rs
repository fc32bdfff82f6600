//! The selected-timer context
//!
//! Created on selection, disposed on deselection. Owns the snapshot
//! subscription and the tick loop; at most one of these exists at a time,
//! so no two timers' tick loops ever run concurrently.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::warn;

use crate::store::{MemoryStore, StoreError};
use crate::tasks::{timer_loop, TimerCommand, TimerFrame};

const COMMAND_BUFFER: usize = 16;

#[derive(Debug)]
pub struct TimerContext {
    timer_id: String,
    commands: mpsc::Sender<TimerCommand>,
    frames: watch::Receiver<Option<TimerFrame>>,
    task: Option<JoinHandle<()>>,
}

impl TimerContext {
    /// Subscribe to a timer and start its tick loop
    pub fn open(
        store: &MemoryStore,
        session_id: &str,
        timer_id: &str,
        tick_interval: Duration,
    ) -> Result<Self, StoreError> {
        let snapshots = store.subscribe_timer(session_id, timer_id)?;
        let (commands_tx, commands_rx) = mpsc::channel(COMMAND_BUFFER);
        let (frames_tx, frames_rx) = watch::channel(None);

        let task = tokio::spawn(timer_loop(
            store.clone(),
            session_id.to_string(),
            timer_id.to_string(),
            snapshots,
            commands_rx,
            frames_tx,
            tick_interval,
        ));

        Ok(Self {
            timer_id: timer_id.to_string(),
            commands: commands_tx,
            frames: frames_rx,
            task: Some(task),
        })
    }

    pub fn timer_id(&self) -> &str {
        &self.timer_id
    }

    /// Display frames; `None` means the timer is gone
    pub fn frames(&self) -> watch::Receiver<Option<TimerFrame>> {
        self.frames.clone()
    }

    /// Send a control action to the loop. Returns false if the loop has
    /// already ended.
    pub async fn send(&self, command: TimerCommand) -> bool {
        if let Err(e) = self.commands.send(command).await {
            warn!("Timer {} loop is gone: {}", self.timer_id, e);
            return false;
        }
        true
    }

    /// Stop the tick loop and drop the subscription. Idempotent: safe to
    /// call when the loop already ended.
    pub fn close(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for TimerContext {
    fn drop(&mut self) {
        self.close();
    }
}
