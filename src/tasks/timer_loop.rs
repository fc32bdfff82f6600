//! Per-selected-timer background loop
//!
//! One task owns everything for the currently viewed timer: the predictor,
//! the authoritative snapshot subscription, the display ticker, and the
//! control command channel. All local mutation happens on this single
//! logical thread, so the predictor needs no lock.

use std::time::Duration;

use chrono::Utc;
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::client::controls;
use crate::engine::{format_time, Predictor};
use crate::state::{Direction, Lap, TimerPatch, TimerSnapshot};
use crate::store::MemoryStore;

/// Control actions on the selected timer
#[derive(Debug, Clone, PartialEq)]
pub enum TimerCommand {
    StartPause,
    LapOrReset,
    Reverse,
    SetSpeed(f64),
    SetTime(f64),
    SetAlarm(f64),
    ClearAlarm,
    Delete,
}

/// Rendered timer state published to the view. `None` on the frame channel
/// means the timer is gone and the view should fall back to the list.
#[derive(Debug, Clone, PartialEq)]
pub struct TimerFrame {
    pub name: String,
    pub display: String,
    pub time: f64,
    pub running: bool,
    pub direction: Direction,
    pub speed: f64,
    pub alarm_time: Option<f64>,
    pub alarm_active: bool,
    pub laps: Vec<Lap>,
}

impl TimerFrame {
    fn of(snapshot: &TimerSnapshot) -> Self {
        Self {
            name: snapshot.name.clone(),
            display: format_time(snapshot.time),
            time: snapshot.time,
            running: snapshot.running,
            direction: snapshot.direction,
            speed: snapshot.speed,
            alarm_time: snapshot.alarm_time,
            alarm_active: snapshot.alarm_triggered,
            laps: snapshot.laps.clone(),
        }
    }
}

/// Run the loop for one selected timer until it is deleted, the
/// subscription closes, or the owning context is dropped.
pub async fn timer_loop(
    store: MemoryStore,
    session_id: String,
    timer_id: String,
    mut snapshots: watch::Receiver<Option<TimerSnapshot>>,
    mut commands: mpsc::Receiver<TimerCommand>,
    frames: watch::Sender<Option<TimerFrame>>,
    tick_interval: Duration,
) {
    info!("Watching timer {} in session {}", timer_id, session_id);

    let initial = snapshots.borrow_and_update().clone();
    let Some(initial) = initial else {
        info!("Timer {} no longer exists", timer_id);
        let _ = frames.send(None);
        return;
    };
    let mut predictor = Predictor::new(initial, now_ms());
    publish(&frames, &predictor);

    let mut ticker = tokio::time::interval(tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    warn!("Snapshot subscription for timer {} closed", timer_id);
                    break;
                }
                match snapshots.borrow_and_update().clone() {
                    Some(snapshot) => {
                        debug!("Authoritative snapshot for timer {}: running={}", timer_id, snapshot.running);
                        predictor.observe(snapshot, now_ms());
                        publish(&frames, &predictor);
                    }
                    None => {
                        info!("Timer {} was deleted", timer_id);
                        let _ = frames.send(None);
                        break;
                    }
                }
            }

            _ = ticker.tick(), if predictor.running() => {
                if let Some(outcome) = predictor.tick(now_ms()) {
                    if outcome.alarm_fired {
                        info!("Alarm triggered at {}", format_time(outcome.time));
                        // No time field in this push: writing time here would
                        // freeze the clock at the threshold for every client.
                        push(&store, &session_id, &timer_id, TimerPatch {
                            alarm_triggered: Some(true),
                            ..Default::default()
                        });
                    }
                    publish(&frames, &predictor);
                }
            }

            command = commands.recv() => {
                let Some(command) = command else { break };
                if command == TimerCommand::Delete {
                    if let Err(e) = store.delete_timer(&session_id, &timer_id) {
                        warn!("Failed to delete timer {}: {}", timer_id, e);
                    }
                    // The deletion arrives back as an absent snapshot and
                    // ends the loop there.
                    continue;
                }
                let patch = build_patch(&command, predictor.state());
                if patch.is_empty() {
                    continue;
                }
                push(&store, &session_id, &timer_id, patch);
            }
        }
    }
}

fn build_patch(command: &TimerCommand, local: &TimerSnapshot) -> TimerPatch {
    match command {
        TimerCommand::StartPause => controls::start_pause(local),
        TimerCommand::LapOrReset => controls::lap_or_reset(local),
        TimerCommand::Reverse => controls::reverse(local),
        TimerCommand::SetSpeed(speed) => controls::set_speed(local, *speed),
        TimerCommand::SetTime(seconds) => controls::set_time(*seconds),
        TimerCommand::SetAlarm(seconds) => controls::set_alarm(*seconds),
        TimerCommand::ClearAlarm => controls::clear_alarm(),
        TimerCommand::Delete => TimerPatch::default(),
    }
}

fn publish(frames: &watch::Sender<Option<TimerFrame>>, predictor: &Predictor) {
    if let Err(e) = frames.send(Some(TimerFrame::of(predictor.state()))) {
        debug!("No frame listeners left: {}", e);
    }
}

/// Fire-and-forget push. A failure is logged and dropped; the next
/// authoritative snapshot self-corrects, so there is no retry or rollback.
fn push(store: &MemoryStore, session_id: &str, timer_id: &str, patch: TimerPatch) {
    let store = store.clone();
    let session_id = session_id.to_string();
    let timer_id = timer_id.to_string();
    tokio::spawn(async move {
        if let Err(e) = store.update_timer(&session_id, &timer_id, &patch) {
            warn!("Failed to push timer update: {}", e);
        }
    });
}

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}
