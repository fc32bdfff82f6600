//! Local time prediction and alarm-crossing detection
//!
//! The predictor keeps a locally-extrapolated view of a timer between
//! authoritative snapshots and detects alarm threshold crossings without
//! firing twice. All timestamps are wall-clock milliseconds passed in by the
//! caller, so tests drive it without sleeping.

use crate::state::{Direction, TimerSnapshot};

/// Result of one tick while the timer is running
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOutcome {
    /// The new working time, for display
    pub time: f64,
    /// True exactly when this tick crossed the alarm threshold; the caller
    /// is expected to push `{ alarm_triggered: true }` (and nothing else)
    pub alarm_fired: bool,
}

/// Per-timer prediction state. Replaced wholesale whenever a fresh
/// authoritative snapshot arrives.
#[derive(Debug)]
pub struct Predictor {
    snapshot: TimerSnapshot,
    /// Timestamp of the previous tick; `None` right after (re)start so the
    /// first tick never produces a spurious huge delta
    last_tick_ms: Option<i64>,
    /// Local dedupe marker: the working time at which the alarm last fired.
    /// Cleared on every snapshot; the authoritative `alarm_triggered` flag
    /// is what suppresses re-firing across snapshot churn.
    last_alarm_check: Option<f64>,
}

impl Predictor {
    pub fn new(snapshot: TimerSnapshot, now_ms: i64) -> Self {
        let mut predictor = Self {
            snapshot: TimerSnapshot::new(""),
            last_tick_ms: None,
            last_alarm_check: None,
        };
        predictor.observe(snapshot, now_ms);
        predictor
    }

    /// Replace local state with a fresh authoritative snapshot.
    ///
    /// A running snapshot is extrapolated forward from its write timestamp
    /// to `now_ms`, reconciling clock drift between the producer and this
    /// consumer. Crossing detection is always re-armed.
    pub fn observe(&mut self, mut snapshot: TimerSnapshot, now_ms: i64) {
        if snapshot.running {
            let elapsed = (now_ms - snapshot.last_updated_timestamp) as f64 / 1000.0;
            snapshot.time += snapshot.direction.sign() * snapshot.speed * elapsed;
        }
        self.last_alarm_check = None;
        self.last_tick_ms = None;
        self.snapshot = snapshot;
    }

    /// Advance the working time to `now_ms`.
    ///
    /// Returns `None` while paused and on the first tick after a (re)start.
    pub fn tick(&mut self, now_ms: i64) -> Option<TickOutcome> {
        if !self.snapshot.running {
            return None;
        }
        let Some(last_tick_ms) = self.last_tick_ms else {
            self.last_tick_ms = Some(now_ms);
            return None;
        };
        self.last_tick_ms = Some(now_ms);

        let delta = (now_ms - last_tick_ms) as f64 / 1000.0;
        let old_time = self.snapshot.time;
        self.snapshot.time += self.snapshot.direction.sign() * self.snapshot.speed * delta;

        let mut alarm_fired = false;
        if let Some(threshold) = self.snapshot.alarm_time {
            if !self.snapshot.alarm_triggered {
                // Previous-vs-new comparison rather than equality: variable
                // deltas and non-integer speeds can skip the exact value, so
                // the tick that lands at-or-past the threshold fires.
                let crossed = match self.snapshot.direction {
                    Direction::Down => old_time > threshold && self.snapshot.time <= threshold,
                    Direction::Up => old_time < threshold && self.snapshot.time >= threshold,
                };
                if crossed && self.last_alarm_check != Some(self.snapshot.time) {
                    self.last_alarm_check = Some(self.snapshot.time);
                    self.snapshot.alarm_triggered = true;
                    alarm_fired = true;
                }
            }
        }

        Some(TickOutcome {
            time: self.snapshot.time,
            alarm_fired,
        })
    }

    pub fn running(&self) -> bool {
        self.snapshot.running
    }

    /// The current working time (extrapolated while running)
    pub fn time(&self) -> f64 {
        self.snapshot.time
    }

    /// The current working snapshot, for building control patches
    pub fn state(&self) -> &TimerSnapshot {
        &self.snapshot
    }
}
