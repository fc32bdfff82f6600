//! Partial updates merged into the authoritative document

use super::{Direction, Lap, TimerSnapshot};

/// A partial timer update. Fields left as `None` are untouched by the merge,
/// matching the store's merge semantics. Clearing the alarm is distinct from
/// leaving it alone, hence the nested option.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimerPatch {
    pub name: Option<String>,
    pub time: Option<f64>,
    pub initial_time: Option<f64>,
    pub direction: Option<Direction>,
    pub speed: Option<f64>,
    pub running: Option<bool>,
    pub laps: Option<Vec<Lap>>,
    pub alarm_time: Option<Option<f64>>,
    pub alarm_triggered: Option<bool>,
}

impl TimerPatch {
    /// Merge this patch into a snapshot, stamping the write time.
    /// `now_ms` becomes the snapshot's new authoritative timestamp.
    pub fn apply(&self, snapshot: &mut TimerSnapshot, now_ms: i64) {
        if let Some(name) = &self.name {
            snapshot.name = name.clone();
        }
        if let Some(time) = self.time {
            snapshot.time = time;
        }
        if let Some(initial_time) = self.initial_time {
            snapshot.initial_time = initial_time;
        }
        if let Some(direction) = self.direction {
            snapshot.direction = direction;
        }
        if let Some(speed) = self.speed {
            snapshot.speed = speed;
        }
        if let Some(running) = self.running {
            snapshot.running = running;
        }
        if let Some(laps) = &self.laps {
            snapshot.laps = laps.clone();
        }
        if let Some(alarm_time) = self.alarm_time {
            snapshot.alarm_time = alarm_time;
        }
        if let Some(alarm_triggered) = self.alarm_triggered {
            snapshot.alarm_triggered = alarm_triggered;
        }
        snapshot.last_updated_timestamp = now_ms;
    }

    pub fn is_empty(&self) -> bool {
        *self == TimerPatch::default()
    }
}
