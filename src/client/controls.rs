//! Control actions as pure patch builders
//!
//! Each builder takes the locally-predicted snapshot and produces the
//! partial update to push. Any action taken while running that changes
//! `running`, `direction`, or `speed` includes the current extrapolated
//! time: letting the store recompute with the new multiplier over the old
//! interval would be a non-replayable mutation.

use crate::engine::format_time;
use crate::state::{Lap, TimerPatch, TimerSnapshot};

/// Toggle running. Pausing persists the current client-side time.
pub fn start_pause(local: &TimerSnapshot) -> TimerPatch {
    TimerPatch {
        running: Some(!local.running),
        time: local.running.then_some(local.time),
        ..Default::default()
    }
}

/// Set both the current and reset time, leaving the timer paused
pub fn set_time(seconds: f64) -> TimerPatch {
    TimerPatch {
        time: Some(seconds),
        initial_time: Some(seconds),
        running: Some(false),
        ..Default::default()
    }
}

/// Running: record a lap. Paused: reset to the initial time, dropping laps
/// and re-arming the alarm.
pub fn lap_or_reset(local: &TimerSnapshot) -> TimerPatch {
    if local.running {
        let mut laps = local.laps.clone();
        laps.push(Lap {
            text: format!("Lap {}", laps.len() + 1),
            time: format_time(local.time),
        });
        TimerPatch {
            laps: Some(laps),
            ..Default::default()
        }
    } else {
        TimerPatch {
            time: Some(local.initial_time),
            laps: Some(Vec::new()),
            alarm_triggered: Some(false),
            ..Default::default()
        }
    }
}

/// Flip the counting direction, persisting the current time while running
pub fn reverse(local: &TimerSnapshot) -> TimerPatch {
    TimerPatch {
        direction: Some(local.direction.reversed()),
        time: local.running.then_some(local.time),
        ..Default::default()
    }
}

/// Change the speed multiplier, persisting the current time while running
pub fn set_speed(local: &TimerSnapshot, speed: f64) -> TimerPatch {
    TimerPatch {
        speed: Some(speed),
        time: local.running.then_some(local.time),
        ..Default::default()
    }
}

/// Arm the alarm at a threshold, clearing any previous trigger
pub fn set_alarm(seconds: f64) -> TimerPatch {
    TimerPatch {
        alarm_time: Some(Some(seconds)),
        alarm_triggered: Some(false),
        ..Default::default()
    }
}

/// Remove the alarm threshold and clear the trigger
pub fn clear_alarm() -> TimerPatch {
    TimerPatch {
        alarm_time: Some(None),
        alarm_triggered: Some(false),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Direction;

    fn local(running: bool, time: f64) -> TimerSnapshot {
        let mut snapshot = TimerSnapshot::new("test");
        snapshot.running = running;
        snapshot.time = time;
        snapshot
    }

    #[test]
    fn pausing_always_includes_the_extrapolated_time() {
        let patch = start_pause(&local(true, 12.7));
        assert_eq!(patch.running, Some(false));
        assert_eq!(patch.time, Some(12.7));
    }

    #[test]
    fn starting_never_writes_time() {
        let patch = start_pause(&local(false, 12.7));
        assert_eq!(patch.running, Some(true));
        assert_eq!(patch.time, None);
    }

    #[test]
    fn reverse_and_speed_persist_time_only_while_running() {
        let mut snapshot = local(true, 8.25);
        snapshot.direction = Direction::Up;
        let patch = reverse(&snapshot);
        assert_eq!(patch.direction, Some(Direction::Down));
        assert_eq!(patch.time, Some(8.25));

        snapshot.running = false;
        assert_eq!(reverse(&snapshot).time, None);

        let patch = set_speed(&local(true, 3.5), 60.0);
        assert_eq!(patch.speed, Some(60.0));
        assert_eq!(patch.time, Some(3.5));
        assert_eq!(set_speed(&local(false, 3.5), 60.0).time, None);
    }

    #[test]
    fn lap_appends_a_numbered_formatted_entry() {
        let mut snapshot = local(true, 65.0);
        snapshot.laps.push(Lap {
            text: "Lap 1".to_string(),
            time: "00:00:30".to_string(),
        });
        let patch = lap_or_reset(&snapshot);
        let laps = patch.laps.unwrap();
        assert_eq!(laps.len(), 2);
        assert_eq!(laps[1].text, "Lap 2");
        assert_eq!(laps[1].time, "00:01:05");
        // Laps are the only field touched
        assert_eq!(patch.time, None);
        assert_eq!(patch.running, None);
    }

    #[test]
    fn reset_restores_initial_time_and_rearms_the_alarm() {
        let mut snapshot = local(false, 99.0);
        snapshot.initial_time = 300.0;
        snapshot.alarm_triggered = true;
        let patch = lap_or_reset(&snapshot);
        assert_eq!(patch.time, Some(300.0));
        assert_eq!(patch.laps, Some(Vec::new()));
        assert_eq!(patch.alarm_triggered, Some(false));
    }

    #[test]
    fn set_time_also_sets_the_reset_point_and_pauses() {
        let patch = set_time(90.0);
        assert_eq!(patch.time, Some(90.0));
        assert_eq!(patch.initial_time, Some(90.0));
        assert_eq!(patch.running, Some(false));
    }

    #[test]
    fn alarm_set_and_clear_both_drop_the_trigger() {
        let patch = set_alarm(10.0);
        assert_eq!(patch.alarm_time, Some(Some(10.0)));
        assert_eq!(patch.alarm_triggered, Some(false));

        let patch = clear_alarm();
        assert_eq!(patch.alarm_time, Some(None));
        assert_eq!(patch.alarm_triggered, Some(false));
    }
}
