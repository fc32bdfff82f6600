//! The shared timer document

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Counting direction, stored as a signed unit on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "i8", try_from = "i8")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// Sign applied to elapsed real time
    pub fn sign(self) -> f64 {
        match self {
            Direction::Up => 1.0,
            Direction::Down => -1.0,
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }
}

impl From<Direction> for i8 {
    fn from(direction: Direction) -> i8 {
        match direction {
            Direction::Up => 1,
            Direction::Down => -1,
        }
    }
}

impl TryFrom<i8> for Direction {
    type Error = String;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Direction::Up),
            -1 => Ok(Direction::Down),
            other => Err(format!("invalid direction {}, expected 1 or -1", other)),
        }
    }
}

/// One recorded lap: label plus the formatted time it was taken at
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lap {
    pub text: String,
    pub time: String,
}

/// Authoritative record of one timer's state at its last write
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub name: String,
    /// Signed seconds; goes negative when counting down past zero
    pub time: f64,
    /// Seconds value `time` resets to
    pub initial_time: f64,
    pub direction: Direction,
    /// Positive multiplier applied to elapsed real time
    pub speed: f64,
    pub running: bool,
    pub laps: Vec<Lap>,
    pub alarm_time: Option<f64>,
    /// True once the alarm has fired; suppresses re-firing
    pub alarm_triggered: bool,
    /// Wall-clock millis at which this snapshot was last authoritative
    pub last_updated_timestamp: i64,
}

impl TimerSnapshot {
    /// Create a fresh paused timer with default state
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            time: 0.0,
            initial_time: 0.0,
            direction: Direction::Up,
            speed: 1.0,
            running: false,
            laps: Vec::new(),
            alarm_time: None,
            alarm_triggered: false,
            last_updated_timestamp: Utc::now().timestamp_millis(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_snapshot_has_documented_defaults() {
        let snapshot = TimerSnapshot::new("Tea");
        assert_eq!(snapshot.name, "Tea");
        assert_eq!(snapshot.time, 0.0);
        assert_eq!(snapshot.initial_time, 0.0);
        assert_eq!(snapshot.direction, Direction::Up);
        assert_eq!(snapshot.speed, 1.0);
        assert!(!snapshot.running);
        assert!(snapshot.laps.is_empty());
        assert_eq!(snapshot.alarm_time, None);
        assert!(!snapshot.alarm_triggered);
    }

    #[test]
    fn direction_round_trips_as_signed_unit() {
        let up = serde_json::to_string(&Direction::Up).unwrap();
        let down = serde_json::to_string(&Direction::Down).unwrap();
        assert_eq!(up, "1");
        assert_eq!(down, "-1");
        assert_eq!(serde_json::from_str::<Direction>("-1").unwrap(), Direction::Down);
        assert!(serde_json::from_str::<Direction>("0").is_err());
    }

    #[test]
    fn snapshot_serializes_with_camel_case_fields() {
        let json = serde_json::to_value(TimerSnapshot::new("t")).unwrap();
        assert!(json.get("initialTime").is_some());
        assert!(json.get("alarmTriggered").is_some());
        assert!(json.get("lastUpdatedTimestamp").is_some());
    }
}
