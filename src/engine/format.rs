//! Clock text formatting and input-field conversion

/// Render seconds as `[-]HH:MM:SS`. The magnitude is floored after taking
/// the absolute value, so `-5.0` renders as `-00:00:05`.
pub fn format_time(total_seconds: f64) -> String {
    let negative = total_seconds < 0.0;
    let total = total_seconds.abs();
    let hours = (total / 3600.0).floor() as u64;
    let minutes = ((total % 3600.0) / 60.0).floor() as u64;
    let seconds = (total % 60.0).floor() as u64;
    format!(
        "{}{:02}:{:02}:{:02}",
        if negative { "-" } else { "" },
        hours,
        minutes,
        seconds
    )
}

/// Combine hours/minutes/seconds input fields into a seconds value
pub fn time_from_fields(hours: u32, minutes: u32, seconds: u32) -> f64 {
    f64::from(hours) * 3600.0 + f64::from(minutes) * 60.0 + f64::from(seconds)
}

/// Decompose a seconds value into absolute hours/minutes/seconds for
/// pre-filling input fields
pub fn split_time(total_seconds: f64) -> (u64, u64, u64) {
    let total = total_seconds.abs();
    let hours = (total / 3600.0).floor() as u64;
    let minutes = ((total % 3600.0) / 60.0).floor() as u64;
    let seconds = (total % 60.0).floor() as u64;
    (hours, minutes, seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_zero_padded_components() {
        assert_eq!(format_time(0.0), "00:00:00");
        assert_eq!(format_time(5.0), "00:00:05");
        assert_eq!(format_time(65.0), "00:01:05");
        assert_eq!(format_time(3_661.0), "01:01:01");
        assert_eq!(format_time(99.0 * 3600.0), "99:00:00");
    }

    #[test]
    fn negative_time_renders_with_explicit_sign() {
        assert_eq!(format_time(-5.0), "-00:00:05");
        assert_eq!(format_time(-3_661.5), "-01:01:01");
        // Fractional negative values below one second still carry the sign
        assert_eq!(format_time(-0.4), "-00:00:00");
    }

    #[test]
    fn fractional_seconds_floor_toward_zero_magnitude() {
        assert_eq!(format_time(59.9), "00:00:59");
        assert_eq!(format_time(60.0), "00:01:00");
    }

    #[test]
    fn field_round_trip_matches_direct_formatting() {
        for hours in [0u32, 1, 25, 99] {
            for minutes in 0..60u32 {
                for seconds in 0..60u32 {
                    let combined = time_from_fields(hours, minutes, seconds);
                    let direct = f64::from(hours * 3600 + minutes * 60 + seconds);
                    assert_eq!(format_time(combined), format_time(direct));
                }
            }
        }
    }

    #[test]
    fn split_time_inverts_field_combination() {
        assert_eq!(split_time(time_from_fields(2, 30, 15)), (2, 30, 15));
        assert_eq!(split_time(-75.0), (0, 1, 15));
    }
}
