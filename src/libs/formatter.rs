//! Human-readable formatting of worked time.

use chrono::Duration;

/// Formats a duration as `HH:MM`; negative durations print as `00:00`.
///
/// ```rust
/// use attend::libs::formatter::format_duration;
/// use chrono::Duration;
///
/// assert_eq!(format_duration(&Duration::minutes(90)), "01:30");
/// assert_eq!(format_duration(&Duration::hours(-1)), "00:00");
/// ```
pub fn format_duration(duration: &Duration) -> String {
    let hours = duration.num_hours();
    let mins = duration.num_minutes() % 60;
    format!("{:02}:{:02}", hours.max(0), mins.max(0))
}

/// Formats fractional minutes, as produced by attendance reports, as `HH:MM`.
pub fn format_minutes(minutes: f64) -> String {
    format_duration(&Duration::seconds((minutes * 60.0).round() as i64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_minutes() {
        assert_eq!(format_minutes(0.0), "00:00");
        assert_eq!(format_minutes(510.0), "08:30");
        assert_eq!(format_minutes(59.99), "01:00");
        assert_eq!(format_minutes(-5.0), "00:00");
        assert_eq!(format_minutes(1500.0), "25:00");
    }
}
