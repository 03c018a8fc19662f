//! Formatting helpers shared across UIs.

use chrono::{DateTime, Local, Utc};

/// Format a play timestamp relative to `now` (e.g., "5 minutes ago").
///
/// Plays older than a day fall back to the local date and time.
pub fn format_played_time_at(ts: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let duration = now.signed_duration_since(ts);

    if duration.num_seconds() < 0 {
        "just now".to_string()
    } else if duration.num_minutes() < 60 {
        let mins = duration.num_minutes();
        format!("{} minute{} ago", mins, if mins == 1 { "" } else { "s" })
    } else if duration.num_hours() < 24 {
        let hours = duration.num_hours();
        format!("{} hour{} ago", hours, if hours == 1 { "" } else { "s" })
    } else {
        ts.with_timezone(&Local)
            .format("%b %d %Y, %H:%M")
            .to_string()
    }
}

/// Format a play timestamp relative to the current time.
pub fn format_played_time(ts: DateTime<Utc>) -> String {
    format_played_time_at(ts, Utc::now())
}

fn twelve_hour(hour: u8) -> (u8, &'static str) {
    let hour = hour % 24;
    let h = match hour % 12 {
        0 => 12,
        h => h,
    };
    (h, if hour < 12 { "AM" } else { "PM" })
}

/// 12-hour clock label for an hour of day (e.g., "3 PM").
pub fn hour_label(hour: u8) -> String {
    let (h, period) = twelve_hour(hour);
    format!("{} {}", h, period)
}

/// Compact 12-hour label used on chart axes (e.g., "6AM").
pub fn hour_label_short(hour: u8) -> String {
    let (h, period) = twelve_hour(hour);
    format!("{}{}", h, period)
}

/// Format a whole-percent change for display (e.g., "+23%" or "-15%").
pub fn format_change(pct: i64) -> String {
    if pct >= 0 {
        format!("+{}%", pct)
    } else {
        format!("{}%", pct)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_played_time_relative() {
        let now = Utc::now();
        assert_eq!(format_played_time_at(now + Duration::seconds(5), now), "just now");
        assert_eq!(format_played_time_at(now - Duration::seconds(30), now), "0 minutes ago");
        assert_eq!(format_played_time_at(now - Duration::minutes(1), now), "1 minute ago");
        assert_eq!(format_played_time_at(now - Duration::minutes(59), now), "59 minutes ago");
        assert_eq!(format_played_time_at(now - Duration::hours(1), now), "1 hour ago");
        assert_eq!(format_played_time_at(now - Duration::hours(23), now), "23 hours ago");
        assert!(!format_played_time_at(now - Duration::days(3), now).ends_with("ago"));
    }

    #[test]
    fn test_hour_labels() {
        assert_eq!(hour_label(0), "12 AM");
        assert_eq!(hour_label(9), "9 AM");
        assert_eq!(hour_label(12), "12 PM");
        assert_eq!(hour_label(23), "11 PM");
        assert_eq!(hour_label_short(6), "6AM");
        assert_eq!(hour_label_short(18), "6PM");
    }

    #[test]
    fn test_format_change() {
        assert_eq!(format_change(23), "+23%");
        assert_eq!(format_change(0), "+0%");
        assert_eq!(format_change(-15), "-15%");
    }
}
