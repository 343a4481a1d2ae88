//! Pure decision functions behind the deadline notifier: tier
//! classification, the cooldown/hysteresis gate, message wording and
//! due-date parsing. Nothing here touches notifier state.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use super::deadline_error::{DeadlineError, Result};
use super::deadline_models::{NotificationKind, NotificationRecord, ReminderTier, UrgencyLevel};

const MS_PER_MINUTE: f64 = 60_000.0;

/// Cadence table keyed by the upper bound (inclusive) on minutes until due,
/// ordered by ascending time remaining.
const TIERS: [(f64, ReminderTier); 5] = [
    (
        30.0,
        ReminderTier {
            interval_minutes: Some(5),
            display_duration_ms: 3000,
            urgency: UrgencyLevel::Critical,
        },
    ),
    (
        120.0,
        ReminderTier {
            interval_minutes: Some(10),
            display_duration_ms: 2500,
            urgency: UrgencyLevel::High,
        },
    ),
    (
        360.0,
        ReminderTier {
            interval_minutes: Some(30),
            display_duration_ms: 2000,
            urgency: UrgencyLevel::Medium,
        },
    ),
    (
        1440.0,
        ReminderTier {
            interval_minutes: Some(150),
            display_duration_ms: 2000,
            urgency: UrgencyLevel::Medium,
        },
    ),
    (
        10080.0,
        ReminderTier {
            interval_minutes: Some(480),
            display_duration_ms: 1500,
            urgency: UrgencyLevel::Low,
        },
    ),
];

/// More than a week out: shown once, never repeated automatically.
const DISTANT_TIER: ReminderTier = ReminderTier {
    interval_minutes: None,
    display_duration_ms: 1000,
    urgency: UrgencyLevel::Low,
};

/// Picks the reminder tier for the given time remaining. First match wins.
pub fn classify(minutes_until_due: f64) -> ReminderTier {
    TIERS
        .iter()
        .find(|(max_minutes, _)| minutes_until_due <= *max_minutes)
        .map(|(_, tier)| *tier)
        .unwrap_or(DISTANT_TIER)
}

/// Cooldown and hysteresis gate.
///
/// A task with no record always passes. Otherwise the tier interval must
/// have elapsed since the last reminder, unless the urgency rose above the
/// one recorded at that reminder.
pub fn should_notify(
    previous: Option<&NotificationRecord>,
    tier: &ReminderTier,
    now: DateTime<Utc>,
) -> bool {
    let Some(previous) = previous else {
        return true;
    };

    if tier.urgency > previous.urgency_level {
        return true;
    }

    match tier.interval_minutes {
        Some(interval) => minutes_between(previous.last_notified_at, now) >= f64::from(interval),
        None => false,
    }
}

/// Reminder text, worded by how close the deadline is.
pub fn format_message(title: &str, minutes_until_due: f64) -> String {
    if minutes_until_due <= 5.0 {
        format!(
            "🔴 URGENT: \"{}\" is due in {} minutes!",
            title,
            minutes_until_due.floor() as i64
        )
    } else if minutes_until_due <= 30.0 {
        format!(
            "⚠️ \"{}\" is due in {} minutes",
            title,
            minutes_until_due.floor() as i64
        )
    } else if minutes_until_due <= 120.0 {
        format!(
            "⏰ \"{}\" is due in {:.1} hours",
            title,
            round_half_up_tenths(minutes_until_due / 60.0)
        )
    } else if minutes_until_due <= 1440.0 {
        format!(
            "📅 \"{}\" is due in {} hours",
            title,
            (minutes_until_due / 60.0).floor() as i64
        )
    } else {
        let days = (minutes_until_due / 1440.0).floor() as i64;
        let unit = if days > 1 { "days" } else { "day" };
        format!("📆 \"{}\" is due in {} {}", title, days, unit)
    }
}

/// One decimal place, ties rounded away from zero (1.25 -> 1.3).
fn round_half_up_tenths(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn notification_kind(urgency: UrgencyLevel) -> NotificationKind {
    match urgency {
        UrgencyLevel::Critical | UrgencyLevel::High => NotificationKind::OverdueAlert,
        UrgencyLevel::Medium | UrgencyLevel::Low => NotificationKind::DeadlineReminder,
    }
}

/// Parses an ISO-8601 due date. Timestamps without an offset and bare dates
/// are taken as UTC.
pub fn parse_due_date(task_id: i64, raw: &str) -> Result<DateTime<Utc>> {
    let trimmed = raw.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
        .ok_or_else(|| DeadlineError::InvalidTaskData {
            task_id,
            due_date: raw.to_string(),
        })
}

/// Fractional minutes from `from` to `to`; negative when `to` is earlier.
pub fn minutes_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / MS_PER_MINUTE
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, hour, minute, 0).unwrap()
    }

    fn record(last: DateTime<Utc>, urgency: UrgencyLevel) -> NotificationRecord {
        NotificationRecord {
            task_id: 1,
            last_notified_at: last,
            urgency_level: urgency,
        }
    }

    #[test]
    fn test_classify_tier_boundaries() {
        let critical = classify(30.0);
        assert_eq!(critical.urgency, UrgencyLevel::Critical);
        assert_eq!(critical.interval_minutes, Some(5));
        assert_eq!(critical.display_duration_ms, 3000);

        assert_eq!(classify(30.5).urgency, UrgencyLevel::High);
        assert_eq!(classify(120.0).interval_minutes, Some(10));
        assert_eq!(classify(360.0).interval_minutes, Some(30));
        assert_eq!(classify(361.0).interval_minutes, Some(150));
        assert_eq!(classify(1440.0).urgency, UrgencyLevel::Medium);
    }

    #[test]
    fn test_classify_week_boundary() {
        let week = classify(10080.0);
        assert_eq!(week.urgency, UrgencyLevel::Low);
        assert_eq!(week.interval_minutes, Some(480));
        assert_eq!(week.display_duration_ms, 1500);

        let beyond = classify(10081.0);
        assert_eq!(beyond.urgency, UrgencyLevel::Low);
        assert_eq!(beyond.interval_minutes, None);
        assert_eq!(beyond.display_duration_ms, 1000);
    }

    #[test]
    fn test_first_notification_always_passes() {
        assert!(should_notify(None, &classify(10081.0), at(9, 0)));
    }

    #[test]
    fn test_cooldown_suppresses_until_interval_elapsed() {
        let tier = classify(200.0);
        let previous = record(at(9, 0), UrgencyLevel::Medium);

        assert!(!should_notify(Some(&previous), &tier, at(9, 29)));
        assert!(should_notify(Some(&previous), &tier, at(9, 30)));
    }

    #[test]
    fn test_urgency_increase_overrides_cooldown() {
        let previous = record(at(9, 0), UrgencyLevel::Medium);
        assert!(should_notify(Some(&previous), &classify(20.0), at(9, 1)));
    }

    #[test]
    fn test_urgency_decrease_does_not_override() {
        // Due date pushed back: the calmer tier still waits out its interval.
        let previous = record(at(9, 0), UrgencyLevel::Critical);
        assert!(!should_notify(Some(&previous), &classify(500.0), at(9, 10)));
    }

    #[test]
    fn test_distant_tier_never_repeats() {
        let previous = record(at(9, 0), UrgencyLevel::Low);
        let later = at(9, 0) + Duration::days(30);
        assert!(!should_notify(Some(&previous), &classify(20_000.0), later));
    }

    #[test]
    fn test_format_message_branches() {
        assert_eq!(
            format_message("Report", 4.7),
            "🔴 URGENT: \"Report\" is due in 4 minutes!"
        );
        assert_eq!(format_message("Report", 5.0), "🔴 URGENT: \"Report\" is due in 5 minutes!");
        assert_eq!(format_message("Report", 30.0), "⚠️ \"Report\" is due in 30 minutes");
        assert_eq!(format_message("Report", 90.0), "⏰ \"Report\" is due in 1.5 hours");
        assert_eq!(format_message("Report", 75.0), "⏰ \"Report\" is due in 1.3 hours");
        assert_eq!(format_message("Report", 105.0), "⏰ \"Report\" is due in 1.8 hours");
        assert_eq!(format_message("Report", 120.0), "⏰ \"Report\" is due in 2.0 hours");
        assert_eq!(format_message("Report", 299.0), "📅 \"Report\" is due in 4 hours");
        assert_eq!(format_message("Report", 2000.0), "📆 \"Report\" is due in 1 day");
        assert_eq!(format_message("Report", 4320.0), "📆 \"Report\" is due in 3 days");
    }

    #[test]
    fn test_notification_kind_mapping() {
        assert_eq!(notification_kind(UrgencyLevel::Critical), NotificationKind::OverdueAlert);
        assert_eq!(notification_kind(UrgencyLevel::High), NotificationKind::OverdueAlert);
        assert_eq!(notification_kind(UrgencyLevel::Medium), NotificationKind::DeadlineReminder);
        assert_eq!(notification_kind(UrgencyLevel::Low), NotificationKind::DeadlineReminder);
    }

    #[test]
    fn test_parse_due_date_formats() {
        let expected = Utc.with_ymd_and_hms(2025, 3, 14, 17, 30, 0).unwrap();
        assert_eq!(parse_due_date(1, "2025-03-14T17:30:00Z").unwrap(), expected);
        assert_eq!(parse_due_date(1, "2025-03-14T19:30:00+02:00").unwrap(), expected);
        assert_eq!(parse_due_date(1, "2025-03-14T17:30:00.000").unwrap(), expected);
        assert_eq!(parse_due_date(1, "2025-03-14T17:30").unwrap(), expected);
        assert_eq!(
            parse_due_date(1, "2025-03-14").unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 14, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_parse_due_date_rejects_garbage() {
        let err = parse_due_date(42, "next tuesday").unwrap_err();
        assert_eq!(
            err,
            DeadlineError::InvalidTaskData {
                task_id: 42,
                due_date: "next tuesday".to_string(),
            }
        );
    }

    #[test]
    fn test_minutes_between_is_fractional() {
        let start = at(9, 0);
        assert_eq!(minutes_between(start, start + Duration::seconds(90)), 1.5);
        assert_eq!(minutes_between(start + Duration::minutes(2), start), -2.0);
    }
}
