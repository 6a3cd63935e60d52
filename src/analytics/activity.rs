//! Activity log aggregation
//!
//! Derives [`ActivityStats`] locally from a full log collection. The
//! result has the same shape the backend stats endpoint serves, so
//! callers can take their counters from either provenance.

use chrono::{DateTime, Duration, Utc};

use crate::records::{ActivityLog, ActivityStats};

/// Count a log collection into platform-wide activity stats.
///
/// `by_type` keys are the raw wire tags, unknown ones included. `today`
/// compares calendar days against `now`; `this_week` is the same
/// inclusive seven-day cutoff the student windows use.
pub fn aggregate_activity(logs: &[ActivityLog], now: DateTime<Utc>) -> ActivityStats {
    let mut stats = ActivityStats {
        total: logs.len() as u64,
        ..ActivityStats::default()
    };

    let today = now.date_naive();
    let week_cutoff = now - Duration::days(7);
    for log in logs {
        *stats
            .by_type
            .entry(log.activity_type.as_str().to_string())
            .or_insert(0) += 1;
        if log.created_at.date_naive() == today {
            stats.today += 1;
        }
        if log.created_at >= week_cutoff {
            stats.this_week += 1;
        }
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{ActivityActor, ActivityKind};
    use chrono::TimeZone;

    fn sample_log(id: &str, kind: ActivityKind, created_at: DateTime<Utc>) -> ActivityLog {
        ActivityLog {
            id: id.to_string(),
            user_id: "u-1".to_string(),
            activity_type: kind,
            action: "did_something".to_string(),
            title: None,
            description: None,
            score: None,
            metadata: None,
            created_at,
            user: ActivityActor {
                id: "u-1".to_string(),
                full_name: "Jane Smith".to_string(),
                email: "jane@example.com".to_string(),
                student_id: "STU-001".to_string(),
            },
        }
    }

    #[test]
    fn test_counts_by_raw_tag() {
        let now = Utc::now();
        let logs = vec![
            sample_log("l-1", ActivityKind::Login, now),
            sample_log("l-2", ActivityKind::QuizCompleted, now),
            sample_log("l-3", ActivityKind::QuizCompleted, now),
            sample_log("l-4", ActivityKind::Other("mystery_event".to_string()), now),
        ];

        let stats = aggregate_activity(&logs, now);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.by_type.get("login"), Some(&1));
        assert_eq!(stats.by_type.get("quiz_completed"), Some(&2));
        assert_eq!(stats.by_type.get("mystery_event"), Some(&1));
    }

    #[test]
    fn test_today_is_a_calendar_day_not_a_window() {
        // Early morning: 23 hours ago was yesterday, but still in-week
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 1, 0, 0).unwrap();
        let logs = vec![
            sample_log("l-1", ActivityKind::Login, now),
            sample_log("l-2", ActivityKind::Login, now - Duration::hours(23)),
        ];

        let stats = aggregate_activity(&logs, now);
        assert_eq!(stats.today, 1);
        assert_eq!(stats.this_week, 2);
    }

    #[test]
    fn test_week_boundary_is_inclusive() {
        let now = Utc::now();
        let logs = vec![
            sample_log("edge", ActivityKind::Login, now - Duration::days(7)),
            sample_log(
                "outside",
                ActivityKind::Login,
                now - Duration::days(7) - Duration::seconds(1),
            ),
        ];

        let stats = aggregate_activity(&logs, now);
        assert_eq!(stats.this_week, 1);
        assert_eq!(stats.total, 2);
    }

    #[test]
    fn test_empty_collection() {
        let stats = aggregate_activity(&[], Utc::now());
        assert_eq!(stats, ActivityStats::default());
    }
}
