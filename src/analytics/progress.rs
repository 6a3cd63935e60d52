//! Progress cohort aggregation
//!
//! The only derivation done over progress summaries is the cohort
//! average; everything else (streaks, completion counts, leaderboard
//! ranks) is backend-computed and passed through unchanged.

use crate::records::ProgressSummary;

/// Mean `overall_progress` across the cohort, rounded to nearest;
/// 0 for an empty cohort.
pub fn average_progress(summaries: &[ProgressSummary]) -> i64 {
    if summaries.is_empty() {
        return 0;
    }
    let sum: f64 = summaries.iter().map(|s| s.overall_progress).sum();
    (sum / summaries.len() as f64).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_summary(id: &str, overall_progress: f64) -> ProgressSummary {
        ProgressSummary {
            id: id.to_string(),
            name: format!("Student {}", id),
            email: format!("{}@example.com", id),
            overall_progress,
            courses_completed: 2,
            videos_watched: 10,
            quizzes_completed: 4,
            current_streak: 3,
            languages: Vec::new(),
        }
    }

    #[test]
    fn test_average_rounds_to_nearest() {
        let cohort = vec![
            sample_summary("a", 80.0),
            sample_summary("b", 91.0),
        ];
        // 85.5 rounds up
        assert_eq!(average_progress(&cohort), 86);

        let cohort = vec![
            sample_summary("a", 80.0),
            sample_summary("b", 90.8),
        ];
        // 85.4 rounds down
        assert_eq!(average_progress(&cohort), 85);
    }

    #[test]
    fn test_empty_cohort_is_zero() {
        assert_eq!(average_progress(&[]), 0);
    }

    #[test]
    fn test_single_summary_passes_through() {
        assert_eq!(average_progress(&[sample_summary("a", 72.4)]), 72);
    }
}
