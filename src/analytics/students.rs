//! Student collection aggregation
//!
//! Derives the dashboard overview from one student snapshot: status
//! partition, approval rate, registration windows, program and year
//! groupings, and the newest registrations. Pure over its inputs; the
//! caller samples `now` once so a whole pass shares one cutoff.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};

use crate::records::{Student, StudentStatus};

/// How many of the newest registrations the overview carries
pub const RECENT_LIMIT: usize = 5;

/// Derived rollup of one student snapshot, never persisted
#[derive(Debug, Clone, PartialEq)]
pub struct StudentOverview {
    pub total: usize,
    pub approved: usize,
    pub pending: usize,
    pub rejected: usize,
    /// Approved share of the whole collection, one decimal ("50.0");
    /// the literal "0" for an empty collection
    pub approval_rate: String,
    pub last_7_days: usize,
    pub last_30_days: usize,
    pub by_program: BTreeMap<String, usize>,
    pub by_year: BTreeMap<String, usize>,
    /// Newest first, at most [`RECENT_LIMIT`]
    pub recent_registrations: Vec<Student>,
    /// The `now` this whole pass was computed against
    pub generated_at: DateTime<Utc>,
}

/// Aggregate a student collection into the dashboard overview.
///
/// Every student lands in exactly one status bucket. Window counts are
/// inclusive: a registration at exactly `now - 7d` is inside the 7-day
/// window. Grouping skips students whose program or year is absent or
/// empty and keeps the raw values as keys; rendering decides what to
/// call the leftovers.
pub fn aggregate_students(students: &[Student], now: DateTime<Utc>) -> StudentOverview {
    let total = students.len();
    let mut approved = 0;
    let mut pending = 0;
    let mut rejected = 0;
    for student in students {
        match student.status {
            StudentStatus::Approved => approved += 1,
            StudentStatus::Pending => pending += 1,
            StudentStatus::Rejected => rejected += 1,
        }
    }

    let approval_rate = if total == 0 {
        "0".to_string()
    } else {
        format!("{:.1}", approved as f64 / total as f64 * 100.0)
    };

    let week_cutoff = now - Duration::days(7);
    let month_cutoff = now - Duration::days(30);
    let last_7_days = students
        .iter()
        .filter(|s| s.created_at >= week_cutoff)
        .count();
    let last_30_days = students
        .iter()
        .filter(|s| s.created_at >= month_cutoff)
        .count();

    let mut by_program: BTreeMap<String, usize> = BTreeMap::new();
    let mut by_year: BTreeMap<String, usize> = BTreeMap::new();
    for student in students {
        if let Some(program) = student.program.as_deref() {
            if !program.is_empty() {
                *by_program.entry(program.to_string()).or_insert(0) += 1;
            }
        }
        if let Some(year) = student.year_of_study.as_deref() {
            if !year.is_empty() {
                *by_year.entry(year.to_string()).or_insert(0) += 1;
            }
        }
    }

    let mut recent: Vec<Student> = students.to_vec();
    // Stable sort keeps source order among equal timestamps
    recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    recent.truncate(RECENT_LIMIT);

    StudentOverview {
        total,
        approved,
        pending,
        rejected,
        approval_rate,
        last_7_days,
        last_30_days,
        by_program,
        by_year,
        recent_registrations: recent,
        generated_at: now,
    }
}
