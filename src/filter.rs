//! In-memory filtering for already-fetched snapshots
//!
//! Text search plus categorical narrowing, recomputed from scratch on
//! every input change. No relevance ranking and no mutation; results
//! keep the snapshot's order.

use crate::records::{ActivityKind, ActivityLog, Student, StudentStatus};

/// Case-insensitive substring test across a record's searchable fields.
///
/// The empty query matches everything, and nothing is trimmed; a query
/// of " " only matches fields containing a space.
fn any_field_contains(fields: &[&str], query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let needle = query.to_lowercase();
    fields
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

/// Narrows a student collection by free text and status
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudentFilter {
    pub query: String,
    /// `None` is the "all" tab: no status constraint
    pub status: Option<StudentStatus>,
}

impl StudentFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    pub fn with_status(mut self, status: StudentStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Searchable fields: full name, email, student id
    pub fn matches(&self, student: &Student) -> bool {
        if let Some(status) = self.status {
            if student.status != status {
                return false;
            }
        }
        any_field_contains(
            &[
                &student.full_name,
                &student.email,
                student.student_id.as_deref().unwrap_or(""),
            ],
            &self.query,
        )
    }

    pub fn apply<'a>(&self, students: &'a [Student]) -> Vec<&'a Student> {
        students.iter().filter(|s| self.matches(s)).collect()
    }
}

/// Narrows an activity feed by free text and activity type
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivityFilter {
    pub query: String,
    /// `None` is the "all" tab: no type constraint
    pub kind: Option<ActivityKind>,
}

impl ActivityFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    pub fn with_kind(mut self, kind: ActivityKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Searchable fields: owner name, owner email, owner student id,
    /// title, action
    pub fn matches(&self, log: &ActivityLog) -> bool {
        if let Some(kind) = &self.kind {
            if &log.activity_type != kind {
                return false;
            }
        }
        any_field_contains(
            &[
                &log.user.full_name,
                &log.user.email,
                &log.user.student_id,
                log.title.as_deref().unwrap_or(""),
                &log.action,
            ],
            &self.query,
        )
    }

    pub fn apply<'a>(&self, logs: &'a [ActivityLog]) -> Vec<&'a ActivityLog> {
        logs.iter().filter(|l| self.matches(l)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::ActivityActor;
    use chrono::Utc;

    fn sample_student(id: &str, name: &str, email: &str, status: StudentStatus) -> Student {
        Student {
            id: id.to_string(),
            full_name: name.to_string(),
            email: email.to_string(),
            phone_number: "+100000".to_string(),
            student_id: Some(format!("STU-{}", id)),
            program: None,
            year_of_study: None,
            status,
            created_at: Utc::now(),
        }
    }

    fn sample_log(id: &str, kind: ActivityKind, action: &str, owner: &str) -> ActivityLog {
        ActivityLog {
            id: id.to_string(),
            user_id: "u-1".to_string(),
            activity_type: kind,
            action: action.to_string(),
            title: Some("Rust Basics".to_string()),
            description: None,
            score: None,
            metadata: None,
            created_at: Utc::now(),
            user: ActivityActor {
                id: "u-1".to_string(),
                full_name: owner.to_string(),
                email: format!("{}@example.com", id),
                student_id: "STU-001".to_string(),
            },
        }
    }

    #[test]
    fn test_query_matches_name_case_insensitively() {
        let students = vec![
            sample_student("1", "Jane Smith", "jane@example.com", StudentStatus::Pending),
            sample_student("2", "John Doe", "john@example.com", StudentStatus::Pending),
        ];

        let filter = StudentFilter::new().with_query("jane");
        let hits = filter.apply(&students);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].full_name, "Jane Smith");

        let filter = StudentFilter::new().with_query("JANE");
        assert_eq!(filter.apply(&students).len(), 1);
    }

    #[test]
    fn test_query_matches_email_and_student_id() {
        let students = vec![sample_student(
            "42",
            "Jane Smith",
            "jane@example.com",
            StudentStatus::Approved,
        )];

        assert_eq!(
            StudentFilter::new()
                .with_query("@example")
                .apply(&students)
                .len(),
            1
        );
        assert_eq!(
            StudentFilter::new()
                .with_query("stu-42")
                .apply(&students)
                .len(),
            1
        );
    }

    #[test]
    fn test_empty_query_matches_everything() {
        let students = vec![
            sample_student("1", "Jane Smith", "jane@example.com", StudentStatus::Pending),
            sample_student("2", "John Doe", "john@example.com", StudentStatus::Approved),
        ];

        assert_eq!(StudentFilter::new().apply(&students).len(), 2);
    }

    #[test]
    fn test_query_is_not_trimmed() {
        let students = vec![sample_student(
            "1",
            "Jane Smith",
            "jane@example.com",
            StudentStatus::Pending,
        )];

        // "Jane Smith" contains "e s"; a stray-whitespace query is taken
        // literally rather than cleaned up
        assert_eq!(StudentFilter::new().with_query("e s").apply(&students).len(), 1);
        assert_eq!(
            StudentFilter::new()
                .with_query(" jane ")
                .apply(&students)
                .len(),
            0
        );
    }

    #[test]
    fn test_status_and_query_must_both_hold() {
        let students = vec![
            sample_student("1", "Jane Smith", "jane@example.com", StudentStatus::Pending),
            sample_student("2", "Jane Doe", "jd@example.com", StudentStatus::Approved),
        ];

        let filter = StudentFilter::new()
            .with_query("jane")
            .with_status(StudentStatus::Approved);
        let hits = filter.apply(&students);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "2");
    }

    #[test]
    fn test_apply_preserves_order_and_is_idempotent() {
        let students = vec![
            sample_student("3", "Ada Smith", "ada@example.com", StudentStatus::Pending),
            sample_student("1", "Bea Smith", "bea@example.com", StudentStatus::Pending),
            sample_student("2", "Cal Smith", "cal@example.com", StudentStatus::Pending),
        ];

        let filter = StudentFilter::new().with_query("smith");
        let once: Vec<&Student> = filter.apply(&students);
        let ids: Vec<&str> = once.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "1", "2"]);

        // Filtering the filtered set changes nothing
        let owned: Vec<Student> = once.into_iter().cloned().collect();
        let twice = filter.apply(&owned);
        assert_eq!(twice.len(), owned.len());
    }

    #[test]
    fn test_activity_filter_by_kind_and_text() {
        let logs = vec![
            sample_log("1", ActivityKind::QuizCompleted, "completed_quiz", "Jane Smith"),
            sample_log("2", ActivityKind::Login, "logged_in", "Jane Smith"),
            sample_log("3", ActivityKind::QuizCompleted, "completed_quiz", "John Doe"),
        ];

        let filter = ActivityFilter::new().with_kind(ActivityKind::QuizCompleted);
        assert_eq!(filter.apply(&logs).len(), 2);

        let filter = ActivityFilter::new()
            .with_kind(ActivityKind::QuizCompleted)
            .with_query("jane");
        let hits = filter.apply(&logs);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "1");
    }

    #[test]
    fn test_activity_query_searches_title_and_action() {
        let logs = vec![sample_log(
            "1",
            ActivityKind::CourseAccessed,
            "opened_course",
            "Jane Smith",
        )];

        assert_eq!(
            ActivityFilter::new()
                .with_query("rust basics")
                .apply(&logs)
                .len(),
            1
        );
        assert_eq!(
            ActivityFilter::new()
                .with_query("opened_")
                .apply(&logs)
                .len(),
            1
        );
        assert_eq!(
            ActivityFilter::new()
                .with_query("python")
                .apply(&logs)
                .len(),
            0
        );
    }
}
