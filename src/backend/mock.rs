//! In-memory mock implementation of RecordSource for testing without a live backend.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::error::ApiError;
use super::traits::{ActivityQuery, RecordSource};
use crate::records::{
    ActivityLog, ActivityStats, LeaderboardEntry, ProgressSummary, Snapshot, Student,
    StudentStatus,
};

/// In-memory mock implementation of RecordSource for testing.
///
/// Records live in `Vec`s behind async `RwLock`s. Moderation calls flip
/// statuses in place so a re-fetch observes the transition, the way the
/// real backend would. Per-method call counters back cache tests, and
/// `set_fail_message` makes every subsequent call answer like a backend
/// 500 until cleared.
pub struct MockRecordSource {
    students: RwLock<Vec<Student>>,
    logs: RwLock<Vec<ActivityLog>>,
    stats: RwLock<ActivityStats>,
    leaderboard: RwLock<Vec<LeaderboardEntry>>,
    summaries: RwLock<Vec<ProgressSummary>>,
    fail_message: RwLock<Option<String>>,
    last_rejection_reason: RwLock<Option<String>>,
    student_fetches: AtomicUsize,
    activity_fetches: AtomicUsize,
    approvals: AtomicUsize,
    rejections: AtomicUsize,
    bulk_requests: AtomicUsize,
}

impl MockRecordSource {
    /// Create a new empty mock source.
    pub fn new() -> Self {
        Self {
            students: RwLock::new(Vec::new()),
            logs: RwLock::new(Vec::new()),
            stats: RwLock::new(ActivityStats::default()),
            leaderboard: RwLock::new(Vec::new()),
            summaries: RwLock::new(Vec::new()),
            fail_message: RwLock::new(None),
            last_rejection_reason: RwLock::new(None),
            student_fetches: AtomicUsize::new(0),
            activity_fetches: AtomicUsize::new(0),
            approvals: AtomicUsize::new(0),
            rejections: AtomicUsize::new(0),
            bulk_requests: AtomicUsize::new(0),
        }
    }

    /// Create a mock source pre-populated with students.
    pub fn with_students(students: Vec<Student>) -> Self {
        Self {
            students: RwLock::new(students),
            ..Self::new()
        }
    }

    pub async fn set_activity(&self, logs: Vec<ActivityLog>) {
        *self.logs.write().await = logs;
    }

    pub async fn set_stats(&self, stats: ActivityStats) {
        *self.stats.write().await = stats;
    }

    pub async fn set_leaderboard(&self, entries: Vec<LeaderboardEntry>) {
        *self.leaderboard.write().await = entries;
    }

    pub async fn set_summaries(&self, summaries: Vec<ProgressSummary>) {
        *self.summaries.write().await = summaries;
    }

    /// Make every subsequent call fail like a backend 500 carrying this
    /// message; pass `None` to heal.
    pub async fn set_fail_message(&self, message: Option<&str>) {
        *self.fail_message.write().await = message.map(str::to_string);
    }

    /// Reason forwarded by the most recent reject call.
    pub async fn last_rejection_reason(&self) -> Option<String> {
        self.last_rejection_reason.read().await.clone()
    }

    pub fn student_fetch_count(&self) -> usize {
        self.student_fetches.load(Ordering::SeqCst)
    }

    pub fn activity_fetch_count(&self) -> usize {
        self.activity_fetches.load(Ordering::SeqCst)
    }

    pub fn approval_count(&self) -> usize {
        self.approvals.load(Ordering::SeqCst)
    }

    pub fn rejection_count(&self) -> usize {
        self.rejections.load(Ordering::SeqCst)
    }

    pub fn bulk_request_count(&self) -> usize {
        self.bulk_requests.load(Ordering::SeqCst)
    }

    async fn check_failure(&self) -> Result<(), ApiError> {
        if let Some(message) = self.fail_message.read().await.clone() {
            return Err(ApiError::Rejected {
                status: 500,
                message: Some(message),
            });
        }
        Ok(())
    }
}

impl Default for MockRecordSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordSource for MockRecordSource {
    async fn list_students(&self) -> Result<Snapshot<Vec<Student>>, ApiError> {
        self.check_failure().await?;
        self.student_fetches.fetch_add(1, Ordering::SeqCst);
        let students = self.students.read().await;
        Ok(Snapshot::new(students.clone()))
    }

    async fn approve_student(&self, student_id: &str) -> Result<(), ApiError> {
        self.check_failure().await?;
        self.approvals.fetch_add(1, Ordering::SeqCst);
        let mut students = self.students.write().await;
        match students.iter_mut().find(|s| s.id == student_id) {
            Some(student) => {
                student.status = StudentStatus::Approved;
                Ok(())
            }
            None => Err(ApiError::Rejected {
                status: 404,
                message: Some("Student not found".to_string()),
            }),
        }
    }

    async fn reject_student(&self, student_id: &str, reason: Option<&str>) -> Result<(), ApiError> {
        self.check_failure().await?;
        self.rejections.fetch_add(1, Ordering::SeqCst);
        *self.last_rejection_reason.write().await = reason.map(str::to_string);
        let mut students = self.students.write().await;
        match students.iter_mut().find(|s| s.id == student_id) {
            Some(student) => {
                student.status = StudentStatus::Rejected;
                Ok(())
            }
            None => Err(ApiError::Rejected {
                status: 404,
                message: Some("Student not found".to_string()),
            }),
        }
    }

    async fn bulk_approve(&self, student_ids: &[String]) -> Result<(), ApiError> {
        self.check_failure().await?;
        self.bulk_requests.fetch_add(1, Ordering::SeqCst);
        let mut students = self.students.write().await;

        // All-or-nothing, like the backend endpoint
        if student_ids
            .iter()
            .any(|id| !students.iter().any(|s| &s.id == id))
        {
            return Err(ApiError::Rejected {
                status: 404,
                message: Some("One or more students not found".to_string()),
            });
        }
        for student in students.iter_mut() {
            if student_ids.contains(&student.id) {
                student.status = StudentStatus::Approved;
            }
        }
        Ok(())
    }

    async fn list_activity(
        &self,
        query: &ActivityQuery,
    ) -> Result<Snapshot<Vec<ActivityLog>>, ApiError> {
        self.check_failure().await?;
        self.activity_fetches.fetch_add(1, Ordering::SeqCst);
        let logs = self.logs.read().await;
        let mut filtered: Vec<ActivityLog> = logs
            .iter()
            .filter(|log| {
                if let Some(kind) = &query.kind {
                    if &log.activity_type != kind {
                        return false;
                    }
                }
                if let Some(user_id) = &query.user_id {
                    if &log.user_id != user_id {
                        return false;
                    }
                }
                true
            })
            .cloned()
            .collect();
        if let Some(limit) = query.limit {
            filtered.truncate(limit as usize);
        }
        Ok(Snapshot::new(filtered))
    }

    async fn activity_stats(&self) -> Result<Snapshot<ActivityStats>, ApiError> {
        self.check_failure().await?;
        let stats = self.stats.read().await;
        Ok(Snapshot::new(stats.clone()))
    }

    async fn leaderboard(&self, limit: u32) -> Result<Snapshot<Vec<LeaderboardEntry>>, ApiError> {
        self.check_failure().await?;
        let entries = self.leaderboard.read().await;
        let mut top: Vec<LeaderboardEntry> = entries.clone();
        top.truncate(limit as usize);
        Ok(Snapshot::new(top))
    }

    async fn progress_summaries(&self) -> Result<Snapshot<Vec<ProgressSummary>>, ApiError> {
        self.check_failure().await?;
        let summaries = self.summaries.read().await;
        Ok(Snapshot::new(summaries.clone()))
    }
}
