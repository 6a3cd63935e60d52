//! Record source abstraction
//!
//! One seam between the console core and the backend. The real
//! implementation speaks HTTP ([`super::client::HttpRecordSource`]);
//! tests swap in [`super::mock::MockRecordSource`]. Everything above
//! this trait is transport-agnostic.

use async_trait::async_trait;

use super::error::ApiError;
use crate::records::{
    ActivityKind, ActivityLog, ActivityStats, LeaderboardEntry, ProgressSummary, Snapshot, Student,
};

/// Server-side parameters for an activity-log fetch
///
/// These narrow the collection at the source; client-side text search
/// happens afterwards in the filter module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ActivityQuery {
    /// Only logs with this activity-type tag
    pub kind: Option<ActivityKind>,
    /// Only logs owned by this user
    pub user_id: Option<String>,
    /// Page size cap; the backend applies its own default when absent
    pub limit: Option<u32>,
}

impl ActivityQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_kind(mut self, kind: ActivityKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Gateway to the moderation and analytics backend
///
/// Reads return immutable [`Snapshot`]s stamped at fetch completion.
/// Mutations forward the request and surface the backend's verdict
/// unchanged: no retry, no optimistic local state, no client-side
/// transition guards.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Fetch every registrant, all moderation states included
    async fn list_students(&self) -> Result<Snapshot<Vec<Student>>, ApiError>;

    /// Move one registrant pending → approved
    async fn approve_student(&self, student_id: &str) -> Result<(), ApiError>;

    /// Move one registrant pending → rejected, optional reason forwarded
    /// verbatim
    async fn reject_student(&self, student_id: &str, reason: Option<&str>) -> Result<(), ApiError>;

    /// Approve a whole id set in a single request
    ///
    /// All-or-nothing from the caller's perspective; whether the backend
    /// applies partially on its side is its own concern.
    async fn bulk_approve(&self, student_ids: &[String]) -> Result<(), ApiError>;

    /// Fetch a page of activity logs narrowed by `query`
    async fn list_activity(&self, query: &ActivityQuery)
        -> Result<Snapshot<Vec<ActivityLog>>, ApiError>;

    /// Fetch the platform-wide activity counters
    async fn activity_stats(&self) -> Result<Snapshot<ActivityStats>, ApiError>;

    /// Fetch the top `limit` leaderboard rows, ranks backend-assigned
    async fn leaderboard(&self, limit: u32) -> Result<Snapshot<Vec<LeaderboardEntry>>, ApiError>;

    /// Fetch the per-student progress roll-ups
    async fn progress_summaries(&self) -> Result<Snapshot<Vec<ProgressSummary>>, ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_query_builder() {
        let query = ActivityQuery::new()
            .with_kind(ActivityKind::QuizCompleted)
            .with_user("u-7")
            .with_limit(100);

        assert_eq!(query.kind, Some(ActivityKind::QuizCompleted));
        assert_eq!(query.user_id.as_deref(), Some("u-7"));
        assert_eq!(query.limit, Some(100));
    }

    #[test]
    fn test_activity_query_default_is_unfiltered() {
        let query = ActivityQuery::new();
        assert_eq!(query, ActivityQuery::default());
        assert!(query.kind.is_none() && query.user_id.is_none() && query.limit.is_none());
    }
}
