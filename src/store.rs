//! Snapshot store
//!
//! The per-query cache of backend snapshots, and the only component
//! that ever replaces one. Reads serve the cached snapshot when present
//! and fetch through the record source otherwise; a moderation event
//! with an applied outcome discards the student snapshot so the next
//! read re-fetches. Snapshots are swapped whole, never patched.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::backend::{ActivityQuery, ApiError, RecordSource};
use crate::events::EventBus;
use crate::records::{
    ActivityLog, ActivityStats, LeaderboardEntry, ProgressSummary, RecordKind, Snapshot, Student,
};

/// Race a fetch against its cancellation token.
///
/// `biased` so a token cancelled before the call starts never lets the
/// fetch through; cancellation resolves to [`ApiError::Cancelled`] and
/// nothing gets cached.
async fn run_cancellable<T>(
    cancel: &CancellationToken,
    fut: impl Future<Output = Result<T, ApiError>>,
) -> Result<T, ApiError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ApiError::Cancelled),
        result = fut => result,
    }
}

pub struct SnapshotStore {
    source: Arc<dyn RecordSource>,
    students: RwLock<Option<Snapshot<Vec<Student>>>>,
    activity: RwLock<HashMap<ActivityQuery, Snapshot<Vec<ActivityLog>>>>,
    activity_stats: RwLock<Option<Snapshot<ActivityStats>>>,
    leaderboard: RwLock<HashMap<u32, Snapshot<Vec<LeaderboardEntry>>>>,
    progress: RwLock<Option<Snapshot<Vec<ProgressSummary>>>>,
}

impl SnapshotStore {
    pub fn new(source: Arc<dyn RecordSource>) -> Self {
        Self {
            source,
            students: RwLock::new(None),
            activity: RwLock::new(HashMap::new()),
            activity_stats: RwLock::new(None),
            leaderboard: RwLock::new(HashMap::new()),
            progress: RwLock::new(None),
        }
    }

    /// Student snapshot, cached until a moderation event invalidates it
    pub async fn students(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Snapshot<Vec<Student>>, ApiError> {
        if let Some(snapshot) = self.students.read().await.clone() {
            return Ok(snapshot);
        }
        let snapshot = run_cancellable(cancel, self.source.list_students()).await?;
        *self.students.write().await = Some(snapshot.clone());
        Ok(snapshot)
    }

    /// Drop the student snapshot and fetch a fresh one in one call
    pub async fn refresh_students(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Snapshot<Vec<Student>>, ApiError> {
        *self.students.write().await = None;
        self.students(cancel).await
    }

    /// Activity page for `query`, cached per distinct query
    pub async fn activity(
        &self,
        query: &ActivityQuery,
        cancel: &CancellationToken,
    ) -> Result<Snapshot<Vec<ActivityLog>>, ApiError> {
        if let Some(snapshot) = self.activity.read().await.get(query).cloned() {
            return Ok(snapshot);
        }
        let snapshot = run_cancellable(cancel, self.source.list_activity(query)).await?;
        self.activity
            .write()
            .await
            .insert(query.clone(), snapshot.clone());
        Ok(snapshot)
    }

    pub async fn activity_stats(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Snapshot<ActivityStats>, ApiError> {
        if let Some(snapshot) = self.activity_stats.read().await.clone() {
            return Ok(snapshot);
        }
        let snapshot = run_cancellable(cancel, self.source.activity_stats()).await?;
        *self.activity_stats.write().await = Some(snapshot.clone());
        Ok(snapshot)
    }

    /// Leaderboard rows, cached per requested limit
    pub async fn leaderboard(
        &self,
        limit: u32,
        cancel: &CancellationToken,
    ) -> Result<Snapshot<Vec<LeaderboardEntry>>, ApiError> {
        if let Some(snapshot) = self.leaderboard.read().await.get(&limit).cloned() {
            return Ok(snapshot);
        }
        let snapshot = run_cancellable(cancel, self.source.leaderboard(limit)).await?;
        self.leaderboard
            .write()
            .await
            .insert(limit, snapshot.clone());
        Ok(snapshot)
    }

    pub async fn progress(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Snapshot<Vec<ProgressSummary>>, ApiError> {
        if let Some(snapshot) = self.progress.read().await.clone() {
            return Ok(snapshot);
        }
        let snapshot = run_cancellable(cancel, self.source.progress_summaries()).await?;
        *self.progress.write().await = Some(snapshot.clone());
        Ok(snapshot)
    }

    /// Discard every cached snapshot of `kind`; the next read re-fetches
    pub async fn invalidate(&self, kind: RecordKind) {
        match kind {
            RecordKind::Students => *self.students.write().await = None,
            RecordKind::ActivityLogs => self.activity.write().await.clear(),
            RecordKind::ActivityStats => *self.activity_stats.write().await = None,
            RecordKind::Leaderboard => self.leaderboard.write().await.clear(),
            RecordKind::ProgressSummaries => *self.progress.write().await = None,
        }
        debug!(%kind, "Snapshot invalidated");
    }

    /// Subscribe this store to the moderation bus.
    ///
    /// Applied outcomes invalidate the student snapshot; failed ones
    /// change nothing. The task ends when the bus closes.
    pub fn spawn_invalidation_listener(self: &Arc<Self>, bus: &EventBus) -> JoinHandle<()> {
        let store = Arc::clone(self);
        let mut rx = bus.subscribe();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => {
                        if let Some(kind) = event.invalidates() {
                            store.invalidate(kind).await;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        // Missed events may include applied outcomes;
                        // treat the student snapshot as stale
                        warn!(skipped, "Invalidation listener lagged");
                        store.invalidate(RecordKind::Students).await;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockRecordSource;
    use crate::events::{EventEmitter, ModerationAction, ModerationEvent};
    use crate::records::{ActivityKind, StudentStatus};
    use chrono::Utc;
    use std::time::Duration;

    fn sample_student(id: &str) -> Student {
        Student {
            id: id.to_string(),
            full_name: format!("Student {}", id),
            email: format!("{}@example.com", id),
            phone_number: "+100000".to_string(),
            student_id: None,
            program: None,
            year_of_study: None,
            status: StudentStatus::Pending,
            created_at: Utc::now(),
        }
    }

    fn store_with(students: Vec<Student>) -> (Arc<SnapshotStore>, Arc<MockRecordSource>) {
        let source = Arc::new(MockRecordSource::with_students(students));
        let store = Arc::new(SnapshotStore::new(source.clone()));
        (store, source)
    }

    #[tokio::test]
    async fn test_students_cached_until_invalidated() {
        let (store, source) = store_with(vec![sample_student("s-1")]);
        let cancel = CancellationToken::new();

        store.students(&cancel).await.unwrap();
        store.students(&cancel).await.unwrap();
        assert_eq!(source.student_fetch_count(), 1);

        store.invalidate(RecordKind::Students).await;
        store.students(&cancel).await.unwrap();
        assert_eq!(source.student_fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_refresh_students_forces_fetch() {
        let (store, source) = store_with(vec![sample_student("s-1")]);
        let cancel = CancellationToken::new();

        store.students(&cancel).await.unwrap();
        store.refresh_students(&cancel).await.unwrap();
        assert_eq!(source.student_fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_activity_cached_per_query() {
        let (store, source) = store_with(vec![]);
        let cancel = CancellationToken::new();

        let all = ActivityQuery::new();
        let quizzes = ActivityQuery::new().with_kind(ActivityKind::QuizCompleted);

        store.activity(&all, &cancel).await.unwrap();
        store.activity(&quizzes, &cancel).await.unwrap();
        assert_eq!(source.activity_fetch_count(), 2);

        // Same queries again hit the cache
        store.activity(&all, &cancel).await.unwrap();
        store.activity(&quizzes, &cancel).await.unwrap();
        assert_eq!(source.activity_fetch_count(), 2);

        store.invalidate(RecordKind::ActivityLogs).await;
        store.activity(&all, &cancel).await.unwrap();
        assert_eq!(source.activity_fetch_count(), 3);
    }

    #[tokio::test]
    async fn test_cancelled_fetch_installs_nothing() {
        let (store, source) = store_with(vec![sample_student("s-1")]);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = store.students(&cancel).await.unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(source.student_fetch_count(), 0);

        // A live token afterwards fetches normally
        let fresh = CancellationToken::new();
        store.students(&fresh).await.unwrap();
        assert_eq!(source.student_fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_applied_event_invalidates_via_listener() {
        let (store, source) = store_with(vec![sample_student("s-1")]);
        let cancel = CancellationToken::new();
        let bus = EventBus::default();
        let _listener = store.spawn_invalidation_listener(&bus);

        store.students(&cancel).await.unwrap();
        assert_eq!(source.student_fetch_count(), 1);

        bus.emit(ModerationEvent::applied(ModerationAction::Approve {
            student_id: "s-1".to_string(),
        }));

        // The listener runs on its own task; poll until the
        // invalidation lands and a read re-fetches
        let mut refetched = false;
        for _ in 0..100 {
            tokio::time::sleep(Duration::from_millis(10)).await;
            store.students(&cancel).await.unwrap();
            if source.student_fetch_count() >= 2 {
                refetched = true;
                break;
            }
        }
        assert!(refetched, "applied event should invalidate the snapshot");
    }

    #[tokio::test]
    async fn test_failed_event_leaves_cache_alone() {
        let (store, source) = store_with(vec![sample_student("s-1")]);
        let cancel = CancellationToken::new();
        let bus = EventBus::default();
        let _listener = store.spawn_invalidation_listener(&bus);

        store.students(&cancel).await.unwrap();
        bus.emit(ModerationEvent::failed(
            ModerationAction::Approve {
                student_id: "s-1".to_string(),
            },
            "Backend down",
        ));

        tokio::time::sleep(Duration::from_millis(50)).await;
        store.students(&cancel).await.unwrap();
        assert_eq!(source.student_fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_leaderboard_cached_per_limit() {
        let cancel = CancellationToken::new();
        let source = MockRecordSource::new();
        source
            .set_leaderboard(vec![
                LeaderboardEntry {
                    rank: 1,
                    user_id: "u-1".to_string(),
                    name: "Jane Smith".to_string(),
                    avg_progress: 92.0,
                },
                LeaderboardEntry {
                    rank: 2,
                    user_id: "u-2".to_string(),
                    name: "John Doe".to_string(),
                    avg_progress: 77.5,
                },
            ])
            .await;
        let source = Arc::new(source);
        let store = SnapshotStore::new(source.clone());

        let one = store.leaderboard(1, &cancel).await.unwrap();
        let fifty = store.leaderboard(50, &cancel).await.unwrap();
        assert_eq!(one.data().len(), 1);
        assert_eq!(fifty.data().len(), 2);

        // Repeated limits come back from the cache with the original stamp
        let again = store.leaderboard(1, &cancel).await.unwrap();
        assert_eq!(again.fetched_at(), one.fetched_at());

        store.invalidate(RecordKind::Leaderboard).await;
        let fresh = store.leaderboard(1, &cancel).await.unwrap();
        assert!(fresh.fetched_at() > one.fetched_at());
    }
}
