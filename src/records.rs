//! Domain records for the admin console
//!
//! Wire-format models for everything the backend serves the console:
//! registrants under moderation, activity logs, leaderboard entries and
//! per-student progress summaries. All of them are read-only snapshots
//! on this side; the backend owns the data and every field arrives in
//! camelCase JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

// ============================================================================
// Core Enums
// ============================================================================

/// Moderation state of a registrant
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum StudentStatus {
    /// Awaiting staff review
    Pending,
    /// Admitted to the platform
    Approved,
    /// Turned down (terminal, like approved)
    Rejected,
}

impl fmt::Display for StudentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Approved => write!(f, "approved"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

impl FromStr for StudentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(format!("Unknown student status: {}", s)),
        }
    }
}

/// Activity-type tag on a log entry
///
/// The tag set is open: the backend is free to introduce new tags, so
/// unknown values are preserved verbatim instead of failing the whole
/// collection fetch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(from = "String", into = "String")]
pub enum ActivityKind {
    CourseAccessed,
    VideoWatched,
    QuizCompleted,
    QuizStarted,
    MaterialViewed,
    Login,
    DashboardAccessed,
    /// Tag this build does not know about, kept as-is
    Other(String),
}

impl ActivityKind {
    /// Wire tag (snake_case, as the backend sends it)
    pub fn as_str(&self) -> &str {
        match self {
            Self::CourseAccessed => "course_accessed",
            Self::VideoWatched => "video_watched",
            Self::QuizCompleted => "quiz_completed",
            Self::QuizStarted => "quiz_started",
            Self::MaterialViewed => "material_viewed",
            Self::Login => "login",
            Self::DashboardAccessed => "dashboard_accessed",
            Self::Other(tag) => tag,
        }
    }

    /// Human heading for stat cards and tables
    pub fn label(&self) -> String {
        match self {
            Self::CourseAccessed => "Course Accessed".to_string(),
            Self::VideoWatched => "Video Watched".to_string(),
            Self::QuizCompleted => "Quiz Completed".to_string(),
            Self::QuizStarted => "Quiz Started".to_string(),
            Self::MaterialViewed => "Material Viewed".to_string(),
            Self::Login => "Login".to_string(),
            Self::DashboardAccessed => "Dashboard Accessed".to_string(),
            Self::Other(tag) => tag.clone(),
        }
    }
}

impl From<String> for ActivityKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "course_accessed" => Self::CourseAccessed,
            "video_watched" => Self::VideoWatched,
            "quiz_completed" => Self::QuizCompleted,
            "quiz_started" => Self::QuizStarted,
            "material_viewed" => Self::MaterialViewed,
            "login" => Self::Login,
            "dashboard_accessed" => Self::DashboardAccessed,
            _ => Self::Other(s),
        }
    }
}

impl From<ActivityKind> for String {
    fn from(kind: ActivityKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ActivityKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s.to_string()))
    }
}

/// Backend resource a snapshot was fetched for
///
/// Names each cacheable collection for invalidation and logging.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Students,
    ActivityLogs,
    ActivityStats,
    Leaderboard,
    ProgressSummaries,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Students => write!(f, "students"),
            Self::ActivityLogs => write!(f, "activity_logs"),
            Self::ActivityStats => write!(f, "activity_stats"),
            Self::Leaderboard => write!(f, "leaderboard"),
            Self::ProgressSummaries => write!(f, "progress_summaries"),
        }
    }
}

// ============================================================================
// Students
// ============================================================================

/// A registrant as served by the moderation endpoint
///
/// Created by the public registration flow and never deleted here; the
/// console only moves `status` from pending to approved or rejected.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    /// Institutional student number, filled in later by some cohorts
    pub student_id: Option<String>,
    pub program: Option<String>,
    pub year_of_study: Option<String>,
    pub status: StudentStatus,
    pub created_at: DateTime<Utc>,
}

impl Student {
    /// Whether this registrant still awaits a moderation decision
    pub fn is_pending(&self) -> bool {
        self.status == StudentStatus::Pending
    }
}

// ============================================================================
// Activity
// ============================================================================

/// Denormalized owner summary embedded in each activity log
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActivityActor {
    pub id: String,
    pub full_name: String,
    pub email: String,
    /// Some deployments omit this; default to empty rather than fail
    #[serde(default)]
    pub student_id: String,
}

/// One immutable entry in the platform activity feed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLog {
    pub id: String,
    pub user_id: String,
    pub activity_type: ActivityKind,
    pub action: String,
    pub title: Option<String>,
    pub description: Option<String>,
    /// 0-100 scale where present (quiz results)
    pub score: Option<f64>,
    /// Opaque payload, carried through without interpretation
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub user: ActivityActor,
}

impl ActivityLog {
    /// Relative-time label for feed rows: "Just now", "5 minutes ago",
    /// "3 hours ago", "2 days ago", then the plain date.
    pub fn age_label(&self, now: DateTime<Utc>) -> String {
        let elapsed = now.signed_duration_since(self.created_at);
        let mins = elapsed.num_minutes();
        let hours = elapsed.num_hours();
        let days = elapsed.num_days();

        if mins < 1 {
            "Just now".to_string()
        } else if mins < 60 {
            format!("{} minute{} ago", mins, if mins > 1 { "s" } else { "" })
        } else if hours < 24 {
            format!("{} hour{} ago", hours, if hours > 1 { "s" } else { "" })
        } else if days < 7 {
            format!("{} day{} ago", days, if days > 1 { "s" } else { "" })
        } else {
            self.created_at.format("%Y-%m-%d").to_string()
        }
    }
}

/// Platform-wide activity counters
///
/// Served whole by the stats endpoint, or derived locally from a full
/// log collection by the analytics module; same shape either way.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActivityStats {
    pub total: u64,
    /// Keyed by raw wire tag, unknown tags included
    #[serde(default)]
    pub by_type: BTreeMap<String, u64>,
    pub today: u64,
    pub this_week: u64,
}

// ============================================================================
// Leaderboard & Progress
// ============================================================================

/// One row of the progress leaderboard
///
/// `rank` is assigned by the backend (1-based, dense) and never
/// recomputed here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub user_id: String,
    pub name: String,
    /// 0-100, may be fractional
    pub avg_progress: f64,
}

impl LeaderboardEntry {
    /// Progress clamped to [0, 100] for drawing a bar
    pub fn bar_width(&self) -> f64 {
        self.avg_progress.clamp(0.0, 100.0)
    }

    /// Unclamped progress rounded for the numeric readout
    pub fn display_progress(&self) -> i64 {
        self.avg_progress.round() as i64
    }
}

/// Per-language progress inside a student summary
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LanguageProgress {
    pub name: String,
    pub progress: f64,
}

/// Progress roll-up for one student
///
/// Every value is computed by the backend and passed through unchanged;
/// the console never re-derives streaks or completion counts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSummary {
    pub id: String,
    pub name: String,
    pub email: String,
    pub overall_progress: f64,
    pub courses_completed: u32,
    pub videos_watched: u32,
    pub quizzes_completed: u32,
    pub current_streak: u32,
    #[serde(default)]
    pub languages: Vec<LanguageProgress>,
}

// ============================================================================
// Snapshots
// ============================================================================

/// Immutable result of one backend fetch
///
/// Holders only ever get shared read access; the snapshot store swaps
/// whole snapshots on invalidation and nothing is patched in place.
#[derive(Debug)]
pub struct Snapshot<T> {
    data: Arc<T>,
    fetched_at: DateTime<Utc>,
}

impl<T> Snapshot<T> {
    /// Wrap freshly fetched data, stamped with the current instant
    pub fn new(data: T) -> Self {
        Self {
            data: Arc::new(data),
            fetched_at: Utc::now(),
        }
    }

    /// Wrap data with an explicit fetch timestamp
    pub fn with_timestamp(data: T, fetched_at: DateTime<Utc>) -> Self {
        Self {
            data: Arc::new(data),
            fetched_at,
        }
    }

    pub fn data(&self) -> &T {
        &self.data
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }
}

// Manual impl: cloning shares the Arc, so T itself need not be Clone.
impl<T> Clone for Snapshot<T> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
            fetched_at: self.fetched_at,
        }
    }
}
