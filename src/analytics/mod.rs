//! Analytics aggregation
//!
//! Pure derivations over fetched snapshots: the student dashboard
//! overview, locally-counted activity stats, and the cohort progress
//! average. Nothing here talks to the backend; callers fetch a
//! snapshot, sample `now` once, and pass both in.

pub mod activity;
pub mod progress;
pub mod students;

pub use activity::aggregate_activity;
pub use progress::average_progress;
pub use students::{aggregate_students, StudentOverview, RECENT_LIMIT};
