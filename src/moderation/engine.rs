//! Moderation engine
//!
//! Drives student state transitions against the backend: single
//! approve, single reject with an optional reason, and one-request bulk
//! approval. There is no optimistic local mutation anywhere; on success
//! the engine emits an applied event and the invalidated snapshot's
//! re-fetch delivers the new truth. On failure the prior state stands
//! untouched and the server's reason rides along on the error and the
//! failure event.

use std::sync::Arc;

use tracing::{info, warn};

use super::selection::SelectionTracker;
use crate::backend::{ApiError, RecordSource};
use crate::events::{EventEmitter, ModerationAction, ModerationEvent};

pub struct ModerationEngine {
    source: Arc<dyn RecordSource>,
    events: Arc<dyn EventEmitter>,
}

impl ModerationEngine {
    pub fn new(source: Arc<dyn RecordSource>, events: Arc<dyn EventEmitter>) -> Self {
        Self { source, events }
    }

    /// Move one registrant pending → approved
    ///
    /// Repeat calls on an already-terminal student are forwarded as-is;
    /// whatever verdict the backend returns is surfaced unchanged.
    pub async fn approve(&self, student_id: &str) -> Result<(), ApiError> {
        let action = ModerationAction::Approve {
            student_id: student_id.to_string(),
        };
        self.submit(action, self.source.approve_student(student_id))
            .await
    }

    /// Move one registrant pending → rejected, reason forwarded verbatim
    pub async fn reject(&self, student_id: &str, reason: Option<&str>) -> Result<(), ApiError> {
        let action = ModerationAction::Reject {
            student_id: student_id.to_string(),
            reason: reason.map(str::to_string),
        };
        self.submit(action, self.source.reject_student(student_id, reason))
            .await
    }

    /// Approve everything currently selected, as one backend request
    ///
    /// An empty selection fails locally before any network I/O and
    /// emits nothing. On success the selection is cleared and the
    /// approved count returned; on failure the selection stands so the
    /// operator can retry by hand.
    pub async fn bulk_approve(
        &self,
        selection: &mut SelectionTracker,
    ) -> Result<usize, ApiError> {
        let ids = selection.ids();
        if ids.is_empty() {
            return Err(ApiError::NoSelection);
        }

        let count = ids.len();
        let action = ModerationAction::BulkApprove {
            student_ids: ids.clone(),
        };
        self.submit(action, self.source.bulk_approve(&ids)).await?;
        selection.clear();
        Ok(count)
    }

    /// Run one backend call and report its outcome on the bus.
    ///
    /// Cancellation propagates without an event: an aborted call is not
    /// a failure and must not trigger invalidation either.
    async fn submit(
        &self,
        action: ModerationAction,
        call: impl std::future::Future<Output = Result<(), ApiError>>,
    ) -> Result<(), ApiError> {
        match call.await {
            Ok(()) => {
                info!(
                    action = action.label(),
                    students = action.student_ids().len(),
                    "Moderation call applied"
                );
                self.events.emit(ModerationEvent::applied(action));
                Ok(())
            }
            Err(err) if err.is_cancelled() => Err(err),
            Err(err) => {
                let message = err.display_message();
                warn!(action = action.label(), %message, "Moderation call failed");
                self.events.emit(ModerationEvent::failed(action, message));
                Err(err)
            }
        }
    }
}
