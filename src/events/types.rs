//! Moderation event types
//!
//! Every moderation call reports its outcome as one of these events.
//! Applied outcomes are what drive snapshot invalidation: the store
//! subscribes and discards the student snapshot when it sees one.
//! Failed outcomes are observability only and invalidate nothing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::records::RecordKind;

/// What the engine asked the backend to do
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModerationAction {
    Approve {
        student_id: String,
    },
    Reject {
        student_id: String,
        reason: Option<String>,
    },
    BulkApprove {
        student_ids: Vec<String>,
    },
}

impl ModerationAction {
    /// Short tag for logs
    pub fn label(&self) -> &'static str {
        match self {
            Self::Approve { .. } => "approve",
            Self::Reject { .. } => "reject",
            Self::BulkApprove { .. } => "bulk_approve",
        }
    }

    /// Every student id this action touches
    pub fn student_ids(&self) -> Vec<&str> {
        match self {
            Self::Approve { student_id } | Self::Reject { student_id, .. } => {
                vec![student_id.as_str()]
            }
            Self::BulkApprove { student_ids } => {
                student_ids.iter().map(String::as_str).collect()
            }
        }
    }
}

/// How the backend answered
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ModerationOutcome {
    Applied,
    Failed { message: String },
}

/// One moderation call, reported to whoever listens
///
/// Must be Clone for `tokio::sync::broadcast`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModerationEvent {
    pub action: ModerationAction,
    pub outcome: ModerationOutcome,
    pub timestamp: DateTime<Utc>,
}

impl ModerationEvent {
    /// Event for a call the backend accepted
    pub fn applied(action: ModerationAction) -> Self {
        Self {
            action,
            outcome: ModerationOutcome::Applied,
            timestamp: Utc::now(),
        }
    }

    /// Event for a call the backend (or transport) turned down
    pub fn failed(action: ModerationAction, message: impl Into<String>) -> Self {
        Self {
            action,
            outcome: ModerationOutcome::Failed {
                message: message.into(),
            },
            timestamp: Utc::now(),
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self.outcome, ModerationOutcome::Applied)
    }

    /// Which snapshot this event makes stale, if any
    pub fn invalidates(&self) -> Option<RecordKind> {
        match self.outcome {
            ModerationOutcome::Applied => Some(RecordKind::Students),
            ModerationOutcome::Failed { .. } => None,
        }
    }
}

/// Object-safe seam for anything that reports moderation outcomes
pub trait EventEmitter: Send + Sync {
    fn emit(&self, event: ModerationEvent);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_applied_event_invalidates_students() {
        let event = ModerationEvent::applied(ModerationAction::Approve {
            student_id: "s-1".to_string(),
        });
        assert!(event.is_applied());
        assert_eq!(event.invalidates(), Some(RecordKind::Students));
    }

    #[test]
    fn test_failed_event_invalidates_nothing() {
        let event = ModerationEvent::failed(
            ModerationAction::BulkApprove {
                student_ids: vec!["s-1".to_string()],
            },
            "Backend down",
        );
        assert!(!event.is_applied());
        assert_eq!(event.invalidates(), None);
        assert_eq!(
            event.outcome,
            ModerationOutcome::Failed {
                message: "Backend down".to_string()
            }
        );
    }

    #[test]
    fn test_action_student_ids() {
        let approve = ModerationAction::Approve {
            student_id: "s-1".to_string(),
        };
        assert_eq!(approve.student_ids(), vec!["s-1"]);

        let bulk = ModerationAction::BulkApprove {
            student_ids: vec!["s-1".to_string(), "s-2".to_string()],
        };
        assert_eq!(bulk.student_ids(), vec!["s-1", "s-2"]);
        assert_eq!(bulk.label(), "bulk_approve");
    }

    #[test]
    fn test_action_serializes_with_kind_tag() {
        let action = ModerationAction::Reject {
            student_id: "s-9".to_string(),
            reason: Some("Incomplete application".to_string()),
        };
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["kind"], "reject");
        assert_eq!(json["student_id"], "s-9");
        assert_eq!(json["reason"], "Incomplete application");

        let back: ModerationAction = serde_json::from_value(json).unwrap();
        assert_eq!(back, action);
    }

    #[test]
    fn test_event_round_trip() {
        let event = ModerationEvent::applied(ModerationAction::BulkApprove {
            student_ids: vec!["a".to_string(), "b".to_string()],
        });
        let json = serde_json::to_string(&event).unwrap();
        let back: ModerationEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
