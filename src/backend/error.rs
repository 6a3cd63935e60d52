//! Error taxonomy for backend calls
//!
//! Four failure families and one deliberate non-failure: transport
//! problems, rejected requests (the backend answered and said no),
//! missing/expired credentials, local validation, and cancellation.
//! Presentation shows exactly one line per failure, picked by
//! [`ApiError::display_message`], and never retries on its own.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// No usable response: connect failure, dropped body, undecodable payload
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Backend answered with a non-success status
    #[error("request rejected with status {status}")]
    Rejected {
        status: u16,
        /// Server-supplied `message` field, when the body carried one
        message: Option<String>,
    },

    /// Missing credential, or the backend answered 401
    #[error("authentication required")]
    Unauthorized { message: Option<String> },

    /// The caller aborted the call; swallowed silently downstream
    #[error("request cancelled")]
    Cancelled,

    /// Bulk moderation invoked with nothing selected
    #[error("no students selected")]
    NoSelection,
}

impl ApiError {
    /// The one human-readable line shown for this failure.
    ///
    /// Prefers the server-supplied message, then the transport error's
    /// own text, then a generic string carrying the status.
    pub fn display_message(&self) -> String {
        match self {
            Self::Rejected {
                message: Some(msg), ..
            } => msg.clone(),
            Self::Rejected {
                status,
                message: None,
            } => format!("Request failed with status {}", status),
            Self::Unauthorized { message: Some(msg) } => msg.clone(),
            Self::Unauthorized { message: None } => "Authentication required".to_string(),
            Self::Transport(err) => err.to_string(),
            Self::Cancelled => "Request cancelled".to_string(),
            Self::NoSelection => "No students selected".to_string(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Whether the caller should send the operator back through sign-in
    pub fn requires_reauth(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }
}
