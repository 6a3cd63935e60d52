//! In-process events
//!
//! The moderation engine publishes every call outcome on the
//! [`EventBus`]; the snapshot store subscribes and turns applied
//! outcomes into cache invalidation, and anything else (UI notifiers,
//! logs) can listen without touching the engine.

pub mod bus;
pub mod types;

pub use bus::EventBus;
pub use types::{EventEmitter, ModerationAction, ModerationEvent, ModerationOutcome};
