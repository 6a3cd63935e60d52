//! Moderation workflow
//!
//! The approval queue's two halves: the [`SelectionTracker`] holding
//! which pending rows are checked, and the [`ModerationEngine`] that
//! submits decisions to the backend and reports outcomes on the event
//! bus.

pub mod engine;
pub mod selection;

pub use engine::ModerationEngine;
pub use selection::SelectionTracker;
