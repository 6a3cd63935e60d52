//! Backend gateway
//!
//! Everything that crosses the wire lives here: the [`RecordSource`]
//! seam, its HTTP implementation, the in-memory mock used by tests, and
//! the error taxonomy shared by all of them.

pub mod client;
pub mod error;
pub mod mock;
pub mod traits;

pub use client::HttpRecordSource;
pub use error::ApiError;
pub use mock::MockRecordSource;
pub use traits::{ActivityQuery, RecordSource};
