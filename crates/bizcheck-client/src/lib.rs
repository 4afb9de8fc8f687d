//! Lookup client for the NTS business-status endpoint.
//!
//! Wraps the odcloud REST endpoint behind the [`StatusLookup`] trait so
//! the batch runner can be driven by a real HTTP client or a test
//! double.

pub mod api;
pub mod error;
pub mod http;

pub use error::ClientError;
pub use http::{LookupClient, StatusLookup, DEFAULT_BASE_URL, MAX_BATCH_SIZE};
