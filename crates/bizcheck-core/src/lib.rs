//! BizCheck Core Domain Types
//!
//! This crate contains pure domain types with no dependencies on:
//! - Network/HTTP
//! - Async runtime specifics
//!
//! All types here represent the core business domain of BizCheck:
//! looking up business-registration status numbers against the NTS
//! (Korean National Tax Service) endpoint and reconciling the answers
//! into per-identifier result rows.

pub mod entry;
pub mod identifier;
pub mod ids;
pub mod key;
pub mod progress;
pub mod record;
pub mod status;

// Re-export commonly used types
pub use entry::ResultEntry;
pub use identifier::{normalize_identifier, parse_identifiers};
pub use ids::{EntryId, RunId};
pub use key::normalize_service_key;
pub use progress::Progress;
pub use record::StatusRecord;
pub use status::RunState;
