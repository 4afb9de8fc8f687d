//! Per-identifier result rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::EntryId;
use crate::record::StatusRecord;

/// The outcome for one requested identifier, as consumed by the
/// rendering collaborator.
///
/// Exactly one entry exists per identifier requested in a processed
/// chunk: a successful one carrying the upstream record, or a
/// soft-failed one with blank record fields and an explanatory message.
/// Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultEntry {
    /// Unique id for rendering identity, not business identity.
    pub id: EntryId,
    /// The identifier as the user entered it (trimmed).
    pub identifier: String,
    /// Upstream record fields; all blank on failure.
    pub record: StatusRecord,
    /// When this entry was created.
    pub created_at: DateTime<Utc>,
    /// Whether the upstream returned a record for this identifier.
    pub success: bool,
    /// Human-readable failure message, present when `success` is false.
    pub error_message: Option<String>,
}

impl ResultEntry {
    /// Entry for an identifier the upstream returned a record for.
    pub fn matched(identifier: impl Into<String>, record: StatusRecord) -> Self {
        Self {
            id: EntryId::generate(),
            identifier: identifier.into(),
            record,
            created_at: Utc::now(),
            success: true,
            error_message: None,
        }
    }

    /// Entry for an identifier the upstream silently omitted from its
    /// response. Not a transport error.
    pub fn unmatched(identifier: impl Into<String>) -> Self {
        Self {
            id: EntryId::generate(),
            identifier: identifier.into(),
            record: StatusRecord::default(),
            created_at: Utc::now(),
            success: false,
            error_message: Some("no result returned for this identifier".to_string()),
        }
    }

    /// Entry for an identifier whose whole chunk failed.
    pub fn failed(identifier: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: EntryId::generate(),
            identifier: identifier.into(),
            record: StatusRecord::default(),
            created_at: Utc::now(),
            success: false,
            error_message: Some(message.into()),
        }
    }
}
