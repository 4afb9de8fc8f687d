//! Wire types for the NTS status endpoint.
//!
//! The request/response shapes are fixed by the third party and must be
//! reproduced byte-for-byte.

use bizcheck_core::StatusRecord;
use serde::{Deserialize, Serialize};

/// Request body: `{"b_no": ["<digits>", ...]}`, at most 100 entries.
#[derive(Debug, Clone, Serialize)]
pub struct LookupRequest {
    pub b_no: Vec<String>,
}

/// Success response body.
///
/// `data` may be shorter than the request; the API silently omits
/// identifiers it cannot match, and omits the field entirely when
/// nothing matched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LookupResponse {
    #[serde(default)]
    pub request_cnt: u32,
    #[serde(default)]
    pub match_cnt: u32,
    #[serde(default)]
    pub status_code: String,
    #[serde(default)]
    pub data: Vec<StatusRecord>,
}

/// Best-effort error body on non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub msg: String,
}
