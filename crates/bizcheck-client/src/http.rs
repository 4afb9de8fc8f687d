//! HTTP client for the status lookup endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use bizcheck_core::{normalize_service_key, StatusRecord};

use crate::api::{ErrorBody, LookupRequest, LookupResponse};
use crate::error::ClientError;

/// The NTS business-status endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.odcloud.kr/api/nts-businessman/v1/status";

/// The endpoint's documented per-request identifier cap. Enforced by
/// the batch runner, not here.
pub const MAX_BATCH_SIZE: usize = 100;

/// The transport default is no timeout at all; a stuck upstream should
/// surface as a transport failure instead.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Seam between the batch runner and the network.
#[async_trait]
pub trait StatusLookup {
    /// Look up a batch of digit-only identifiers.
    ///
    /// Returns the upstream records verbatim; the result may be shorter
    /// than the request when the API cannot match some identifiers.
    /// Returns [`ClientError::Cancelled`] when `cancel` fires mid-call.
    async fn lookup_batch(
        &self,
        identifiers: &[String],
        cancel: &CancellationToken,
    ) -> Result<Vec<StatusRecord>, ClientError>;
}

/// HTTP client for the status lookup endpoint.
pub struct LookupClient {
    inner: reqwest::Client,
    endpoint: String,
}

impl LookupClient {
    /// Create a client against the production endpoint.
    ///
    /// `service_key` may be either representation the odcloud portal
    /// issues; it is normalized once here.
    pub fn new(service_key: &str) -> Result<Self, ClientError> {
        Self::with_base_url(DEFAULT_BASE_URL, service_key)
    }

    /// Create a client against a custom base URL (tests, proxies).
    pub fn with_base_url(base_url: &str, service_key: &str) -> Result<Self, ClientError> {
        let inner = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        let endpoint = format!(
            "{}?serviceKey={}",
            base_url.trim_end_matches('/'),
            normalize_service_key(service_key)
        );
        Ok(Self { inner, endpoint })
    }
}

#[async_trait]
impl StatusLookup for LookupClient {
    async fn lookup_batch(
        &self,
        identifiers: &[String],
        cancel: &CancellationToken,
    ) -> Result<Vec<StatusRecord>, ClientError> {
        if cancel.is_cancelled() {
            return Err(ClientError::Cancelled);
        }

        debug!(count = identifiers.len(), "POST status lookup");

        let request = self
            .inner
            .post(&self.endpoint)
            .header(header::ACCEPT, "application/json")
            .json(&LookupRequest {
                b_no: identifiers.to_vec(),
            })
            .send();

        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(ClientError::Cancelled),
            result = request => result?,
        };

        let status = response.status();
        if !status.is_success() {
            // Best effort: the error body is JSON with a `msg` field
            // when the gateway produced it, arbitrary bytes otherwise.
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .map(|body| body.msg);
            return Err(ClientError::Http {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("Unknown").to_string(),
                message,
            });
        }

        let body = tokio::select! {
            _ = cancel.cancelled() => return Err(ClientError::Cancelled),
            result = response.json::<LookupResponse>() => result?,
        };

        debug!(
            request_cnt = body.request_cnt,
            match_cnt = body.match_cnt,
            "lookup response"
        );

        Ok(body.data)
    }
}
