//! HTTP client for the move service.

use super::error::ProviderError;
use super::provider::MoveProvider;
use crate::protocol::{MoveRequest, MoveResponse};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Asks a remote move service for the CPU's reply.
#[derive(Debug, Clone)]
pub struct RemoteProvider {
    api_base: String,
    client: reqwest::Client,
}

impl RemoteProvider {
    /// Creates a client for `api_base` (for example `http://host:3000/api`).
    ///
    /// Every request is bounded by `timeout`.
    #[instrument(skip(api_base), fields(api_base = %api_base.as_ref()))]
    pub fn new(api_base: impl AsRef<str>, timeout: Duration) -> Result<Self, ProviderError> {
        let api_base = api_base.as_ref().trim_end_matches('/').to_string();
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        info!(%api_base, ?timeout, "Remote move provider ready");
        Ok(Self { api_base, client })
    }

    /// Base URL requests are sent to.
    pub fn api_base(&self) -> &str {
        &self.api_base
    }
}

#[async_trait]
impl MoveProvider for RemoteProvider {
    #[instrument(skip_all, fields(api_base = %self.api_base, difficulty = %request.difficulty))]
    async fn next_move(&self, request: &MoveRequest) -> Result<MoveResponse, ProviderError> {
        let url = format!("{}/cpu-move", self.api_base);
        debug!(%url, "Requesting CPU move");

        let response = self.client.post(&url).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::new(format!("API error: {}", status)));
        }

        let body: MoveResponse = response.json().await?;
        debug!(cell = ?body.cell, fallback = body.fallback, "Got CPU move");
        Ok(body)
    }

    fn name(&self) -> &str {
        "remote"
    }
}
