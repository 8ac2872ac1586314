//! HTTP client for the vote endpoint

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;
use votehud_api::VoteResponse;

use crate::{CooldownSource, FetchError, FetchResult};

/// Default vote endpoint base; the username is appended
pub const DEFAULT_ENDPOINT: &str = "https://www.excalia.fr/vote/user/";

pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
pub const READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Fetches vote status over HTTP.
///
/// Only an exact `200 OK` with a well-formed body counts as success.
pub struct FetchClient {
    client: Client,
    endpoint: String,
}

impl FetchClient {
    pub fn new(endpoint: &str) -> FetchResult<Self> {
        Self::with_timeouts(endpoint, CONNECT_TIMEOUT, READ_TIMEOUT)
    }

    pub fn with_timeouts(
        endpoint: &str,
        connect_timeout: Duration,
        read_timeout: Duration,
    ) -> FetchResult<Self> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(connect_timeout + read_timeout)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: normalize_endpoint(endpoint),
        })
    }

    /// Endpoint base, always ending in `/`
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn url_for(&self, username: &str) -> String {
        format!("{}{}", self.endpoint, username.trim())
    }
}

fn normalize_endpoint(endpoint: &str) -> String {
    let endpoint = endpoint.trim();
    if endpoint.ends_with('/') {
        endpoint.to_string()
    } else {
        format!("{}/", endpoint)
    }
}

fn transport_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Transport(e.to_string())
    }
}

#[async_trait]
impl CooldownSource for FetchClient {
    async fn fetch(&self, username: &str) -> FetchResult<VoteResponse> {
        let url = self.url_for(username);
        debug!(url = %url, "Fetching vote status");

        let response = self.client.get(&url).send().await.map_err(transport_error)?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(transport_error)?;
        Ok(VoteResponse::parse(&body)?)
    }
}
