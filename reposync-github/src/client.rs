//! Blocking GitHub REST client.
//!
//! Thin wrapper over a [`ureq::Agent`]: it sets the API headers, maps HTTP
//! failures onto [`GatewayError`] and retries transient ones.

use std::fmt;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{classify_status, GatewayError};
use crate::retry::{with_retry, RetryConfig};
use crate::wire::ApiErrorBody;

const ACCEPT: &str = "application/vnd.github+json";
const API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = concat!("reposync/", env!("CARGO_PKG_VERSION"));

/// Authenticated client for one API host.
#[derive(Clone)]
pub struct GitHubClient {
    agent: ureq::Agent,
    base_url: String,
    token: String,
    retry: RetryConfig,
}

impl fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubClient")
            .field("base_url", &self.base_url)
            .field("token", &"***")
            .field("retry", &self.retry)
            .finish()
    }
}

impl GitHubClient {
    /// `base_url` is the REST root, e.g. `https://api.github.com` or
    /// `https://ghe.example.com/api/v3`.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build();
        Self {
            agent,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            retry: RetryConfig::default(),
        }
    }

    #[must_use]
    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // -----------------------------------------------------------------------
    // Verbs
    // -----------------------------------------------------------------------

    /// `GET {base}/{path}` decoded as `T`.
    pub(crate) fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, GatewayError> {
        with_retry(&self.retry, path, || {
            let response = self.execute(self.request("GET", path), path, None::<&()>)?;
            decode(path, response)
        })
    }

    /// `GET` that only cares whether the resource exists.
    pub(crate) fn check(&self, path: &str) -> Result<(), GatewayError> {
        with_retry(&self.retry, path, || {
            self.execute(self.request("GET", path), path, None::<&()>)
                .map(drop)
        })
    }

    /// Send a JSON body and ignore the response body (PUT endpoints answer
    /// 204 No Content).
    pub(crate) fn send<B: Serialize>(
        &self,
        method: &str,
        path: &str,
        body: &B,
    ) -> Result<(), GatewayError> {
        with_retry(&self.retry, path, || {
            self.execute(self.request(method, path), path, Some(body))
                .map(drop)
        })
    }

    /// Like [`send`](Self::send) but a single attempt. For requests that
    /// are not idempotent, where a lost response may hide a success.
    pub(crate) fn send_once<B: Serialize>(
        &self,
        method: &str,
        path: &str,
        body: &B,
    ) -> Result<(), GatewayError> {
        self.execute(self.request(method, path), path, Some(body))
            .map(drop)
    }

    // -----------------------------------------------------------------------
    // Private helpers
    // -----------------------------------------------------------------------

    fn request(&self, method: &str, path: &str) -> ureq::Request {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        self.agent
            .request(method, &url)
            .set("Accept", ACCEPT)
            .set("X-GitHub-Api-Version", API_VERSION)
            .set("Authorization", &format!("Bearer {}", self.token))
    }

    fn execute<B: Serialize>(
        &self,
        request: ureq::Request,
        path: &str,
        body: Option<&B>,
    ) -> Result<ureq::Response, GatewayError> {
        tracing::trace!(method = request.method(), path, "api request");
        let outcome = match body {
            Some(body) => {
                let value = serde_json::to_value(body)
                    .map_err(|e| GatewayError::decode(path, format!("encoding request: {e}")))?;
                request.send_json(value)
            }
            None => request.call(),
        };
        outcome.map_err(|err| map_ureq_error(path, err))
    }
}

fn decode<T: DeserializeOwned>(path: &str, response: ureq::Response) -> Result<T, GatewayError> {
    response
        .into_json::<T>()
        .map_err(|e| GatewayError::decode(path, e.to_string()))
}

fn map_ureq_error(path: &str, err: ureq::Error) -> GatewayError {
    match err {
        ureq::Error::Status(status, response) => {
            let remaining = response.header("x-ratelimit-remaining").map(str::to_string);
            let reset = response.header("x-ratelimit-reset").map(str::to_string);
            let message = error_message(response);
            classify_status(
                status,
                path,
                remaining.as_deref(),
                reset.as_deref(),
                message,
            )
        }
        ureq::Error::Transport(transport) => GatewayError::Network {
            resource: path.to_string(),
            message: transport.to_string(),
        },
    }
}

/// The `message` field of a GitHub error body, or the raw body when it is
/// not JSON.
fn error_message(response: ureq::Response) -> String {
    let raw = response.into_string().unwrap_or_default();
    match serde_json::from_str::<ApiErrorBody>(&raw) {
        Ok(body) => body.message,
        Err(_) => raw.trim().to_string(),
    }
}
