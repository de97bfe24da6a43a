//! Error types for reposync-github.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors returned by the hosting API.
///
/// `NotFound` is a first-class outcome: callers match on it to tell "needs
/// creation" or "not configured" apart from real failures.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("not found: {resource}")]
    NotFound { resource: String },

    #[error("authentication failed ({status}) for {resource}: {message}")]
    AuthFailure {
        status: u16,
        resource: String,
        message: String,
    },

    #[error("rate limit exceeded for {resource}{}", reset_suffix(.reset_at))]
    RateLimited {
        resource: String,
        reset_at: Option<DateTime<Utc>>,
    },

    #[error("network failure for {resource}: {message}")]
    Network { resource: String, message: String },

    #[error("API error ({status}) for {resource}: {message}")]
    Api {
        status: u16,
        resource: String,
        message: String,
    },

    #[error("unexpected response for {resource}: {message}")]
    Decode { resource: String, message: String },
}

impl GatewayError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, GatewayError::NotFound { .. })
    }

    /// Rate limits and transport failures are worth another attempt; every
    /// other status is a definite answer.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GatewayError::RateLimited { .. } | GatewayError::Network { .. }
        )
    }

    pub(crate) fn decode(resource: &str, message: impl Into<String>) -> Self {
        GatewayError::Decode {
            resource: resource.to_string(),
            message: message.into(),
        }
    }
}

fn reset_suffix(reset_at: &Option<DateTime<Utc>>) -> String {
    match reset_at {
        Some(at) => format!(" (resets at {})", at.to_rfc3339()),
        None => String::new(),
    }
}

/// Map a non-success HTTP status to the error taxonomy.
///
/// GitHub reports primary rate limits as 403 with
/// `x-ratelimit-remaining: 0`, secondary limits as 403/429 with a message
/// mentioning the limit.
pub fn classify_status(
    status: u16,
    resource: &str,
    ratelimit_remaining: Option<&str>,
    ratelimit_reset: Option<&str>,
    message: String,
) -> GatewayError {
    let resource = resource.to_string();
    let exhausted = ratelimit_remaining.map(str::trim) == Some("0");
    let secondary = message.to_ascii_lowercase().contains("rate limit");

    match status {
        404 => GatewayError::NotFound { resource },
        429 => GatewayError::RateLimited {
            resource,
            reset_at: parse_reset(ratelimit_reset),
        },
        403 if exhausted || secondary => GatewayError::RateLimited {
            resource,
            reset_at: parse_reset(ratelimit_reset),
        },
        401 | 403 => GatewayError::AuthFailure {
            status,
            resource,
            message,
        },
        _ => GatewayError::Api {
            status,
            resource,
            message,
        },
    }
}

fn parse_reset(value: Option<&str>) -> Option<DateTime<Utc>> {
    let secs: i64 = value?.trim().parse().ok()?;
    DateTime::from_timestamp(secs, 0)
}
