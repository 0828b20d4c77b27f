//! Unified error types using thiserror

use std::time::Duration;

use thiserror::Error;

use crate::probe::ProbeState;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{failed} of {total} smoke case(s) failed")]
    SmokeFailed { failed: usize, total: usize },
}

pub type AppResult<T> = Result<T, AppError>;

/// A probe could not obtain a complete response.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid probe target `{target}`: {reason}")]
    InvalidTarget { target: String, reason: String },
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("could not connect to {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("no complete response from {url} within {timeout:?}")]
    Timeout {
        url: String,
        timeout: Duration,
        #[source]
        source: reqwest::Error,
    },
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("probe already used (state: {0})")]
    Spent(ProbeState),
}

impl TransportError {
    /// Classify a client error. Timeouts are checked first since a connect that times out
    /// reports both.
    pub(crate) fn from_reqwest(url: &str, timeout: Duration, source: reqwest::Error) -> Self {
        let url = url.to_string();
        if source.is_timeout() {
            Self::Timeout { url, timeout, source }
        } else if source.is_connect() {
            Self::Connect { url, source }
        } else {
            Self::Request { url, source }
        }
    }
}

/// Expected-vs-actual mismatch raised by the assertion adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct AssertionError {
    message: String,
    expected: String,
    actual: String,
}

impl AssertionError {
    pub fn new(
        message: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn expected(&self) -> &str {
        &self.expected
    }

    pub fn actual(&self) -> &str {
        &self.actual
    }
}

/// Why a single smoke case failed.
#[derive(Debug, Error)]
pub enum CaseError {
    #[error(transparent)]
    Assertion(#[from] AssertionError),
    #[error(transparent)]
    Transport(#[from] TransportError),
}
