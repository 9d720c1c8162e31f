use reqwest::StatusCode;
use shared::error::{ApiError, ErrorCode};
use thiserror::Error;

/// Failure of a single exchange with the task service.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("invalid service url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned {status}{}", describe_api_error(.api))]
    Status {
        url: String,
        status: StatusCode,
        api: Option<ApiError>,
    },
    #[error("unexpected response body from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl TransportError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the service answered 404 for the record itself. A 404
    /// carrying an error body with any other code does not count.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Status { status, api, .. } if *status == StatusCode::NOT_FOUND => api
                .as_ref()
                .map_or(true, |api| api.code == ErrorCode::NotFound),
            _ => false,
        }
    }

    pub(crate) fn invalid_url(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}

fn describe_api_error(api: &Option<ApiError>) -> String {
    match api {
        Some(api) => format!(" ({})", api.message),
        None => String::new(),
    }
}

#[cfg(test)]
#[path = "tests/error_tests.rs"]
mod tests;
