//! Error taxonomy shared by the weather and account sides of the service.
//!
//! Every error exposes a stable [`kind`](WeatherError::kind) identifier and the
//! HTTP status a routing layer should answer with. The core never maps errors
//! to sentinel values; callers always get one of these.

use std::time::Duration;

use thiserror::Error;

/// Failure talking to the upstream weather provider.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("upstream request timed out after {0:?}")]
    Timeout(Duration),

    #[error("upstream request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("upstream request failed: {0}")]
    Transport(String),

    #[error("failed to decode upstream payload: {0}")]
    Decode(String),

    #[error("invalid upstream url: {0}")]
    InvalidUrl(String),
}

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("city not found: {0:?}")]
    NotFound(String),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("no day data available")]
    EmptyData,

    #[error("upstream payload is missing {0}")]
    DataMissing(&'static str),
}

impl WeatherError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Upstream(_) => "upstream_error",
            Self::EmptyData => "empty_data",
            Self::DataMissing(_) => "data_missing",
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::Upstream(UpstreamError::Timeout(_)) => 504,
            Self::Upstream(_) | Self::EmptyData | Self::DataMissing(_) => 502,
        }
    }
}

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Username '{0}' already exists")]
    DuplicateUser(String),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("User '{0}' not found")]
    UserNotFound(String),

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("credential store error: {0}")]
    Storage(#[from] rusqlite::Error),
}

impl AccountError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DuplicateUser(_) => "duplicate_user",
            Self::InvalidCredentials => "invalid_credentials",
            Self::UserNotFound(_) => "user_not_found",
            Self::MissingField(_) => "missing_field",
            Self::Storage(_) => "storage_error",
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::DuplicateUser(_) => 409,
            Self::InvalidCredentials => 401,
            Self::UserNotFound(_) => 404,
            Self::MissingField(_) => 400,
            Self::Storage(_) => 500,
        }
    }
}
