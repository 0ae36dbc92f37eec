//! JSON bodies a routing layer returns, with the field names clients expect.

use serde::{Deserialize, Serialize};

use crate::error::{AccountError, WeatherError};

pub const ACCOUNT_CREATED: &str = "Account created successfully";
pub const LOGIN_SUCCESSFUL: &str = "Login successful";
pub const PASSWORD_UPDATED: &str = "Password updated successfully";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusBody {
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageBody {
    pub message: String,
}

impl MessageBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekAverageBody {
    pub week_average_temp: f64,
}

/// Anything that can be rendered as an error response.
pub trait ErrorResponse: std::fmt::Display {
    fn kind(&self) -> &'static str;
    fn status_code(&self) -> u16;

    fn body(&self) -> ErrorBody {
        ErrorBody { error: self.to_string() }
    }
}

impl ErrorResponse for WeatherError {
    fn kind(&self) -> &'static str {
        WeatherError::kind(self)
    }

    fn status_code(&self) -> u16 {
        WeatherError::status_code(self)
    }
}

impl ErrorResponse for AccountError {
    fn kind(&self) -> &'static str {
        AccountError::kind(self)
    }

    fn status_code(&self) -> u16 {
        AccountError::status_code(self)
    }
}

pub fn health() -> StatusBody {
    tracing::info!("health check");
    StatusBody { status: "healthy".to_string() }
}
