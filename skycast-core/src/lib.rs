//! Core library for the SkyCast service.
//!
//! This crate defines:
//! - Configuration (on-disk TOML plus environment overrides)
//! - The upstream weather client abstraction and its Visual Crossing implementation
//! - Forecast aggregation: current conditions, weekly average, extreme days
//! - A SQLite credential store with salted password hashes
//! - Error kinds and JSON bodies for whatever routing layer sits on top
//!
//! It is used by `skycast-cli`, but can also be reused by other binaries or services.

pub mod accounts;
pub mod aggregate;
pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod response;

pub use accounts::CredentialStore;
pub use aggregate::WeatherAggregator;
pub use config::Config;
pub use error::{AccountError, UpstreamError, WeatherError};
pub use model::{CurrentConditions, ForecastDay, ForecastSet, User};
pub use provider::{RawPayload, UpstreamWeatherClient, visualcrossing::VisualCrossingProvider};
