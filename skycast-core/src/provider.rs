use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use std::fmt::Debug;

use crate::{Config, error::UpstreamError, provider::visualcrossing::VisualCrossingProvider};

pub mod visualcrossing;

/// Source of raw forecast payloads for a city.
///
/// Implementations surface failures verbatim and do not retry.
#[async_trait]
pub trait UpstreamWeatherClient: Send + Sync + Debug {
    async fn get_forecast(&self, city: &str) -> Result<RawPayload, UpstreamError>;
}

/// Upstream timeline payload. Fields not listed here are ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPayload {
    #[serde(default)]
    pub resolved_address: Option<String>,
    pub days: Vec<RawDay>,
    #[serde(default)]
    pub current_conditions: Option<RawCurrentConditions>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawDay {
    pub datetime: NaiveDate,
    pub tempmax: f64,
    pub tempmin: f64,
    pub temp: f64,
    pub precipprob: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawCurrentConditions {
    pub temp: f64,
    pub humidity: f64,
    /// Upstream reports `null` when nothing has fallen.
    #[serde(deserialize_with = "null_as_zero")]
    pub precip: f64,
}

fn null_as_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

/// Construct the Visual Crossing client from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<VisualCrossingProvider> {
    let api_key = config.api_key.as_deref().filter(|_| config.is_api_key_configured()).ok_or_else(|| {
        anyhow::anyhow!(
            "No API key configured for the weather provider.\n\
             Hint: run `skycast configure` or set WEATHER_API_KEY."
        )
    })?;

    let provider = VisualCrossingProvider::new(api_key.to_owned(), config.timeout())?
        .with_base_url(config.base_url.clone())
        .with_unit_group(config.unit_group.clone());

    Ok(provider)
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
