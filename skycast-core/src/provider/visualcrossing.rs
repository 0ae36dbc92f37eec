use async_trait::async_trait;
use reqwest::{Client, Url};
use std::time::Duration;

use crate::{
    config::{DEFAULT_BASE_URL, DEFAULT_UNIT_GROUP},
    error::UpstreamError,
    provider::{RawPayload, UpstreamWeatherClient, truncate_body},
};

const TIMELINE_PATH: [&str; 4] = ["VisualCrossingWebServices", "rest", "services", "timeline"];

/// Visual Crossing timeline client, fetching the next seven days plus current conditions.
#[derive(Debug, Clone)]
pub struct VisualCrossingProvider {
    api_key: String,
    base_url: String,
    unit_group: String,
    timeout: Duration,
    http: Client,
}

impl VisualCrossingProvider {
    pub fn new(api_key: String, timeout: Duration) -> Result<Self, UpstreamError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        Ok(Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            unit_group: DEFAULT_UNIT_GROUP.to_string(),
            timeout,
            http,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_unit_group(mut self, unit_group: impl Into<String>) -> Self {
        self.unit_group = unit_group.into();
        self
    }

    fn timeline_url(&self, city: &str) -> Result<Url, UpstreamError> {
        let mut url =
            Url::parse(&self.base_url).map_err(|e| UpstreamError::InvalidUrl(e.to_string()))?;

        url.path_segments_mut()
            .map_err(|_| UpstreamError::InvalidUrl(format!("{} cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(TIMELINE_PATH)
            .push(city)
            .push("next7days");

        Ok(url)
    }

    fn map_send_error(&self, err: reqwest::Error) -> UpstreamError {
        if err.is_timeout() {
            UpstreamError::Timeout(self.timeout)
        } else {
            // The request url carries the API key.
            UpstreamError::Transport(err.without_url().to_string())
        }
    }

    /// Upstream echoes the key back in some error bodies.
    fn redact_key(&self, body: &str) -> String {
        if self.api_key.is_empty() {
            body.to_string()
        } else {
            body.replace(self.api_key.as_str(), "***")
        }
    }
}

#[async_trait]
impl UpstreamWeatherClient for VisualCrossingProvider {
    async fn get_forecast(&self, city: &str) -> Result<RawPayload, UpstreamError> {
        let url = self.timeline_url(city)?;
        tracing::debug!(city, path = url.path(), "requesting Visual Crossing timeline");

        let res = self
            .http
            .get(url)
            .query(&[
                ("unitGroup", self.unit_group.as_str()),
                ("include", "days,current,events"),
                ("key", self.api_key.as_str()),
                ("contentType", "json"),
            ])
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = res.status();
        let body = res.text().await.map_err(|e| self.map_send_error(e))?;

        if !status.is_success() {
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body: truncate_body(&self.redact_key(&body)),
            });
        }

        serde_json::from_str(&body).map_err(|e| UpstreamError::Decode(e.to_string()))
    }
}
