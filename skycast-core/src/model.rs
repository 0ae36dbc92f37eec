use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::provider::{RawCurrentConditions, RawDay, RawPayload};

/// One calendar day of the forecast series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: NaiveDate,
    #[serde(rename = "tempmax")]
    pub temp_max: f64,
    #[serde(rename = "tempmin")]
    pub temp_min: f64,
    #[serde(rename = "precipprob")]
    pub precip_probability: f64,
    #[serde(rename = "temp")]
    pub mean_temp: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temp: f64,
    pub humidity: f64,
    pub precip: f64,
}

/// Normalized forecast for a single city, built per request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastSet {
    /// Lower-cased, trimmed lookup key.
    pub city: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_address: Option<String>,
    /// Chronological.
    pub days: Vec<ForecastDay>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<CurrentConditions>,
}

impl ForecastSet {
    pub fn from_payload(city: &str, payload: RawPayload) -> Self {
        let mut days: Vec<ForecastDay> = payload.days.into_iter().map(ForecastDay::from).collect();
        days.sort_by_key(|d| d.date);

        Self {
            city: normalize_city(city),
            resolved_address: payload.resolved_address,
            days,
            current: payload.current_conditions.map(CurrentConditions::from),
        }
    }
}

impl From<RawDay> for ForecastDay {
    fn from(raw: RawDay) -> Self {
        Self {
            date: raw.datetime,
            temp_max: raw.tempmax,
            temp_min: raw.tempmin,
            precip_probability: raw.precipprob,
            mean_temp: raw.temp,
        }
    }
}

impl From<RawCurrentConditions> for CurrentConditions {
    fn from(raw: RawCurrentConditions) -> Self {
        Self { temp: raw.temp, humidity: raw.humidity, precip: raw.precip }
    }
}

/// Case-insensitive key for a city name.
pub fn normalize_city(city: &str) -> String {
    city.trim().to_lowercase()
}

/// A stored account. Only the salted hash is ever kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub username: String,
    pub password_hash: String,
    pub salt: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> RawPayload {
        serde_json::from_value(serde_json::json!({
            "resolvedAddress": "Boston, MA, United States",
            "days": [
                { "datetime": "2024-12-10", "tempmax": 40.0, "tempmin": 30.0, "temp": 35.0, "precipprob": 90.0 },
                { "datetime": "2024-12-09", "tempmax": 45.0, "tempmin": 32.0, "temp": 38.5, "precipprob": 10.0 }
            ],
            "currentConditions": { "temp": 36.2, "humidity": 71.5, "precip": null }
        }))
        .expect("fixture must parse")
    }

    #[test]
    fn from_payload_sorts_days_and_normalizes_city() {
        let set = ForecastSet::from_payload("  Boston ", payload());

        assert_eq!(set.city, "boston");
        assert_eq!(set.resolved_address.as_deref(), Some("Boston, MA, United States"));
        assert_eq!(set.days[0].date, NaiveDate::from_ymd_opt(2024, 12, 9).unwrap());
        assert_eq!(set.days[1].date, NaiveDate::from_ymd_opt(2024, 12, 10).unwrap());
        assert_eq!(set.days[0].mean_temp, 38.5);
    }

    #[test]
    fn null_precip_reads_as_zero() {
        let set = ForecastSet::from_payload("boston", payload());
        let current = set.current.expect("current conditions present");

        assert_eq!(current.precip, 0.0);
        assert_eq!(current.humidity, 71.5);
    }

    #[test]
    fn forecast_day_serializes_with_boundary_names() {
        let set = ForecastSet::from_payload("boston", payload());
        let json = serde_json::to_value(&set.days[0]).unwrap();

        assert_eq!(json["date"], "2024-12-09");
        assert_eq!(json["tempmax"], 45.0);
        assert_eq!(json["tempmin"], 32.0);
        assert_eq!(json["precipprob"], 10.0);
        assert_eq!(json["temp"], 38.5);
    }
}
