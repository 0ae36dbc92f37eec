//! Derived views over a city's forecast.
//!
//! The derivation functions are pure single-pass scans over
//! [`ForecastSet::days`]. Ties go to the earliest date. An empty day series is
//! always an error, never a zero.

use std::time::Duration;

use crate::{
    error::{UpstreamError, WeatherError},
    model::{CurrentConditions, ForecastDay, ForecastSet},
    provider::UpstreamWeatherClient,
};

/// Fetches forecasts through an upstream client and answers the per-city queries.
#[derive(Debug, Clone)]
pub struct WeatherAggregator<P> {
    provider: P,
    timeout: Duration,
}

impl<P: UpstreamWeatherClient> WeatherAggregator<P> {
    pub fn new(provider: P, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    pub async fn fetch_forecast(&self, city: &str) -> Result<ForecastSet, WeatherError> {
        let city = city.trim();
        if city.is_empty() {
            return Err(WeatherError::NotFound(city.to_string()));
        }

        let payload = tokio::time::timeout(self.timeout, self.provider.get_forecast(city))
            .await
            .map_err(|_| UpstreamError::Timeout(self.timeout))
            .and_then(|res| res)
            .inspect_err(|e| tracing::warn!(city, error = %e, "upstream forecast failed"))?;

        Ok(ForecastSet::from_payload(city, payload))
    }

    pub async fn get_forecast(&self, city: &str) -> Result<ForecastSet, WeatherError> {
        self.fetch_forecast(city).await
    }

    pub async fn get_current_conditions(&self, city: &str) -> Result<CurrentConditions, WeatherError> {
        current_conditions(&self.fetch_forecast(city).await?).cloned()
    }

    pub async fn get_weekly_average(&self, city: &str) -> Result<f64, WeatherError> {
        weekly_average_temp(&self.fetch_forecast(city).await?)
    }

    pub async fn get_max_temp_day(&self, city: &str) -> Result<ForecastDay, WeatherError> {
        max_temp_day(&self.fetch_forecast(city).await?).cloned()
    }

    pub async fn get_min_temp_day(&self, city: &str) -> Result<ForecastDay, WeatherError> {
        min_temp_day(&self.fetch_forecast(city).await?).cloned()
    }

    pub async fn get_highest_precip_day(&self, city: &str) -> Result<ForecastDay, WeatherError> {
        highest_precip_day(&self.fetch_forecast(city).await?).cloned()
    }
}

pub fn current_conditions(forecast: &ForecastSet) -> Result<&CurrentConditions, WeatherError> {
    forecast.current.as_ref().ok_or(WeatherError::DataMissing("currentConditions"))
}

/// Mean of `mean_temp` over every day the upstream returned.
pub fn weekly_average_temp(forecast: &ForecastSet) -> Result<f64, WeatherError> {
    if forecast.days.is_empty() {
        return Err(WeatherError::EmptyData);
    }

    let total: f64 = forecast.days.iter().map(|d| d.mean_temp).sum();
    Ok(total / forecast.days.len() as f64)
}

pub fn max_temp_day(forecast: &ForecastSet) -> Result<&ForecastDay, WeatherError> {
    best_day(&forecast.days, |d| d.temp_max, |candidate, best| candidate > best)
}

pub fn min_temp_day(forecast: &ForecastSet) -> Result<&ForecastDay, WeatherError> {
    best_day(&forecast.days, |d| d.temp_min, |candidate, best| candidate < best)
}

pub fn highest_precip_day(forecast: &ForecastSet) -> Result<&ForecastDay, WeatherError> {
    best_day(&forecast.days, |d| d.precip_probability, |candidate, best| candidate > best)
}

/// Keeps the first day unless a later one strictly beats it, or ties it with an earlier date.
fn best_day<K, B>(days: &[ForecastDay], key: K, beats: B) -> Result<&ForecastDay, WeatherError>
where
    K: Fn(&ForecastDay) -> f64,
    B: Fn(f64, f64) -> bool,
{
    let (first, rest) = days.split_first().ok_or(WeatherError::EmptyData)?;

    Ok(rest.iter().fold(first, |best, day| {
        let (value, best_value) = (key(day), key(best));
        if beats(value, best_value) || (value == best_value && day.date < best.date) {
            day
        } else {
            best
        }
    }))
}
