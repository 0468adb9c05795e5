//! Weather provider: weatherapi.com current conditions through RapidAPI.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use crate::config::Weather as WeatherSettings;

pub mod conditions;
pub mod report;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("No API key configured")]
    MissingKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {0}")]
    Api(String),
}

pub type Result<T> = std::result::Result<T, ProviderError>;

/// `current.json` response. Every field is optional on the wire.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct WeatherResponse {
    pub current: Option<Current>,
    pub forecast: Option<Forecast>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct Current {
    pub temp_c: Option<f64>,
    pub feelslike_c: Option<f64>,
    pub cloud: Option<f64>,
    pub wind_kph: Option<f64>,
    pub humidity: Option<f64>,
    pub pressure_mb: Option<f64>,
    pub vis_km: Option<f64>,
    pub precip_mm: Option<f64>,
    pub last_updated: Option<String>,
    pub condition: Option<Condition>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct Condition {
    pub text: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct Forecast {
    #[serde(default)]
    pub forecastday: Vec<ForecastDay>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct ForecastDay {
    pub astro: Option<Astro>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct Astro {
    pub sunrise: Option<String>,
    pub sunset: Option<String>,
}

impl WeatherResponse {
    /// Today's astronomy block, if the provider sent one.
    pub fn astro(&self) -> Option<&Astro> {
        self.forecast.as_ref()?.forecastday.first()?.astro.as_ref()
    }
}

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Current conditions for a free-form city name.
    async fn current(&self, city: &str) -> Result<WeatherResponse>;
}

pub struct WeatherApiClient {
    client: Client,
    base_url: String,
    host: String,
    api_key: Option<String>,
}

impl WeatherApiClient {
    pub fn new(settings: &WeatherSettings) -> Self {
        Self {
            client: Client::new(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            host: settings.host.clone(),
            api_key: settings.api_key.clone(),
        }
    }
}

#[async_trait]
impl WeatherProvider for WeatherApiClient {
    async fn current(&self, city: &str) -> Result<WeatherResponse> {
        let api_key = self.api_key.as_deref().ok_or(ProviderError::MissingKey)?;

        let response = self
            .client
            .get(format!("{}/current.json", self.base_url))
            .query(&[("q", city)])
            .header("X-RapidAPI-Host", &self.host)
            .header("X-RapidAPI-Key", api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api(format!("{}: {}", status, body)));
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_partial_response() {
        let body = r#"{
            "current": {
                "temp_c": 21.0,
                "feelslike_c": 20.4,
                "pressure_mb": 1013.0,
                "condition": { "text": "Partly cloudy" }
            },
            "forecast": { "forecastday": [ { "astro": { "sunrise": "05:01 AM", "sunset": "09:40 PM" } } ] }
        }"#;
        let response: WeatherResponse = serde_json::from_str(body).unwrap();
        let current = response.current.as_ref().unwrap();
        assert_eq!(current.temp_c, Some(21.0));
        assert!(current.humidity.is_none());
        assert_eq!(response.astro().unwrap().sunset.as_deref(), Some("09:40 PM"));
    }

    #[tokio::test]
    async fn missing_key_fails_without_request() {
        let client = WeatherApiClient::new(&WeatherSettings::default());
        assert!(matches!(
            client.current("Moscow").await,
            Err(ProviderError::MissingKey)
        ));
    }
}
