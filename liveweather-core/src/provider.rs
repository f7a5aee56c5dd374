use crate::{
    Config,
    error::WeatherError,
    model::{Coordinates, CurrentWeather, Locator, Sample},
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::{convert::TryFrom, fmt::Debug, time::Duration};

pub mod openweather;

pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// External services that need credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    /// Weather data (current conditions and forecast).
    OpenWeather,
    /// Reverse geocoding for map picks.
    Google,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenWeather => "openweather",
            ProviderId::Google => "google",
        }
    }

    /// Environment variable that overrides the stored API key.
    pub fn env_var(&self) -> &'static str {
        match self {
            ProviderId::OpenWeather => "LIVEWEATHER_OPENWEATHER_KEY",
            ProviderId::Google => "LIVEWEATHER_GOOGLE_KEY",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::OpenWeather, ProviderId::Google]
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "openweather" => Ok(ProviderId::OpenWeather),
            "google" => Ok(ProviderId::Google),
            _ => Err(anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: openweather, google."
            )),
        }
    }
}

/// Source of current conditions and the 3-hour forecast feed.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch_current(&self, locator: &Locator) -> Result<CurrentWeather, WeatherError>;

    /// Forecast samples in feed order (ascending by time).
    async fn fetch_forecast(&self, coordinates: Coordinates) -> Result<Vec<Sample>, WeatherError>;
}

/// Construct the weather provider from config.
pub fn provider_from_config(config: &Config) -> Result<Box<dyn WeatherProvider>, WeatherError> {
    let id = ProviderId::OpenWeather;
    let provider = config.provider_config(id).filter(|p| !p.api_key.trim().is_empty());

    let Some(provider) = provider else {
        return Err(WeatherError::Config(format!(
            "No API key configured for provider '{id}'. \
             Hint: run `liveweather configure {id}` or set {}.",
            id.env_var()
        )));
    };

    let client = match &provider.base_url {
        Some(url) => OpenWeatherProvider::with_base_url(provider.api_key.clone(), url.clone())?,
        None => OpenWeatherProvider::new(provider.api_key.clone())?,
    };

    Ok(Box::new(client))
}
