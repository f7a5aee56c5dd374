//! Resolves "my location" to coordinates.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::fmt::Debug;

use crate::{
    Config,
    error::WeatherError,
    model::Coordinates,
    provider::REQUEST_TIMEOUT,
};

pub const IP_API_URL: &str = "http://ip-api.com";

#[async_trait]
pub trait Geolocator: Send + Sync + Debug {
    async fn current_position(&self) -> Result<Coordinates, WeatherError>;
}

/// Approximate position from the public IP address.
#[derive(Debug, Clone)]
pub struct IpGeolocator {
    base_url: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    lat: Option<f64>,
    lon: Option<f64>,
    message: Option<String>,
}

impl IpGeolocator {
    pub fn new() -> Result<Self, WeatherError> {
        Self::with_base_url(IP_API_URL.to_string())
    }

    pub fn with_base_url(base_url: String) -> Result<Self, WeatherError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { base_url: base_url.trim_end_matches('/').to_string(), http })
    }
}

#[async_trait]
impl Geolocator for IpGeolocator {
    async fn current_position(&self) -> Result<Coordinates, WeatherError> {
        let url = format!("{}/json", self.base_url);

        let response = self
            .http
            .get(&url)
            .query(&[("fields", "status,message,lat,lon")])
            .send()
            .await
            .map_err(|e| WeatherError::GeolocationUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(WeatherError::GeolocationUnavailable(format!(
                "lookup returned status {}",
                response.status()
            )));
        }

        let body: IpApiResponse = response
            .json()
            .await
            .map_err(|e| WeatherError::GeolocationUnavailable(e.to_string()))?;

        match (body.status.as_str(), body.lat, body.lon) {
            ("success", Some(lat), Some(lon)) => Ok(Coordinates::new(lat, lon)),
            _ => Err(WeatherError::GeolocationUnavailable(
                body.message.unwrap_or_else(|| "no position in lookup response".to_string()),
            )),
        }
    }
}

/// Always reports the configured home position.
#[derive(Debug, Clone)]
pub struct FixedGeolocator(pub Coordinates);

#[async_trait]
impl Geolocator for FixedGeolocator {
    async fn current_position(&self) -> Result<Coordinates, WeatherError> {
        Ok(self.0)
    }
}

/// Geolocation switched off by the user.
#[derive(Debug, Clone, Default)]
pub struct DeniedGeolocator;

#[async_trait]
impl Geolocator for DeniedGeolocator {
    async fn current_position(&self) -> Result<Coordinates, WeatherError> {
        Err(WeatherError::GeolocationDenied)
    }
}

pub fn geolocator_from_config(config: &Config) -> Result<Box<dyn Geolocator>, WeatherError> {
    if !config.location.enabled {
        return Ok(Box::new(DeniedGeolocator));
    }

    match config.location.home {
        Some(home) => Ok(Box::new(FixedGeolocator(home))),
        None => Ok(Box::new(IpGeolocator::new()?)),
    }
}
