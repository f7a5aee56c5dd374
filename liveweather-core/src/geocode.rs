//! Reverse geocoding: turn a picked map coordinate into a city name.
//! Uses the Google Geocoding API.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use tracing::instrument;

use crate::{
    Config,
    error::WeatherError,
    model::Coordinates,
    provider::{ProviderId, REQUEST_TIMEOUT},
};

pub const GOOGLE_MAPS_URL: &str = "https://maps.googleapis.com";

/// Address component categories, most specific first.
const PLACE_PRECEDENCE: [&str; 3] =
    ["locality", "administrative_area_level_2", "administrative_area_level_1"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressComponent {
    pub long_name: String,
    #[serde(default)]
    pub short_name: String,
    #[serde(default)]
    pub types: Vec<String>,
}

impl AddressComponent {
    pub fn has_type(&self, kind: &str) -> bool {
        self.types.iter().any(|t| t == kind)
    }
}

#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    /// Address components of the best match at `coordinates`. Empty when nothing matched.
    async fn reverse_geocode(
        &self,
        coordinates: Coordinates,
    ) -> Result<Vec<AddressComponent>, WeatherError>;
}

/// Pick the place name from address components.
///
/// A `locality` wins over `administrative_area_level_2`, which wins over
/// `administrative_area_level_1`, regardless of array order. Within one
/// category the first component wins.
pub fn resolve_place_name(components: &[AddressComponent]) -> Option<String> {
    PLACE_PRECEDENCE.iter().find_map(|kind| {
        components
            .iter()
            .find(|c| c.has_type(kind) && !c.long_name.trim().is_empty())
            .map(|c| c.long_name.clone())
    })
}

/// Reverse geocode and resolve a place name, or fail with `PlaceUnresolved`.
pub async fn place_name_at(
    geocoder: &dyn Geocoder,
    coordinates: Coordinates,
) -> Result<String, WeatherError> {
    let components = geocoder.reverse_geocode(coordinates).await?;
    let name = resolve_place_name(&components).ok_or(WeatherError::PlaceUnresolved)?;
    tracing::info!("Reverse geocoded {} to: {}", coordinates, name);
    Ok(name)
}

#[derive(Debug, Clone)]
pub struct GoogleGeocoder {
    api_key: String,
    base_url: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    #[serde(default)]
    address_components: Vec<AddressComponent>,
}

impl GoogleGeocoder {
    pub fn new(api_key: String) -> Result<Self, WeatherError> {
        Self::with_base_url(api_key, GOOGLE_MAPS_URL.to_string())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Result<Self, WeatherError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    #[instrument(skip(self), level = "debug")]
    async fn reverse_geocode(
        &self,
        coordinates: Coordinates,
    ) -> Result<Vec<AddressComponent>, WeatherError> {
        let url = format!("{}/maps/api/geocode/json", self.base_url);
        let latlng = format!("{},{}", coordinates.lat, coordinates.lon);

        let response = self
            .http
            .get(&url)
            .query(&[("latlng", latlng.as_str()), ("key", self.api_key.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(WeatherError::NetworkFailure(format!(
                "Geocoding request returned status {}",
                response.status()
            )));
        }

        let body: GeocodeResponse = response.json().await?;

        match body.status.as_str() {
            "OK" => Ok(body
                .results
                .into_iter()
                .next()
                .map(|r| r.address_components)
                .unwrap_or_default()),
            "ZERO_RESULTS" => Ok(Vec::new()),
            other => Err(WeatherError::NetworkFailure(format!(
                "Geocoding failed with status {other}: {}",
                body.error_message.unwrap_or_default()
            ))),
        }
    }
}

/// The configured geocoder, or `None` when no Google key is set.
pub fn geocoder_from_config(config: &Config) -> Result<Option<Box<dyn Geocoder>>, WeatherError> {
    let Some(api_key) = config.provider_api_key(ProviderId::Google) else {
        return Ok(None);
    };

    let base_url = config
        .provider_config(ProviderId::Google)
        .and_then(|p| p.base_url.clone())
        .unwrap_or_else(|| GOOGLE_MAPS_URL.to_string());

    Ok(Some(Box::new(GoogleGeocoder::with_base_url(api_key.to_string(), base_url)?)))
}
