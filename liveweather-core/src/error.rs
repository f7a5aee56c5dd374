//! Error taxonomy for dashboard operations.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum WeatherError {
    #[error("City not found: {0}")]
    NotFound(String),

    #[error("No weather for location {0}")]
    LocationUnavailable(String),

    #[error("Network failure: {0}")]
    NetworkFailure(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Geolocation denied")]
    GeolocationDenied,

    #[error("Geolocation unavailable: {0}")]
    GeolocationUnavailable(String),

    #[error("Map unavailable: no geocoding provider configured")]
    MapUnavailable,

    #[error("No place name found at this location")]
    PlaceUnresolved,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl WeatherError {
    /// Message shown directly to the user.
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound(_) => "City not found!".to_string(),
            Self::LocationUnavailable(_) => "Unable to fetch weather for your location".to_string(),
            Self::NetworkFailure(_) | Self::MalformedResponse(_) => {
                "Failed to fetch weather data".to_string()
            }
            Self::GeolocationDenied => {
                "Unable to retrieve your location. Please enable location services.".to_string()
            }
            Self::GeolocationUnavailable(_) => {
                "Geolocation is not available right now".to_string()
            }
            Self::MapUnavailable => {
                "Map is unavailable. Configure a Google API key with `liveweather configure google`."
                    .to_string()
            }
            Self::PlaceUnresolved => {
                "Unable to identify city at this location. Please try clicking on a city or town."
                    .to_string()
            }
            Self::Config(msg) => format!("Configuration problem: {msg}"),
            Self::Storage(_) => "Could not save recent cities".to_string(),
        }
    }
}

impl From<reqwest::Error> for WeatherError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::MalformedResponse(err.to_string())
        } else {
            Self::NetworkFailure(err.to_string())
        }
    }
}
