//! Core library for the `liveweather` dashboard.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Weather, geocoding and geolocation clients
//! - Forecast aggregation into hourly and daily views
//! - The recent-city store
//! - The dashboard state container and fetch pipeline
//!
//! It is used by `liveweather-cli`, but can also be reused by other front ends.

pub mod config;
pub mod dashboard;
pub mod error;
pub mod forecast;
pub mod geocode;
pub mod location;
pub mod model;
pub mod provider;
pub mod recent;

pub use config::{Config, LocationConfig, ProviderConfig};
pub use dashboard::{Dashboard, DashboardState, Event, FetchOutcome, FetchPipeline, Request};
pub use error::WeatherError;
pub use forecast::{aggregate, aggregate_in};
pub use geocode::{AddressComponent, Geocoder, GoogleGeocoder, resolve_place_name};
pub use location::{Geolocator, IpGeolocator};
pub use model::{
    Condition, Coordinates, CurrentWeather, DailyEntry, Forecast, HourlyEntry, Locator, Sample,
};
pub use provider::{ProviderId, WeatherProvider, openweather::OpenWeatherProvider};
pub use recent::RecentCities;
