use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};
use tracing::instrument;

use crate::{
    error::WeatherError,
    model::{Condition, Coordinates, CurrentWeather, Locator, Sample},
};

use super::{REQUEST_TIMEOUT, WeatherProvider};

pub const OPENWEATHER_URL: &str = "https://api.openweathermap.org";

/// Reported visibility is capped at 10 km and omitted when unknown.
const DEFAULT_VISIBILITY_M: u32 = 10_000;

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Result<Self, WeatherError> {
        Self::with_base_url(api_key, OPENWEATHER_URL.to_string())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Result<Self, WeatherError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<(StatusCode, Option<T>, String), WeatherError> {
        let url = format!("{}/data/2.5/{endpoint}", self.base_url);

        let res = self
            .http
            .get(&url)
            .query(query)
            .query(&[("units", "metric"), ("appid", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| {
                WeatherError::NetworkFailure(format!("OpenWeather {endpoint} request failed: {e}"))
            })?;

        let status = res.status();
        let body = res.text().await.map_err(|e| {
            WeatherError::NetworkFailure(format!("Failed to read OpenWeather {endpoint} body: {e}"))
        })?;

        if !status.is_success() {
            return Ok((status, None, body));
        }

        let parsed = serde_json::from_str(&body).map_err(|e| {
            WeatherError::MalformedResponse(format!("Failed to parse OpenWeather {endpoint} JSON: {e}"))
        })?;

        Ok((status, Some(parsed), body))
    }
}

fn locator_query(locator: &Locator) -> Vec<(&'static str, String)> {
    match locator {
        Locator::City(name) => vec![("q", name.trim().to_string())],
        Locator::Coordinates(c) => vec![("lat", c.lat.to_string()), ("lon", c.lon.to_string())],
    }
}

#[derive(Debug, Deserialize)]
struct OwCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
    pressure: u32,
}

#[derive(Debug, Deserialize)]
struct OwForecastMain {
    temp: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct OwWeather {
    main: String,
    description: String,
    icon: String,
}

impl From<OwWeather> for Condition {
    fn from(w: OwWeather) -> Self {
        Condition { main: w.main, description: w.description, icon: w.icon }
    }
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    sunrise: i64,
    sunset: i64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    coord: OwCoord,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    visibility: Option<u32>,
    sys: OwSys,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwForecastMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    #[serde(default)]
    pop: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

impl TryFrom<OwCurrentResponse> for CurrentWeather {
    type Error = WeatherError;

    fn try_from(raw: OwCurrentResponse) -> Result<Self, Self::Error> {
        let condition = raw.weather.into_iter().next().map(Condition::from).ok_or_else(|| {
            WeatherError::MalformedResponse("OpenWeather current response has no condition".into())
        })?;

        Ok(CurrentWeather {
            name: raw.name,
            coordinates: Coordinates::new(raw.coord.lat, raw.coord.lon),
            temperature_c: raw.main.temp,
            feels_like_c: raw.main.feels_like,
            humidity_pct: raw.main.humidity,
            pressure_hpa: raw.main.pressure,
            wind_speed_mps: raw.wind.speed,
            visibility_m: raw.visibility.unwrap_or(DEFAULT_VISIBILITY_M),
            sunrise: unix_to_utc(raw.sys.sunrise)?,
            sunset: unix_to_utc(raw.sys.sunset)?,
            condition,
        })
    }
}

/// Drop entries that cannot become a [`Sample`] and normalize `pop`.
fn normalize_forecast(list: Vec<OwForecastEntry>) -> Vec<Sample> {
    list.into_iter()
        .filter_map(|entry| {
            if entry.weather.is_empty() {
                tracing::warn!(dt = entry.dt, "dropping forecast entry without condition");
                return None;
            }
            let timestamp = match unix_to_utc(entry.dt) {
                Ok(ts) => ts,
                Err(e) => {
                    tracing::warn!(dt = entry.dt, "dropping forecast entry: {e}");
                    return None;
                }
            };

            Some(Sample {
                timestamp,
                temp_c: entry.main.temp,
                conditions: entry.weather.into_iter().map(Condition::from).collect(),
                pop: entry.pop.unwrap_or(0.0).clamp(0.0, 1.0),
            })
        })
        .collect()
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    #[instrument(skip(self), level = "debug")]
    async fn fetch_current(&self, locator: &Locator) -> Result<CurrentWeather, WeatherError> {
        let (status, parsed, body) =
            self.get::<OwCurrentResponse>("weather", &locator_query(locator)).await?;

        let Some(parsed) = parsed else {
            if status == StatusCode::NOT_FOUND {
                return Err(match locator {
                    Locator::City(_) => WeatherError::NotFound(locator.to_string()),
                    Locator::Coordinates(_) => WeatherError::LocationUnavailable(locator.to_string()),
                });
            }
            return Err(WeatherError::NetworkFailure(format!(
                "OpenWeather current request failed with status {}: {}",
                status,
                truncate_body(&body),
            )));
        };

        let current = CurrentWeather::try_from(parsed)?;
        tracing::debug!(name = %current.name, coords = %current.coordinates, "resolved current weather");
        Ok(current)
    }

    #[instrument(skip(self), level = "debug")]
    async fn fetch_forecast(&self, coordinates: Coordinates) -> Result<Vec<Sample>, WeatherError> {
        let query = locator_query(&Locator::Coordinates(coordinates));
        let (status, parsed, body) = self.get::<OwForecastResponse>("forecast", &query).await?;

        let Some(parsed) = parsed else {
            return Err(WeatherError::NetworkFailure(format!(
                "OpenWeather forecast request failed with status {}: {}",
                status,
                truncate_body(&body),
            )));
        };

        Ok(normalize_forecast(parsed.list))
    }
}

fn unix_to_utc(ts: i64) -> Result<DateTime<Utc>, WeatherError> {
    DateTime::from_timestamp(ts, 0)
        .ok_or_else(|| WeatherError::MalformedResponse(format!("timestamp out of range: {ts}")))
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
