use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.lon)
    }
}

/// What the user asked weather for.
#[derive(Debug, Clone, PartialEq)]
pub enum Locator {
    City(String),
    Coordinates(Coordinates),
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Locator::City(name) => f.write_str(name),
            Locator::Coordinates(coords) => write!(f, "({coords})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Category, e.g. "Rain" or "Clouds".
    pub main: String,
    pub description: String,
    pub icon: String,
}

/// One 3-hour point of the forecast feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp: DateTime<Utc>,
    pub temp_c: f64,
    /// Never empty; the fetch client drops entries without a condition.
    pub conditions: Vec<Condition>,
    /// Probability of precipitation, 0.0..=1.0.
    pub pop: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyEntry {
    pub timestamp: DateTime<Utc>,
    pub temp_c: f64,
    pub conditions: Vec<Condition>,
    pub pop: f64,
}

impl From<&Sample> for HourlyEntry {
    fn from(sample: &Sample) -> Self {
        Self {
            timestamp: sample.timestamp,
            temp_c: sample.temp_c,
            conditions: sample.conditions.clone(),
            pop: sample.pop,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyEntry {
    /// Timestamp of the first sample of the day.
    pub timestamp: DateTime<Utc>,
    pub min_c: f64,
    pub max_c: f64,
    /// Conditions of the first sample of the day.
    pub conditions: Vec<Condition>,
    /// Mean pop across the day's samples.
    pub pop: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub hourly: Vec<HourlyEntry>,
    pub daily: Vec<DailyEntry>,
}

impl Forecast {
    pub fn is_empty(&self) -> bool {
        self.hourly.is_empty() && self.daily.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub name: String,
    pub coordinates: Coordinates,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub humidity_pct: u8,
    pub pressure_hpa: u32,
    pub wind_speed_mps: f64,
    pub visibility_m: u32,
    pub sunrise: DateTime<Utc>,
    pub sunset: DateTime<Utc>,
    pub condition: Condition,
}
