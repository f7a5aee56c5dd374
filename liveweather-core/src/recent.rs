//! Persisted list of recently viewed cities.

use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{config::project_dirs, error::WeatherError};

pub const MAX_RECENT: usize = 5;
const RECENT_FILE: &str = "recent_cities.json";

/// Up to [`MAX_RECENT`] city names, most recent first, unique ignoring case.
#[derive(Debug, Clone, Default)]
pub struct RecentCities {
    path: Option<PathBuf>,
    cities: Vec<String>,
}

impl RecentCities {
    /// A store that never touches disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load from the platform data directory.
    pub fn load() -> Result<Self, WeatherError> {
        let dirs = project_dirs().map_err(|e| WeatherError::Storage(e.to_string()))?;
        Ok(Self::load_from(dirs.data_dir().join(RECENT_FILE)))
    }

    /// Load from `path`. A missing or unreadable file yields an empty list.
    pub fn load_from(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let cities = read_cities(&path);
        Self { path: Some(path), cities }
    }

    pub fn list(&self) -> &[String] {
        &self.cities
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    /// Move `city` to the front, dropping any entry equal to it ignoring case.
    pub fn record(&mut self, city: &str) {
        let city = city.trim();
        if city.is_empty() {
            return;
        }

        let lower = city.to_lowercase();
        self.cities.retain(|c| c.to_lowercase() != lower);
        self.cities.insert(0, city.to_string());
        self.cities.truncate(MAX_RECENT);
    }

    /// Write the list to disk. No-op for in-memory stores.
    pub fn save(&self) -> Result<(), WeatherError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                WeatherError::Storage(format!("create {}: {e}", parent.display()))
            })?;
        }

        let json = serde_json::to_string(&self.cities)
            .map_err(|e| WeatherError::Storage(e.to_string()))?;
        fs::write(path, json)
            .map_err(|e| WeatherError::Storage(format!("write {}: {e}", path.display())))
    }
}

fn read_cities(path: &Path) -> Vec<String> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            tracing::warn!("Failed to read {}: {}", path.display(), e);
            return Vec::new();
        }
    };

    match serde_json::from_str::<Vec<String>>(&content) {
        Ok(mut cities) => {
            cities.truncate(MAX_RECENT);
            cities
        }
        Err(e) => {
            tracing::warn!("Ignoring corrupt recent city list {}: {}", path.display(), e);
            Vec::new()
        }
    }
}
