use anyhow::{Context, anyhow};
use clap::{Args, Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode};
use liveweather_core::{Config, Coordinates, Dashboard, ProviderId, RecentCities};

use crate::{interactive, render};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "liveweather", version, about = "Live weather dashboard")]
pub struct Cli {
    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Which forecast views to print after the current conditions.
#[derive(Debug, Clone, Copy, Args)]
pub struct Views {
    /// Show the next 24 hours in 3-hour steps.
    #[arg(long)]
    pub hourly: bool,

    /// Show the daily summary.
    #[arg(long)]
    pub daily: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure credentials for a specific provider.
    Configure {
        /// Provider short name: "openweather" or "google".
        provider: String,
    },

    /// Show weather for a city (defaults to the configured city).
    Show {
        city: Option<String>,

        #[command(flatten)]
        views: Views,
    },

    /// Show weather for a coordinate pair.
    Coords {
        #[arg(allow_negative_numbers = true)]
        lat: f64,
        #[arg(allow_negative_numbers = true)]
        lon: f64,

        #[command(flatten)]
        views: Views,
    },

    /// Show weather for your current location.
    Here {
        #[command(flatten)]
        views: Views,
    },

    /// Pick a point as on a map: resolve its place name, then show its weather.
    Pick {
        #[arg(allow_negative_numbers = true)]
        lat: f64,
        #[arg(allow_negative_numbers = true)]
        lon: f64,

        #[command(flatten)]
        views: Views,
    },

    /// List recently viewed cities.
    Recent,

    /// Interactive dashboard.
    Dashboard,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure { provider } => configure(&provider),
            Command::Recent => {
                let recent = RecentCities::load()?;
                println!("{}", render::render_recent(recent.list(), None));
                Ok(())
            }
            Command::Dashboard => {
                let config = Config::load()?;
                let mut dashboard = Dashboard::from_config(&config)?;
                interactive::run(&mut dashboard, config.default_city()).await
            }
            Command::Show { city, views } => {
                let config = Config::load()?;
                let city = city.unwrap_or_else(|| config.default_city().to_string());
                let mut dashboard = Dashboard::from_config(&config)?;
                let result = dashboard.search(&city).await;
                report(&dashboard, views, result)
            }
            Command::Coords { lat, lon, views } => {
                let coordinates = parse_coordinates(lat, lon)?;
                let mut dashboard = Dashboard::from_config(&Config::load()?)?;
                let result = dashboard.search_coordinates(coordinates).await;
                report(&dashboard, views, result)
            }
            Command::Here { views } => {
                let mut dashboard = Dashboard::from_config(&Config::load()?)?;
                let result = dashboard.use_my_location().await;
                report(&dashboard, views, result)
            }
            Command::Pick { lat, lon, views } => {
                let coordinates = parse_coordinates(lat, lon)?;
                let mut dashboard = Dashboard::from_config(&Config::load()?)?;
                let result = dashboard.map_click(coordinates).await;
                report(&dashboard, views, result)
            }
        }
    }
}

/// Print the dashboard; a failed action exits non-zero after the notice is shown.
fn report<T>(
    dashboard: &Dashboard,
    views: Views,
    result: Result<T, liveweather_core::WeatherError>,
) -> anyhow::Result<()> {
    match result {
        Ok(_) => {
            println!("{}", render::render_state(dashboard.state(), views.hourly, views.daily));
            Ok(())
        }
        Err(err) => {
            let message = err.user_message();
            Err(anyhow::Error::new(err).context(message))
        }
    }
}

pub fn parse_coordinates(lat: f64, lon: f64) -> anyhow::Result<Coordinates> {
    if !(-90.0..=90.0).contains(&lat) {
        return Err(anyhow!("Latitude must be between -90 and 90, got {lat}"));
    }
    if !(-180.0..=180.0).contains(&lon) {
        return Err(anyhow!("Longitude must be between -180 and 180, got {lon}"));
    }
    Ok(Coordinates::new(lat, lon))
}

fn configure(provider: &str) -> anyhow::Result<()> {
    let id = ProviderId::try_from(provider)?;
    let mut config = Config::load()?;

    let api_key = Password::new(&format!("API key for {id}:"))
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    if api_key.trim().is_empty() {
        return Err(anyhow!("API key must not be empty"));
    }

    config.upsert_provider_api_key(id, api_key.trim().to_string());
    config.save()?;

    println!("Saved {id} API key to {}", Config::config_file_path()?.display());
    Ok(())
}
