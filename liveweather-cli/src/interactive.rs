//! Interactive dashboard loop.

use std::fmt;

use inquire::{CustomType, InquireError, Select, Text};
use liveweather_core::{Coordinates, Dashboard};

use crate::{cli::parse_coordinates, render};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuItem {
    Search,
    Recent,
    MyLocation,
    PickOnMap,
    Hourly,
    Daily,
    Quit,
}

impl MenuItem {
    const ALL: [MenuItem; 7] = [
        MenuItem::Search,
        MenuItem::Recent,
        MenuItem::MyLocation,
        MenuItem::PickOnMap,
        MenuItem::Hourly,
        MenuItem::Daily,
        MenuItem::Quit,
    ];
}

impl fmt::Display for MenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MenuItem::Search => "Search city",
            MenuItem::Recent => "Recent cities",
            MenuItem::MyLocation => "Use my location",
            MenuItem::PickOnMap => "Pick location on map",
            MenuItem::Hourly => "Hourly forecast",
            MenuItem::Daily => "7 day forecast",
            MenuItem::Quit => "Quit",
        };
        f.write_str(label)
    }
}

/// Run the dashboard until the user quits or presses Esc/Ctrl-C.
pub async fn run(dashboard: &mut Dashboard, start_city: &str) -> anyhow::Result<()> {
    // Failures land in the state's notice, which is printed below.
    let _ = dashboard.search(start_city).await;
    println!("{}\n", render::render_state(dashboard.state(), false, false));

    loop {
        let choice = match Select::new("LiveWeather", MenuItem::ALL.to_vec()).prompt() {
            Ok(choice) => choice,
            Err(e) if is_exit(&e) => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        let refreshed = match choice {
            MenuItem::Quit => return Ok(()),
            MenuItem::Hourly => {
                println!("{}\n", render::render_hourly(&dashboard.state().forecast.hourly));
                false
            }
            MenuItem::Daily => {
                println!("{}\n", render::render_daily(&dashboard.state().forecast.daily));
                false
            }
            MenuItem::Search => match prompt(Text::new("City:").prompt())? {
                Some(city) if !city.trim().is_empty() => {
                    let _ = dashboard.search(&city).await;
                    true
                }
                _ => false,
            },
            MenuItem::Recent => {
                let recent = dashboard.state().recent.list().to_vec();
                let current = dashboard.state().current.as_ref().map(|w| w.name.as_str());
                println!("{}\n", render::render_recent(&recent, current));
                if recent.is_empty() {
                    false
                } else if let Some(city) = prompt(Select::new("Recent cities", recent).prompt())? {
                    let _ = dashboard.search(&city).await;
                    true
                } else {
                    false
                }
            }
            MenuItem::MyLocation => {
                println!("Getting location...");
                let _ = dashboard.use_my_location().await;
                true
            }
            MenuItem::PickOnMap => match prompt_coordinates()? {
                Some(coordinates) => {
                    let _ = dashboard.map_click(coordinates).await;
                    true
                }
                None => false,
            },
        };

        if refreshed {
            println!("{}\n", render::render_state(dashboard.state(), false, false));
        }
    }
}

fn prompt_coordinates() -> anyhow::Result<Option<Coordinates>> {
    let Some(lat) = prompt(CustomType::<f64>::new("Latitude:").prompt())? else {
        return Ok(None);
    };
    let Some(lon) = prompt(CustomType::<f64>::new("Longitude:").prompt())? else {
        return Ok(None);
    };

    match parse_coordinates(lat, lon) {
        Ok(coordinates) => Ok(Some(coordinates)),
        Err(e) => {
            println!("{e}\n");
            Ok(None)
        }
    }
}

/// Treat Esc as "go back" rather than an error.
fn prompt<T>(result: Result<T, InquireError>) -> anyhow::Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn is_exit(err: &InquireError) -> bool {
    matches!(err, InquireError::OperationCanceled | InquireError::OperationInterrupted)
}
