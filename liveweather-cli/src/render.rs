//! Plain-text rendering of dashboard state.

use std::fmt::Write;

use chrono::{DateTime, Local, TimeZone, Utc};
use liveweather_core::{Condition, CurrentWeather, DailyEntry, DashboardState, HourlyEntry};

pub fn round_temp(celsius: f64) -> i64 {
    celsius.round() as i64
}

pub fn wind_kmh(mps: f64) -> i64 {
    (mps * 3.6).round() as i64
}

pub fn visibility_km(meters: u32) -> String {
    format!("{:.1} km", f64::from(meters) / 1000.0)
}

pub fn percent(fraction: f64) -> i64 {
    (fraction * 100.0).round() as i64
}

fn clock_in<Tz: TimeZone>(ts: DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    ts.with_timezone(tz).format("%I:%M %p").to_string()
}

fn clock(ts: DateTime<Utc>) -> String {
    clock_in(ts, &Local)
}

fn describe(conditions: &[Condition]) -> &str {
    conditions.first().map(|c| c.description.as_str()).unwrap_or("unknown")
}

pub fn render_current(weather: &CurrentWeather) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}  ({})", weather.name, weather.coordinates);
    let _ = writeln!(
        out,
        "  {}°C  {}  (feels like {}°C)",
        round_temp(weather.temperature_c),
        weather.condition.main,
        round_temp(weather.feels_like_c)
    );
    let _ = writeln!(out, "  Humidity    {}%", weather.humidity_pct);
    let _ = writeln!(out, "  Wind        {} km/h", wind_kmh(weather.wind_speed_mps));
    let _ = writeln!(out, "  Pressure    {} hPa", weather.pressure_hpa);
    let _ = writeln!(out, "  Visibility  {}", visibility_km(weather.visibility_m));
    let _ = writeln!(out, "  Sunrise     {}", clock(weather.sunrise));
    let _ = write!(out, "  Sunset      {}", clock(weather.sunset));
    out
}

pub fn render_hourly(hourly: &[HourlyEntry]) -> String {
    render_hourly_in(hourly, &Local)
}

fn render_hourly_in<Tz: TimeZone>(hourly: &[HourlyEntry], tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    if hourly.is_empty() {
        return "Hourly forecast unavailable".to_string();
    }

    let mut out = String::from("Hourly forecast");
    for hour in hourly {
        let _ = write!(
            out,
            "\n  {}  {:>4}°C  {:<20} {:>3}% rain",
            clock_in(hour.timestamp, tz),
            round_temp(hour.temp_c),
            describe(&hour.conditions),
            percent(hour.pop)
        );
    }
    out
}

pub fn render_daily(daily: &[DailyEntry]) -> String {
    render_daily_in(daily, &Local)
}

fn render_daily_in<Tz: TimeZone>(daily: &[DailyEntry], tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    if daily.is_empty() {
        return "Daily forecast unavailable".to_string();
    }

    let mut out = String::from("Daily forecast");
    for (i, day) in daily.iter().enumerate() {
        let label = if i == 0 {
            "Today".to_string()
        } else {
            day.timestamp.with_timezone(tz).format("%a").to_string()
        };
        let date = day.timestamp.with_timezone(tz).format("%b %-d");
        let _ = write!(
            out,
            "\n  {:<5} {:<6}  {:<20} {:>3}%  {:>4}° / {:>4}°",
            label,
            date,
            describe(&day.conditions),
            percent(day.pop),
            round_temp(day.max_c),
            round_temp(day.min_c)
        );
    }
    out
}

pub fn render_recent(recent: &[String], current: Option<&str>) -> String {
    if recent.is_empty() {
        return "No recent searches yet".to_string();
    }

    let mut out = String::from("Recent cities");
    for city in recent {
        let marker = if Some(city.as_str()) == current { "*" } else { " " };
        let _ = write!(out, "\n {marker} {city}");
    }
    out
}

/// Everything the dashboard shows after an action.
pub fn render_state(state: &DashboardState, hourly: bool, daily: bool) -> String {
    let mut sections = Vec::new();

    if let Some(notice) = &state.notice {
        sections.push(format!("! {notice}"));
    }
    if let Some(place) = &state.picked_place {
        sections.push(format!("Picked on map: {place}"));
    }
    match &state.current {
        Some(weather) => sections.push(render_current(weather)),
        None => sections.push("No weather loaded".to_string()),
    }
    if hourly {
        sections.push(render_hourly(&state.forecast.hourly));
    }
    if daily {
        sections.push(render_daily(&state.forecast.daily));
    }

    sections.join("\n\n")
}
