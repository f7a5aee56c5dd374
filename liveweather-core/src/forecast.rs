//! Collapses the 3-hour forecast feed into hourly and daily views.

use std::collections::HashMap;

use chrono::{Local, NaiveDate, TimeZone};

use crate::model::{DailyEntry, Forecast, HourlyEntry, Sample};

pub const HOURLY_LIMIT: usize = 8;
pub const DAILY_LIMIT: usize = 7;

/// Aggregate samples, grouping days by the local time zone.
pub fn aggregate(samples: &[Sample]) -> Forecast {
    aggregate_in(samples, &Local)
}

/// Aggregate samples, grouping days by calendar date in `tz`.
///
/// `hourly` holds the first [`HOURLY_LIMIT`] samples verbatim. `daily` holds one
/// entry per calendar date in the order dates are first seen, capped at
/// [`DAILY_LIMIT`].
pub fn aggregate_in<Tz: TimeZone>(samples: &[Sample], tz: &Tz) -> Forecast {
    let hourly = samples.iter().take(HOURLY_LIMIT).map(HourlyEntry::from).collect();

    let mut index: HashMap<NaiveDate, usize> = HashMap::new();
    let mut days: Vec<Vec<&Sample>> = Vec::new();

    for sample in samples {
        let date = sample.timestamp.with_timezone(tz).date_naive();
        let slot = *index.entry(date).or_insert_with(|| {
            days.push(Vec::new());
            days.len() - 1
        });
        days[slot].push(sample);
    }

    let daily = days.iter().take(DAILY_LIMIT).filter_map(|day| summarize(day)).collect();

    Forecast { hourly, daily }
}

fn summarize(day: &[&Sample]) -> Option<DailyEntry> {
    let first = day.first()?;

    let (min_c, max_c) = day.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), s| {
        (lo.min(s.temp_c), hi.max(s.temp_c))
    });
    let pop = day.iter().map(|s| s.pop).sum::<f64>() / day.len() as f64;

    Some(DailyEntry {
        timestamp: first.timestamp,
        min_c,
        max_c,
        conditions: first.conditions.clone(),
        pop,
    })
}
