//! Stateless formatting used when rendering a [`ResolverState`].

use chrono::NaiveDate;

use crate::{
    icon::classify,
    model::{DayForecast, ResolvedLocation, ResolverState},
};

const REGIONAL_INDICATOR_OFFSET: u32 = 127_397;

/// Flag emoji for a two-letter country code, e.g. `FR` → 🇫🇷.
///
/// Lower-case input is accepted. Characters that are not ASCII letters have no
/// regional indicator and are skipped.
pub fn country_flag(country_code: &str) -> String {
    country_code
        .chars()
        .filter(char::is_ascii_alphabetic)
        .filter_map(|c| char::from_u32(c.to_ascii_uppercase() as u32 + REGIONAL_INDICATOR_OFFSET))
        .collect()
}

/// `today` for the first day of a strip, the short English weekday otherwise.
pub fn day_label(index: usize, date: NaiveDate) -> String {
    if index == 0 {
        "today".to_string()
    } else {
        date.format("%a").to_string()
    }
}

/// Min is floored and max is ceiled, so the shown range is never narrower than
/// the forecast.
pub fn temperature_range(min: f64, max: f64) -> String {
    format!("{}° — {}°", min.floor() as i64, max.ceil() as i64)
}

/// One rendered day of the forecast strip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayCell {
    pub icon: &'static str,
    pub range: String,
    pub label: String,
}

pub fn day_cells(days: &[DayForecast]) -> Vec<DayCell> {
    days.iter()
        .enumerate()
        .map(|(i, day)| DayCell {
            icon: classify(day.weather_code),
            range: temperature_range(day.temp_min, day.temp_max),
            label: day_label(i, day.date),
        })
        .collect()
}

/// What the UI should show for a given state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Idle,
    Loading,
    Error(String),
    Forecast {
        location: Option<ResolvedLocation>,
        days: Vec<DayCell>,
    },
}

impl View {
    pub fn of(state: &ResolverState) -> Self {
        if let Some(error) = &state.error {
            View::Error(error.clone())
        } else if state.is_loading {
            View::Loading
        } else if !state.daily_forecast.is_empty() {
            View::Forecast {
                location: state.resolved_location.clone(),
                days: day_cells(&state.daily_forecast),
            }
        } else {
            View::Idle
        }
    }
}
