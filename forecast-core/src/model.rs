use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::format::country_flag;

/// One geocoding match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: String,
    pub name: String,
    pub country_code: String,
}

impl Place {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            latitude: self.latitude,
            longitude: self.longitude,
            timezone: self.timezone.clone(),
        }
    }
}

/// Input of a forecast request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
    /// IANA zone name, or `auto` to let the forecast service pick one.
    pub timezone: String,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            timezone: "auto".to_string(),
        }
    }
}

/// The place a forecast is shown for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedLocation {
    pub display_name: String,
    pub country_flag: String,
}

impl ResolvedLocation {
    /// Header text, e.g. `Paris 🇫🇷`.
    pub fn label(&self) -> String {
        if self.country_flag.is_empty() {
            self.display_name.clone()
        } else {
            format!("{} {}", self.display_name, self.country_flag)
        }
    }
}

impl From<&Place> for ResolvedLocation {
    fn from(place: &Place) -> Self {
        Self {
            display_name: place.name.clone(),
            country_flag: country_flag(&place.country_code),
        }
    }
}

impl From<&Coordinates> for ResolvedLocation {
    fn from(coords: &Coordinates) -> Self {
        Self {
            display_name: format!("{:.2}, {:.2}", coords.latitude, coords.longitude),
            country_flag: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayForecast {
    pub date: NaiveDate,
    /// WMO present-weather code.
    pub weather_code: i32,
    pub temp_max: f64,
    pub temp_min: f64,
}

/// Everything the UI renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolverState {
    pub search_term: String,
    pub is_loading: bool,
    pub error: Option<String>,
    pub resolved_location: Option<ResolvedLocation>,
    pub daily_forecast: Vec<DayForecast>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolved_location_from_place() {
        let place = Place {
            latitude: 48.85,
            longitude: 2.35,
            timezone: "Europe/Paris".into(),
            name: "Paris".into(),
            country_code: "FR".into(),
        };

        let resolved = ResolvedLocation::from(&place);
        assert_eq!(resolved.label(), "Paris 🇫🇷");
        assert_eq!(place.coordinates().timezone, "Europe/Paris");
    }

    #[test]
    fn coordinate_label_has_no_flag() {
        let resolved = ResolvedLocation::from(&Coordinates::new(52.5244, 13.4105));
        assert_eq!(resolved.label(), "52.52, 13.41");
    }
}
