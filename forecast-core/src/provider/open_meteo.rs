use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use tokio_util::sync::CancellationToken;

use crate::{
    Config, LookupError,
    model::{Coordinates, DayForecast, Place},
    provider::until_cancelled,
};

use super::ForecastProvider;

const DAILY_SERIES: &str = "weathercode,temperature_2m_max,temperature_2m_min";

/// Open-Meteo geocoding + forecast. Neither endpoint needs an API key.
#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    geocoding_url: String,
    forecast_url: String,
    http: Client,
}

impl OpenMeteoProvider {
    pub fn new(geocoding_url: impl Into<String>, forecast_url: impl Into<String>) -> Self {
        Self {
            geocoding_url: geocoding_url.into(),
            forecast_url: forecast_url.into(),
            http: Client::new(),
        }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let mut builder = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            geocoding_url: config.geocoding_url.clone(),
            forecast_url: config.forecast_url.clone(),
            http: builder.build()?,
        })
    }

    async fn fetch_places(&self, name: &str) -> Result<Vec<Place>, LookupError> {
        let request = self.http.get(&self.geocoding_url).query(&[("name", name)]);
        let parsed: OmGeocodeResponse = get_json(request)
            .await
            .map_err(|detail| LookupError::geocode(format!("geocoding '{name}': {detail}")))?;

        parsed
            .into_places()
            .map_err(|detail| LookupError::geocode(format!("geocoding '{name}': {detail}")))
    }

    async fn fetch_daily(&self, at: &Coordinates) -> Result<Vec<DayForecast>, LookupError> {
        let request = self.http.get(&self.forecast_url).query(&[
            ("latitude", at.latitude.to_string()),
            ("longitude", at.longitude.to_string()),
            ("timezone", at.timezone.clone()),
            ("daily", DAILY_SERIES.to_string()),
        ]);
        let point = format!("{},{}", at.latitude, at.longitude);
        let parsed: OmForecastResponse = get_json(request)
            .await
            .map_err(|detail| LookupError::forecast(format!("forecast for {point}: {detail}")))?;

        Ok(parsed.daily.into_days())
    }
}

#[derive(Debug, Deserialize)]
struct OmPlace {
    latitude: f64,
    longitude: f64,
    /// Missing for some features (seas, undersea ridges).
    #[serde(default = "auto_timezone")]
    timezone: String,
    name: String,
    #[serde(default)]
    country_code: String,
}

fn auto_timezone() -> String {
    "auto".to_string()
}

impl From<OmPlace> for Place {
    fn from(p: OmPlace) -> Self {
        Place {
            latitude: p.latitude,
            longitude: p.longitude,
            timezone: p.timezone,
            name: p.name,
            country_code: p.country_code,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OmGeocodeResponse {
    /// Absent, not empty, when nothing matched.
    results: Option<Vec<serde_json::Value>>,
}

impl OmGeocodeResponse {
    /// The first result must decode; later ones that don't are skipped.
    fn into_places(self) -> Result<Vec<Place>, String> {
        let mut results = self.results.unwrap_or_default().into_iter();

        let Some(first) = results.next() else {
            return Ok(Vec::new());
        };
        let first: OmPlace = serde_json::from_value(first)
            .map_err(|e| format!("invalid first result: {e}"))?;

        let rest = results.filter_map(|value| {
            serde_json::from_value::<OmPlace>(value)
                .inspect_err(|e| tracing::debug!(error = %e, "skipping undecodable result"))
                .ok()
        });

        let mut places = vec![Place::from(first)];
        places.extend(rest.map(Place::from));
        Ok(places)
    }
}

#[derive(Debug, Deserialize)]
struct OmDaily {
    time: Vec<NaiveDate>,
    weathercode: Vec<i32>,
    temperature_2m_max: Vec<f64>,
    temperature_2m_min: Vec<f64>,
}

impl OmDaily {
    /// Zip the parallel series by index. Extra trailing entries in a longer
    /// series are dropped.
    fn into_days(self) -> Vec<DayForecast> {
        let lens = [
            self.time.len(),
            self.weathercode.len(),
            self.temperature_2m_max.len(),
            self.temperature_2m_min.len(),
        ];
        if lens.iter().any(|len| *len != lens[0]) {
            tracing::warn!(?lens, "daily series have different lengths, truncating");
        }

        self.time
            .into_iter()
            .zip(self.weathercode)
            .zip(self.temperature_2m_max)
            .zip(self.temperature_2m_min)
            .map(|(((date, weather_code), temp_max), temp_min)| DayForecast {
                date,
                weather_code,
                temp_max,
                temp_min,
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct OmForecastResponse {
    daily: OmDaily,
}

#[async_trait]
impl ForecastProvider for OpenMeteoProvider {
    async fn geocode(
        &self,
        name: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<Place>, LookupError> {
        until_cancelled(cancel, self.fetch_places(name)).await
    }

    async fn daily_forecast(
        &self,
        at: &Coordinates,
        cancel: &CancellationToken,
    ) -> Result<Vec<DayForecast>, LookupError> {
        until_cancelled(cancel, self.fetch_daily(at)).await
    }
}

/// Send, check the status and decode. Errors come back as log-ready text.
async fn get_json<T: DeserializeOwned>(request: reqwest::RequestBuilder) -> Result<T, String> {
    let res = request
        .send()
        .await
        .map_err(|e| format!("request failed: {e}"))?;

    let status = res.status();
    let body = res
        .text()
        .await
        .map_err(|e| format!("failed to read body: {e}"))?;

    if !status.is_success() {
        return Err(format!("status {status}: {}", truncate_body(&body)));
    }

    serde_json::from_str(&body)
        .map_err(|e| format!("invalid JSON ({e}): {}", truncate_body(&body)))
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "é".repeat(300);
        let cut = truncate_body(&long);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), 203);
        assert_eq!(truncate_body("short"), "short");
    }

    #[test]
    fn daily_series_are_zipped_by_index() {
        let daily: OmDaily = serde_json::from_value(serde_json::json!({
            "time": ["2024-01-02", "2024-01-03"],
            "weathercode": [95, 61],
            "temperature_2m_max": [15.2, 9.0],
            "temperature_2m_min": [10.7, 1.1],
        }))
        .unwrap();

        let days = daily.into_days();
        assert_eq!(days.len(), 2);
        assert_eq!(days[1].date, NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
        assert_eq!(days[1].weather_code, 61);
        assert_eq!(days[1].temp_max, 9.0);
        assert_eq!(days[1].temp_min, 1.1);
    }

    #[test]
    fn uneven_series_truncate_to_shortest() {
        let daily = OmDaily {
            time: vec![NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(); 3],
            weathercode: vec![0, 1],
            temperature_2m_max: vec![1.0, 2.0, 3.0],
            temperature_2m_min: vec![0.0, 0.0, 0.0],
        };
        assert_eq!(daily.into_days().len(), 2);
    }

    #[test]
    fn undecodable_later_results_are_skipped() {
        let parsed: OmGeocodeResponse = serde_json::from_value(serde_json::json!({
            "results": [
                {
                    "name": "Paris",
                    "latitude": 48.85,
                    "longitude": 2.35,
                    "timezone": "Europe/Paris",
                    "country_code": "FR"
                },
                { "name": "Broken", "timezone": "UTC" },
                { "name": "Paris Basin", "latitude": 48.0, "longitude": 2.0 }
            ]
        }))
        .unwrap();

        let places = parsed.into_places().unwrap();
        assert_eq!(places.len(), 2);
        assert_eq!(places[0].name, "Paris");
        assert_eq!(places[1].country_code, "");
        assert_eq!(places[1].timezone, "auto");
    }

    #[test]
    fn undecodable_first_result_is_an_error() {
        let parsed: OmGeocodeResponse = serde_json::from_value(serde_json::json!({
            "results": [{ "name": "Nowhere", "timezone": "UTC" }]
        }))
        .unwrap();

        let err = parsed.into_places().unwrap_err();
        assert!(err.contains("invalid first result"));
    }
}
