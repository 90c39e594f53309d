//! WMO weather code → display glyph.

/// Returned by [`classify`] for codes outside every bucket.
pub const UNRECOGNIZED: &str = "NOT FOUND";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeatherIcon {
    Clear,
    MainlyClear,
    PartlyCloudy,
    Overcast,
    Fog,
    Drizzle,
    Rain,
    Snow,
    Thunderstorm,
    ThunderstormWithHail,
}

/// Buckets are disjoint.
const TABLE: &[(&[i32], WeatherIcon)] = &[
    (&[0], WeatherIcon::Clear),
    (&[1], WeatherIcon::MainlyClear),
    (&[2], WeatherIcon::PartlyCloudy),
    (&[3], WeatherIcon::Overcast),
    (&[45, 48], WeatherIcon::Fog),
    (&[51, 56, 61, 66, 80], WeatherIcon::Drizzle),
    (&[53, 55, 57, 63, 65, 67, 81, 82], WeatherIcon::Rain),
    (&[71, 73, 75, 77, 85, 86], WeatherIcon::Snow),
    (&[95], WeatherIcon::Thunderstorm),
    (&[96, 99], WeatherIcon::ThunderstormWithHail),
];

impl WeatherIcon {
    pub fn from_code(code: i32) -> Option<Self> {
        TABLE
            .iter()
            .find(|(codes, _)| codes.contains(&code))
            .map(|(_, icon)| *icon)
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            WeatherIcon::Clear => "☀️",
            WeatherIcon::MainlyClear => "🌤",
            WeatherIcon::PartlyCloudy => "⛅️",
            WeatherIcon::Overcast => "☁️",
            WeatherIcon::Fog => "🌫",
            WeatherIcon::Drizzle => "🌦",
            WeatherIcon::Rain => "🌧",
            WeatherIcon::Snow => "🌨",
            WeatherIcon::Thunderstorm => "🌩",
            WeatherIcon::ThunderstormWithHail => "⛈",
        }
    }

    pub const fn all() -> &'static [WeatherIcon] {
        &[
            WeatherIcon::Clear,
            WeatherIcon::MainlyClear,
            WeatherIcon::PartlyCloudy,
            WeatherIcon::Overcast,
            WeatherIcon::Fog,
            WeatherIcon::Drizzle,
            WeatherIcon::Rain,
            WeatherIcon::Snow,
            WeatherIcon::Thunderstorm,
            WeatherIcon::ThunderstormWithHail,
        ]
    }
}

/// Glyph for a weather code, or [`UNRECOGNIZED`].
pub fn classify(code: i32) -> &'static str {
    WeatherIcon::from_code(code).map_or(UNRECOGNIZED, |icon| icon.glyph())
}
