use thiserror::Error;

/// Failure of one geocode → forecast lookup.
///
/// The `Display` text of every variant except [`LookupError::Cancelled`] is what
/// the user sees; transport details go to the log instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// The geocoding service answered but had no match for the search term.
    #[error("Location not found")]
    LocationNotFound,

    #[error("Could not fetch location data")]
    GeocodeRequest { detail: String },

    #[error("Could not fetch weather data")]
    ForecastRequest { detail: String },

    /// The lookup was superseded or torn down. Never shown to the user.
    #[error("lookup cancelled")]
    Cancelled,
}

impl LookupError {
    pub fn geocode(detail: impl Into<String>) -> Self {
        Self::GeocodeRequest {
            detail: detail.into(),
        }
    }

    pub fn forecast(detail: impl Into<String>) -> Self {
        Self::ForecastRequest {
            detail: detail.into(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Transport-level detail, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::GeocodeRequest { detail } | Self::ForecastRequest { detail } => Some(detail),
            Self::LocationNotFound | Self::Cancelled => None,
        }
    }
}
