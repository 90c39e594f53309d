use crate::{
    Config, LookupError,
    model::{Coordinates, DayForecast, Place},
    provider::open_meteo::OpenMeteoProvider,
};
use async_trait::async_trait;
use std::{fmt::Debug, future::Future, sync::Arc};
use tokio_util::sync::CancellationToken;

pub mod open_meteo;

/// The two remote calls a lookup is made of.
///
/// Implementations should stop waiting and return [`LookupError::Cancelled`]
/// once `cancel` fires. The resolver discards superseded results either way.
#[async_trait]
pub trait ForecastProvider: Send + Sync + Debug {
    /// Geocoding matches for a free-text place name, best first.
    async fn geocode(&self, name: &str, cancel: &CancellationToken)
    -> Result<Vec<Place>, LookupError>;

    async fn daily_forecast(
        &self,
        at: &Coordinates,
        cancel: &CancellationToken,
    ) -> Result<Vec<DayForecast>, LookupError>;
}

/// Construct the configured provider.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Arc<dyn ForecastProvider>> {
    config.validate()?;
    Ok(Arc::new(OpenMeteoProvider::from_config(config)?))
}

/// Run `fut` unless `cancel` fires first.
pub async fn until_cancelled<T>(
    cancel: &CancellationToken,
    fut: impl Future<Output = Result<T, LookupError>>,
) -> Result<T, LookupError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(LookupError::Cancelled),
        result = fut => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn provider_from_default_config() {
        assert!(provider_from_config(&Config::default()).is_ok());
    }

    #[test]
    fn provider_from_config_rejects_bad_url() {
        let cfg = Config {
            geocoding_url: "nowhere".into(),
            ..Config::default()
        };
        let err = provider_from_config(&cfg).unwrap_err();
        assert!(err.to_string().contains("Invalid geocoding_url"));
    }

    #[tokio::test]
    async fn until_cancelled_prefers_cancellation() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let work = async { Ok::<_, LookupError>(1) };
        let result = until_cancelled(&cancel, work).await;
        assert_eq!(result, Err(LookupError::Cancelled));
    }

    #[tokio::test(start_paused = true)]
    async fn until_cancelled_interrupts_pending_work() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.cancel();
        });

        let result = until_cancelled(&cancel, async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok::<_, LookupError>(())
        })
        .await;
        assert_eq!(result, Err(LookupError::Cancelled));
    }

    #[tokio::test]
    async fn until_cancelled_passes_result_through() {
        let cancel = CancellationToken::new();
        let work = async { Err::<(), _>(LookupError::LocationNotFound) };
        let result = until_cancelled(&cancel, work).await;
        assert_eq!(result, Err(LookupError::LocationNotFound));
    }
}
