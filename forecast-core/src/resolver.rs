//! Turns a changing search term into forecast state.
//!
//! Every lookup gets a generation number and its own pair of cancellation
//! tokens. Starting a new lookup cancels the previous pair and bumps the
//! generation inside the state lock; a lookup only writes state while its
//! generation is still the latest one, so late responses from superseded
//! lookups are dropped even if the provider ignores its token.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::{
    LookupError,
    model::{Coordinates, ResolvedLocation, ResolverState},
    provider::ForecastProvider,
    store::{KeyValueStore, SEARCH_TERM_KEY},
};

/// Search terms shorter than this (in characters) never hit the network.
pub const MIN_SEARCH_LEN: usize = 2;

#[derive(Debug)]
struct Shared {
    state: watch::Sender<ResolverState>,
    latest: AtomicU64,
}

impl Shared {
    /// Start a new generation and apply `f` under the same lock.
    fn advance(&self, f: impl FnOnce(&mut ResolverState)) -> u64 {
        let mut next = 0;
        self.state.send_modify(|state| {
            next = self.latest.fetch_add(1, Ordering::AcqRel) + 1;
            f(state);
        });
        next
    }

    /// Apply `f` only if `generation` is still the latest. Returns whether it was applied.
    fn commit(&self, generation: u64, f: impl FnOnce(&mut ResolverState)) -> bool {
        let mut applied = false;
        self.state.send_if_modified(|state| {
            if self.latest.load(Ordering::Acquire) != generation {
                return false;
            }
            f(state);
            applied = true;
            true
        });
        applied
    }
}

#[derive(Debug)]
struct ActiveLookup {
    generation: u64,
    geocode: CancellationToken,
    forecast: CancellationToken,
}

impl ActiveLookup {
    fn cancel(&self) {
        self.geocode.cancel();
        self.forecast.cancel();
    }
}

#[derive(Debug)]
enum Target {
    Place(String),
    Coordinates(Coordinates),
}

/// Owns the search term and the lookups it triggers.
///
/// Lookups run on the ambient Tokio runtime, so the resolver must be created
/// and driven from within one. Dropping the resolver cancels any live lookup.
#[derive(Debug)]
pub struct ForecastResolver {
    provider: Arc<dyn ForecastProvider>,
    store: Arc<dyn KeyValueStore>,
    shared: Arc<Shared>,
    active: Option<ActiveLookup>,
}

impl ForecastResolver {
    /// Create a resolver seeded with the persisted search term. A persisted
    /// term long enough to search starts a lookup right away.
    pub fn new(provider: Arc<dyn ForecastProvider>, store: Arc<dyn KeyValueStore>) -> Self {
        let (state, _) = watch::channel(ResolverState::default());
        let mut resolver = Self {
            provider,
            store,
            shared: Arc::new(Shared {
                state,
                latest: AtomicU64::new(0),
            }),
            active: None,
        };

        let persisted = resolver.store.get(SEARCH_TERM_KEY).unwrap_or_default();
        tracing::debug!(term = %persisted, "restored search term");
        resolver.set_search_term(persisted);
        resolver
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> ResolverState {
        self.shared.state.borrow().clone()
    }

    /// Receiver that is notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<ResolverState> {
        self.shared.state.subscribe()
    }

    /// Wait until no lookup is loading and return the state at that point.
    pub async fn settled(&self) -> ResolverState {
        let mut rx = self.subscribe();
        let settled = rx
            .wait_for(|state| !state.is_loading)
            .await
            .map(|state| state.clone());
        settled.unwrap_or_else(|_| self.state())
    }

    /// Replace the search term.
    ///
    /// Persists the term, cancels the previous lookup and, if the term is at
    /// least [`MIN_SEARCH_LEN`] characters long, starts a new one. Setting the
    /// current term again does nothing.
    pub fn set_search_term(&mut self, term: impl Into<String>) {
        let term = term.into();
        if self.shared.state.borrow().search_term == term {
            return;
        }

        if let Err(err) = self.store.set(SEARCH_TERM_KEY, &term) {
            tracing::warn!(error = %err, "failed to persist search term");
        }

        self.cancel_active();

        if term.chars().count() < MIN_SEARCH_LEN {
            self.shared.advance(|state| {
                state.search_term = term;
                state.error = None;
                state.is_loading = false;
                state.daily_forecast.clear();
            });
            return;
        }

        let query = term.clone();
        let generation = self.shared.advance(|state| {
            state.search_term = term;
            state.error = None;
            state.is_loading = true;
        });
        self.spawn(generation, Target::Place(query));
    }

    /// Fetch the forecast for raw coordinates, skipping geocoding. Supersedes
    /// any live lookup and clears the search term, so entering the previous
    /// term again starts a new lookup. The persisted term is kept.
    pub fn lookup_coordinates(&mut self, at: Coordinates) {
        self.cancel_active();

        let generation = self.shared.advance(|state| {
            state.search_term.clear();
            state.error = None;
            state.is_loading = true;
        });
        self.spawn(generation, Target::Coordinates(at));
    }

    /// Cancel the live lookup, if any. The state stops loading and keeps
    /// whatever the lookup had already written.
    pub fn shutdown(&mut self) {
        if self.active.is_some() {
            self.cancel_active();
            self.shared.advance(|state| state.is_loading = false);
        }
    }

    fn cancel_active(&mut self) {
        if let Some(lookup) = self.active.take() {
            tracing::debug!(generation = lookup.generation, "cancelling lookup");
            lookup.cancel();
        }
    }

    fn spawn(&mut self, generation: u64, target: Target) {
        let active = ActiveLookup {
            generation,
            geocode: CancellationToken::new(),
            forecast: CancellationToken::new(),
        };

        let run = LookupRun {
            provider: Arc::clone(&self.provider),
            shared: Arc::clone(&self.shared),
            generation,
            geocode: active.geocode.clone(),
            forecast: active.forecast.clone(),
        };

        tracing::info!(generation, ?target, "starting lookup");
        tokio::spawn(run.execute(target));
        self.active = Some(active);
    }
}

impl Drop for ForecastResolver {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// The task side of one lookup.
struct LookupRun {
    provider: Arc<dyn ForecastProvider>,
    shared: Arc<Shared>,
    generation: u64,
    geocode: CancellationToken,
    forecast: CancellationToken,
}

impl LookupRun {
    async fn execute(self, target: Target) {
        let outcome = self.resolve(target).await;

        match &outcome {
            Ok(()) => tracing::debug!(generation = self.generation, "lookup finished"),
            Err(err) if err.is_cancelled() => {
                tracing::debug!(generation = self.generation, "lookup cancelled");
                return;
            }
            Err(err) => tracing::warn!(
                generation = self.generation,
                error = %err,
                detail = err.detail().unwrap_or_default(),
                "lookup failed"
            ),
        }

        self.shared.commit(self.generation, |state| {
            state.is_loading = false;
            if let Err(err) = outcome {
                state.error = Some(err.to_string());
                state.daily_forecast.clear();
            }
        });
    }

    async fn resolve(&self, target: Target) -> Result<(), LookupError> {
        let at = match target {
            Target::Place(term) => {
                let places = self.provider.geocode(&term, &self.geocode).await?;
                let place = places
                    .into_iter()
                    .next()
                    .ok_or(LookupError::LocationNotFound)?;
                let location = ResolvedLocation::from(&place);
                self.write(|state| state.resolved_location = Some(location))?;
                place.coordinates()
            }
            Target::Coordinates(at) => {
                let location = ResolvedLocation::from(&at);
                self.write(|state| state.resolved_location = Some(location))?;
                at
            }
        };

        let days = self.provider.daily_forecast(&at, &self.forecast).await?;
        self.write(|state| state.daily_forecast = days)
    }

    fn write(&self, f: impl FnOnce(&mut ResolverState)) -> Result<(), LookupError> {
        if self.shared.commit(self.generation, f) {
            Ok(())
        } else {
            Err(LookupError::Cancelled)
        }
    }
}
