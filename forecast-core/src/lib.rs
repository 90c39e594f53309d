//! Core library for the `forecast` CLI.
//!
//! This crate defines:
//! - The forecast resolver: search term in, cancellable geocode → forecast lookups out
//! - The Open-Meteo provider behind the `ForecastProvider` trait
//! - WMO code icons and the formatting used to render a daily forecast strip
//! - Configuration and the key-value store the last search term is kept in
//!
//! It is used by `forecast-cli`, but can also be driven by any other front end.

pub mod config;
pub mod error;
pub mod format;
pub mod icon;
pub mod model;
pub mod provider;
pub mod resolver;
pub mod store;

pub use config::Config;
pub use error::LookupError;
pub use format::View;
pub use icon::classify;
pub use model::{Coordinates, DayForecast, Place, ResolvedLocation, ResolverState};
pub use provider::{ForecastProvider, provider_from_config};
pub use resolver::ForecastResolver;
pub use store::{FileStore, KeyValueStore, MemoryStore};
