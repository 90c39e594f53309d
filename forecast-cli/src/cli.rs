use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use forecast_core::{Config, Coordinates, FileStore, ForecastResolver, View, provider_from_config};
use inquire::{CustomType, Text};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::render::print_view;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "forecast", version, about = "Daily forecast for a place")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Edit endpoint URLs and the request timeout.
    Configure,

    /// Show the forecast for a place.
    Show {
        /// Place name. Defaults to the last one searched for.
        place: Option<String>,
    },

    /// Show the forecast for coordinates, skipping the place search.
    Here {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
    },

    /// Type place names line by line; each line replaces the previous search.
    Interactive,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { place } => show(place).await,
            Command::Here { lat, lon } => here(lat, lon).await,
            Command::Interactive => interactive().await,
        }
    }
}

fn resolver() -> anyhow::Result<ForecastResolver> {
    let config = Config::load()?;
    tracing::debug!(?config, "using configuration");
    let provider = provider_from_config(&config)?;
    let store = Arc::new(FileStore::open_default()?);
    tracing::debug!(path = %store.path().display(), "opened state store");
    Ok(ForecastResolver::new(provider, store))
}

fn configure() -> anyhow::Result<()> {
    let mut cfg = Config::load()?;
    let current = cfg.clone();

    cfg.geocoding_url = Text::new("Geocoding endpoint:")
        .with_default(&current.geocoding_url)
        .prompt()
        .context("Geocoding endpoint prompt aborted")?;

    cfg.forecast_url = Text::new("Forecast endpoint:")
        .with_default(&current.forecast_url)
        .prompt()
        .context("Forecast endpoint prompt aborted")?;

    cfg.request_timeout_secs = CustomType::<u64>::new("Request timeout in seconds (0 = none):")
        .with_default(current.request_timeout_secs)
        .with_error_message("Please enter a whole number of seconds")
        .prompt()
        .context("Timeout prompt aborted")?;

    cfg.validate()?;
    cfg.save()?;

    let path = Config::config_file_path()?;
    println!("Saved configuration to {}", path.display());
    Ok(())
}

async fn show(place: Option<String>) -> anyhow::Result<()> {
    let mut resolver = resolver()?;

    if let Some(place) = place {
        resolver.set_search_term(place);
    }

    let state = resolver.settled().await;
    if state.search_term.is_empty() {
        println!("Search a location: run `forecast show <place>`.");
        return Ok(());
    }

    print_view(&View::of(&state));
    Ok(())
}

async fn here(lat: f64, lon: f64) -> anyhow::Result<()> {
    let mut resolver = resolver()?;

    resolver.lookup_coordinates(Coordinates::new(lat, lon));
    let state = resolver.settled().await;

    print_view(&View::of(&state));
    Ok(())
}

async fn interactive() -> anyhow::Result<()> {
    let mut resolver = resolver()?;

    println!("Search a location (Ctrl-D to quit):");

    let mut rx = resolver.subscribe();
    let printer = tokio::spawn(async move {
        let mut last: Option<View> = None;
        loop {
            let view = View::of(&rx.borrow_and_update());
            if last.as_ref() != Some(&view) {
                print_view(&view);
                last = Some(view);
            }
            if rx.changed().await.is_err() {
                break;
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line.context("Failed to read from stdin")? {
                Some(line) => resolver.set_search_term(line),
                None => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    resolver.shutdown();
    printer.abort();
    Ok(())
}
