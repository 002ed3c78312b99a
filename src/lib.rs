pub mod chart;
pub mod cli;
pub mod config;
pub mod core;
pub mod fetch;
pub mod log;
pub mod server;
pub mod store;
pub mod sync;

use crate::chart::SvgRenderer;
use crate::config::AppConfig;
use crate::core::date::DateValidator;
use crate::fetch::finmarket::FinmarketRatesProvider;
use crate::fetch::iban::IbanCodesProvider;
use crate::server::AppState;
use crate::store::RateStore;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

pub enum AppCommand {
    Serve,
    SyncCodes,
    SyncRates {
        start: String,
        end: String,
    },
    Chart {
        start: String,
        end: String,
        countries: Vec<String>,
        out: PathBuf,
    },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    match command {
        AppCommand::Serve => serve(config_path).await,
        AppCommand::SyncCodes => cli::codes::run(config_path).await,
        AppCommand::SyncRates { start, end } => cli::rates::run(config_path, &start, &end).await,
        AppCommand::Chart {
            start,
            end,
            countries,
            out,
        } => cli::chart::run(config_path, &start, &end, &countries, &out).await,
    }
}

/// Wires the store, fetchers, renderer, and validator from config.
pub fn build_state(config: &AppConfig) -> Result<AppState> {
    let store = match &config.data_dir {
        Some(dir) => RateStore::open(dir)?,
        None => RateStore::in_memory(),
    };
    let codes = IbanCodesProvider::new(&config.sources.codes.base_url)?;
    let rates = FinmarketRatesProvider::new(&config.sources.rates.base_url)?;
    let validator = DateValidator::new(config.timezone()?);

    Ok(AppState::new(
        Arc::new(store),
        Arc::new(codes),
        Arc::new(rates),
        Arc::new(SvgRenderer::new()),
        validator,
    ))
}

pub async fn serve(config_path: Option<&str>) -> Result<()> {
    let config = AppConfig::resolve(config_path)?;
    let state = build_state(&config)?;
    let app = server::app_router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind))?;
    info!("HTTP server listening on {}", config.server.bind);
    axum::serve(listener, app).await?;
    Ok(())
}
