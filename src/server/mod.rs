//! HTTP surface. Thin: every handler validates, delegates to `sync`,
//! and serializes what came back.

pub mod error;
pub mod handlers;

use crate::chart::ChartRenderer;
use crate::core::date::DateValidator;
use crate::fetch::{CodeTableProvider, RateArchiveProvider};
use crate::store::RateStore;
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RateStore>,
    pub codes: Arc<dyn CodeTableProvider>,
    pub rates: Arc<dyn RateArchiveProvider>,
    pub renderer: Arc<dyn ChartRenderer>,
    pub validator: DateValidator,
}

impl AppState {
    pub fn new(
        store: Arc<RateStore>,
        codes: Arc<dyn CodeTableProvider>,
        rates: Arc<dyn RateArchiveProvider>,
        renderer: Arc<dyn ChartRenderer>,
        validator: DateValidator,
    ) -> Self {
        Self {
            store,
            codes,
            rates,
            renderer,
            validator,
        }
    }
}

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/main", get(handlers::main_form))
        .route("/main/countries-and-rates", post(handlers::countries_and_rates))
        .route("/api/country-currency", get(handlers::country_currency))
        .route("/api/currency-rates", get(handlers::currency_rates))
        .with_state(state)
}
