use super::ui;
use crate::sync;
use anyhow::{Context, Result};
use console::style;
use std::path::Path;

/// Renders a relative-change chart for the selected countries.
pub async fn run(
    config_path: Option<&str>,
    start: &str,
    end: &str,
    countries: &[String],
    out: &Path,
) -> Result<()> {
    let config = super::load_config(config_path)?;
    let state = crate::build_state(&config)?;
    let range = super::parse_range(&state.validator, start, end)?;

    let spinner = ui::new_spinner("syncing rate archive...");
    let rates_outcome = sync::sync_rates(state.rates.as_ref(), &state.store, range).await;
    if let Err(e) = &rates_outcome {
        tracing::warn!(error = %e, "rate sync failed, charting stored data only");
    }
    if state.store.codes().is_empty() {
        spinner.set_message("syncing country codes...");
        sync::sync_country_codes(state.codes.as_ref(), &state.store)
            .await
            .context("country code sync failed and no codes are stored")?;
    }
    spinner.finish_and_clear();

    let (series, missing) = sync::change_series(&state.store, countries, range);
    if !missing.is_empty() {
        println!(
            "{}",
            style(format!("no known currency code: {}", missing.join(", "))).yellow()
        );
    }

    let chart = state
        .renderer
        .render("Relative rate changes against the ruble, %", &series)?;
    std::fs::write(out, &chart.bytes)
        .with_context(|| format!("failed to write chart to {}", out.display()))?;
    println!("chart written to {}", style(out.display()).bold());
    Ok(())
}
