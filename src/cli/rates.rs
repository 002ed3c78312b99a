use super::ui;
use crate::sync;
use anyhow::Result;
use console::style;

/// Syncs rate snapshots for a date range and recomputes changes.
pub async fn run(config_path: Option<&str>, start: &str, end: &str) -> Result<()> {
    let config = super::load_config(config_path)?;
    let state = crate::build_state(&config)?;
    let range = super::parse_range(&state.validator, start, end)?;

    let spinner = ui::new_spinner("syncing rate archive...");
    let outcome = sync::sync_rates(state.rates.as_ref(), &state.store, range).await;
    spinner.finish_and_clear();
    let outcome = outcome?;

    println!(
        "{} snapshots for {} - {}",
        style(outcome.snapshots.len()).bold(),
        range.start,
        range.end,
    );
    println!(
        "changes: {} inserted, {} updated, {} unchanged, {} skipped",
        outcome.changes.inserted,
        outcome.changes.updated,
        outcome.changes.unchanged,
        outcome.changes.skipped,
    );

    if !outcome.skipped.is_empty() {
        let codes: Vec<&str> = outcome.skipped.iter().map(|c| c.code()).collect();
        println!(
            "{}",
            style(format!("failed to fetch: {}", codes.join(", "))).red()
        );
    }
    Ok(())
}
