use super::ui;
use crate::sync;
use anyhow::Result;
use comfy_table::Cell;
use console::style;

/// Syncs the country/currency code table and prints it.
pub async fn run(config_path: Option<&str>) -> Result<()> {
    let config = super::load_config(config_path)?;
    let state = crate::build_state(&config)?;

    let spinner = ui::new_spinner("syncing country codes...");
    let outcome = sync::sync_country_codes(state.codes.as_ref(), &state.store).await;
    spinner.finish_and_clear();
    let outcome = outcome?;

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Country"),
        ui::header_cell("Currency"),
        ui::header_cell("Code"),
        ui::header_cell("Number"),
    ]);
    for row in &outcome.rows {
        let code_cell = if row.tracked().is_some() {
            Cell::new(&row.code).fg(comfy_table::Color::Green)
        } else {
            Cell::new(&row.code)
        };
        table.add_row(vec![
            Cell::new(&row.country),
            Cell::new(&row.currency),
            code_cell,
            Cell::new(&row.number),
        ]);
    }
    println!("{table}");

    println!(
        "{} rows: {} inserted, {} updated, {} unchanged",
        style(outcome.rows.len()).bold(),
        outcome.inserted,
        outcome.updated,
        outcome.unchanged,
    );
    Ok(())
}
