use super::AppState;
use super::error::ApiError;
use crate::core::date::{DateError, DateRange, DateValidator};
use crate::core::model::{CountryCurrency, RateSnapshot};
use crate::sync;
use axum::{
    Json,
    extract::{Query, State},
    response::{Html, Redirect},
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use tracing::warn;

pub async fn root() -> Redirect {
    Redirect::to("/main")
}

/// The six date components every rate request carries.
#[derive(Debug, Deserialize)]
pub struct RangeParams {
    pub bd: i32,
    pub bm: i32,
    pub by: i32,
    pub ed: i32,
    pub em: i32,
    pub ey: i32,
}

impl RangeParams {
    fn validate(&self, validator: &DateValidator) -> Result<DateRange, DateError> {
        let start = validator.validate_date(self.bd, self.bm, self.by)?;
        let end = validator.validate_date(self.ed, self.em, self.ey)?;
        validator.validate_interval(start, end)
    }
}

pub async fn main_form(State(state): State<AppState>) -> Html<String> {
    let mut countries: Vec<String> = state
        .store
        .codes()
        .scan()
        .into_iter()
        .map(|(country, _)| country)
        .collect();
    if countries.is_empty() {
        match sync::sync_country_codes(state.codes.as_ref(), &state.store).await {
            Ok(outcome) => countries = outcome.rows.into_iter().map(|r| r.country).collect(),
            Err(e) => warn!(error = %e, "code table sync failed, rendering empty country list"),
        }
    }
    Html(render_main_form(&countries))
}

pub async fn country_currency(State(state): State<AppState>) -> Json<Vec<CountryCurrency>> {
    match sync::sync_country_codes(state.codes.as_ref(), &state.store).await {
        Ok(outcome) => Json(outcome.rows),
        Err(e) => {
            warn!(error = %e, "code table sync failed, serving stored rows");
            Json(
                state
                    .store
                    .codes()
                    .scan()
                    .into_iter()
                    .map(|(_, row)| row)
                    .collect(),
            )
        }
    }
}

pub async fn currency_rates(
    State(state): State<AppState>,
    Query(params): Query<RangeParams>,
) -> Result<Json<Vec<RateSnapshot>>, ApiError> {
    let range = params.validate(&state.validator)?;

    match sync::sync_rates(state.rates.as_ref(), &state.store, range).await {
        Ok(outcome) => Ok(Json(outcome.snapshots)),
        Err(e) => {
            warn!(error = %e, "rate sync failed, serving stored snapshots");
            Ok(Json(
                state
                    .store
                    .snapshots()
                    .scan()
                    .into_iter()
                    .filter(|(date, _)| range.contains(*date))
                    .map(|(_, snapshot)| snapshot)
                    .collect(),
            ))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChartRequest {
    #[serde(flatten)]
    pub range: RangeParams,
    #[serde(default)]
    pub countries: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ChartResponse {
    pub image_base64: String,
    pub mime: &'static str,
    /// Selected countries with no known tracked currency code.
    pub missing_countries: Vec<String>,
}

pub async fn countries_and_rates(
    State(state): State<AppState>,
    Json(request): Json<ChartRequest>,
) -> Result<Json<ChartResponse>, ApiError> {
    let range = request.range.validate(&state.validator)?;

    if let Err(e) = sync::sync_rates(state.rates.as_ref(), &state.store, range).await {
        warn!(error = %e, "rate sync failed, charting stored data only");
    }
    if state.store.codes().is_empty() {
        if let Err(e) = sync::sync_country_codes(state.codes.as_ref(), &state.store).await {
            warn!(error = %e, "code table sync failed, all countries will be unresolved");
        }
    }

    let (series, missing_countries) = sync::change_series(&state.store, &request.countries, range);
    let chart = state
        .renderer
        .render("Relative rate changes against the ruble, %", &series)?;

    Ok(Json(ChartResponse {
        image_base64: BASE64.encode(&chart.bytes),
        mime: chart.mime,
        missing_countries,
    }))
}

fn render_main_form(countries: &[String]) -> String {
    let mut options = String::new();
    for country in countries {
        let escaped = country
            .replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;");
        options.push_str(&format!("<option value=\"{escaped}\">{escaped}</option>\n"));
    }

    format!(
        r#"<!doctype html>
<html>
<head><meta charset="utf-8"><title>kursview</title></head>
<body>
<h1>Relative rate changes</h1>
<form id="chart-form">
  <label>Start: <input name="bd" type="number" placeholder="DD" size="2">
    <input name="bm" type="number" placeholder="MM" size="2">
    <input name="by" type="number" placeholder="YYYY" size="4"></label>
  <label>End: <input name="ed" type="number" placeholder="DD" size="2">
    <input name="em" type="number" placeholder="MM" size="2">
    <input name="ey" type="number" placeholder="YYYY" size="4"></label>
  <label>Countries:
    <select name="countries" multiple size="12">
{options}    </select>
  </label>
  <button type="submit">Build chart</button>
</form>
<div id="missing"></div>
<div id="chart"></div>
<script>
document.getElementById("chart-form").addEventListener("submit", async (event) => {{
  event.preventDefault();
  const form = event.target;
  const body = {{
    bd: Number(form.bd.value), bm: Number(form.bm.value), by: Number(form.by.value),
    ed: Number(form.ed.value), em: Number(form.em.value), ey: Number(form.ey.value),
    countries: Array.from(form.countries.selectedOptions).map((o) => o.value),
  }};
  const response = await fetch("/main/countries-and-rates", {{
    method: "POST",
    headers: {{"content-type": "application/json"}},
    body: JSON.stringify(body),
  }});
  const payload = await response.json();
  if (!response.ok) {{
    document.getElementById("missing").textContent = payload.error;
    return;
  }}
  document.getElementById("missing").textContent =
    payload.missing_countries.length ? "No known currency code: " + payload.missing_countries.join(", ") : "";
  document.getElementById("chart").innerHTML =
    '<img src="data:' + payload.mime + ';base64,' + payload.image_base64 + '" alt="chart">';
}});
</script>
</body>
</html>
"#
    )
}
