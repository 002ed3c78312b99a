//! Country/currency-code table scraper.
//!
//! The source page carries one HTML table whose header names the
//! columns in Russian; rows are extracted positionally by header
//! lookup so column reordering upstream does not break the sync.

use crate::core::model::CountryCurrency;
use crate::fetch::CodeTableProvider;
use crate::fetch::util::{RETRY_ATTEMPTS, RETRY_DELAY, with_retry};
use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument};

const COUNTRY_COLUMN: &str = "Страна";
const CURRENCY_COLUMN: &str = "Валюта";
const CODE_COLUMN: &str = "Код";
const NUMBER_COLUMN: &str = "Номер";

pub struct IbanCodesProvider {
    base_url: String,
    client: reqwest::Client,
}

impl IbanCodesProvider {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: super::util::client()?,
        })
    }
}

#[async_trait]
impl CodeTableProvider for IbanCodesProvider {
    #[instrument(name = "CodeTableFetch", skip(self))]
    async fn fetch_codes(&self) -> Result<Vec<CountryCurrency>> {
        let url = format!("{}/currency-codes", self.base_url);
        debug!("requesting currency code table from {url}");

        let response = with_retry(
            || async { self.client.get(&url).send().await },
            RETRY_ATTEMPTS,
            RETRY_DELAY,
        )
        .await
        .with_context(|| format!("code table request failed: {url}"))?;

        if !response.status().is_success() {
            bail!("HTTP error {} from {url}", response.status());
        }
        let body = response
            .text()
            .await
            .with_context(|| format!("reading code page body from {url}"))?;

        parse_code_table(&body)
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("invalid selector `{css}`: {e}"))
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().collect::<String>().trim().to_string()
}

pub(crate) fn parse_code_table(html: &str) -> Result<Vec<CountryCurrency>> {
    let doc = Html::parse_document(html);

    let table_sel = selector("table")?;
    let table = doc
        .select(&table_sel)
        .next()
        .context("no table found on the code page")?;

    let head_sel = selector("thead th")?;
    let head: Vec<String> = table.select(&head_sel).map(cell_text).collect();
    let column = |name: &str| {
        head.iter()
            .position(|h| h == name)
            .with_context(|| format!("column `{name}` missing from the code table header"))
    };
    let country_ix = column(COUNTRY_COLUMN)?;
    let currency_ix = column(CURRENCY_COLUMN)?;
    let code_ix = column(CODE_COLUMN)?;
    let number_ix = column(NUMBER_COLUMN)?;

    let row_sel = selector("tbody tr")?;
    let cell_sel = selector("td")?;
    let mut rows = Vec::new();
    for tr in table.select(&row_sel) {
        let cells: Vec<String> = tr.select(&cell_sel).map(cell_text).collect();
        let Some(code) = cells.get(code_ix) else {
            continue;
        };
        // Countries without their own ISO code carry an empty cell.
        if code.is_empty() {
            continue;
        }
        rows.push(CountryCurrency {
            country: cells.get(country_ix).cloned().unwrap_or_default(),
            currency: cells.get(currency_ix).cloned().unwrap_or_default(),
            code: code.clone(),
            number: cells.get(number_ix).cloned().unwrap_or_default(),
        });
    }
    rows.sort_by(|a, b| a.country.cmp(&b.country));

    debug!(rows = rows.len(), "parsed currency code table");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const CODE_PAGE: &str = r#"
        <html><body>
        <table>
          <thead>
            <tr><th>Страна</th><th>Валюта</th><th>Код</th><th>Номер</th></tr>
          </thead>
          <tbody>
            <tr><td>Япония</td><td>Иена</td><td>JPY</td><td>392</td></tr>
            <tr><td>Абхазия</td><td>Российский рубль</td><td></td><td></td></tr>
            <tr><td>Австралия</td><td>Австралийский доллар</td><td>AUD</td><td>036</td></tr>
          </tbody>
        </table>
        </body></html>
    "#;

    #[test]
    fn test_parse_drops_codeless_rows_and_sorts() {
        let rows = parse_code_table(CODE_PAGE).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].country, "Австралия");
        assert_eq!(rows[0].code, "AUD");
        assert_eq!(rows[1].country, "Япония");
        assert_eq!(rows[1].number, "392");
    }

    #[test]
    fn test_parse_survives_column_reordering() {
        let page = r#"
            <table>
              <thead><tr><th>Код</th><th>Страна</th><th>Номер</th><th>Валюта</th></tr></thead>
              <tbody><tr><td>USD</td><td>США</td><td>840</td><td>Доллар США</td></tr></tbody>
            </table>
        "#;
        let rows = parse_code_table(page).unwrap();
        assert_eq!(rows[0].country, "США");
        assert_eq!(rows[0].code, "USD");
        assert_eq!(rows[0].currency, "Доллар США");
    }

    #[test]
    fn test_missing_table_is_an_error() {
        let err = parse_code_table("<html><body>nothing here</body></html>").unwrap_err();
        assert!(err.to_string().contains("no table"));
    }

    #[test]
    fn test_header_drift_is_an_error() {
        let page = r#"
            <table>
              <thead><tr><th>Country</th><th>Currency</th></tr></thead>
              <tbody></tbody>
            </table>
        "#;
        let err = parse_code_table(page).unwrap_err();
        assert!(err.to_string().contains("missing from the code table header"));
    }

    #[tokio::test]
    async fn test_fetch_codes_against_mock_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/currency-codes"))
            .respond_with(ResponseTemplate::new(200).set_body_string(CODE_PAGE))
            .mount(&server)
            .await;

        let provider = IbanCodesProvider::new(&server.uri()).unwrap();
        let rows = provider.fetch_codes().await.unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_codes_propagates_http_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/currency-codes"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let provider = IbanCodesProvider::new(&server.uri()).unwrap();
        let err = provider.fetch_codes().await.unwrap_err();
        assert!(err.to_string().contains("HTTP error"));
    }
}
