//! Rate archive scraper.
//!
//! The archive addresses currencies by an internal numeric id, not by
//! ISO code. The landing page carries a `<select>` mapping currency
//! titles to those ids; it is resolved once per provider and cached.

use crate::core::currency::Currency;
use crate::core::date::DateRange;
use crate::fetch::{RateArchiveProvider, RateRow};
use crate::fetch::util::{RETRY_ATTEMPTS, RETRY_DELAY, with_retry};
use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

const DATE_COLUMN: &str = "Дата";
const RATE_COLUMN: &str = "Курс";

/// Titles as printed in the archive's currency selector, lowercased.
const ARCHIVE_TITLES: [(Currency, &str); 7] = [
    (Currency::Usd, "доллар сша"),
    (Currency::Eur, "евро"),
    (Currency::Gbp, "фунт стерлингов"),
    (Currency::Inr, "индийская рупия"),
    (Currency::Cny, "китайский юань жэньминьби"),
    (Currency::Try, "турецкая лира"),
    (Currency::Jpy, "японская йена"),
];

pub struct FinmarketRatesProvider {
    base_url: String,
    client: reqwest::Client,
    archive_ids: Mutex<Option<HashMap<Currency, String>>>,
}

impl FinmarketRatesProvider {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: super::util::client()?,
            archive_ids: Mutex::new(None),
        })
    }

    async fn get_page(&self, url: &str) -> Result<String> {
        let response = with_retry(
            || async { self.client.get(url).send().await },
            RETRY_ATTEMPTS,
            RETRY_DELAY,
        )
        .await
        .with_context(|| format!("archive request failed: {url}"))?;

        if !response.status().is_success() {
            bail!("HTTP error {} from {url}", response.status());
        }
        response
            .text()
            .await
            .with_context(|| format!("reading archive page body from {url}"))
    }

    async fn archive_id(&self, currency: Currency) -> Result<String> {
        let mut ids = self.archive_ids.lock().await;
        if ids.is_none() {
            let url = format!("{}/currency/rates/?id=10148&pv=1", self.base_url);
            debug!("resolving archive currency ids from {url}");
            let body = self.get_page(&url).await?;
            *ids = Some(parse_currency_options(&body)?);
        }
        ids.as_ref()
            .and_then(|map| map.get(&currency).cloned())
            .ok_or_else(|| anyhow!("currency {currency} not listed in the archive selector"))
    }
}

#[async_trait]
impl RateArchiveProvider for FinmarketRatesProvider {
    #[instrument(name = "RateArchiveFetch", skip(self, range), fields(currency = %currency))]
    async fn fetch_currency(&self, currency: Currency, range: DateRange) -> Result<Vec<RateRow>> {
        let cur = self.archive_id(currency).await?;
        let url = format!(
            "{}/currency/rates/?id=10148&pv=1&cur={}&bd={}&bm={}&by={}&ed={}&em={}&ey={}",
            self.base_url,
            cur,
            range.start.day(),
            range.start.month(),
            range.start.year(),
            range.end.day(),
            range.end.month(),
            range.end.year(),
        );
        debug!("requesting rate archive from {url}");

        let body = self.get_page(&url).await?;
        parse_archive_table(&body)
            .with_context(|| format!("parsing archive table for {currency}"))
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("invalid selector `{css}`: {e}"))
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().collect::<String>().trim().to_string()
}

pub(crate) fn parse_currency_options(html: &str) -> Result<HashMap<Currency, String>> {
    let doc = Html::parse_document(html);
    let option_sel = selector(r#"select[name="cur"] option"#)?;

    let mut ids = HashMap::new();
    for option in doc.select(&option_sel) {
        let Some(value) = option.value().attr("value") else {
            continue;
        };
        let title = cell_text(option).to_lowercase();
        for (currency, archive_title) in ARCHIVE_TITLES {
            if title == archive_title {
                ids.insert(currency, value.to_string());
            }
        }
    }
    if ids.is_empty() {
        bail!("archive currency selector is missing or lists no tracked currency");
    }
    Ok(ids)
}

pub(crate) fn parse_archive_table(html: &str) -> Result<Vec<RateRow>> {
    let doc = Html::parse_document(html);

    let table_sel = selector("table.karramba")?;
    let table = doc
        .select(&table_sel)
        .next()
        .context("no archive table found on the page")?;

    let head_sel = selector("thead th")?;
    let head: Vec<String> = table.select(&head_sel).map(cell_text).collect();
    let column = |name: &str| {
        head.iter()
            .position(|h| h == name)
            .with_context(|| format!("column `{name}` missing from the archive table header"))
    };
    let date_ix = column(DATE_COLUMN)?;
    let rate_ix = column(RATE_COLUMN)?;

    let row_sel = selector("tbody tr")?;
    let cell_sel = selector("td")?;
    let mut rows = Vec::new();
    for tr in table.select(&row_sel) {
        let cells: Vec<String> = tr.select(&cell_sel).map(cell_text).collect();
        let (Some(date_raw), Some(rate)) = (cells.get(date_ix), cells.get(rate_ix)) else {
            continue;
        };
        let date = NaiveDate::parse_from_str(date_raw, "%d.%m.%Y")
            .with_context(|| format!("bad date in archive table: `{date_raw}`"))?;
        rows.push(RateRow {
            date,
            rate: rate.clone(),
        });
    }
    // The archive lists newest first; callers expect oldest first.
    rows.sort_by_key(|row| row.date);
    Ok(rows)
}
