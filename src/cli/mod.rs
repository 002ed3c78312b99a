//! CLI command implementations.

pub mod chart;
pub mod codes;
pub mod rates;
pub mod setup;
pub mod ui;

use crate::config::AppConfig;
use crate::core::date::{DateRange, DateValidator};
use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};

/// Parses a `DD.MM.YYYY` pair and runs it through the full validator,
/// so the CLI rejects exactly what the HTTP surface rejects.
pub(crate) fn parse_range(
    validator: &DateValidator,
    start: &str,
    end: &str,
) -> Result<DateRange> {
    let start = parse_dmy(validator, start)?;
    let end = parse_dmy(validator, end)?;
    Ok(validator.validate_interval(start, end)?)
}

fn parse_dmy(validator: &DateValidator, raw: &str) -> Result<NaiveDate> {
    let date = NaiveDate::parse_from_str(raw, "%d.%m.%Y")
        .with_context(|| format!("expected DD.MM.YYYY, got `{raw}`"))?;
    Ok(validator.validate_date(date.day() as i32, date.month() as i32, date.year())?)
}

pub(crate) fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    AppConfig::resolve(config_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> DateValidator {
        DateValidator::new(chrono_tz::Europe::Moscow)
    }

    #[test]
    fn test_parse_range_accepts_past_interval() {
        let range = parse_range(&validator(), "03.06.2024", "05.06.2024").unwrap();
        assert_eq!(range.days(), 2);
    }

    #[test]
    fn test_parse_range_rejects_garbage() {
        let err = parse_range(&validator(), "2024-06-03", "05.06.2024").unwrap_err();
        assert!(err.to_string().contains("expected DD.MM.YYYY"));
    }

    #[test]
    fn test_parse_range_rejects_inverted_interval() {
        assert!(parse_range(&validator(), "01.06.2024", "01.01.2024").is_err());
    }
}
