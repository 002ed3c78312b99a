//! Date and interval validation.
//!
//! All checks are pure functions over integers; the only ambient input
//! is "today", evaluated in the configured time zone.

use chrono::{Datelike, NaiveDate, Utc};
use chrono_tz::Tz;
use thiserror::Error;

/// Longest permitted interval between the start and end dates.
pub const MAX_INTERVAL_DAYS: i64 = 730;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DateError {
    #[error("{field} must be between {min} and {max}, got {value}")]
    Range {
        field: &'static str,
        min: i32,
        max: i32,
        value: i32,
    },

    #[error("no such calendar date: {day:02}.{month:02}.{year:04}")]
    InvalidDate { day: u32, month: u32, year: i32 },

    #[error("date {0} is in the future")]
    FutureDate(NaiveDate),

    #[error("interval of {days} days is longer than {MAX_INTERVAL_DAYS} days")]
    IntervalTooLong { days: i64 },

    #[error("end date {end} precedes start date {start}")]
    InvertedInterval { start: NaiveDate, end: NaiveDate },
}

/// A validated, inclusive date interval with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DateValidator {
    tz: Tz,
}

impl DateValidator {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// Today's date in the configured zone.
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.tz).date_naive()
    }

    pub fn validate_day(&self, day: i32) -> Result<u32, DateError> {
        if !(1..=31).contains(&day) {
            return Err(DateError::Range {
                field: "day",
                min: 1,
                max: 31,
                value: day,
            });
        }
        Ok(day as u32)
    }

    pub fn validate_month(&self, month: i32) -> Result<u32, DateError> {
        if !(1..=12).contains(&month) {
            return Err(DateError::Range {
                field: "month",
                min: 1,
                max: 12,
                value: month,
            });
        }
        Ok(month as u32)
    }

    pub fn validate_year(&self, year: i32) -> Result<i32, DateError> {
        let current_year = self.today().year();
        if !(1..=current_year).contains(&year) {
            return Err(DateError::Range {
                field: "year",
                min: 1,
                max: current_year,
                value: year,
            });
        }
        Ok(year)
    }

    /// Checks the components, the calendar validity of the triple, and
    /// that the date is not in the future.
    pub fn validate_date(&self, day: i32, month: i32, year: i32) -> Result<NaiveDate, DateError> {
        let day = self.validate_day(day)?;
        let month = self.validate_month(month)?;
        let year = self.validate_year(year)?;

        let date = NaiveDate::from_ymd_opt(year, month, day)
            .ok_or(DateError::InvalidDate { day, month, year })?;
        if date > self.today() {
            return Err(DateError::FutureDate(date));
        }
        Ok(date)
    }

    pub fn validate_interval(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<DateRange, DateError> {
        let days = (end - start).num_days();
        if days < 0 {
            return Err(DateError::InvertedInterval { start, end });
        }
        if days > MAX_INTERVAL_DAYS {
            return Err(DateError::IntervalTooLong { days });
        }
        Ok(DateRange { start, end })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Days;

    fn validator() -> DateValidator {
        DateValidator::new(chrono_tz::Europe::Moscow)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_day_bounds() {
        let v = validator();
        assert_eq!(v.validate_day(1), Ok(1));
        assert_eq!(v.validate_day(31), Ok(31));
        assert!(matches!(
            v.validate_day(0),
            Err(DateError::Range { field: "day", .. })
        ));
        assert!(matches!(v.validate_day(32), Err(DateError::Range { .. })));
    }

    #[test]
    fn test_month_bounds() {
        let v = validator();
        assert_eq!(v.validate_month(12), Ok(12));
        assert!(matches!(
            v.validate_month(13),
            Err(DateError::Range { field: "month", .. })
        ));
        assert!(matches!(v.validate_month(-1), Err(DateError::Range { .. })));
    }

    #[test]
    fn test_year_bounds() {
        let v = validator();
        assert_eq!(v.validate_year(1), Ok(1));
        assert_eq!(v.validate_year(2024), Ok(2024));
        let next_year = v.today().year() + 1;
        assert!(matches!(
            v.validate_year(next_year),
            Err(DateError::Range { field: "year", .. })
        ));
        assert!(matches!(v.validate_year(0), Err(DateError::Range { .. })));
    }

    #[test]
    fn test_real_past_dates_are_accepted() {
        let v = validator();
        assert_eq!(v.validate_date(29, 2, 2024), Ok(date(2024, 2, 29)));
        assert_eq!(v.validate_date(1, 1, 2000), Ok(date(2000, 1, 1)));
        assert_eq!(v.validate_date(31, 12, 2023), Ok(date(2023, 12, 31)));
    }

    #[test]
    fn test_impossible_triples_are_rejected() {
        let v = validator();
        assert_eq!(
            v.validate_date(31, 2, 2023),
            Err(DateError::InvalidDate {
                day: 31,
                month: 2,
                year: 2023
            })
        );
        assert_eq!(
            v.validate_date(29, 2, 2023),
            Err(DateError::InvalidDate {
                day: 29,
                month: 2,
                year: 2023
            })
        );
        assert!(matches!(
            v.validate_date(31, 4, 2023),
            Err(DateError::InvalidDate { .. })
        ));
    }

    #[test]
    fn test_future_dates_are_rejected() {
        let v = validator();
        let tomorrow = v.today().checked_add_days(Days::new(1)).unwrap();
        // Only meaningful while tomorrow stays within the current year;
        // on Dec 31 the year check fires first, which is fine too.
        let result = v.validate_date(
            tomorrow.day() as i32,
            tomorrow.month() as i32,
            tomorrow.year(),
        );
        assert!(matches!(
            result,
            Err(DateError::FutureDate(_)) | Err(DateError::Range { field: "year", .. })
        ));
    }

    #[test]
    fn test_interval_within_bound() {
        let v = validator();
        let start = date(2023, 1, 1);
        let range = v.validate_interval(start, date(2024, 12, 31)).unwrap();
        assert_eq!(range.days(), 730);
        assert!(range.contains(date(2023, 6, 15)));
        assert!(!range.contains(date(2025, 1, 1)));
    }

    #[test]
    fn test_interval_too_long() {
        let v = validator();
        assert!(matches!(
            v.validate_interval(date(2023, 1, 1), date(2025, 1, 2)),
            Err(DateError::IntervalTooLong { .. })
        ));
    }

    #[test]
    fn test_inverted_interval() {
        let v = validator();
        assert_eq!(
            v.validate_interval(date(2024, 6, 1), date(2024, 1, 1)),
            Err(DateError::InvertedInterval {
                start: date(2024, 6, 1),
                end: date(2024, 1, 1),
            })
        );
    }

    #[test]
    fn test_zero_length_interval_is_valid() {
        let v = validator();
        let d = date(2024, 3, 5);
        assert_eq!(v.validate_interval(d, d), Ok(DateRange { start: d, end: d }));
    }
}
