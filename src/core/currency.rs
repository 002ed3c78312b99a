//! The tracked currency set.
//!
//! The rate archive only publishes a handful of currencies against the
//! ruble; everything else in the code table maps to "untracked".

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Variants are declared in ISO-code order so that the derived `Ord`
/// matches the byte order of encoded store keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Cny,
    Eur,
    Gbp,
    Inr,
    Jpy,
    Try,
    Usd,
}

impl Currency {
    pub const ALL: [Currency; 7] = [
        Currency::Usd,
        Currency::Eur,
        Currency::Gbp,
        Currency::Inr,
        Currency::Cny,
        Currency::Try,
        Currency::Jpy,
    ];

    /// ISO 4217 alphabetic code.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Cny => "CNY",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Inr => "INR",
            Currency::Jpy => "JPY",
            Currency::Try => "TRY",
            Currency::Usd => "USD",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Currency::Cny => "Chinese yuan renminbi",
            Currency::Eur => "Euro",
            Currency::Gbp => "Pound sterling",
            Currency::Inr => "Indian rupee",
            Currency::Jpy => "Japanese yen",
            Currency::Try => "Turkish lira",
            Currency::Usd => "US dollar",
        }
    }

    /// Maps an ISO code from the country table to a tracked currency.
    pub fn from_code(code: &str) -> Option<Currency> {
        match code.trim().to_uppercase().as_str() {
            "CNY" => Some(Currency::Cny),
            "EUR" => Some(Currency::Eur),
            "GBP" => Some(Currency::Gbp),
            "INR" => Some(Currency::Inr),
            "JPY" => Some(Currency::Jpy),
            "TRY" => Some(Currency::Try),
            "USD" => Some(Currency::Usd),
            _ => None,
        }
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Currency {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Currency::from_code(s).ok_or_else(|| anyhow::anyhow!("untracked currency code: {s}"))
    }
}
