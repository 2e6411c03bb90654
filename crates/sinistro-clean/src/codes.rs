//! Bounded domain codes.
//!
//! Each parser is total: it returns the typed code for a valid value and
//! `None` for everything else, so filtering never depends on implicit
//! string/number coercion.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sex of the insured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
    /// `M`
    Male,
    /// `F`
    Female,
}

impl Sex {
    /// Parse the raw value. Matching is exact: no trimming, no case folding.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "M" => Some(Self::Male),
            "F" => Some(Self::Female),
            _ => None,
        }
    }

    /// Code as written in the extracts.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "M",
            Self::Female => "F",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Claim cause, 1 to 8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CauseCode(u8);

impl CauseCode {
    /// Highest valid cause.
    pub const MAX: u8 = 8;

    /// Parse the raw value (surrounding whitespace ignored).
    pub fn parse(raw: &str) -> Option<Self> {
        parse_bounded(raw, Self::MAX).map(Self)
    }

    /// Numeric value.
    pub const fn value(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for CauseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Claim event, 1 to 9.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventCode(u8);

impl EventCode {
    /// Highest valid event.
    pub const MAX: u8 = 9;

    /// Parse the raw value (surrounding whitespace ignored).
    pub fn parse(raw: &str) -> Option<Self> {
        parse_bounded(raw, Self::MAX).map(Self)
    }

    /// Numeric value.
    pub const fn value(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for EventCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Decimal code in `1..=max`, written without sign or leading zeros.
fn parse_bounded(raw: &str, max: u8) -> Option<u8> {
    let value = raw.trim();
    if value.is_empty() || value.starts_with('0') || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse::<u8>().ok().filter(|code| (1..=max).contains(code))
}
