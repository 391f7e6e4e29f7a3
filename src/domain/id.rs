//! Work item identifiers
//!
//! Work items are numbered by the remote tracker. IDs are positive integers
//! and are displayed as `#{n}` in human-facing output, but serialized as plain
//! numbers so stored records stay byte-compatible with the remote API.
//!
//! Parsing accepts both forms: `42` and `#42`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum IdError {
    #[error("Invalid work item ID: expected a positive integer, got '{0}'")]
    Invalid(String),

    #[error("Work item ID must be greater than zero")]
    Zero,
}

/// Identifier of a single work item
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkItemId(u32);

impl WorkItemId {
    /// Creates an ID from its numeric value
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the numeric value
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for WorkItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for WorkItemId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let digits = s.strip_prefix('#').unwrap_or(s);

        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(IdError::Invalid(s.to_string()));
        }

        let value: u32 = digits
            .parse()
            .map_err(|_| IdError::Invalid(s.to_string()))?;

        if value == 0 {
            return Err(IdError::Zero);
        }

        Ok(Self(value))
    }
}

impl From<u32> for WorkItemId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_number() {
        let id: WorkItemId = "42".parse().unwrap();
        assert_eq!(id.value(), 42);
    }

    #[test]
    fn parses_hash_prefixed_number() {
        let id: WorkItemId = " #7 ".parse().unwrap();
        assert_eq!(id, WorkItemId::new(7));
    }

    #[test]
    fn rejects_invalid_format() {
        assert!("".parse::<WorkItemId>().is_err());
        assert!("#".parse::<WorkItemId>().is_err());
        assert!("abc".parse::<WorkItemId>().is_err());
        assert!("-3".parse::<WorkItemId>().is_err());
        assert!("1.5".parse::<WorkItemId>().is_err());
        assert!("99999999999".parse::<WorkItemId>().is_err());
    }

    #[test]
    fn rejects_zero() {
        assert_eq!("0".parse::<WorkItemId>(), Err(IdError::Zero));
    }

    #[test]
    fn ordering_is_numeric() {
        let mut ids = vec![WorkItemId::new(10), WorkItemId::new(2), WorkItemId::new(33)];
        ids.sort();
        assert_eq!(ids, vec![WorkItemId::new(2), WorkItemId::new(10), WorkItemId::new(33)]);
    }

    #[test]
    fn serializes_as_plain_number() {
        let json = serde_json::to_string(&WorkItemId::new(12)).unwrap();
        assert_eq!(json, "12");

        let parsed: WorkItemId = serde_json::from_str("12").unwrap();
        assert_eq!(parsed, WorkItemId::new(12));
    }
}
