//! API-compatible types.
//!
//! The types in this module are serialised in an API-friendly way, e.g.:
//!
//! - Field names are camelCase.
//! - Related records are embedded rather than referenced by ID.
//! - Datetimes are serialised as RFC 3339 strings.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub mod auth;
pub mod group;
pub mod maintenance;
pub mod pair;
pub mod poll;
pub mod vote;
pub mod voter;

/// Response body for a successful delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deleted {
    pub success: bool,
}

impl Deleted {
    pub fn new() -> Self {
        Self { success: true }
    }
}

impl Default for Deleted {
    fn default() -> Self {
        Self::new()
    }
}

/// A plain confirmation message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Trim a required text field, rejecting it with `message` if it is missing or blank.
pub fn required_text(field: Option<&str>, message: &str) -> Result<String> {
    field
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
        .ok_or_else(|| Error::bad_request(message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_text_trims() {
        assert_eq!(required_text(Some("  Snacks "), "x").unwrap(), "Snacks");
        assert_eq!(
            required_text(Some(" \t"), "Title is required")
                .unwrap_err()
                .to_string(),
            "Title is required"
        );
        assert!(required_text(None, "x").is_err());
    }
}
