//! Core type definitions with validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// The value contained whitespace.
    #[error("{field} cannot contain whitespace: {value:?}")]
    Whitespace { field: &'static str, value: String },
}

/// A validated ticket identifier, e.g. `CAM-123`.
///
/// Keys must be non-empty and free of whitespace. They are otherwise opaque:
/// the ticket system decides what a real key looks like.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TicketKey(String);

impl TicketKey {
    /// Creates a new key after validation.
    pub fn new(key: impl Into<String>) -> Result<Self, ValidationError> {
        let key = key.into();
        if key.is_empty() {
            return Err(ValidationError::Empty { field: "ticket key" });
        }
        if key.chars().any(char::is_whitespace) {
            return Err(ValidationError::Whitespace {
                field: "ticket key",
                value: key,
            });
        }
        Ok(Self(key))
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TicketKey {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TicketKey> for String {
    fn from(key: TicketKey) -> Self {
        key.0
    }
}

impl fmt::Display for TicketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for TicketKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A ticket returned by a search, as offered to the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketChoice {
    /// Display text, typically `"KEY summary"`.
    pub title: String,
    /// The ticket the choice resolves to.
    pub key: TicketKey,
}
