//! Domain primitives: InvestorId, InstrumentId, Symbol, Email.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Database identity of an investor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InvestorId(pub i64);

impl InvestorId {
    pub fn new(id: i64) -> Self {
        InvestorId(id)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for InvestorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Database identity of an instrument (fund).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InstrumentId(pub i64);

impl InstrumentId {
    pub fn new(id: i64) -> Self {
        InstrumentId(id)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for InstrumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Instrument ticker symbol (e.g. "JURO11").
///
/// Normalized to upper case on construction so lookups are
/// case-insensitive at the edges.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(symbol: &str) -> Self {
        Symbol(symbol.trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EmailParseError {
    #[error("email must contain '@'")]
    MissingAtSign,
    #[error("email must not be empty")]
    Empty,
}

/// Investor contact email, lower-cased on construction.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Email(String);

impl Email {
    /// Parse and normalize an email address.
    ///
    /// # Errors
    /// Returns an error when the input is empty or lacks an '@'.
    pub fn parse(email: &str) -> Result<Self, EmailParseError> {
        let trimmed = email.trim();
        if trimmed.is_empty() {
            return Err(EmailParseError::Empty);
        }
        if !trimmed.contains('@') {
            return Err(EmailParseError::MissingAtSign);
        }
        Ok(Email(trimmed.to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
