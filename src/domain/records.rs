//! Persisted investor and instrument records.

use crate::domain::{Email, InstrumentId, InvestorId, Symbol};
use chrono::{DateTime, Utc};

/// A registered investor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Investor {
    pub id: InvestorId,
    pub name: String,
    pub email: Email,
    pub created_at: DateTime<Utc>,
}

/// A registered instrument (fund).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instrument {
    pub id: InstrumentId,
    pub symbol: Symbol,
    pub name: String,
    pub created_at: DateTime<Utc>,
}
