//! Domain types for the fund administration fee service.
//!
//! This module provides:
//! - Lossless monetary arithmetic via the Decimal wrapper
//! - Identity primitives: InvestorId, InstrumentId, Symbol, Email
//! - Sample (time-series mode input) and MovementEvent (portfolio mode input)
//! - Persisted Investor and Instrument records

pub mod decimal;
pub mod movement;
pub mod primitives;
pub mod records;
pub mod sample;

pub use decimal::Decimal;
pub use movement::MovementEvent;
pub use primitives::{Email, EmailParseError, InstrumentId, InvestorId, Symbol};
pub use records::{Instrument, Investor};
pub use sample::Sample;
