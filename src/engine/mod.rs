//! Pure computation engine for administration fees.
//!
//! Both entry points are synchronous, side-effect-free functions over
//! their inputs: identical inputs always produce identical outputs, and
//! concurrent invocations never interfere. All validation happens before
//! any accumulation begins; a failed precondition never leaves a partial
//! result behind.

use crate::domain::{Decimal, InvestorId};
use thiserror::Error;

pub mod portfolio;
pub mod timeseries;

pub use portfolio::{
    compute_for_all_investors, compute_for_investor, summarize_holdings, HoldingsSummary,
    InstrumentBreakdown, InvestorFeeResult,
};
pub use timeseries::compute_fees;

/// Annualization convention: accrued totals are divided by this many
/// trading days to derive the period fee.
pub const TRADING_DAYS_PER_YEAR: i64 = 252;

/// Decimal places kept on derived fees.
pub const FEE_SCALE: u32 = 4;

/// Decimal places kept on basis-value subtotals.
pub const VALUE_SCALE: u32 = 2;

/// Precondition violations reported by the fee engine.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FeeError {
    #[error("at least one sample is required")]
    EmptySamples,
    #[error("sample {index}: {actual} investors, expected {expected}")]
    InconsistentInvestorCount {
        index: usize,
        expected: usize,
        actual: usize,
    },
    #[error("annual rate must be non-negative, got {0}")]
    NegativeRate(Decimal),
    #[error("no movements recorded for investor {0}")]
    NoMovements(InvestorId),
}
