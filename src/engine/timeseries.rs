//! Stateless time-series fee calculation.
//!
//! Each sample is treated as one trading day: the daily contribution of
//! investor `i` is `quantity[i] * unit_value * annual_rate`, and the
//! accrued total is annualized by dividing by 252. The same formula
//! therefore covers a single-day spot calculation and a multi-day
//! accrual without special cases.

use crate::domain::{Decimal, Sample};
use crate::engine::{FeeError, FEE_SCALE, TRADING_DAYS_PER_YEAR};

/// Compute one administration fee per investor from a sample sequence.
///
/// Output order matches the quantity-vector order of the input; entry
/// `i` is investor `i`'s fee, rounded to four decimal places.
///
/// # Errors
/// - [`FeeError::NegativeRate`] when `annual_rate` < 0.
/// - [`FeeError::EmptySamples`] when `samples` is empty.
/// - [`FeeError::InconsistentInvestorCount`] when any sample's quantity
///   vector length differs from the first sample's.
pub fn compute_fees(annual_rate: Decimal, samples: &[Sample]) -> Result<Vec<Decimal>, FeeError> {
    if annual_rate.is_negative() {
        return Err(FeeError::NegativeRate(annual_rate));
    }
    let first = samples.first().ok_or(FeeError::EmptySamples)?;

    let investor_count = first.investor_count();
    for (index, sample) in samples.iter().enumerate() {
        if sample.investor_count() != investor_count {
            return Err(FeeError::InconsistentInvestorCount {
                index,
                expected: investor_count,
                actual: sample.investor_count(),
            });
        }
    }

    let mut accrued = vec![Decimal::zero(); investor_count];
    for sample in samples {
        for (i, quantity) in sample.quantities.iter().enumerate() {
            let daily = *quantity * sample.unit_value * annual_rate;
            accrued[i] = accrued[i] + daily;
        }
    }

    let trading_days = Decimal::from(TRADING_DAYS_PER_YEAR);
    Ok(accrued
        .into_iter()
        .map(|total| (total / trading_days).round_dp(FEE_SCALE))
        .collect())
}
