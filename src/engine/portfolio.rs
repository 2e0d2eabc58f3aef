//! Portfolio fee aggregation over recorded movement events.
//!
//! Movements are grouped per instrument within an investor; the fee
//! basis is the sum of recorded values over every matched movement, and
//! the derived fee is `basis * annual_rate / 252`.

use crate::domain::{Decimal, InvestorId, MovementEvent, Symbol};
use crate::engine::{FeeError, FEE_SCALE, TRADING_DAYS_PER_YEAR, VALUE_SCALE};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Per-instrument subtotal within an investor's aggregated result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstrumentBreakdown {
    pub instrument_name: String,
    /// Sum of recorded values for this instrument, rounded to 2 places.
    pub summed_value: Decimal,
    pub movement_count: usize,
}

/// Aggregated fee result for one investor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvestorFeeResult {
    pub investor_id: InvestorId,
    pub investor_name: String,
    /// Latest `occurred_at` among the matched movements.
    pub calculation_date: DateTime<Utc>,
    pub annual_rate: Decimal,
    /// Sum of recorded values over all matched movements, rounded to 2
    /// places for presentation; the fee is derived from the exact sum.
    pub total_basis_value: Decimal,
    /// `basis * annual_rate / 252`, rounded to 4 places.
    pub derived_fee: Decimal,
    pub movement_count: usize,
    pub instrument_count: usize,
    pub breakdown: BTreeMap<Symbol, InstrumentBreakdown>,
}

/// Holdings view of one investor as of a date: the instrument grouping
/// without a fee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoldingsSummary {
    pub total_value: Decimal,
    pub movement_count: usize,
    pub instrument_count: usize,
    pub breakdown: BTreeMap<Symbol, InstrumentBreakdown>,
}

/// Aggregate fees for every investor with movements at or before
/// `as_of`.
///
/// Returns one result per distinct investor in the filtered set, keyed
/// deterministically by investor id. An empty event set (or one where
/// nothing predates the cutoff) yields an empty list; that is a valid
/// state, not an error.
///
/// # Errors
/// [`FeeError::NegativeRate`] when `annual_rate` < 0.
pub fn compute_for_all_investors(
    events: &[MovementEvent],
    as_of: DateTime<Utc>,
    annual_rate: Decimal,
) -> Result<Vec<InvestorFeeResult>, FeeError> {
    if annual_rate.is_negative() {
        return Err(FeeError::NegativeRate(annual_rate));
    }

    let mut by_investor: BTreeMap<InvestorId, Vec<&MovementEvent>> = BTreeMap::new();
    for event in events.iter().filter(|e| e.occurred_at <= as_of) {
        by_investor.entry(event.investor_id).or_default().push(event);
    }

    Ok(by_investor
        .into_values()
        .map(|movements| aggregate(&movements, annual_rate))
        .collect())
}

/// Aggregate the fee for a single investor from their movement events.
///
/// # Errors
/// - [`FeeError::NegativeRate`] when `annual_rate` < 0.
/// - [`FeeError::NoMovements`] when `events` is empty: "no data" is a
///   client-visible condition, distinct from a zero-valued fee.
pub fn compute_for_investor(
    investor_id: InvestorId,
    events: &[MovementEvent],
    annual_rate: Decimal,
) -> Result<InvestorFeeResult, FeeError> {
    if annual_rate.is_negative() {
        return Err(FeeError::NegativeRate(annual_rate));
    }
    if events.is_empty() {
        return Err(FeeError::NoMovements(investor_id));
    }

    let movements: Vec<&MovementEvent> = events.iter().collect();
    Ok(aggregate(&movements, annual_rate))
}

/// Group one investor's movements at or before `as_of` by instrument,
/// without deriving a fee.
pub fn summarize_holdings(events: &[MovementEvent], as_of: DateTime<Utc>) -> HoldingsSummary {
    let movements: Vec<&MovementEvent> = events.iter().filter(|e| e.occurred_at <= as_of).collect();

    let breakdown = group_by_instrument(&movements);
    let total_value = sum_recorded_values(&movements).round_dp(VALUE_SCALE);

    HoldingsSummary {
        total_value,
        movement_count: movements.len(),
        instrument_count: breakdown.len(),
        breakdown,
    }
}

// `movements` must be non-empty and belong to a single investor.
fn aggregate(movements: &[&MovementEvent], annual_rate: Decimal) -> InvestorFeeResult {
    let breakdown = group_by_instrument(movements);

    let total = sum_recorded_values(movements);
    let trading_days = Decimal::from(TRADING_DAYS_PER_YEAR);
    let derived_fee = (total * annual_rate / trading_days).round_dp(FEE_SCALE);

    let calculation_date = movements
        .iter()
        .map(|m| m.occurred_at)
        .max()
        .unwrap_or_default();

    InvestorFeeResult {
        investor_id: movements[0].investor_id,
        investor_name: movements[0].investor_name.clone(),
        calculation_date,
        annual_rate,
        total_basis_value: total.round_dp(VALUE_SCALE),
        derived_fee,
        movement_count: movements.len(),
        instrument_count: breakdown.len(),
        breakdown,
    }
}

fn group_by_instrument(movements: &[&MovementEvent]) -> BTreeMap<Symbol, InstrumentBreakdown> {
    let mut groups: BTreeMap<Symbol, (String, Decimal, usize)> = BTreeMap::new();
    for movement in movements {
        let entry = groups
            .entry(movement.symbol.clone())
            .or_insert_with(|| (movement.instrument_name.clone(), Decimal::zero(), 0));
        entry.1 = entry.1 + movement.recorded_value;
        entry.2 += 1;
    }

    groups
        .into_iter()
        .map(|(symbol, (instrument_name, summed, count))| {
            (
                symbol,
                InstrumentBreakdown {
                    instrument_name,
                    summed_value: summed.round_dp(VALUE_SCALE),
                    movement_count: count,
                },
            )
        })
        .collect()
}

fn sum_recorded_values(movements: &[&MovementEvent]) -> Decimal {
    let mut total = Decimal::zero();
    for movement in movements {
        total = total + movement.recorded_value;
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::InstrumentId;
    use chrono::TimeZone;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap()
    }

    fn movement(
        id: i64,
        investor: i64,
        symbol: &str,
        value: &str,
        occurred_at: DateTime<Utc>,
    ) -> MovementEvent {
        MovementEvent {
            id,
            investor_id: InvestorId::new(investor),
            investor_name: format!("Investor {}", investor),
            instrument_id: InstrumentId::new(symbol.len() as i64),
            symbol: Symbol::new(symbol),
            instrument_name: format!("{} Fund", symbol),
            recorded_value: dec(value),
            occurred_at,
            created_at: occurred_at,
        }
    }

    #[test]
    fn test_single_investor_aggregation() {
        let events = vec![
            movement(1, 1, "JURO11", "150.00", at(1)),
            movement(2, 1, "CDII11", "125.50", at(5)),
            movement(3, 1, "JURO11", "155.00", at(10)),
        ];

        let result = compute_for_investor(InvestorId::new(1), &events, dec("0.01")).unwrap();

        // basis = 150 + 125.5 + 155 = 430.5; fee = 430.5*0.01/252 = 0.0171
        assert_eq!(result.total_basis_value, dec("430.50"));
        assert_eq!(result.derived_fee, dec("0.0171"));
        assert_eq!(result.movement_count, 3);
        assert_eq!(result.instrument_count, 2);
        assert_eq!(result.calculation_date, at(10));

        let juro = &result.breakdown[&Symbol::new("JURO11")];
        assert_eq!(juro.summed_value, dec("305.00"));
        assert_eq!(juro.movement_count, 2);

        let cdii = &result.breakdown[&Symbol::new("CDII11")];
        assert_eq!(cdii.summed_value, dec("125.50"));
        assert_eq!(cdii.movement_count, 1);
    }

    #[test]
    fn test_basis_independent_of_event_order() {
        let mut events = vec![
            movement(1, 1, "JURO11", "150.00", at(1)),
            movement(2, 1, "CDII11", "125.50", at(5)),
            movement(3, 1, "JURO11", "155.00", at(10)),
        ];
        let forward = compute_for_investor(InvestorId::new(1), &events, dec("0.01")).unwrap();

        events.reverse();
        let reversed = compute_for_investor(InvestorId::new(1), &events, dec("0.01")).unwrap();

        assert_eq!(forward, reversed);
    }

    #[test]
    fn test_no_movements_is_not_found_not_zero() {
        let result = compute_for_investor(InvestorId::new(7), &[], dec("0.01"));
        assert_eq!(result, Err(FeeError::NoMovements(InvestorId::new(7))));
    }

    #[test]
    fn test_negative_rate_rejected() {
        let events = vec![movement(1, 1, "JURO11", "150.00", at(1))];
        let single = compute_for_investor(InvestorId::new(1), &events, dec("-0.5"));
        assert_eq!(single, Err(FeeError::NegativeRate(dec("-0.5"))));

        let all = compute_for_all_investors(&events, at(2), dec("-0.5"));
        assert_eq!(all, Err(FeeError::NegativeRate(dec("-0.5"))));
    }

    #[test]
    fn test_cutoff_filters_investors() {
        // Only investor 1 has a movement at or before the cutoff.
        let events = vec![
            movement(1, 1, "JURO11", "150.00", at(1)),
            movement(2, 2, "CDII11", "125.50", at(20)),
        ];

        let results = compute_for_all_investors(&events, at(10), dec("0.01")).unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].investor_id, InvestorId::new(1));
        assert_eq!(results[0].movement_count, 1);
    }

    #[test]
    fn test_cutoff_boundary_is_inclusive() {
        let events = vec![movement(1, 1, "JURO11", "150.00", at(10))];
        let results = compute_for_all_investors(&events, at(10), dec("0.01")).unwrap();
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_empty_store_yields_empty_result() {
        let results = compute_for_all_investors(&[], at(1), dec("0.01")).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_all_investors_one_result_each() {
        let events = vec![
            movement(1, 1, "JURO11", "150.00", at(1)),
            movement(2, 2, "CDII11", "126.00", at(2)),
            movement(3, 1, "CDII11", "125.50", at(3)),
            movement(4, 2, "CRAA11", "95.75", at(4)),
        ];

        let results = compute_for_all_investors(&events, at(30), dec("0.02")).unwrap();
        assert_eq!(results.len(), 2);

        let by_id: BTreeMap<InvestorId, &InvestorFeeResult> =
            results.iter().map(|r| (r.investor_id, r)).collect();

        let first = by_id[&InvestorId::new(1)];
        assert_eq!(first.total_basis_value, dec("275.50"));
        // 275.5*0.02/252 = 0.0219
        assert_eq!(first.derived_fee, dec("0.0219"));
        assert_eq!(first.calculation_date, at(3));

        let second = by_id[&InvestorId::new(2)];
        assert_eq!(second.total_basis_value, dec("221.75"));
        // 221.75*0.02/252 = 0.0176
        assert_eq!(second.derived_fee, dec("0.0176"));
    }

    #[test]
    fn test_zero_rate_yields_zero_fee() {
        let events = vec![movement(1, 1, "JURO11", "150.00", at(1))];
        let result = compute_for_investor(InvestorId::new(1), &events, Decimal::zero()).unwrap();
        assert!(result.derived_fee.is_zero());
        assert_eq!(result.total_basis_value, dec("150.00"));
    }

    #[test]
    fn test_holdings_summary_groups_without_fee() {
        let events = vec![
            movement(1, 1, "JURO11", "150.00", at(1)),
            movement(2, 1, "JURO11", "155.00", at(5)),
            movement(3, 1, "CDII11", "125.50", at(20)),
        ];

        let summary = summarize_holdings(&events, at(10));

        assert_eq!(summary.movement_count, 2);
        assert_eq!(summary.instrument_count, 1);
        assert_eq!(summary.total_value, dec("305.00"));
        assert_eq!(
            summary.breakdown[&Symbol::new("JURO11")].summed_value,
            dec("305.00")
        );
    }

    #[test]
    fn test_deterministic_under_concurrent_invocation() {
        let events = std::sync::Arc::new(vec![
            movement(1, 1, "JURO11", "150.00", at(1)),
            movement(2, 2, "CDII11", "126.00", at(2)),
            movement(3, 1, "CDII11", "125.50", at(3)),
            movement(4, 2, "CRAA11", "95.75", at(4)),
        ]);
        let expected = compute_for_all_investors(&events, at(30), dec("0.02")).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let events = std::sync::Arc::clone(&events);
                std::thread::spawn(move || {
                    compute_for_all_investors(&events, at(30), dec("0.02")).unwrap()
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    }

    #[test]
    fn test_holdings_summary_empty_is_valid() {
        let summary = summarize_holdings(&[], at(1));
        assert_eq!(summary.movement_count, 0);
        assert!(summary.breakdown.is_empty());
        assert!(summary.total_value.is_zero());
    }
}
