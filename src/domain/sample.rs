//! Time-series sample: one day's unit valuation plus the per-investor
//! quantity vector.

use crate::domain::Decimal;

/// One data point of the stateless fee mode.
///
/// Index `i` of `quantities` is investor `i`'s unit holding for the
/// period this sample covers. Samples are transient: they arrive with a
/// request and are never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    /// Unit value of the fund for the period. Must be > 0.
    pub unit_value: Decimal,
    /// Units held per investor, in investor-index order. Each entry >= 0.
    pub quantities: Vec<Decimal>,
}

impl Sample {
    pub fn new(unit_value: Decimal, quantities: Vec<Decimal>) -> Self {
        Sample {
            unit_value,
            quantities,
        }
    }

    /// Number of investors this sample carries quantities for.
    pub fn investor_count(&self) -> usize {
        self.quantities.len()
    }
}
