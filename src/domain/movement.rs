//! Movement events: immutable recorded ownership changes.

use crate::domain::{Decimal, InstrumentId, InvestorId, Symbol};
use chrono::{DateTime, Utc};

/// One recorded ownership change for one investor in one instrument.
///
/// Immutable once created; the engine only reads these. The investor and
/// instrument names ride along so aggregated results can be rendered
/// without further lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovementEvent {
    pub id: i64,
    pub investor_id: InvestorId,
    pub investor_name: String,
    pub instrument_id: InstrumentId,
    pub symbol: Symbol,
    pub instrument_name: String,
    /// Recorded monetary value of the movement. Always > 0; enforced at
    /// the API boundary before the event is persisted.
    pub recorded_value: Decimal,
    pub occurred_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}
