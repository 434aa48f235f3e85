//! Aggregate alias and transfer statistics.

use rust_decimal::Decimal;

use super::error::ConsoleError;
use super::ports::ExtrasBackend;

/// Counters reported by the statistics endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtrasStatistics {
    /// Every alias, active or not.
    pub total_aliases: u64,
    /// Active aliases.
    pub active_aliases: u64,
    /// Inactive aliases.
    pub inactive_aliases: u64,
    /// Sum of all transfer totals.
    pub total_transferred: Decimal,
}

/// Fetch statistics.
///
/// # Errors
///
/// [`ConsoleError::Fetch`] on transport failure and
/// [`ConsoleError::InvalidResponse`] when the envelope is not successful.
pub async fn fetch_statistics<B: ExtrasBackend + ?Sized>(
    backend: &B,
) -> Result<ExtrasStatistics, ConsoleError> {
    backend
        .statistics()
        .await?
        .into_data()
        .ok_or_else(|| ConsoleError::invalid_response("statistics response was not successful"))
}
