//! Allocation reconciler: rebuilds editable allocation rows for an alias
//! from the current membership and previously saved amounts.

use std::collections::{HashMap, HashSet};

use super::codec::format_amount;
use super::owner::{OwnerDirectory, OwnerId};
use super::transfer::{Allocation, AllocationRow};

/// Build one row per current alias member, in membership order.
///
/// Saved amounts prefill the matching owner's row; owners who have since
/// left the alias are dropped. Owners missing from the registry are labelled
/// `ID:<id>`. Pure and idempotent.
///
/// # Examples
/// ```
/// use extras_console::domain::{
///     Allocation, OwnerDirectory, OwnerId, reconcile,
/// };
/// use rust_decimal::Decimal;
///
/// let saved = [Allocation { owner_id: OwnerId::new(10), amount: Decimal::new(50, 0) }];
/// let rows = reconcile(
///     &[OwnerId::new(20), OwnerId::new(30)],
///     &saved,
///     &OwnerDirectory::default(),
/// );
///
/// assert_eq!(rows.len(), 2);
/// assert!(rows.iter().all(|row| row.amount.is_empty()));
/// ```
pub fn reconcile(
    alias_owner_ids: &[OwnerId],
    saved: &[Allocation],
    owners: &OwnerDirectory,
) -> Vec<AllocationRow> {
    let saved_amounts = saved
        .iter()
        .map(|allocation| (allocation.owner_id, allocation.amount))
        .collect::<HashMap<_, _>>();
    let mut seen = HashSet::with_capacity(alias_owner_ids.len());

    alias_owner_ids
        .iter()
        .copied()
        .filter(|owner_id| seen.insert(*owner_id))
        .map(|owner_id| AllocationRow {
            owner_id,
            owner_label: owners.label_for(owner_id),
            amount: saved_amounts
                .get(&owner_id)
                .copied()
                .map(format_amount)
                .unwrap_or_default(),
        })
        .collect()
}
