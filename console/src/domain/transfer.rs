//! Transfers: dated allocations of a monetary value across an alias's owners.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::alias::{Alias, AliasId};
use super::codec::{Decoded, parse_amount};
use super::error::ValidationError;
use super::owner::OwnerId;

/// Backend-assigned transfer identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransferId(i64);

impl TransferId {
    /// Wrap a raw backend identifier.
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Raw identifier as sent on the wire.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for TransferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One owner's share of a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allocation {
    /// Receiving owner.
    pub owner_id: OwnerId,
    /// Exact amount.
    pub amount: Decimal,
}

/// Sum of allocation amounts.
pub fn total_amount(allocations: &[Allocation]) -> Decimal {
    allocations.iter().map(|allocation| allocation.amount).sum()
}

/// Transfer as held in the local cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    /// Backend identifier.
    pub id: TransferId,
    /// Alias whose owners share the transfer.
    pub alias_id: AliasId,
    /// Alias label joined by the backend for display.
    pub alias_label: Option<String>,
    /// Transfer name.
    pub name: String,
    /// Creation date; older records may lack one.
    pub created_date: Option<NaiveDate>,
    /// Optional end date, never before `created_date`.
    pub end_date: Option<NaiveDate>,
    /// Saved per-owner amounts decoded from the persisted blob.
    pub allocations: Decoded<Vec<Allocation>>,
    /// Sum of the allocations at the last save.
    pub total_amount: Decimal,
    /// Business toggle.
    pub active: bool,
}

/// Editable allocation row produced by the reconciler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationRow {
    /// Owner the row allocates to.
    pub owner_id: OwnerId,
    /// Owner display label.
    pub owner_label: String,
    /// Amount as shown in the input; empty when blank.
    pub amount: String,
}

/// Transfer editor form state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferForm {
    /// Selected alias.
    pub alias_id: Option<AliasId>,
    /// Transfer name as typed.
    pub name: String,
    /// Creation date.
    pub created_date: Option<NaiveDate>,
    /// Optional end date.
    pub end_date: Option<NaiveDate>,
    /// Allocation rows for the selected alias.
    pub rows: Vec<AllocationRow>,
}

impl TransferForm {
    /// Check client-side preconditions and produce the payload to persist.
    ///
    /// Rows with blank, malformed or zero amounts are dropped. The selected
    /// alias must be among `aliases`, and every remaining row must belong to
    /// one of its owners.
    ///
    /// # Errors
    ///
    /// Returns the first violated precondition in form order: alias, name,
    /// creation date, date ordering, alias availability, then allocations.
    ///
    /// # Examples
    /// ```
    /// use chrono::NaiveDate;
    /// use extras_console::domain::{AliasId, TransferForm, ValidationError};
    ///
    /// let form = TransferForm {
    ///     alias_id: Some(AliasId::new(1)),
    ///     name: "Rent".to_owned(),
    ///     created_date: NaiveDate::from_ymd_opt(2024, 2, 1),
    ///     end_date: NaiveDate::from_ymd_opt(2024, 1, 1),
    ///     rows: Vec::new(),
    /// };
    /// assert!(matches!(
    ///     form.validate(&[]),
    ///     Err(ValidationError::EndDateBeforeCreatedDate { .. })
    /// ));
    /// ```
    pub fn validate(&self, aliases: &[Alias]) -> Result<TransferSubmission, ValidationError> {
        let alias_id = self.alias_id.ok_or(ValidationError::AliasRequired)?;
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::TransferNameRequired);
        }
        let created_date = self
            .created_date
            .ok_or(ValidationError::CreatedDateRequired)?;
        if let Some(end_date) = self.end_date.filter(|end_date| *end_date < created_date) {
            return Err(ValidationError::EndDateBeforeCreatedDate {
                created_date,
                end_date,
            });
        }

        let alias = aliases
            .iter()
            .find(|alias| alias.id == alias_id)
            .ok_or(ValidationError::UnknownAlias(alias_id))?;

        let allocations = self
            .rows
            .iter()
            .filter_map(|row| {
                parse_amount(&row.amount)
                    .filter(|amount| !amount.is_zero())
                    .map(|amount| Allocation {
                        owner_id: row.owner_id,
                        amount,
                    })
            })
            .collect::<Vec<_>>();

        if let Some(stray) = allocations
            .iter()
            .find(|allocation| !alias.has_owner(allocation.owner_id))
        {
            return Err(ValidationError::OwnerOutsideAlias(stray.owner_id));
        }
        if allocations.is_empty() {
            return Err(ValidationError::AllocationRequired);
        }

        Ok(TransferSubmission {
            alias_id,
            name: name.to_owned(),
            created_date,
            end_date: self.end_date,
            total_amount: total_amount(&allocations),
            allocations,
        })
    }
}

/// Validated transfer payload handed to the backend port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferSubmission {
    /// Alias the transfer belongs to.
    pub alias_id: AliasId,
    /// Trimmed, non-empty name.
    pub name: String,
    /// Creation date.
    pub created_date: NaiveDate,
    /// End date, not before `created_date`.
    pub end_date: Option<NaiveDate>,
    /// Non-zero allocations, at least one.
    pub allocations: Vec<Allocation>,
    /// Sum of `allocations`.
    pub total_amount: Decimal,
}
