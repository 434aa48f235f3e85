//! Render-ready rows for the alias and transfer tables.

use chrono::NaiveDate;

use super::alias::{Alias, AliasId};
use super::codec::Decoded;
use super::owner::OwnerDirectory;
use super::transfer::{Transfer, TransferId};

const OWNER_SUMMARY_LIMIT: usize = 50;

/// One line of the alias table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasRow {
    /// Alias identifier.
    pub id: AliasId,
    /// Alias label.
    pub label: String,
    /// Owner names, shortened for display.
    pub owners: String,
    /// Active toggle.
    pub active: bool,
}

impl AliasRow {
    /// Build the row for `alias`, resolving owner names through `owners`.
    pub fn new(alias: &Alias, owners: &OwnerDirectory) -> Self {
        Self {
            id: alias.id,
            label: alias.label.clone(),
            owners: owner_summary(alias, owners),
            active: alias.active,
        }
    }
}

fn owner_summary(alias: &Alias, owners: &OwnerDirectory) -> String {
    let ids = match &alias.owners {
        Decoded::Unreadable { .. } => return "format error".to_owned(),
        Decoded::Valid(ids) if ids.is_empty() => return "none".to_owned(),
        Decoded::Valid(ids) => ids,
    };
    let joined = ids
        .iter()
        .map(|id| {
            owners
                .get(*id)
                .map_or_else(|| owners.label_for(*id), |owner| owner.name.clone())
        })
        .collect::<Vec<_>>()
        .join(", ");
    truncate(&joined, OWNER_SUMMARY_LIMIT)
}

fn truncate(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}...", text.get(..cut).unwrap_or(text)),
        None => text.to_owned(),
    }
}

/// One line of the transfer table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRow {
    /// Transfer identifier.
    pub id: TransferId,
    /// Alias label, or `-` when the backend did not join one.
    pub alias_label: String,
    /// Transfer name.
    pub name: String,
    /// Active toggle.
    pub active: bool,
    /// Creation date as `dd/mm/yyyy`, or `-`.
    pub created_date: String,
    /// End date as `dd/mm/yyyy`, or `-`.
    pub end_date: String,
}

impl From<&Transfer> for TransferRow {
    fn from(transfer: &Transfer) -> Self {
        Self {
            id: transfer.id,
            alias_label: transfer
                .alias_label
                .clone()
                .unwrap_or_else(|| "-".to_owned()),
            name: transfer.name.clone(),
            active: transfer.active,
            created_date: display_date(transfer.created_date),
            end_date: display_date(transfer.end_date),
        }
    }
}

fn display_date(date: Option<NaiveDate>) -> String {
    date.map_or_else(|| "-".to_owned(), |date| date.format("%d/%m/%Y").to_string())
}
