//! Aliases: named groupings of property owners.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::codec::Decoded;
use super::error::ValidationError;
use super::owner::{OwnerDirectory, OwnerId};

/// Backend-assigned alias identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AliasId(i64);

impl AliasId {
    /// Wrap a raw backend identifier.
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Raw identifier as sent on the wire.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for AliasId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Alias as held in the local cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alias {
    /// Backend identifier.
    pub id: AliasId,
    /// Display label, unique by convention.
    pub label: String,
    /// Ordered owner membership decoded from the persisted blob.
    pub owners: Decoded<Vec<OwnerId>>,
    /// Business toggle; not a deletion marker.
    pub active: bool,
}

impl Alias {
    /// Current member ids in stored order. Empty when the blob is unreadable.
    pub fn owner_ids(&self) -> &[OwnerId] {
        self.owners.as_slice()
    }

    /// Whether `owner` currently belongs to this alias.
    pub fn has_owner(&self, owner: OwnerId) -> bool {
        self.owner_ids().contains(&owner)
    }
}

/// Editable alias form state.
///
/// The draft keeps `owner_ids` free of duplicates when edited through
/// [`AliasDraft::select_owner`]; [`AliasDraft::validate`] rejects duplicates
/// that arrive any other way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasDraft {
    /// Label as typed.
    pub label: String,
    /// Selected owners in selection order.
    pub owner_ids: Vec<OwnerId>,
    /// Active toggle.
    pub active: bool,
}

impl Default for AliasDraft {
    fn default() -> Self {
        Self {
            label: String::new(),
            owner_ids: Vec::new(),
            active: true,
        }
    }
}

impl AliasDraft {
    /// Draft prefilled from a cached alias.
    pub fn from_alias(alias: &Alias) -> Self {
        Self {
            label: alias.label.clone(),
            owner_ids: alias.owner_ids().to_vec(),
            active: alias.active,
        }
    }

    /// Add `owner` unless already selected.
    pub fn select_owner(&mut self, owner: OwnerId) {
        if !self.owner_ids.contains(&owner) {
            self.owner_ids.push(owner);
        }
    }

    /// Remove `owner` from the selection.
    pub fn deselect_owner(&mut self, owner: OwnerId) {
        self.owner_ids.retain(|selected| *selected != owner);
    }

    /// Check client-side preconditions and produce the payload to persist.
    ///
    /// Owner existence is only checked once the registry has loaded, so a
    /// registry outage does not block editing.
    ///
    /// # Errors
    ///
    /// Returns the first violated precondition: blank label, no owners,
    /// a duplicated owner, or an owner unknown to the registry.
    pub fn validate(&self, owners: &OwnerDirectory) -> Result<AliasSubmission, ValidationError> {
        let label = self.label.trim();
        if label.is_empty() {
            return Err(ValidationError::AliasLabelRequired);
        }
        if self.owner_ids.is_empty() {
            return Err(ValidationError::OwnersRequired);
        }

        let mut seen = HashSet::with_capacity(self.owner_ids.len());
        for owner in &self.owner_ids {
            if !seen.insert(*owner) {
                return Err(ValidationError::DuplicateOwner(*owner));
            }
            if owners.is_loaded() && !owners.contains(*owner) {
                return Err(ValidationError::UnknownOwner(*owner));
            }
        }

        Ok(AliasSubmission {
            label: label.to_owned(),
            owner_ids: self.owner_ids.clone(),
            active: self.active,
        })
    }
}

/// Validated alias payload handed to the backend port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasSubmission {
    /// Trimmed, non-empty label.
    pub label: String,
    /// Non-empty, duplicate-free owner ids.
    pub owner_ids: Vec<OwnerId>,
    /// Active toggle.
    pub active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Owner;

    fn directory(ids: &[i64]) -> OwnerDirectory {
        OwnerDirectory::new(
            ids.iter()
                .map(|id| Owner {
                    id: OwnerId::new(*id),
                    name: format!("Owner {id}"),
                    surname: None,
                })
                .collect(),
        )
    }

    fn draft(label: &str, owners: &[i64]) -> AliasDraft {
        AliasDraft {
            label: label.to_owned(),
            owner_ids: owners.iter().copied().map(OwnerId::new).collect(),
            active: true,
        }
    }

    #[test]
    fn validate_trims_label_and_keeps_owner_order() {
        let submission = draft("  Family  ", &[20, 10])
            .validate(&directory(&[10, 20]))
            .expect("draft is valid");

        assert_eq!(submission.label, "Family");
        assert_eq!(
            submission.owner_ids,
            vec![OwnerId::new(20), OwnerId::new(10)]
        );
    }

    #[test]
    fn validate_rejects_blank_label_before_owners() {
        let error = draft("   ", &[])
            .validate(&directory(&[10]))
            .expect_err("blank label");
        assert_eq!(error, ValidationError::AliasLabelRequired);
    }

    #[test]
    fn validate_rejects_empty_owner_set() {
        let error = draft("A1", &[])
            .validate(&directory(&[10]))
            .expect_err("no owners");
        assert_eq!(error, ValidationError::OwnersRequired);
    }

    #[test]
    fn validate_rejects_duplicates_and_unknown_owners() {
        let duplicate = draft("A1", &[10, 10])
            .validate(&directory(&[10]))
            .expect_err("duplicate owner");
        assert_eq!(duplicate, ValidationError::DuplicateOwner(OwnerId::new(10)));

        let unknown = draft("A1", &[10, 30])
            .validate(&directory(&[10]))
            .expect_err("unknown owner");
        assert_eq!(unknown, ValidationError::UnknownOwner(OwnerId::new(30)));
    }

    #[test]
    fn unloaded_registry_skips_membership_check() {
        let submission = draft("A1", &[30]).validate(&OwnerDirectory::default());
        assert!(submission.is_ok());
    }

    #[test]
    fn select_owner_keeps_set_semantics() {
        let mut draft = AliasDraft::default();
        draft.select_owner(OwnerId::new(10));
        draft.select_owner(OwnerId::new(20));
        draft.select_owner(OwnerId::new(10));
        draft.deselect_owner(OwnerId::new(20));

        assert_eq!(draft.owner_ids, vec![OwnerId::new(10)]);
        assert!(draft.active, "new drafts start active");
    }
}
