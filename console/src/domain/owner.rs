//! Property owners eligible for alias membership and transfer allocations.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Backend-assigned owner identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(i64);

impl OwnerId {
    /// Wrap a raw backend identifier.
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Raw identifier as sent on the wire.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Owner reference data. Read-only to this crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Owner {
    /// Unique, immutable identifier.
    pub id: OwnerId,
    /// Given name.
    pub name: String,
    /// Family name, when the backend has one.
    pub surname: Option<String>,
}

impl Owner {
    /// Full display label: name and surname joined by a space, trimmed.
    ///
    /// # Examples
    /// ```
    /// use extras_console::domain::{Owner, OwnerId};
    ///
    /// let owner = Owner {
    ///     id: OwnerId::new(10),
    ///     name: "Ana".to_owned(),
    ///     surname: None,
    /// };
    /// assert_eq!(owner.display_label(), "Ana");
    /// ```
    pub fn display_label(&self) -> String {
        format!("{} {}", self.name, self.surname.as_deref().unwrap_or_default())
            .trim()
            .to_owned()
    }
}

/// Label used when an owner id no longer resolves against the registry.
pub fn missing_owner_label(id: OwnerId) -> String {
    format!("ID:{id}")
}

/// Point-in-time copy of the owner registry used for lookups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnerDirectory {
    owners: Vec<Owner>,
    loaded: bool,
}

impl OwnerDirectory {
    /// Build a loaded directory from the backend's ordered owner list.
    pub fn new(owners: Vec<Owner>) -> Self {
        Self {
            owners,
            loaded: true,
        }
    }

    /// Whether a load has ever succeeded.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Owners in backend order.
    pub fn all(&self) -> &[Owner] {
        &self.owners
    }

    /// Look up one owner.
    pub fn get(&self, id: OwnerId) -> Option<&Owner> {
        self.owners.iter().find(|owner| owner.id == id)
    }

    /// Whether the directory knows `id`.
    pub fn contains(&self, id: OwnerId) -> bool {
        self.get(id).is_some()
    }

    /// Full label for `id`, falling back to the missing-owner placeholder.
    pub fn label_for(&self, id: OwnerId) -> String {
        self.get(id)
            .map_or_else(|| missing_owner_label(id), Owner::display_label)
    }

    /// Number of known owners.
    pub fn len(&self) -> usize {
        self.owners.len()
    }

    /// Whether no owners are known.
    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}
