//! Set-semantics container for permissions.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::model::Permission;

/// An ordered, duplicate-free set of permissions.
///
/// Serialized as a JSON array of wire strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet(BTreeSet<Permission>);

impl PermissionSet {
    /// An empty set.
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// Every known permission.
    pub fn all() -> Self {
        Permission::ALL.into_iter().collect()
    }

    /// Parse a list of wire strings.
    ///
    /// Returns the offending entries, in input order, if any string is not
    /// a known permission.
    pub fn parse<S: AsRef<str>>(raw: &[S]) -> Result<Self, Vec<String>> {
        let mut set = BTreeSet::new();
        let mut invalid = Vec::new();
        for entry in raw {
            match entry.as_ref().parse::<Permission>() {
                Ok(p) => {
                    set.insert(p);
                }
                Err(_) => invalid.push(entry.as_ref().to_string()),
            }
        }
        if invalid.is_empty() {
            Ok(Self(set))
        } else {
            Err(invalid)
        }
    }

    /// Whether the set holds `permission`.
    pub fn contains(&self, permission: Permission) -> bool {
        self.0.contains(&permission)
    }

    /// Add a permission. Returns `false` if it was already present.
    pub fn insert(&mut self, permission: Permission) -> bool {
        self.0.insert(permission)
    }

    /// Number of distinct permissions.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = Permission> + '_ {
        self.0.iter().copied()
    }

    /// Wire strings in canonical order.
    pub fn to_strings(&self) -> Vec<String> {
        self.iter().map(|p| p.as_str().to_string()).collect()
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for PermissionSet {
    type Item = Permission;
    type IntoIter = std::collections::btree_set::IntoIter<Permission>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
