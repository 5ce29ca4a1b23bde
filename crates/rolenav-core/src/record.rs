// Rolenav
// Copyright (C) 2025 Synerthink

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Permission records and the allowed-path set derived from them

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A single (role, path) grant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionRecord {
    /// Role the grant applies to
    pub role: String,

    /// Capability path from the catalog
    pub path: String,

    /// Title of the containing group at write time, for display only
    #[serde(default, alias = "groupName")]
    pub group_name: Option<String>,

    /// Whether the capability is granted
    #[serde(rename = "isAllowed")]
    pub is_allowed: bool,
}

impl PermissionRecord {
    /// Create a record without a group label
    pub fn new(role: impl Into<String>, path: impl Into<String>, is_allowed: bool) -> Self {
        Self {
            role: role.into(),
            path: path.into(),
            group_name: None,
            is_allowed,
        }
    }

    pub fn with_group(mut self, group_name: Option<String>) -> Self {
        self.group_name = group_name;
        self
    }

    /// Identity of the record in a store
    pub fn key(&self) -> (String, String) {
        (self.role.clone(), self.path.clone())
    }
}

/// Paths currently granted to a role
///
/// Anything not contained is denied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AllowedSet {
    paths: BTreeSet<String>,
}

impl AllowedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive the set from a role's records; later records supersede earlier ones
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a PermissionRecord>) -> Self {
        let mut set = Self::new();
        for record in records {
            set.set(&record.path, record.is_allowed);
        }
        set
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    /// Patch a single path, e.g. after a committed edit
    pub fn set(&mut self, path: &str, allowed: bool) {
        if allowed {
            self.paths.insert(path.to_string());
        } else {
            self.paths.remove(path);
        }
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for AllowedSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            paths: iter.into_iter().map(Into::into).collect(),
        }
    }
}
