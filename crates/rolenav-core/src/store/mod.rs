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

//! Permission storage
//!
//! A store holds at most one record per (role, path). Writes are upserts and
//! are validated against the capability catalog before anything is mutated.

pub mod file;
pub mod memory;

pub use file::FilePermissionStore;
pub use memory::MemoryPermissionStore;

use crate::catalog::Catalog;
use crate::record::PermissionRecord;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised by permission stores
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("unknown capability path: {path}")]
    UnknownPath { path: String },

    #[error("invalid permission record: {message}")]
    Invalid { message: String },

    #[error("permission store unavailable: {message}")]
    Unavailable { message: String },
}

impl StoreError {
    /// Validation failures are rejected outright and never retried
    pub fn is_validation(&self) -> bool {
        matches!(self, StoreError::UnknownPath { .. } | StoreError::Invalid { .. })
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        StoreError::Unavailable { message: message.into() }
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Durable (role, path) -> grant mapping
#[async_trait]
pub trait PermissionStore: Send + Sync {
    /// All records for a role; empty when the role has none
    async fn grants_for_role(&self, role: &str) -> StoreResult<Vec<PermissionRecord>>;

    /// Insert or replace the record for (role, path), returning what was stored
    async fn upsert_grant(&self, record: PermissionRecord) -> StoreResult<PermissionRecord>;

    /// Remove a record; returns whether one existed
    async fn delete_grant(&self, role: &str, path: &str) -> StoreResult<bool>;

    /// Distinct roles that have at least one record
    async fn roles(&self) -> StoreResult<Vec<String>>;
}

#[async_trait]
impl<S: PermissionStore + ?Sized> PermissionStore for Arc<S> {
    async fn grants_for_role(&self, role: &str) -> StoreResult<Vec<PermissionRecord>> {
        (**self).grants_for_role(role).await
    }

    async fn upsert_grant(&self, record: PermissionRecord) -> StoreResult<PermissionRecord> {
        (**self).upsert_grant(record).await
    }

    async fn delete_grant(&self, role: &str, path: &str) -> StoreResult<bool> {
        (**self).delete_grant(role, path).await
    }

    async fn roles(&self) -> StoreResult<Vec<String>> {
        (**self).roles().await
    }
}

/// Canonical form of a role name as stored and looked up
pub fn normalize_role(role: &str) -> &str {
    role.trim()
}

/// Validate a record against the catalog and denormalize its group label
pub fn prepare_record(catalog: &Catalog, mut record: PermissionRecord) -> StoreResult<PermissionRecord> {
    record.role = normalize_role(&record.role).to_string();
    if record.role.is_empty() {
        return Err(StoreError::Invalid {
            message: "role must not be empty".to_string(),
        });
    }

    if !catalog.contains_path(&record.path) {
        return Err(StoreError::UnknownPath { path: record.path });
    }

    record.group_name = catalog.group_of(&record.path).map(str::to_string);
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CapabilityNode;

    fn catalog() -> Catalog {
        Catalog::from_nodes(
            1,
            vec![
                CapabilityNode::group("HR", None, vec![CapabilityNode::leaf("Departments", "/dept", None)]),
                CapabilityNode::leaf("Home", "/home", None),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_prepare_fills_group_from_catalog() {
        let record = PermissionRecord::new("user", "/dept", true).with_group(Some("Stale".to_string()));
        let prepared = prepare_record(&catalog(), record).unwrap();

        assert_eq!(prepared.group_name.as_deref(), Some("HR"));
    }

    #[test]
    fn test_prepare_clears_group_for_standalone_leaf() {
        let record = PermissionRecord::new(" user ", "/home", true).with_group(Some("HR".to_string()));
        let prepared = prepare_record(&catalog(), record).unwrap();

        assert_eq!(prepared.role, "user");
        assert_eq!(prepared.group_name, None);
    }

    #[test]
    fn test_prepare_rejects_unknown_path() {
        let err = prepare_record(&catalog(), PermissionRecord::new("user", "/nowhere", true)).unwrap_err();

        assert_eq!(err, StoreError::UnknownPath { path: "/nowhere".to_string() });
        assert!(err.is_validation());
    }

    #[test]
    fn test_prepare_rejects_blank_role() {
        let err = prepare_record(&catalog(), PermissionRecord::new("  ", "/home", true)).unwrap_err();

        assert!(matches!(err, StoreError::Invalid { .. }));
    }
}
