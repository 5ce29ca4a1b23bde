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

//! Permission resolver: role -> allowed paths

use crate::record::AllowedSet;
use crate::store::{PermissionStore, StoreResult};
use tracing::{debug, instrument, warn};

/// Derives the allowed-path set of a role from its stored grants
pub struct PermissionResolver<S> {
    store: S,
}

impl<S: PermissionStore> PermissionResolver<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Resolve, reporting store failures to the caller
    #[instrument(skip(self))]
    pub async fn try_resolve(&self, role: &str) -> StoreResult<AllowedSet> {
        let records = self.store.grants_for_role(role).await?;
        let allowed = AllowedSet::from_records(records.iter().filter(|record| record.role == role));
        debug!("Role {} has {} of {} records allowed", role, allowed.len(), records.len());
        Ok(allowed)
    }

    /// Resolve, denying everything when the store cannot be read
    pub async fn resolve(&self, role: &str) -> AllowedSet {
        match self.try_resolve(role).await {
            Ok(allowed) => allowed,
            Err(e) => {
                warn!("Failed to resolve permissions for {}, denying all: {}", role, e);
                AllowedSet::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CapabilityNode, Catalog};
    use crate::record::PermissionRecord;
    use crate::store::{MemoryPermissionStore, StoreError};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct UnreachableStore;

    #[async_trait]
    impl PermissionStore for UnreachableStore {
        async fn grants_for_role(&self, _role: &str) -> StoreResult<Vec<PermissionRecord>> {
            Err(StoreError::unavailable("timeout"))
        }

        async fn upsert_grant(&self, _record: PermissionRecord) -> StoreResult<PermissionRecord> {
            Err(StoreError::unavailable("timeout"))
        }

        async fn delete_grant(&self, _role: &str, _path: &str) -> StoreResult<bool> {
            Err(StoreError::unavailable("timeout"))
        }

        async fn roles(&self) -> StoreResult<Vec<String>> {
            Err(StoreError::unavailable("timeout"))
        }
    }

    fn memory_store() -> Arc<MemoryPermissionStore> {
        let catalog = Catalog::from_nodes(1, vec![CapabilityNode::leaf("Home", "/home", None), CapabilityNode::leaf("Reports", "/reports", None)]).unwrap();
        Arc::new(MemoryPermissionStore::new(Arc::new(catalog)))
    }

    #[tokio::test]
    async fn test_role_without_records_is_denied_everything() {
        let resolver = PermissionResolver::new(memory_store());

        assert!(resolver.resolve("user").await.is_empty());
    }

    #[tokio::test]
    async fn test_only_granted_paths_are_allowed() {
        let store = memory_store();
        store.upsert_grant(PermissionRecord::new("user", "/home", true)).await.unwrap();
        store.upsert_grant(PermissionRecord::new("user", "/reports", false)).await.unwrap();
        let resolver = PermissionResolver::new(store);

        let allowed = resolver.resolve("user").await;
        assert!(allowed.contains("/home"));
        assert!(!allowed.contains("/reports"));
    }

    #[tokio::test]
    async fn test_roles_are_isolated() {
        let store = memory_store();
        store.upsert_grant(PermissionRecord::new("admin", "/reports", true)).await.unwrap();
        let resolver = PermissionResolver::new(store);

        assert!(resolver.resolve("admin").await.contains("/reports"));
        assert!(resolver.resolve("manager").await.is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_fails_closed() {
        let resolver = PermissionResolver::new(UnreachableStore);

        assert!(resolver.try_resolve("admin").await.is_err());
        assert!(resolver.resolve("admin").await.is_empty());
    }
}
