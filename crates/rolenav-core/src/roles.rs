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

//! Role catalog provider
//!
//! Role names come from a single authoritative [`RoleSource`]. When that source
//! fails or answers with nothing, the provider degrades to [`FALLBACK_ROLES`] so
//! role selection is never empty. A store-backed source always lists the
//! default roles first so they stay selectable once other roles hold grants.

use crate::store::{PermissionStore, StoreError};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Default role list, used when the role source fails or has no roles
pub const FALLBACK_ROLES: [&str; 3] = ["admin", "manager", "user"];

pub fn fallback_roles() -> Vec<String> {
    FALLBACK_ROLES.iter().map(|role| role.to_string()).collect()
}

/// Authoritative list of known roles
#[async_trait]
pub trait RoleSource: Send + Sync {
    async fn fetch_roles(&self) -> Result<Vec<String>, StoreError>;
}

/// Roles fixed by configuration
#[derive(Debug, Clone)]
pub struct StaticRoleSource {
    roles: Vec<String>,
}

impl StaticRoleSource {
    pub fn new(roles: Vec<String>) -> Self {
        Self { roles }
    }
}

#[async_trait]
impl RoleSource for StaticRoleSource {
    async fn fetch_roles(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.roles.clone())
    }
}

/// Default roles followed by every role that has grants in a store
pub struct StoreRoleSource<S> {
    store: S,
}

impl<S: PermissionStore> StoreRoleSource<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S: PermissionStore> RoleSource for StoreRoleSource<S> {
    async fn fetch_roles(&self) -> Result<Vec<String>, StoreError> {
        let stored = self.store.roles().await?;
        Ok(fallback_roles().into_iter().chain(stored).collect())
    }
}

/// Supplies role names, never failing
#[derive(Clone)]
pub struct RoleProvider {
    source: Arc<dyn RoleSource>,
}

impl RoleProvider {
    pub fn new(source: Arc<dyn RoleSource>) -> Self {
        Self { source }
    }

    /// Known roles, or the fallback list when the source is unusable
    pub async fn list_roles(&self) -> Vec<String> {
        match self.source.fetch_roles().await {
            Ok(roles) => {
                let roles = normalize(roles);
                if roles.is_empty() {
                    warn!("Role source returned no roles, using fallback list");
                    fallback_roles()
                } else {
                    debug!("Loaded {} roles", roles.len());
                    roles
                }
            }
            Err(e) => {
                warn!("Failed to load roles, using fallback list: {}", e);
                fallback_roles()
            }
        }
    }
}

/// Trim, drop blanks and duplicates while keeping source order
fn normalize(roles: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    roles
        .into_iter()
        .map(|role| role.trim().to_string())
        .filter(|role| !role.is_empty() && seen.insert(role.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CapabilityNode, Catalog};
    use crate::record::PermissionRecord;
    use crate::store::MemoryPermissionStore;

    struct FailingSource;

    #[async_trait]
    impl RoleSource for FailingSource {
        async fn fetch_roles(&self) -> Result<Vec<String>, StoreError> {
            Err(StoreError::unavailable("connection refused"))
        }
    }

    #[tokio::test]
    async fn test_source_roles_are_used() {
        let provider = RoleProvider::new(Arc::new(StaticRoleSource::new(vec!["auditor".to_string(), " admin ".to_string(), "auditor".to_string()])));

        assert_eq!(provider.list_roles().await, vec!["auditor".to_string(), "admin".to_string()]);
    }

    #[tokio::test]
    async fn test_failure_falls_back() {
        let provider = RoleProvider::new(Arc::new(FailingSource));

        assert_eq!(provider.list_roles().await, vec!["admin", "manager", "user"]);
    }

    #[tokio::test]
    async fn test_store_roles_extend_defaults() {
        let catalog = Arc::new(Catalog::from_nodes(1, vec![CapabilityNode::leaf("Home", "/home", None)]).unwrap());
        let store = Arc::new(MemoryPermissionStore::new(catalog));
        store.upsert_grant(PermissionRecord::new("admin", "/home", true)).await.unwrap();
        store.upsert_grant(PermissionRecord::new("auditor", "/home", true)).await.unwrap();

        let provider = RoleProvider::new(Arc::new(StoreRoleSource::new(store)));

        assert_eq!(provider.list_roles().await, vec!["admin", "manager", "user", "auditor"]);
    }

    #[tokio::test]
    async fn test_empty_store_lists_defaults() {
        let catalog = Arc::new(Catalog::from_nodes(1, vec![CapabilityNode::leaf("Home", "/home", None)]).unwrap());
        let provider = RoleProvider::new(Arc::new(StoreRoleSource::new(MemoryPermissionStore::new(catalog))));

        assert_eq!(provider.list_roles().await, fallback_roles());
    }

    #[tokio::test]
    async fn test_empty_source_falls_back() {
        let provider = RoleProvider::new(Arc::new(StaticRoleSource::new(vec!["  ".to_string()])));

        assert_eq!(provider.list_roles().await, fallback_roles());
    }
}
