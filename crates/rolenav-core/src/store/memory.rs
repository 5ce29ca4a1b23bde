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

//! In-memory permission store

use super::{PermissionStore, StoreResult, normalize_role, prepare_record};
use crate::catalog::Catalog;
use crate::record::PermissionRecord;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::debug;

/// Volatile store keyed by (role, path)
#[derive(Debug)]
pub struct MemoryPermissionStore {
    catalog: Arc<Catalog>,
    grants: RwLock<BTreeMap<(String, String), PermissionRecord>>,
}

impl MemoryPermissionStore {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            grants: RwLock::new(BTreeMap::new()),
        }
    }

    /// Number of records across all roles
    pub fn len(&self) -> usize {
        self.grants.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.grants.read().is_empty()
    }
}

#[async_trait]
impl PermissionStore for MemoryPermissionStore {
    async fn grants_for_role(&self, role: &str) -> StoreResult<Vec<PermissionRecord>> {
        let role = normalize_role(role);
        let grants = self.grants.read();
        Ok(grants.values().filter(|record| record.role == role).cloned().collect())
    }

    async fn upsert_grant(&self, record: PermissionRecord) -> StoreResult<PermissionRecord> {
        let record = prepare_record(&self.catalog, record)?;
        debug!("Upserting grant {} {} = {}", record.role, record.path, record.is_allowed);
        self.grants.write().insert(record.key(), record.clone());
        Ok(record)
    }

    async fn delete_grant(&self, role: &str, path: &str) -> StoreResult<bool> {
        Ok(self.grants.write().remove(&(normalize_role(role).to_string(), path.to_string())).is_some())
    }

    async fn roles(&self) -> StoreResult<Vec<String>> {
        let grants = self.grants.read();
        let roles: BTreeSet<&str> = grants.keys().map(|(role, _)| role.as_str()).collect();
        Ok(roles.into_iter().map(str::to_string).collect())
    }
}
