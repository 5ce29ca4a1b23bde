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

//! JSON file backed permission store
//!
//! The whole grant table is rewritten on every change through a temporary file
//! and an atomic rename. The in-memory table is only replaced once the rename
//! succeeded, so a failed write leaves both disk and memory untouched.

use super::{PermissionStore, StoreError, StoreResult, normalize_role, prepare_record};
use crate::catalog::Catalog;
use crate::record::PermissionRecord;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

const STORE_FORMAT_VERSION: u32 = 1;

/// A record together with its audit timestamp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredGrant {
    #[serde(flatten)]
    pub record: PermissionRecord,

    /// When the record was last written
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoreDocument {
    version: u32,
    grants: Vec<StoredGrant>,
}

type GrantTable = BTreeMap<(String, String), StoredGrant>;

/// Durable store persisted as a single JSON document
#[derive(Debug)]
pub struct FilePermissionStore {
    path: PathBuf,
    catalog: Arc<Catalog>,
    grants: Mutex<GrantTable>,
}

impl FilePermissionStore {
    /// Open a store, creating an empty one when the file does not exist yet
    pub async fn open(path: impl AsRef<Path>, catalog: Arc<Catalog>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();

        let grants = match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let document: StoreDocument = serde_json::from_slice(&bytes).map_err(|e| StoreError::unavailable(format!("corrupt store {}: {}", path.display(), e)))?;
                if document.version != STORE_FORMAT_VERSION {
                    return Err(StoreError::unavailable(format!("unsupported store format version {}", document.version)));
                }
                document.grants.into_iter().map(|grant| (grant.record.key(), grant)).collect::<GrantTable>()
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => GrantTable::new(),
            Err(e) => return Err(StoreError::unavailable(format!("failed to read {}: {}", path.display(), e))),
        };

        let orphaned = grants.keys().filter(|(_, grant_path)| !catalog.contains_path(grant_path)).count();
        if orphaned > 0 {
            warn!("{} stored grants reference paths missing from catalog v{}", orphaned, catalog.version());
        }

        info!("Opened permission store {} with {} grants", path.display(), grants.len());

        Ok(Self {
            path,
            catalog,
            grants: Mutex::new(grants),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Full stored entry including its audit timestamp
    pub async fn stored_grant(&self, role: &str, path: &str) -> Option<StoredGrant> {
        self.grants.lock().await.get(&(role.to_string(), path.to_string())).cloned()
    }

    async fn persist(&self, table: &GrantTable) -> StoreResult<()> {
        let document = StoreDocument {
            version: STORE_FORMAT_VERSION,
            grants: table.values().cloned().collect(),
        };
        let json = serde_json::to_vec_pretty(&document).map_err(|e| StoreError::unavailable(format!("failed to encode store: {}", e)))?;

        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::unavailable(format!("failed to create {}: {}", parent.display(), e)))?;
        }

        let tmp_path = self.path.with_extension("tmp");
        tokio::fs::write(&tmp_path, &json)
            .await
            .map_err(|e| StoreError::unavailable(format!("failed to write {}: {}", tmp_path.display(), e)))?;

        if let Err(e) = tokio::fs::rename(&tmp_path, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(StoreError::unavailable(format!("failed to replace {}: {}", self.path.display(), e)));
        }

        debug!("Persisted {} grants to {}", table.len(), self.path.display());
        Ok(())
    }
}

#[async_trait]
impl PermissionStore for FilePermissionStore {
    async fn grants_for_role(&self, role: &str) -> StoreResult<Vec<PermissionRecord>> {
        let role = normalize_role(role);
        let grants = self.grants.lock().await;
        Ok(grants.values().filter(|grant| grant.record.role == role).map(|grant| grant.record.clone()).collect())
    }

    async fn upsert_grant(&self, record: PermissionRecord) -> StoreResult<PermissionRecord> {
        let record = prepare_record(&self.catalog, record)?;
        let mut grants = self.grants.lock().await;

        if grants.get(&record.key()).is_some_and(|existing| existing.record == record) {
            debug!("Grant {} {} unchanged", record.role, record.path);
            return Ok(record);
        }

        let mut next = grants.clone();
        next.insert(
            record.key(),
            StoredGrant {
                record: record.clone(),
                updated_at: Utc::now(),
            },
        );

        self.persist(&next).await?;
        *grants = next;

        info!("Stored grant {} {} = {}", record.role, record.path, record.is_allowed);
        Ok(record)
    }

    async fn delete_grant(&self, role: &str, path: &str) -> StoreResult<bool> {
        let mut grants = self.grants.lock().await;
        let key = (normalize_role(role).to_string(), path.to_string());

        if !grants.contains_key(&key) {
            return Ok(false);
        }

        let mut next = grants.clone();
        next.remove(&key);
        self.persist(&next).await?;
        *grants = next;

        info!("Deleted grant {} {}", role, path);
        Ok(true)
    }

    async fn roles(&self) -> StoreResult<Vec<String>> {
        let grants = self.grants.lock().await;
        let roles: BTreeSet<&str> = grants.keys().map(|(role, _)| role.as_str()).collect();
        Ok(roles.into_iter().map(str::to_string).collect())
    }
}
