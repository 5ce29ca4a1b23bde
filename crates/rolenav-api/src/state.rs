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

//! Shared server state

use crate::config::Config;
use crate::error::ApiResult;
use rolenav_core::{Catalog, Composer, FilePermissionStore, PermissionResolver, PermissionStore, RoleProvider, RoleSource, StaticRoleSource, StoreRoleSource};
use std::sync::Arc;
use tracing::info;

/// Everything a request handler needs
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub store: Arc<dyn PermissionStore>,
    pub roles: RoleProvider,
    pub composer: Composer,
    pub max_body_size: usize,
}

impl AppState {
    pub fn new(catalog: Arc<Catalog>, store: Arc<dyn PermissionStore>, roles: RoleProvider, composer: Composer) -> Self {
        Self {
            catalog,
            store,
            roles,
            composer,
            max_body_size: Config::default().max_body_size,
        }
    }

    /// Build the state described by a configuration
    pub async fn from_config(config: &Config) -> ApiResult<Self> {
        let catalog = Arc::new(match &config.catalog_path {
            Some(path) => Catalog::from_path(path)?,
            None => Catalog::builtin()?,
        });
        info!("Using catalog v{} with {} capabilities", catalog.version(), catalog.leaf_count());

        let store: Arc<dyn PermissionStore> = Arc::new(FilePermissionStore::open(&config.data_file, catalog.clone()).await?);

        let role_source: Arc<dyn RoleSource> = if config.roles.is_empty() {
            Arc::new(StoreRoleSource::new(store.clone()))
        } else {
            Arc::new(StaticRoleSource::new(config.roles.clone()))
        };

        Ok(Self {
            catalog,
            store,
            roles: RoleProvider::new(role_source),
            composer: Composer::with_threshold(config.collapse_threshold),
            max_body_size: config.max_body_size,
        })
    }

    /// Resolver over the shared store
    pub fn resolver(&self) -> PermissionResolver<Arc<dyn PermissionStore>> {
        PermissionResolver::new(self.store.clone())
    }
}
