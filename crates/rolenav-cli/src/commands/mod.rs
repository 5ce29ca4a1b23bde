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

pub mod catalog;
pub mod config;
pub mod grants;
pub mod nav;
pub mod roles;
pub mod serve;

use crate::config::RolenavConfig;
use anyhow::Result;
use rolenav_api::{ApiClient, HttpPermissionStore, HttpRoleSource};
use rolenav_core::{Catalog, Composer, FilePermissionStore, PermissionStore, RoleProvider, RoleSource, StaticRoleSource, StoreRoleSource};
use std::sync::Arc;
use tracing::{info, warn};

/// Everything a subcommand needs, wired for local or remote mode
pub struct CommandContext {
    pub catalog: Arc<Catalog>,
    pub store: Arc<dyn PermissionStore>,
    pub roles: RoleProvider,
    pub composer: Composer,
}

impl CommandContext {
    pub async fn new(config: &RolenavConfig) -> Result<Self> {
        let local_catalog = match &config.catalog_path {
            Some(path) => Catalog::from_path(path)?,
            None => Catalog::builtin()?,
        };

        let (catalog, store, role_source): (Arc<Catalog>, Arc<dyn PermissionStore>, Arc<dyn RoleSource>) = match &config.server_url {
            Some(url) => {
                let client = ApiClient::new(url.clone());
                // The server's catalog is authoritative when it can be reached
                let catalog = Arc::new(match client.catalog().await {
                    Ok(remote) => remote,
                    Err(e) => {
                        warn!("Using local catalog, {} did not answer: {}", url, e);
                        local_catalog
                    }
                });
                info!("Using permission API at {}", url);
                let store: Arc<dyn PermissionStore> = Arc::new(HttpPermissionStore::new(client.clone()).with_catalog(catalog.clone()));
                let role_source: Arc<dyn RoleSource> = Arc::new(HttpRoleSource::new(client));
                (catalog, store, role_source)
            }
            None => {
                let catalog = Arc::new(local_catalog);
                info!("Using grant file {}", config.data_file.display());
                let store: Arc<dyn PermissionStore> = Arc::new(FilePermissionStore::open(&config.data_file, catalog.clone()).await?);
                let role_source: Arc<dyn RoleSource> = if config.roles.is_empty() {
                    Arc::new(StoreRoleSource::new(store.clone()))
                } else {
                    Arc::new(StaticRoleSource::new(config.roles.clone()))
                };
                (catalog, store, role_source)
            }
        };

        Ok(Self {
            composer: Composer::with_threshold(config.collapse_threshold),
            catalog,
            store,
            roles: RoleProvider::new(role_source),
        })
    }
}
