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

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RolenavConfig {
    /// Grant file used when no server is configured
    pub data_file: PathBuf,
    /// Remote permission API; local file mode when unset
    pub server_url: Option<String>,
    pub catalog_path: Option<PathBuf>,
    /// Authoritative role list; derived from stored grants when empty
    pub roles: Vec<String>,
    pub collapse_threshold: usize,
    pub serve: ServeConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    pub bind_address: String,
    pub max_body_size: usize,
}

impl Default for RolenavConfig {
    fn default() -> Self {
        Self {
            data_file: dirs::data_local_dir().unwrap_or_else(|| PathBuf::from(".")).join("rolenav").join("grants.json"),
            server_url: None,
            catalog_path: None,
            roles: Vec::new(),
            collapse_threshold: rolenav_core::COLLAPSE_THRESHOLD,
            serve: ServeConfig::default(),
        }
    }
}

impl Default for ServeConfig {
    fn default() -> Self {
        let api = rolenav_api::Config::default();
        Self {
            bind_address: api.bind_address,
            max_body_size: api.max_body_size,
        }
    }
}

impl RolenavConfig {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let config: Self = toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn resolve_config(cli_config: Option<PathBuf>, cli_server: Option<String>, cli_data_file: Option<PathBuf>) -> Result<Self> {
        Self::resolve_with(cli_config, cli_server, cli_data_file, |key| std::env::var(key).ok())
    }

    /// Resolve with an explicit environment lookup
    pub fn resolve_with(cli_config: Option<PathBuf>, cli_server: Option<String>, cli_data_file: Option<PathBuf>, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = if let Some(config_path) = cli_config {
            Self::load_from_file(config_path)?
        } else if let Some(env_config) = env("ROLENAV_CONFIG") {
            Self::load_from_file(env_config)?
        } else {
            Self::default()
        };

        // CLI flags override environment settings
        if let Some(server) = cli_server {
            config.server_url = Some(server);
        } else if let Some(env_server) = env("ROLENAV_SERVER_URL") {
            config.server_url = Some(env_server);
        }

        if let Some(data_file) = cli_data_file {
            config.data_file = data_file;
        } else if let Some(env_data_file) = env("ROLENAV_DATA_FILE") {
            config.data_file = PathBuf::from(env_data_file);
        }

        config.server_url = config.server_url.filter(|url| !url.trim().is_empty());
        Ok(config)
    }

    /// Server configuration for `rolenav serve`
    pub fn api_config(&self) -> rolenav_api::Config {
        rolenav_api::Config {
            bind_address: self.serve.bind_address.clone(),
            data_file: self.data_file.clone(),
            catalog_path: self.catalog_path.clone(),
            roles: self.roles.clone(),
            collapse_threshold: self.collapse_threshold,
            max_body_size: self.serve.max_body_size,
        }
    }
}
