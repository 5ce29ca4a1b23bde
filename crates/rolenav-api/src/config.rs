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

//! Configuration management for the permission API server

use rolenav_core::COLLAPSE_THRESHOLD;
use std::env;
use std::path::PathBuf;

/// Configuration for the permission API server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Address to bind the HTTP server to
    pub bind_address: String,

    /// JSON file holding the permission records
    pub data_file: PathBuf,

    /// Catalog artifact; the built-in catalog is used when unset
    pub catalog_path: Option<PathBuf>,

    /// Authoritative role list; roles are taken from the store when empty
    pub roles: Vec<String>,

    /// Populated groups required before the navigation stays grouped
    pub collapse_threshold: usize,

    /// Maximum request body size in bytes
    pub max_body_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
            data_file: PathBuf::from("rolenav-grants.json"),
            catalog_path: None,
            roles: Vec::new(),
            collapse_threshold: COLLAPSE_THRESHOLD,
            max_body_size: 64 * 1024, // 64KB
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            bind_address: lookup("ROLENAV_BIND_ADDRESS").unwrap_or(defaults.bind_address),

            data_file: lookup("ROLENAV_DATA_FILE").map(PathBuf::from).unwrap_or(defaults.data_file),

            catalog_path: lookup("ROLENAV_CATALOG_PATH").filter(|v| !v.trim().is_empty()).map(PathBuf::from),

            roles: lookup("ROLENAV_ROLES")
                .map(|v| v.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect())
                .unwrap_or(defaults.roles),

            collapse_threshold: lookup("ROLENAV_COLLAPSE_THRESHOLD").and_then(|v| v.parse().ok()).unwrap_or(defaults.collapse_threshold),

            max_body_size: lookup("ROLENAV_MAX_BODY_SIZE").and_then(|v| v.parse().ok()).unwrap_or(defaults.max_body_size),
        }
    }
}
