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

//! Request and response bodies of the permission API

use chrono::{DateTime, Utc};
use rolenav_core::{PermissionRecord, RenderNode};
use serde::{Deserialize, Serialize};

/// Body of `GET /permissions/{role}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionsResponse {
    #[serde(rename = "routesData")]
    pub routes_data: Vec<PermissionRecord>,
}

/// Body of `PUT /permissions`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpsertGrantRequest {
    /// Capability title, informational
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    pub path: String,

    pub role: String,

    #[serde(default, alias = "groupName")]
    pub group_name: Option<String>,

    #[serde(rename = "isAllowed")]
    pub is_allowed: bool,
}

impl UpsertGrantRequest {
    pub fn into_record(self) -> PermissionRecord {
        PermissionRecord {
            role: self.role,
            path: self.path,
            group_name: self.group_name,
            is_allowed: self.is_allowed,
        }
    }
}

/// Body of `GET /navigation/{role}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationResponse {
    pub role: String,
    pub items: Vec<RenderNode>,
}

/// Body of `DELETE /permissions/{role}/{path}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteGrantResponse {
    pub deleted: bool,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status
    pub status: String,
    /// Time of the check
    pub timestamp: DateTime<Utc>,
    /// Server version
    pub version: String,
    /// Version of the loaded catalog
    pub catalog_version: u32,
    /// Number of leaf capabilities in the catalog
    pub capabilities: usize,
    /// Whether the permission store answered
    pub store_reachable: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_request_shape() {
        let request: UpsertGrantRequest =
            serde_json::from_str(r#"{"title":"Departments","path":"/departments","role":"user","group_name":"Organization","isAllowed":true}"#).unwrap();

        assert_eq!(request.title.as_deref(), Some("Departments"));
        let record = request.into_record();
        assert_eq!(record, PermissionRecord::new("user", "/departments", true).with_group(Some("Organization".to_string())));
    }

    #[test]
    fn test_permissions_response_uses_routes_data() {
        let response = PermissionsResponse {
            routes_data: vec![PermissionRecord::new("user", "/home", true)],
        };
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["routesData"][0]["path"], "/home");
        assert_eq!(json["routesData"][0]["isAllowed"], true);
    }
}
