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

//! Permission record handlers

use crate::error::{ApiError, ApiResult};
use crate::handlers::json_response;
use crate::models::{DeleteGrantResponse, PermissionsResponse, UpsertGrantRequest};
use crate::state::AppState;
use http_body_util::Full;
use hyper::{Response, StatusCode, body::Bytes};
use tracing::{info, instrument, warn};

/// All records of a role
/// GET /permissions/{role}
#[instrument(skip(state))]
pub async fn get_permissions(state: &AppState, role: String) -> ApiResult<Response<Full<Bytes>>> {
    let routes_data = state.store.grants_for_role(&role).await?;
    info!("Returning {} records for {}", routes_data.len(), role);

    json_response(StatusCode::OK, &PermissionsResponse { routes_data })
}

/// Upsert one record
/// PUT /permissions
pub async fn upsert_permission(state: &AppState, body: Bytes) -> ApiResult<Response<Full<Bytes>>> {
    let request: UpsertGrantRequest = serde_json::from_slice(&body).map_err(|e| ApiError::BadRequest {
        message: format!("Invalid permission body: {}", e),
    })?;

    let stored = state.store.upsert_grant(request.into_record()).await.inspect_err(|e| warn!("Rejected grant write: {}", e))?;
    info!("Grant {} {} = {}", stored.role, stored.path, stored.is_allowed);

    json_response(StatusCode::OK, &stored)
}

/// Remove one record
/// DELETE /permissions/{role}/{path}
#[instrument(skip(state))]
pub async fn delete_permission(state: &AppState, role: String, path: String) -> ApiResult<Response<Full<Bytes>>> {
    let deleted = state.store.delete_grant(&role, &path).await?;

    json_response(StatusCode::OK, &DeleteGrantResponse { deleted })
}
