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

//! Health check handler

use crate::error::ApiResult;
use crate::handlers::json_response;
use crate::models::HealthResponse;
use crate::state::AppState;
use chrono::Utc;
use http_body_util::Full;
use hyper::{Response, StatusCode, body::Bytes};
use tracing::info;

/// Health check handler
/// GET /health
pub async fn health_check(state: &AppState) -> ApiResult<Response<Full<Bytes>>> {
    info!("Processing health check request");

    let store_reachable = state.store.roles().await.is_ok();

    let health_response = HealthResponse {
        status: if store_reachable { "healthy".to_string() } else { "degraded".to_string() },
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        catalog_version: state.catalog.version(),
        capabilities: state.catalog.leaf_count(),
        store_reachable,
    };

    let status_code = if store_reachable { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };

    json_response(status_code, &health_response)
}
