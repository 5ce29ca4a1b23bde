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

//! Navigation handler

use crate::error::ApiResult;
use crate::handlers::json_response;
use crate::models::NavigationResponse;
use crate::state::AppState;
use http_body_util::Full;
use hyper::{Response, StatusCode, body::Bytes};
use tracing::{info, instrument};

/// Composed navigation for a role
/// GET /navigation/{role}
///
/// Store failures render an empty navigation rather than an error.
#[instrument(skip(state))]
pub async fn get_navigation(state: &AppState, role: String) -> ApiResult<Response<Full<Bytes>>> {
    let allowed = state.resolver().resolve(&role).await;
    let items = state.composer.compose(&state.catalog, &allowed);

    info!("Navigation for {} has {} top-level entries", role, items.len());

    json_response(StatusCode::OK, &NavigationResponse { role, items })
}
