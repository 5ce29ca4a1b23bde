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

//! Role listing handler

use crate::error::ApiResult;
use crate::handlers::json_response;
use crate::state::AppState;
use http_body_util::Full;
use hyper::{Response, StatusCode, body::Bytes};
use tracing::info;

/// List known roles
/// GET /roles
pub async fn list_roles(state: &AppState) -> ApiResult<Response<Full<Bytes>>> {
    let roles = state.roles.list_roles().await;
    info!("Listing {} roles", roles.len());

    json_response(StatusCode::OK, &roles)
}
