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

//! Request handlers

pub mod catalog;
pub mod health;
pub mod navigation;
pub mod permissions;
pub mod roles;

use crate::error::ApiResult;
use http_body_util::Full;
use hyper::{Response, StatusCode, body::Bytes};
use serde::Serialize;

/// Serialize a body into a JSON response
pub(crate) fn json_response<T: Serialize>(status: StatusCode, body: &T) -> ApiResult<Response<Full<Bytes>>> {
    let response_json = serde_json::to_string(body)?;

    Ok(Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .body(Full::new(Bytes::from(response_json)))?)
}
