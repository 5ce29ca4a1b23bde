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

//! HTTP routing for the permission API

use crate::error::{ApiError, ApiResult};
use crate::handlers::{catalog, health, navigation, permissions, roles};
use crate::state::AppState;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response};
use tracing::{info, warn};

/// HTTP router for the permission API
pub struct Router {
    state: AppState,
}

impl Router {
    /// Create a new router
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Route a request, rendering failures as problem details
    pub async fn handle<B>(&self, req: Request<B>) -> Response<Full<Bytes>>
    where
        B: Body<Data = Bytes> + Send,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let instance = req.uri().path().to_string();
        match self.route(req).await {
            Ok(response) => response,
            Err(e) => e.into_response(&instance),
        }
    }

    /// Route a request to the appropriate handler
    pub async fn route<B>(&self, req: Request<B>) -> ApiResult<Response<Full<Bytes>>>
    where
        B: Body<Data = Bytes> + Send,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let path = req.uri().path().to_string();
        let method = req.method().clone();

        info!("Routing request: {} {}", method, path);

        let segments: Vec<&str> = path.trim_end_matches('/').split('/').collect();

        match (&method, segments.as_slice()) {
            (&Method::GET, ["", "health"]) => health::health_check(&self.state).await,
            (&Method::GET, ["", "roles"]) => roles::list_roles(&self.state).await,
            (&Method::GET, ["", "catalog"]) => catalog::get_catalog(&self.state).await,

            (&Method::PUT, ["", "permissions"]) => {
                let body = self.read_body(req).await?;
                permissions::upsert_permission(&self.state, body).await
            }
            (&Method::GET, ["", "permissions", role]) => permissions::get_permissions(&self.state, decode_segment(role)?).await,
            (&Method::DELETE, ["", "permissions", role, capability]) => permissions::delete_permission(&self.state, decode_segment(role)?, decode_segment(capability)?).await,

            (&Method::GET, ["", "navigation", role]) => navigation::get_navigation(&self.state, decode_segment(role)?).await,

            (_, ["", "health"] | ["", "roles"] | ["", "catalog"] | ["", "permissions", ..] | ["", "navigation", _]) => Err(ApiError::MethodNotAllowed {
                message: format!("{} is not supported on {}", method, path),
            }),

            _ => {
                warn!("Route not found: {} {}", method, path);
                Err(ApiError::NotFound {
                    message: format!("Route not found: {} {}", method, path),
                })
            }
        }
    }

    async fn read_body<B>(&self, req: Request<B>) -> ApiResult<Bytes>
    where
        B: Body<Data = Bytes> + Send,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let collected = Limited::new(req.into_body(), self.state.max_body_size).collect().await.map_err(|e| {
            if e.downcast_ref::<LengthLimitError>().is_some() {
                ApiError::PayloadTooLarge {
                    message: format!("request body exceeds {} bytes", self.state.max_body_size),
                }
            } else {
                ApiError::BadRequest {
                    message: format!("Failed to read request body: {}", e),
                }
            }
        })?;
        Ok(collected.to_bytes())
    }
}

/// Percent-decode one path segment
fn decode_segment(segment: &str) -> ApiResult<String> {
    let decoded = urlencoding::decode(segment).map_err(|e| ApiError::BadRequest {
        message: format!("Invalid path segment '{}': {}", segment, e),
    })?;

    if decoded.trim().is_empty() {
        return Err(ApiError::BadRequest {
            message: "Empty path segment".to_string(),
        });
    }

    Ok(decoded.into_owned())
}
