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

//! HTTP client for the permission API
//!
//! [`HttpPermissionStore`] and [`HttpRoleSource`] let the core resolver, editor
//! and role provider work against a remote server. Transport failures and 5xx
//! answers surface as [`StoreError::Unavailable`], 4xx answers as validation
//! errors.

use crate::error::ProblemDetails;
use crate::models::{DeleteGrantResponse, NavigationResponse, PermissionsResponse, UpsertGrantRequest};
use async_trait::async_trait;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::{Method, Request, StatusCode};
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use rolenav_core::{Catalog, PermissionRecord, PermissionStore, RoleSource, StoreError, StoreResult};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Thin JSON client for the permission API
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    timeout: Duration,
    http: Client<HttpConnector, Full<Bytes>>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: DEFAULT_TIMEOUT,
            http: Client::builder(TokioExecutor::new()).build_http(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET /roles
    pub async fn roles(&self) -> StoreResult<Vec<String>> {
        self.send_json(Method::GET, "/roles", None).await
    }

    /// GET /permissions/{role}
    pub async fn permissions(&self, role: &str) -> StoreResult<Vec<PermissionRecord>> {
        let response: PermissionsResponse = self.send_json(Method::GET, &format!("/permissions/{}", urlencoding::encode(role)), None).await?;
        Ok(response.routes_data)
    }

    /// PUT /permissions
    pub async fn upsert(&self, request: &UpsertGrantRequest) -> StoreResult<PermissionRecord> {
        let body = serde_json::to_vec(request).map_err(|e| StoreError::Invalid { message: e.to_string() })?;
        self.send_json(Method::PUT, "/permissions", Some(body)).await.map_err(|e| match e {
            // The server reports the offending path in its problem details
            StoreError::UnknownPath { .. } => StoreError::UnknownPath { path: request.path.clone() },
            other => other,
        })
    }

    /// DELETE /permissions/{role}/{path}
    pub async fn delete(&self, role: &str, path: &str) -> StoreResult<bool> {
        let uri = format!("/permissions/{}/{}", urlencoding::encode(role), urlencoding::encode(path));
        let response: DeleteGrantResponse = self.send_json(Method::DELETE, &uri, None).await?;
        Ok(response.deleted)
    }

    /// GET /navigation/{role}
    pub async fn navigation(&self, role: &str) -> StoreResult<NavigationResponse> {
        self.send_json(Method::GET, &format!("/navigation/{}", urlencoding::encode(role)), None).await
    }

    /// GET /catalog
    pub async fn catalog(&self) -> StoreResult<Catalog> {
        let bytes = self.send(Method::GET, "/catalog", None).await?;
        let json = std::str::from_utf8(&bytes).map_err(|e| StoreError::unavailable(format!("catalog is not UTF-8: {}", e)))?;
        Catalog::from_json_str(json).map_err(|e| StoreError::unavailable(e.to_string()))
    }

    async fn send_json<T: DeserializeOwned>(&self, method: Method, path: &str, body: Option<Vec<u8>>) -> StoreResult<T> {
        let bytes = self.send(method, path, body).await?;
        serde_json::from_slice(&bytes).map_err(|e| StoreError::unavailable(format!("unexpected response from {}: {}", path, e)))
    }

    async fn send(&self, method: Method, path: &str, body: Option<Vec<u8>>) -> StoreResult<Bytes> {
        let uri = format!("{}{}", self.base_url, path);
        debug!("{} {}", method, uri);

        let mut builder = Request::builder().method(method).uri(&uri);
        if body.is_some() {
            builder = builder.header("content-type", "application/json");
        }
        let request = builder
            .body(Full::new(Bytes::from(body.unwrap_or_default())))
            .map_err(|e| StoreError::Invalid { message: format!("invalid request {}: {}", uri, e) })?;

        let response = tokio::time::timeout(self.timeout, self.http.request(request))
            .await
            .map_err(|_| StoreError::unavailable(format!("{} timed out after {:?}", uri, self.timeout)))?
            .map_err(|e| StoreError::unavailable(format!("{}: {}", uri, e)))?;

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .map_err(|e| StoreError::unavailable(format!("failed to read response from {}: {}", uri, e)))?
            .to_bytes();

        if status.is_success() {
            return Ok(bytes);
        }

        Err(status_error(status, &bytes))
    }
}

/// Map a failed response to a store error
fn status_error(status: StatusCode, body: &[u8]) -> StoreError {
    let problem: Option<ProblemDetails> = serde_json::from_slice(body).ok();
    let detail = problem.as_ref().map(|p| p.detail.clone()).unwrap_or_else(|| status.to_string());

    if status.is_client_error() {
        match problem.as_ref() {
            Some(p) if p.error_type() == "unknown_path" => StoreError::UnknownPath {
                path: p.extensions.get("path").and_then(|v| v.as_str()).unwrap_or_default().to_string(),
            },
            _ => StoreError::Invalid { message: detail },
        }
    } else {
        StoreError::Unavailable { message: detail }
    }
}

/// Permission store backed by a remote server
#[derive(Clone)]
pub struct HttpPermissionStore {
    client: ApiClient,
    catalog: Option<Arc<Catalog>>,
}

impl HttpPermissionStore {
    pub fn new(client: ApiClient) -> Self {
        Self { client, catalog: None }
    }

    /// Use a local catalog to fill titles and group labels on writes
    pub fn with_catalog(mut self, catalog: Arc<Catalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }
}

#[async_trait]
impl PermissionStore for HttpPermissionStore {
    async fn grants_for_role(&self, role: &str) -> StoreResult<Vec<PermissionRecord>> {
        self.client.permissions(role).await
    }

    async fn upsert_grant(&self, record: PermissionRecord) -> StoreResult<PermissionRecord> {
        let title = self.catalog.as_ref().and_then(|catalog| catalog.leaf(&record.path)).map(|leaf| leaf.title.clone());
        let group_name = match &self.catalog {
            Some(catalog) => catalog.group_of(&record.path).map(str::to_string),
            None => record.group_name,
        };

        let request = UpsertGrantRequest {
            title,
            path: record.path,
            role: record.role,
            group_name,
            is_allowed: record.is_allowed,
        };
        self.client.upsert(&request).await
    }

    async fn delete_grant(&self, role: &str, path: &str) -> StoreResult<bool> {
        self.client.delete(role, path).await
    }

    async fn roles(&self) -> StoreResult<Vec<String>> {
        self.client.roles().await
    }
}

/// Role source asking a remote server
#[derive(Clone)]
pub struct HttpRoleSource {
    client: ApiClient,
}

impl HttpRoleSource {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RoleSource for HttpRoleSource {
    async fn fetch_roles(&self) -> Result<Vec<String>, StoreError> {
        self.client.roles().await
    }
}
