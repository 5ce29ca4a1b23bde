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

//! Error handling for the permission API
//! Implements RFC 7807 Problem Details format

use http_body_util::Full;
use hyper::header::{CACHE_CONTROL, CONTENT_TYPE, HeaderValue};
use hyper::{Response, StatusCode, body::Bytes};
use rolenav_core::{CatalogError, StoreError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::error;

/// Base of the problem type URIs
pub const PROBLEM_TYPE_BASE: &str = "urn:rolenav:problem:";

/// API error types following REST conventions
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Method not allowed: {message}")]
    MethodNotAllowed { message: String },

    #[error("Payload too large: {message}")]
    PayloadTooLarge { message: String },

    #[error("Unknown capability path: {path}")]
    UnknownPath { path: String },

    #[error("Unprocessable entity: {message}")]
    UnprocessableEntity { message: String },

    #[error("Internal server error: {message}")]
    InternalServerError { message: String },

    #[error("Service unavailable: {message}")]
    ServiceUnavailable { message: String },

    #[error("Catalog error: {0}")]
    CatalogError(#[from] CatalogError),

    #[error("Serde JSON error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),

    #[error("Hyper error: {0}")]
    HyperError(#[from] hyper::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    HttpError(String),
}

impl ApiError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::UnknownPath { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::UnprocessableEntity { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::SerdeJsonError(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error type identifier
    pub fn error_type(&self) -> &'static str {
        match self {
            ApiError::BadRequest { .. } => "bad_request",
            ApiError::NotFound { .. } => "not_found",
            ApiError::MethodNotAllowed { .. } => "method_not_allowed",
            ApiError::PayloadTooLarge { .. } => "payload_too_large",
            ApiError::UnknownPath { .. } => "unknown_path",
            ApiError::UnprocessableEntity { .. } => "unprocessable_entity",
            ApiError::InternalServerError { .. } => "internal_server_error",
            ApiError::ServiceUnavailable { .. } => "service_unavailable",
            ApiError::CatalogError(_) => "catalog_error",
            ApiError::SerdeJsonError(_) => "json_error",
            ApiError::HyperError(_) => "http_error",
            ApiError::IoError(_) => "io_error",
            ApiError::HttpError(_) => "http_error",
        }
    }

    /// Render the error as a problem details response
    pub fn into_response(self, instance: &str) -> Response<Full<Bytes>> {
        let status_code = self.status_code();
        let problem_details = ProblemDetails::new(&self, instance.to_string());

        if status_code.is_server_error() {
            error!("API Error: {} - {}", status_code, self);
        }

        let json = match serde_json::to_string(&problem_details) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize error response: {}", e);
                format!(
                    r#"{{"type":"{}internal_server_error","title":"Internal Server Error","status":500,"detail":"An internal error occurred","instance":"/"}}"#,
                    PROBLEM_TYPE_BASE
                )
            }
        };

        let mut response = Response::new(Full::new(Bytes::from(json)));
        *response.status_mut() = status_code;
        response.headers_mut().insert(CONTENT_TYPE, HeaderValue::from_static("application/problem+json"));
        response.headers_mut().insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        response
    }
}

/// RFC 7807 Problem Details response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ProblemDetails {
    /// A URI reference that identifies the problem type
    #[serde(rename = "type")]
    pub problem_type: String,

    /// A short, human-readable summary of the problem type
    pub title: String,

    /// The HTTP status code generated by the origin server
    pub status: u16,

    /// A human-readable explanation specific to this occurrence
    pub detail: String,

    /// A URI reference that identifies the specific occurrence
    pub instance: String,

    /// Additional extension members
    #[serde(flatten)]
    pub extensions: HashMap<String, serde_json::Value>,
}

impl ProblemDetails {
    /// Create a new problem details response
    pub fn new(error: &ApiError, instance: String) -> Self {
        let status_code = error.status_code();
        let mut details = Self {
            problem_type: format!("{}{}", PROBLEM_TYPE_BASE, error.error_type()),
            title: status_code.canonical_reason().unwrap_or("Unknown Error").to_string(),
            status: status_code.as_u16(),
            detail: error.to_string(),
            instance,
            extensions: HashMap::new(),
        };

        if let ApiError::UnknownPath { path } = error {
            details = details.with_extension("path".to_string(), serde_json::Value::String(path.clone()));
        }

        details
    }

    /// Add extension data to the problem details
    pub fn with_extension(mut self, key: String, value: serde_json::Value) -> Self {
        self.extensions.insert(key, value);
        self
    }

    /// Error type identifier without the URI prefix
    pub fn error_type(&self) -> &str {
        self.problem_type.strip_prefix(PROBLEM_TYPE_BASE).unwrap_or(&self.problem_type)
    }
}

/// Convert ApiError to HTTP response
impl From<ApiError> for Response<Full<Bytes>> {
    fn from(error: ApiError) -> Self {
        error.into_response("/")
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

impl From<hyper::http::Error> for ApiError {
    fn from(err: hyper::http::Error) -> Self {
        ApiError::HttpError(err.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UnknownPath { path } => ApiError::UnknownPath { path },
            StoreError::Invalid { message } => ApiError::UnprocessableEntity { message },
            StoreError::Unavailable { message } => ApiError::ServiceUnavailable { message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[test]
    fn test_store_errors_map_to_status_codes() {
        assert_eq!(ApiError::from(StoreError::UnknownPath { path: "/x".to_string() }).status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(ApiError::from(StoreError::Invalid { message: "empty role".to_string() }).status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(ApiError::from(StoreError::unavailable("disk full")).status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_problem_details_for_unknown_path() {
        let details = ProblemDetails::new(&ApiError::UnknownPath { path: "/ghost".to_string() }, "/permissions".to_string());

        assert_eq!(details.status, 422);
        assert_eq!(details.error_type(), "unknown_path");
        assert_eq!(details.title, "Unprocessable Entity");
        assert_eq!(details.extensions["path"], "/ghost");
    }

    #[tokio::test]
    async fn test_error_response_body() {
        let response = ApiError::NotFound { message: "Route not found".to_string() }.into_response("/nope");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/problem+json");

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let details: ProblemDetails = serde_json::from_slice(&body).unwrap();
        assert_eq!(details.instance, "/nope");
        assert_eq!(details.error_type(), "not_found");
    }
}
