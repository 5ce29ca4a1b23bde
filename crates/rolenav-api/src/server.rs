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

//! HTTP server implementation using Hyper

use crate::config::Config;
use crate::error::{ApiError, ApiResult};
use crate::router::Router;
use crate::state::AppState;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::Request;
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

/// API server using Hyper
pub struct ApiServer {
    bind_address: SocketAddr,
    router: Arc<Router>,
}

impl ApiServer {
    /// Create a new API server from configuration
    pub async fn new(config: Config) -> ApiResult<Self> {
        // Parse bind address
        let bind_address: SocketAddr = config.bind_address.parse().map_err(|e| ApiError::BadRequest {
            message: format!("Invalid bind address: {}", e),
        })?;

        let state = AppState::from_config(&config).await?;

        info!("API server created successfully");

        Ok(Self::with_state(bind_address, state))
    }

    /// Create a server around prepared state
    pub fn with_state(bind_address: SocketAddr, state: AppState) -> Self {
        Self {
            bind_address,
            router: Arc::new(Router::new(state)),
        }
    }

    /// Get the bind address
    pub fn bind_address(&self) -> SocketAddr {
        self.bind_address
    }

    /// Bind the configured address and start serving
    pub async fn run(self) -> ApiResult<()> {
        let listener = TcpListener::bind(self.bind_address).await?;
        self.serve(listener).await
    }

    /// Serve connections from an already bound listener
    pub async fn serve(self, listener: TcpListener) -> ApiResult<()> {
        info!("Rolenav permission API listening on http://{}", listener.local_addr()?);

        // Accept connections
        loop {
            let (stream, remote_addr) = match listener.accept().await {
                Ok(conn) => conn,
                Err(e) => {
                    error!("Failed to accept connection: {}", e);
                    continue;
                }
            };

            let io = TokioIo::new(stream);
            let router = self.router.clone();

            // Spawn a task to handle the connection
            tokio::task::spawn(async move {
                let service = service_fn(move |req: Request<Incoming>| {
                    let router = router.clone();
                    async move { Ok::<_, Infallible>(router.handle(req).await) }
                });

                // Serve the connection
                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    error!("Error serving connection from {}: {}", remote_addr, err);
                }
            });
        }
    }
}
