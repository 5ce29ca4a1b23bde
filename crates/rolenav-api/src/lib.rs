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

//! Rolenav permission API
//!
//! HTTP surface over the role permission store: role listing, grant reads and
//! writes, the capability catalog and composed navigation. The [`client`]
//! module talks to the same surface so the core editor and resolver can run
//! against a remote server.

pub mod client;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod server;
pub mod state;

pub use client::{ApiClient, HttpPermissionStore, HttpRoleSource};
pub use config::Config;
pub use error::{ApiError, ApiResult, ProblemDetails};
pub use server::ApiServer;
pub use state::AppState;
