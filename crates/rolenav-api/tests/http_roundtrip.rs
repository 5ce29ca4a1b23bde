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

//! End-to-end tests against a live server on a loopback port

use rolenav_api::models::UpsertGrantRequest;
use rolenav_api::{ApiClient, ApiServer, AppState, Config, HttpPermissionStore, HttpRoleSource};
use rolenav_core::{Catalog, PermissionEditor, PermissionRecord, PermissionResolver, PermissionStore, RoleProvider, Settlement, StoreError, ViewSession, fallback_roles};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;

async fn spawn_server(config: Config) -> SocketAddr {
    let state = AppState::from_config(&config).await.unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = ApiServer::with_state(addr, state);
    tokio::spawn(async move {
        let _ = server.serve(listener).await;
    });
    addr
}

fn config_in(dir: &TempDir) -> Config {
    Config {
        data_file: dir.path().join("grants.json"),
        ..Config::default()
    }
}

fn client_for(addr: SocketAddr) -> ApiClient {
    ApiClient::new(format!("http://{}", addr)).with_timeout(Duration::from_secs(5))
}

#[tokio::test]
async fn test_fresh_server_falls_back_to_default_roles() {
    let dir = TempDir::new().unwrap();
    let addr = spawn_server(config_in(&dir)).await;

    let roles = client_for(addr).roles().await.unwrap();

    assert_eq!(roles, fallback_roles());
}

#[tokio::test]
async fn test_grant_roundtrip_over_http() {
    let dir = TempDir::new().unwrap();
    let addr = spawn_server(config_in(&dir)).await;
    let client = client_for(addr);

    let stored = client
        .upsert(&UpsertGrantRequest {
            title: Some("Departments".to_string()),
            path: "/departments".to_string(),
            role: "manager".to_string(),
            group_name: None,
            is_allowed: true,
        })
        .await
        .unwrap();

    assert_eq!(stored.group_name.as_deref(), Some("Organization"));
    assert_eq!(client.permissions("manager").await.unwrap(), vec![stored]);
    assert!(client.permissions("user").await.unwrap().is_empty());
    assert_eq!(client.roles().await.unwrap(), fallback_roles());

    client
        .upsert(&UpsertGrantRequest {
            title: None,
            path: "/reports".to_string(),
            role: "auditor".to_string(),
            group_name: None,
            is_allowed: true,
        })
        .await
        .unwrap();
    assert_eq!(client.roles().await.unwrap(), vec!["admin", "manager", "user", "auditor"]);

    assert!(client.delete("manager", "/departments").await.unwrap());
    assert!(!client.delete("manager", "/departments").await.unwrap());
}

#[tokio::test]
async fn test_unknown_path_is_rejected_by_server() {
    let dir = TempDir::new().unwrap();
    let addr = spawn_server(config_in(&dir)).await;
    let store = HttpPermissionStore::new(client_for(addr));

    let result = store.upsert_grant(PermissionRecord::new("user", "/ghost", true)).await;

    assert_eq!(result, Err(StoreError::UnknownPath { path: "/ghost".to_string() }));
    assert!(store.grants_for_role("user").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_editor_over_http_commits_and_persists() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);
    let data_file = config.data_file.clone();
    let addr = spawn_server(config).await;

    let catalog = Arc::new(Catalog::builtin().unwrap());
    let store = HttpPermissionStore::new(client_for(addr)).with_catalog(catalog.clone());
    let editor = PermissionEditor::new(store, catalog.clone());

    editor.load_role("user").await.unwrap();
    assert_eq!(editor.toggle("user", "/attendance", true).await.unwrap(), Settlement::Committed);
    assert_eq!(editor.toggle("user", "/reports", true).await.unwrap(), Settlement::Committed);
    assert!(editor.value("user", "/attendance"));

    // A second process reading the data file sees the same grants
    let reopened = rolenav_core::FilePermissionStore::open(&data_file, catalog).await.unwrap();
    let paths: Vec<String> = reopened.grants_for_role("user").await.unwrap().into_iter().map(|r| r.path).collect();
    assert_eq!(paths, vec!["/attendance".to_string(), "/reports".to_string()]);
}

#[tokio::test]
async fn test_navigation_matches_local_composition() {
    let dir = TempDir::new().unwrap();
    let addr = spawn_server(config_in(&dir)).await;
    let client = client_for(addr);
    let catalog = Arc::new(client.catalog().await.unwrap());
    let store = HttpPermissionStore::new(client.clone()).with_catalog(catalog.clone());

    for path in ["/dashboard", "/departments", "/payroll/payslips"] {
        store.upsert_grant(PermissionRecord::new("user", path, true)).await.unwrap();
    }

    let remote = client.navigation("user").await.unwrap();

    let session = ViewSession::new();
    assert!(session.switch_to("user", &PermissionResolver::new(store)).await);
    let local = session.navigation(&catalog, &rolenav_core::Composer::new());

    assert_eq!(remote.items, local);
    // Two populated groups collapse into a flat list
    assert!(remote.items.iter().all(|item| !item.is_group()));
    assert_eq!(remote.items.len(), 3);
}

#[tokio::test]
async fn test_unreachable_server_fails_closed() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client_for(addr);
    let resolver = PermissionResolver::new(HttpPermissionStore::new(client.clone()));
    let roles = RoleProvider::new(Arc::new(HttpRoleSource::new(client)));

    assert!(resolver.resolve("admin").await.is_empty());
    assert_eq!(roles.list_roles().await, fallback_roles());
}
