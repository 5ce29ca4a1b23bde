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

//! Permission editor
//!
//! Every (role, path) pair is an independent control. A toggle applies the new
//! value locally right away, writes it to the store, and then either commits
//! or rolls back to the last value the store accepted:
//!
//! ```text
//! Unchanged -> Toggling -> Committed
//!                       -> RolledBack
//! ```
//!
//! A control may be toggled again while a write is still in flight. Each toggle
//! issues its own write; only the settlement of the newest toggle decides what
//! the control shows.

use crate::catalog::Catalog;
use crate::record::{AllowedSet, PermissionRecord};
use crate::store::{PermissionStore, StoreError, StoreResult};
use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

/// Lifecycle of a single grant control
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ToggleState {
    Unchanged,
    Toggling,
    Committed,
    RolledBack { reason: String },
}

/// Identity of a grant control
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GrantKey {
    pub role: String,
    pub path: String,
}

impl GrantKey {
    pub fn new(role: impl Into<String>, path: impl Into<String>) -> Self {
        Self { role: role.into(), path: path.into() }
    }
}

/// Local state of one grant control
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantControl {
    value: bool,
    state: ToggleState,
    in_flight: usize,
    latest_seq: u64,
    /// Last value known to be in the store; rollbacks return here
    committed: bool,
    committed_seq: u64,
}

impl GrantControl {
    fn new(value: bool) -> Self {
        Self {
            value,
            state: ToggleState::Unchanged,
            in_flight: 0,
            latest_seq: 0,
            committed: value,
            committed_seq: 0,
        }
    }

    /// Value currently shown
    pub fn value(&self) -> bool {
        self.value
    }

    pub fn state(&self) -> &ToggleState {
        &self.state
    }

    /// True while a write for this control has not settled; the UI disables it
    pub fn is_busy(&self) -> bool {
        self.in_flight > 0
    }
}

/// Handle for a toggle whose write has not settled yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleTicket {
    key: GrantKey,
    seq: u64,
    previous: bool,
    desired: bool,
}

impl ToggleTicket {
    pub fn key(&self) -> &GrantKey {
        &self.key
    }

    pub fn desired(&self) -> bool {
        self.desired
    }

    pub fn previous(&self) -> bool {
        self.previous
    }
}

/// Outcome of settling a toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    Committed,
    RolledBack,
    /// A newer toggle on the same control owns the displayed state
    Superseded,
}

/// Errors surfaced to the operator; none of them end the session
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditorError {
    #[error("{path} is not a capability in the catalog")]
    UnknownPath { path: String },

    #[error("grant {role} {path} was rolled back: {source}")]
    RolledBack {
        role: String,
        path: String,
        #[source]
        source: StoreError,
    },
}

/// Row of the editor table for one role
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GrantView {
    pub title: String,
    pub path: String,
    pub group_name: Option<String>,
    pub value: bool,
    pub busy: bool,
    pub state: ToggleState,
}

/// Administrative editor over a permission store
pub struct PermissionEditor<S> {
    store: S,
    catalog: Arc<Catalog>,
    controls: DashMap<GrantKey, GrantControl>,
    next_seq: AtomicU64,
}

impl<S: PermissionStore> PermissionEditor<S> {
    pub fn new(store: S, catalog: Arc<Catalog>) -> Self {
        Self {
            store,
            catalog,
            controls: DashMap::new(),
            next_seq: AtomicU64::new(1),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Seed the controls of a role from the store
    ///
    /// On failure every control of the role shows as denied and the error is
    /// returned so it can be reported.
    #[instrument(skip(self))]
    pub async fn load_role(&self, role: &str) -> StoreResult<()> {
        let result = self.store.grants_for_role(role).await;
        let allowed = match &result {
            Ok(records) => AllowedSet::from_records(records),
            Err(e) => {
                warn!("Failed to load grants for {}: {}", role, e);
                AllowedSet::new()
            }
        };

        for (_, leaf) in self.catalog.leaves() {
            let Some(path) = leaf.path.as_deref() else { continue };
            let key = GrantKey::new(role, path);
            // Controls with a write in flight keep their optimistic value
            if self.controls.get(&key).is_some_and(|control| control.is_busy()) {
                continue;
            }
            self.controls.insert(key, GrantControl::new(allowed.contains(path)));
        }

        debug!("Loaded {} controls for {}", self.catalog.leaf_count(), role);
        result.map(|_| ())
    }

    /// Current local state of a control
    pub fn control(&self, role: &str, path: &str) -> Option<GrantControl> {
        self.controls.get(&GrantKey::new(role, path)).map(|control| control.clone())
    }

    /// Value shown for a control; unknown controls show as denied
    pub fn value(&self, role: &str, path: &str) -> bool {
        self.control(role, path).is_some_and(|control| control.value())
    }

    /// Editor rows for a role in catalog order
    pub fn snapshot(&self, role: &str) -> Vec<GrantView> {
        self.catalog
            .leaves()
            .filter_map(|(group, leaf)| {
                let path = leaf.path.clone()?;
                let control = self.control(role, &path).unwrap_or_else(|| GrantControl::new(false));
                Some(GrantView {
                    title: leaf.title.clone(),
                    path,
                    group_name: group.map(str::to_string),
                    value: control.value,
                    busy: control.is_busy(),
                    state: control.state,
                })
            })
            .collect()
    }

    /// Locally patched allowed set of a role, reflecting optimistic values
    pub fn allowed_set(&self, role: &str) -> AllowedSet {
        self.controls.iter().filter(|entry| entry.key().role == role && entry.value().value).map(|entry| entry.key().path.clone()).collect()
    }

    /// Apply a toggle locally and hand out the ticket for its write
    pub fn begin_toggle(&self, role: &str, path: &str, desired: bool) -> Result<ToggleTicket, EditorError> {
        if !self.catalog.contains_path(path) {
            return Err(EditorError::UnknownPath { path: path.to_string() });
        }

        let key = GrantKey::new(role, path);
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);

        let mut control = self.controls.entry(key.clone()).or_insert_with(|| GrantControl::new(false));
        let previous = control.value;
        control.value = desired;
        control.state = ToggleState::Toggling;
        control.in_flight += 1;
        control.latest_seq = seq;

        debug!("Toggling {} {} from {} to {}", role, path, previous, desired);

        Ok(ToggleTicket { key, seq, previous, desired })
    }

    /// Settle a toggle with the result of its write
    pub fn settle(&self, ticket: &ToggleTicket, result: &StoreResult<PermissionRecord>) -> Settlement {
        let Some(mut control) = self.controls.get_mut(&ticket.key) else {
            return Settlement::Superseded;
        };

        control.in_flight = control.in_flight.saturating_sub(1);

        if result.is_ok() && ticket.seq > control.committed_seq {
            control.committed = ticket.desired;
            control.committed_seq = ticket.seq;
        }

        if control.latest_seq != ticket.seq {
            debug!("Toggle {} {} superseded by a newer toggle", ticket.key.role, ticket.key.path);
            return Settlement::Superseded;
        }

        match result {
            Ok(_) => {
                control.state = ToggleState::Committed;
                Settlement::Committed
            }
            Err(e) => {
                control.value = control.committed;
                control.state = ToggleState::RolledBack { reason: e.to_string() };
                Settlement::RolledBack
            }
        }
    }

    /// Toggle a grant: optimistic local change, store write, then settle
    #[instrument(skip(self))]
    pub async fn toggle(&self, role: &str, path: &str, desired: bool) -> Result<Settlement, EditorError> {
        let ticket = self.begin_toggle(role, path, desired)?;

        let record = PermissionRecord::new(role, path, desired).with_group(self.catalog.group_of(path).map(str::to_string));
        let result = self.store.upsert_grant(record).await;
        let settlement = self.settle(&ticket, &result);

        match (settlement, result) {
            (Settlement::RolledBack, Err(source)) => {
                warn!("Grant {} {} rolled back: {}", role, path, source);
                Err(EditorError::RolledBack {
                    role: role.to_string(),
                    path: path.to_string(),
                    source,
                })
            }
            (Settlement::Superseded, Err(e)) => {
                warn!("Superseded write for {} {} failed: {}", role, path, e);
                Ok(settlement)
            }
            _ => {
                info!("Grant {} {} = {} ({:?})", role, path, desired, settlement);
                Ok(settlement)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CapabilityNode;
    use crate::store::MemoryPermissionStore;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::HashSet;
    use tokio::sync::Notify;

    fn catalog() -> Arc<Catalog> {
        Arc::new(
            Catalog::from_nodes(
                1,
                vec![
                    CapabilityNode::group("HR", None, vec![CapabilityNode::leaf("Departments", "/dept", None), CapabilityNode::leaf("Designations", "/desig", None)]),
                    CapabilityNode::leaf("Home", "/home", None),
                ],
            )
            .unwrap(),
        )
    }

    /// Store wrapper that fails writes for selected paths
    struct FlakyStore {
        inner: MemoryPermissionStore,
        failing: Mutex<HashSet<String>>,
    }

    impl FlakyStore {
        fn new() -> Self {
            Self {
                inner: MemoryPermissionStore::new(catalog()),
                failing: Mutex::new(HashSet::new()),
            }
        }

        fn fail(&self, path: &str) {
            self.failing.lock().insert(path.to_string());
        }
    }

    #[async_trait]
    impl PermissionStore for FlakyStore {
        async fn grants_for_role(&self, role: &str) -> StoreResult<Vec<PermissionRecord>> {
            self.inner.grants_for_role(role).await
        }

        async fn upsert_grant(&self, record: PermissionRecord) -> StoreResult<PermissionRecord> {
            if self.failing.lock().contains(&record.path) {
                return Err(StoreError::unavailable("connection reset"));
            }
            self.inner.upsert_grant(record).await
        }

        async fn delete_grant(&self, role: &str, path: &str) -> StoreResult<bool> {
            self.inner.delete_grant(role, path).await
        }

        async fn roles(&self) -> StoreResult<Vec<String>> {
            self.inner.roles().await
        }
    }

    /// Store whose writes block until released
    struct GatedStore {
        inner: MemoryPermissionStore,
        gate: Notify,
    }

    #[async_trait]
    impl PermissionStore for GatedStore {
        async fn grants_for_role(&self, role: &str) -> StoreResult<Vec<PermissionRecord>> {
            self.inner.grants_for_role(role).await
        }

        async fn upsert_grant(&self, record: PermissionRecord) -> StoreResult<PermissionRecord> {
            if record.path == "/dept" {
                self.gate.notified().await;
            }
            self.inner.upsert_grant(record).await
        }

        async fn delete_grant(&self, role: &str, path: &str) -> StoreResult<bool> {
            self.inner.delete_grant(role, path).await
        }

        async fn roles(&self) -> StoreResult<Vec<String>> {
            self.inner.roles().await
        }
    }

    #[tokio::test]
    async fn test_toggle_commits() {
        let store = Arc::new(FlakyStore::new());
        let editor = PermissionEditor::new(store.clone(), catalog());

        let settlement = editor.toggle("user", "/dept", true).await.unwrap();

        assert_eq!(settlement, Settlement::Committed);
        let control = editor.control("user", "/dept").unwrap();
        assert!(control.value());
        assert_eq!(control.state(), &ToggleState::Committed);
        assert!(!control.is_busy());
        assert!(store.grants_for_role("user").await.unwrap()[0].is_allowed);
    }

    #[tokio::test]
    async fn test_failed_write_rolls_back() {
        let store = Arc::new(FlakyStore::new());
        store.fail("/home");
        let editor = PermissionEditor::new(store.clone(), catalog());

        let err = editor.toggle("user", "/home", true).await.unwrap_err();

        assert!(matches!(err, EditorError::RolledBack { .. }));
        let control = editor.control("user", "/home").unwrap();
        assert!(!control.value());
        assert!(matches!(control.state(), ToggleState::RolledBack { .. }));
        assert!(store.grants_for_role("user").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rollback_restores_previous_value() {
        let store = Arc::new(FlakyStore::new());
        let editor = PermissionEditor::new(store.clone(), catalog());
        editor.toggle("admin", "/home", true).await.unwrap();

        store.fail("/home");
        assert!(editor.toggle("admin", "/home", false).await.is_err());

        assert!(editor.value("admin", "/home"));
    }

    #[tokio::test]
    async fn test_unknown_path_is_refused_locally() {
        let editor = PermissionEditor::new(Arc::new(FlakyStore::new()), catalog());

        let err = editor.toggle("user", "/ghost", true).await.unwrap_err();

        assert_eq!(err, EditorError::UnknownPath { path: "/ghost".to_string() });
        assert!(editor.control("user", "/ghost").is_none());
    }

    #[test]
    fn test_transitions_are_observable() {
        let editor = PermissionEditor::new(Arc::new(FlakyStore::new()), catalog());

        let ticket = editor.begin_toggle("user", "/desig", true).unwrap();
        let control = editor.control("user", "/desig").unwrap();
        assert_eq!(control.state(), &ToggleState::Toggling);
        assert!(control.value());
        assert!(control.is_busy());

        let settlement = editor.settle(&ticket, &Err(StoreError::unavailable("offline")));
        assert_eq!(settlement, Settlement::RolledBack);
        let control = editor.control("user", "/desig").unwrap();
        assert!(!control.value());
        assert!(!control.is_busy());
        assert_eq!(
            control.state(),
            &ToggleState::RolledBack {
                reason: "permission store unavailable: offline".to_string()
            }
        );
    }

    #[test]
    fn test_newest_toggle_decides_displayed_state() {
        let editor = PermissionEditor::new(Arc::new(FlakyStore::new()), catalog());

        let first = editor.begin_toggle("user", "/home", true).unwrap();
        let second = editor.begin_toggle("user", "/home", false).unwrap();
        assert!(second.previous());

        // Second write lands first and commits, first write fails afterwards
        assert_eq!(editor.settle(&second, &Ok(PermissionRecord::new("user", "/home", false))), Settlement::Committed);
        assert_eq!(editor.settle(&first, &Err(StoreError::unavailable("late failure"))), Settlement::Superseded);

        let control = editor.control("user", "/home").unwrap();
        assert!(!control.value());
        assert_eq!(control.state(), &ToggleState::Committed);
        assert!(!control.is_busy());
    }

    #[test]
    fn test_two_failed_toggles_restore_stored_value() {
        let editor = PermissionEditor::new(Arc::new(FlakyStore::new()), catalog());

        let allow = editor.begin_toggle("user", "/home", true).unwrap();
        let deny = editor.begin_toggle("user", "/home", false).unwrap();

        assert_eq!(editor.settle(&allow, &Err(StoreError::unavailable("offline"))), Settlement::Superseded);
        assert_eq!(editor.settle(&deny, &Err(StoreError::unavailable("offline"))), Settlement::RolledBack);

        let control = editor.control("user", "/home").unwrap();
        assert!(!control.value());
        assert!(!control.is_busy());
        assert!(matches!(control.state(), ToggleState::RolledBack { .. }));
    }

    #[test]
    fn test_rollback_returns_to_superseded_commit() {
        let editor = PermissionEditor::new(Arc::new(FlakyStore::new()), catalog());

        let allow = editor.begin_toggle("user", "/home", true).unwrap();
        let deny = editor.begin_toggle("user", "/home", false).unwrap();

        // The older write reaches the store, the newer one fails
        assert_eq!(editor.settle(&allow, &Ok(PermissionRecord::new("user", "/home", true))), Settlement::Superseded);
        assert_eq!(editor.settle(&deny, &Err(StoreError::unavailable("offline"))), Settlement::RolledBack);

        assert!(editor.value("user", "/home"));
    }

    #[tokio::test]
    async fn test_independent_controls_do_not_block_each_other() {
        let store = Arc::new(GatedStore {
            inner: MemoryPermissionStore::new(catalog()),
            gate: Notify::new(),
        });
        let editor = Arc::new(PermissionEditor::new(store.clone(), catalog()));

        let blocked = {
            let editor = editor.clone();
            tokio::spawn(async move { editor.toggle("user", "/dept", true).await })
        };
        while editor.control("user", "/dept").is_none() {
            tokio::task::yield_now().await;
        }

        // A different control settles while /dept is still in flight
        assert_eq!(editor.toggle("user", "/home", true).await.unwrap(), Settlement::Committed);
        assert!(editor.control("user", "/dept").unwrap().is_busy());

        store.gate.notify_one();
        assert_eq!(blocked.await.unwrap().unwrap(), Settlement::Committed);
        assert!(!editor.control("user", "/dept").unwrap().is_busy());
    }

    #[tokio::test]
    async fn test_load_role_and_snapshot() {
        let store = Arc::new(FlakyStore::new());
        store.upsert_grant(PermissionRecord::new("manager", "/desig", true)).await.unwrap();
        let editor = PermissionEditor::new(store, catalog());

        editor.load_role("manager").await.unwrap();
        let rows = editor.snapshot("manager");

        assert_eq!(rows.iter().map(|row| row.path.as_str()).collect::<Vec<_>>(), vec!["/dept", "/desig", "/home"]);
        assert_eq!(rows.iter().map(|row| row.value).collect::<Vec<_>>(), vec![false, true, false]);
        assert_eq!(rows[0].group_name.as_deref(), Some("HR"));
        assert_eq!(rows[2].group_name, None);
        assert!(rows.iter().all(|row| row.state == ToggleState::Unchanged));
    }

    #[tokio::test]
    async fn test_allowed_set_tracks_local_values() {
        let editor = PermissionEditor::new(Arc::new(FlakyStore::new()), catalog());
        editor.toggle("user", "/home", true).await.unwrap();
        editor.toggle("user", "/dept", true).await.unwrap();
        editor.toggle("admin", "/desig", true).await.unwrap();

        let allowed = editor.allowed_set("user");
        assert_eq!(allowed.iter().collect::<Vec<_>>(), vec!["/dept", "/home"]);
    }
}
