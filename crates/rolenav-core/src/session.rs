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

//! Active viewing role
//!
//! Only one role is viewed at a time. Each selection hands out a ticket; a
//! resolver response is applied only when its ticket belongs to the latest
//! selection, so a slow response for a previous role never overwrites the
//! permissions of the role selected after it.

use crate::catalog::Catalog;
use crate::composer::{Composer, RenderNode};
use crate::record::AllowedSet;
use crate::resolver::PermissionResolver;
use crate::store::PermissionStore;
use parking_lot::Mutex;
use tracing::debug;

/// Proof of a role selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleTicket {
    role: String,
    generation: u64,
}

impl RoleTicket {
    pub fn role(&self) -> &str {
        &self.role
    }
}

#[derive(Debug, Default)]
struct SessionState {
    generation: u64,
    selected: Option<String>,
    view: Option<(String, AllowedSet)>,
}

/// Tracks the selected role and its resolved permissions
#[derive(Debug, Default)]
pub struct ViewSession {
    state: Mutex<SessionState>,
}

impl ViewSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a role, invalidating every outstanding ticket
    pub fn select_role(&self, role: &str) -> RoleTicket {
        let mut state = self.state.lock();
        state.generation += 1;
        state.selected = Some(role.to_string());
        RoleTicket {
            role: role.to_string(),
            generation: state.generation,
        }
    }

    /// Apply a resolver response; returns false when it was discarded as stale
    pub fn apply(&self, ticket: &RoleTicket, allowed: AllowedSet) -> bool {
        let mut state = self.state.lock();
        if ticket.generation != state.generation {
            debug!("Discarding stale permissions for {} (generation {} < {})", ticket.role, ticket.generation, state.generation);
            return false;
        }
        state.view = Some((ticket.role.clone(), allowed));
        true
    }

    /// Select a role and resolve it; returns whether the result was applied
    pub async fn switch_to<S: PermissionStore>(&self, role: &str, resolver: &PermissionResolver<S>) -> bool {
        let ticket = self.select_role(role);
        let allowed = resolver.resolve(role).await;
        self.apply(&ticket, allowed)
    }

    /// Most recently selected role
    pub fn selected_role(&self) -> Option<String> {
        self.state.lock().selected.clone()
    }

    /// Role whose permissions are currently displayed
    pub fn active_role(&self) -> Option<String> {
        self.state.lock().view.as_ref().map(|(role, _)| role.clone())
    }

    /// Snapshot of the displayed allowed set
    pub fn allowed(&self) -> Option<AllowedSet> {
        self.state.lock().view.as_ref().map(|(_, allowed)| allowed.clone())
    }

    /// Patch the displayed set after a committed edit for the active role
    pub fn patch(&self, role: &str, path: &str, allowed: bool) -> bool {
        let mut state = self.state.lock();
        match state.view.as_mut() {
            Some((active, set)) if active == role => {
                set.set(path, allowed);
                true
            }
            _ => false,
        }
    }

    /// Navigation for the displayed role; empty until a role was applied
    pub fn navigation(&self, catalog: &Catalog, composer: &Composer) -> Vec<RenderNode> {
        let allowed = self.allowed().unwrap_or_default();
        composer.compose(catalog, &allowed)
    }
}
