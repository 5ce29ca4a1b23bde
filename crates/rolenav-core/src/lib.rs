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

//! Rolenav core
//!
//! Role-based visibility over a hierarchical capability catalog: grant storage,
//! role listing, permission resolution, navigation composition and the
//! optimistic permission editor.

pub mod catalog;
pub mod composer;
pub mod editor;
pub mod record;
pub mod resolver;
pub mod roles;
pub mod session;
pub mod store;

pub use catalog::{CapabilityNode, Catalog, CatalogError, IconId};
pub use composer::{COLLAPSE_THRESHOLD, Composer, RenderLeaf, RenderNode, compose};
pub use editor::{EditorError, GrantControl, GrantKey, GrantView, PermissionEditor, Settlement, ToggleState, ToggleTicket};
pub use record::{AllowedSet, PermissionRecord};
pub use resolver::PermissionResolver;
pub use roles::{FALLBACK_ROLES, RoleProvider, RoleSource, StaticRoleSource, StoreRoleSource, fallback_roles};
pub use session::{RoleTicket, ViewSession};
pub use store::{FilePermissionStore, MemoryPermissionStore, PermissionStore, StoreError, StoreResult};
