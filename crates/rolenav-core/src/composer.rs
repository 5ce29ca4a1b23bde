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

//! Navigation composer
//!
//! Maps a catalog and an allowed-path set to the navigation tree shown to a
//! role. Groups lose every child the role may not see and disappear when
//! nothing is left. When fewer than [`COLLAPSE_THRESHOLD`] groups survive, the
//! whole menu is flattened into a single leaf list so the user is not handed a
//! couple of single-item dropdowns. Catalog order is kept in both shapes.
//!
//! Composition is pure: the same catalog and allowed set always produce the
//! same output.

use crate::catalog::{CapabilityNode, Catalog, IconId};
use crate::record::AllowedSet;
use serde::{Deserialize, Serialize};

/// Minimum number of populated groups needed to keep grouping
pub const COLLAPSE_THRESHOLD: usize = 3;

/// A navigable entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderLeaf {
    pub title: String,
    pub path: String,
    pub icon: IconId,
}

impl RenderLeaf {
    fn from_node(node: &CapabilityNode) -> Option<Self> {
        Some(Self {
            title: node.title.clone(),
            path: node.path.clone()?,
            icon: node.icon_or_default(),
        })
    }
}

/// One entry of the composed navigation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderNode {
    Group { title: String, icon: IconId, children: Vec<RenderLeaf> },
    Leaf(RenderLeaf),
}

impl RenderNode {
    pub fn title(&self) -> &str {
        match self {
            RenderNode::Group { title, .. } => title,
            RenderNode::Leaf(leaf) => &leaf.title,
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, RenderNode::Group { .. })
    }
}

/// Top-level catalog entry that survived filtering
enum Visible<'a> {
    Group(&'a CapabilityNode, Vec<RenderLeaf>),
    Leaf(RenderLeaf),
}

/// Navigation composer with a configurable collapse threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Composer {
    threshold: usize,
}

impl Default for Composer {
    fn default() -> Self {
        Self { threshold: COLLAPSE_THRESHOLD }
    }
}

impl Composer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different threshold; `0` never collapses
    pub fn with_threshold(threshold: usize) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Compose the navigation for an allowed set
    pub fn compose(&self, catalog: &Catalog, allowed: &AllowedSet) -> Vec<RenderNode> {
        let visible: Vec<Visible<'_>> = catalog.nodes().iter().filter_map(|node| visible_entry(node, allowed)).collect();

        let group_count = visible.iter().filter(|entry| matches!(entry, Visible::Group(..))).count();

        if group_count < self.threshold {
            visible
                .into_iter()
                .flat_map(|entry| match entry {
                    Visible::Group(_, children) => children,
                    Visible::Leaf(leaf) => vec![leaf],
                })
                .map(RenderNode::Leaf)
                .collect()
        } else {
            visible
                .into_iter()
                .map(|entry| match entry {
                    Visible::Group(group, children) => RenderNode::Group {
                        title: group.title.clone(),
                        icon: group.icon_or_default(),
                        children,
                    },
                    Visible::Leaf(leaf) => RenderNode::Leaf(leaf),
                })
                .collect()
        }
    }
}

/// Compose with the default threshold
pub fn compose(catalog: &Catalog, allowed: &AllowedSet) -> Vec<RenderNode> {
    Composer::default().compose(catalog, allowed)
}

fn is_allowed(node: &CapabilityNode, allowed: &AllowedSet) -> bool {
    node.path.as_deref().is_some_and(|path| allowed.contains(path))
}

fn visible_entry<'a>(node: &'a CapabilityNode, allowed: &AllowedSet) -> Option<Visible<'a>> {
    if node.is_group() {
        let children: Vec<RenderLeaf> = node.children.iter().filter(|child| is_allowed(child, allowed)).filter_map(RenderLeaf::from_node).collect();
        (!children.is_empty()).then(|| Visible::Group(node, children))
    } else if is_allowed(node, allowed) {
        RenderLeaf::from_node(node).map(Visible::Leaf)
    } else {
        None
    }
}
