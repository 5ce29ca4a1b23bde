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

//! Capability catalog
//!
//! The catalog is the ordered, hierarchical list of every navigable capability.
//! Top-level nodes are either standalone leaves or groups of leaves. It is plain
//! data: icons are referenced by [`IconId`] and resolved by whoever renders them.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Catalog compiled into the binary
const BUILTIN_CATALOG: &str = include_str!("../catalog/default.json");

/// Stable icon identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IconId {
    Dashboard,
    Organization,
    Companies,
    Departments,
    Designations,
    Employees,
    Attendance,
    Leave,
    Payroll,
    Clients,
    Warehouses,
    Reports,
    Permissions,
    Settings,
    Folder,
    Document,
}

/// A node of the capability catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityNode {
    /// Display title
    pub title: String,

    /// Navigable path, only meaningful on leaves
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Icon reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<IconId>,

    /// Leaves of a group; empty for leaves
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<CapabilityNode>,
}

impl CapabilityNode {
    /// Create a leaf capability
    pub fn leaf(title: impl Into<String>, path: impl Into<String>, icon: Option<IconId>) -> Self {
        Self {
            title: title.into(),
            path: Some(path.into()),
            icon,
            children: Vec::new(),
        }
    }

    /// Create a group of leaves
    pub fn group(title: impl Into<String>, icon: Option<IconId>, children: Vec<CapabilityNode>) -> Self {
        Self {
            title: title.into(),
            path: None,
            icon,
            children,
        }
    }

    pub fn is_group(&self) -> bool {
        !self.children.is_empty()
    }

    /// Icon to render, falling back to a generic one
    pub fn icon_or_default(&self) -> IconId {
        self.icon.unwrap_or(if self.is_group() { IconId::Folder } else { IconId::Document })
    }
}

/// Configuration errors in a catalog definition
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CatalogError {
    #[error("duplicate leaf path: {path}")]
    DuplicatePath { path: String },

    #[error("group '{title}' must not carry a path")]
    GroupWithPath { title: String },

    #[error("leaf '{title}' has no path")]
    LeafWithoutPath { title: String },

    #[error("group '{title}' contains nested group '{child}'")]
    NestedGroup { title: String, child: String },

    #[error("catalog node has an empty title")]
    EmptyTitle,

    #[error("failed to parse catalog: {message}")]
    Parse { message: String },

    #[error("failed to read catalog: {message}")]
    Io { message: String },
}

/// On-disk shape of a catalog artifact
#[derive(Debug, Serialize, Deserialize)]
struct CatalogDocument {
    #[serde(default = "default_version")]
    version: u32,
    nodes: Vec<CapabilityNode>,
}

fn default_version() -> u32 {
    1
}

/// Location of a leaf inside the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LeafLocation {
    node: usize,
    child: Option<usize>,
}

/// Immutable, validated capability catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    version: u32,
    nodes: Vec<CapabilityNode>,
    index: HashMap<String, LeafLocation>,
}

impl Catalog {
    /// Build a catalog, checking its structural invariants
    pub fn from_nodes(version: u32, nodes: Vec<CapabilityNode>) -> Result<Self, CatalogError> {
        let mut index = HashMap::new();

        for (node_idx, node) in nodes.iter().enumerate() {
            if node.title.trim().is_empty() {
                return Err(CatalogError::EmptyTitle);
            }

            if node.is_group() {
                if node.path.is_some() {
                    return Err(CatalogError::GroupWithPath { title: node.title.clone() });
                }

                for (child_idx, child) in node.children.iter().enumerate() {
                    if child.is_group() {
                        return Err(CatalogError::NestedGroup {
                            title: node.title.clone(),
                            child: child.title.clone(),
                        });
                    }
                    index_leaf(
                        &mut index,
                        child,
                        LeafLocation {
                            node: node_idx,
                            child: Some(child_idx),
                        },
                    )?;
                }
            } else {
                index_leaf(&mut index, node, LeafLocation { node: node_idx, child: None })?;
            }
        }

        debug!("Catalog v{} loaded with {} leaves", version, index.len());

        Ok(Self { version, nodes, index })
    }

    /// Parse a catalog artifact from JSON
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let document: CatalogDocument = serde_json::from_str(json).map_err(|e| CatalogError::Parse { message: e.to_string() })?;
        Self::from_nodes(document.version, document.nodes)
    }

    /// Load a catalog artifact from a JSON file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| CatalogError::Io {
            message: format!("{}: {}", path.display(), e),
        })?;
        Self::from_json_str(&content)
    }

    /// The catalog shipped with the binary
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json_str(BUILTIN_CATALOG)
    }

    /// Serialize the catalog back into its artifact form
    pub fn to_json_pretty(&self) -> Result<String, CatalogError> {
        let document = CatalogDocument {
            version: self.version,
            nodes: self.nodes.clone(),
        };
        serde_json::to_string_pretty(&document).map_err(|e| CatalogError::Parse { message: e.to_string() })
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// Top-level nodes in declaration order
    pub fn nodes(&self) -> &[CapabilityNode] {
        &self.nodes
    }

    pub fn contains_path(&self, path: &str) -> bool {
        self.index.contains_key(path)
    }

    /// Number of leaf capabilities
    pub fn leaf_count(&self) -> usize {
        self.index.len()
    }

    /// Look up a leaf by path
    pub fn leaf(&self, path: &str) -> Option<&CapabilityNode> {
        let location = self.index.get(path)?;
        let node = self.nodes.get(location.node)?;
        match location.child {
            Some(child) => node.children.get(child),
            None => Some(node),
        }
    }

    /// Title of the group containing a leaf, `None` for standalone leaves
    pub fn group_of(&self, path: &str) -> Option<&str> {
        let location = self.index.get(path)?;
        location.child?;
        self.nodes.get(location.node).map(|group| group.title.as_str())
    }

    /// Leaves in catalog order, paired with their group title
    pub fn leaves(&self) -> impl Iterator<Item = (Option<&str>, &CapabilityNode)> + '_ {
        self.nodes.iter().flat_map(|node| {
            if node.is_group() {
                node.children.iter().map(|child| (Some(node.title.as_str()), child)).collect::<Vec<_>>()
            } else {
                vec![(None, node)]
            }
        })
    }
}

fn index_leaf(index: &mut HashMap<String, LeafLocation>, leaf: &CapabilityNode, location: LeafLocation) -> Result<(), CatalogError> {
    if leaf.title.trim().is_empty() {
        return Err(CatalogError::EmptyTitle);
    }

    let path = match leaf.path.as_deref() {
        Some(path) if !path.trim().is_empty() => path,
        _ => return Err(CatalogError::LeafWithoutPath { title: leaf.title.clone() }),
    };

    if index.insert(path.to_string(), location).is_some() {
        return Err(CatalogError::DuplicatePath { path: path.to_string() });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_nodes() -> Vec<CapabilityNode> {
        vec![
            CapabilityNode::group(
                "HR",
                Some(IconId::Employees),
                vec![CapabilityNode::leaf("Departments", "/dept", None), CapabilityNode::leaf("Designations", "/desig", None)],
            ),
            CapabilityNode::group("Finance", None, vec![CapabilityNode::leaf("Payroll", "/pay", Some(IconId::Payroll))]),
            CapabilityNode::leaf("Home", "/home", Some(IconId::Dashboard)),
        ]
    }

    #[test]
    fn test_builtin_catalog_is_valid() {
        let catalog = Catalog::builtin().unwrap();

        assert_eq!(catalog.version(), 1);
        assert!(catalog.contains_path("/departments"));
        assert_eq!(catalog.group_of("/departments"), Some("Organization"));
        assert_eq!(catalog.group_of("/dashboard"), None);
    }

    #[test]
    fn test_lookup_by_path() {
        let catalog = Catalog::from_nodes(1, sample_nodes()).unwrap();

        assert_eq!(catalog.leaf_count(), 4);
        assert_eq!(catalog.leaf("/desig").map(|leaf| leaf.title.as_str()), Some("Designations"));
        assert_eq!(catalog.group_of("/pay"), Some("Finance"));
        assert_eq!(catalog.group_of("/home"), None);
        assert!(catalog.leaf("/missing").is_none());
        assert!(!catalog.contains_path("/missing"));
    }

    #[test]
    fn test_leaves_follow_declaration_order() {
        let catalog = Catalog::from_nodes(1, sample_nodes()).unwrap();
        let paths: Vec<_> = catalog.leaves().filter_map(|(_, leaf)| leaf.path.as_deref()).collect();

        assert_eq!(paths, vec!["/dept", "/desig", "/pay", "/home"]);
    }

    #[test]
    fn test_duplicate_path_rejected() {
        let nodes = vec![
            CapabilityNode::group("HR", None, vec![CapabilityNode::leaf("Departments", "/dept", None)]),
            CapabilityNode::leaf("Departments again", "/dept", None),
        ];

        assert_eq!(Catalog::from_nodes(1, nodes), Err(CatalogError::DuplicatePath { path: "/dept".to_string() }));
    }

    #[test]
    fn test_group_with_path_rejected() {
        let mut group = CapabilityNode::group("HR", None, vec![CapabilityNode::leaf("Departments", "/dept", None)]);
        group.path = Some("/hr".to_string());

        assert_eq!(Catalog::from_nodes(1, vec![group]), Err(CatalogError::GroupWithPath { title: "HR".to_string() }));
    }

    #[test]
    fn test_leaf_without_path_rejected() {
        let leaf = CapabilityNode {
            title: "Orphan".to_string(),
            path: None,
            icon: None,
            children: Vec::new(),
        };

        assert_eq!(Catalog::from_nodes(1, vec![leaf]), Err(CatalogError::LeafWithoutPath { title: "Orphan".to_string() }));
    }

    #[test]
    fn test_nested_group_rejected() {
        let inner = CapabilityNode::group("Inner", None, vec![CapabilityNode::leaf("Leaf", "/leaf", None)]);
        let outer = CapabilityNode::group("Outer", None, vec![inner]);

        assert!(matches!(Catalog::from_nodes(1, vec![outer]), Err(CatalogError::NestedGroup { .. })));
    }

    #[test]
    fn test_json_artifact_roundtrip() {
        let catalog = Catalog::from_nodes(3, sample_nodes()).unwrap();
        let json = catalog.to_json_pretty().unwrap();

        assert_eq!(Catalog::from_json_str(&json).unwrap(), catalog);
    }

    #[test]
    fn test_invalid_json_reports_parse_error() {
        assert!(matches!(Catalog::from_json_str("{\"nodes\": 4}"), Err(CatalogError::Parse { .. })));
    }

    #[test]
    fn test_default_icons() {
        let nodes = sample_nodes();

        assert_eq!(nodes[0].icon_or_default(), IconId::Employees);
        assert_eq!(nodes[1].icon_or_default(), IconId::Folder);
        assert_eq!(CapabilityNode::leaf("Plain", "/plain", None).icon_or_default(), IconId::Document);
    }
}
