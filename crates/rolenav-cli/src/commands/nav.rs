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

use super::CommandContext;
use anyhow::Result;
use rolenav_core::{PermissionResolver, RenderNode, ViewSession};

/// Print the navigation a role would see
pub async fn show_navigation(ctx: &CommandContext, role: &str, json: bool) -> Result<()> {
    let session = ViewSession::new();
    session.switch_to(role, &PermissionResolver::new(ctx.store.clone())).await;
    let items = session.navigation(&ctx.catalog, &ctx.composer);

    if json {
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else if items.is_empty() {
        println!("No navigation for {}.", role);
    } else {
        print!("{}", render_navigation(&items));
    }

    Ok(())
}

fn render_navigation(items: &[RenderNode]) -> String {
    let mut out = String::new();
    for item in items {
        match item {
            RenderNode::Group { title, children, .. } => {
                out.push_str(&format!("{}\n", title));
                for child in children {
                    out.push_str(&format!("  {:<24} {}\n", child.title, child.path));
                }
            }
            RenderNode::Leaf(leaf) => out.push_str(&format!("{:<26} {}\n", leaf.title, leaf.path)),
        }
    }
    out
}
