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
use rolenav_core::{GrantView, PermissionEditor, Settlement};

/// Print the editor table for a role
pub async fn show_grants(ctx: &CommandContext, role: &str) -> Result<()> {
    let editor = PermissionEditor::new(ctx.store.clone(), ctx.catalog.clone());
    if let Err(e) = editor.load_role(role).await {
        eprintln!("Warning: grants for {} could not be loaded ({}), showing everything as denied", role, e);
    }

    println!("Grants for {}:", role);
    print!("{}", render_grants(&editor.snapshot(role)));

    Ok(())
}

/// Set one grant through the editor, reporting a rollback as an error
pub async fn set_grant(ctx: &CommandContext, role: &str, path: &str, allowed: bool) -> Result<()> {
    let editor = PermissionEditor::new(ctx.store.clone(), ctx.catalog.clone());
    editor.load_role(role).await?;

    match editor.toggle(role, path, allowed).await? {
        Settlement::Committed => {
            println!("{} {} for {}", if allowed { "Allowed" } else { "Denied" }, path, role);
            Ok(())
        }
        other => anyhow::bail!("grant {} {} was not committed ({:?})", role, path, other),
    }
}

fn render_grants(rows: &[GrantView]) -> String {
    let mut out = format!("{:<24} {:<24} {:<16} {:<8}\n", "Title", "Path", "Group", "Allowed");
    out.push_str(&"-".repeat(75));
    out.push('\n');

    for row in rows {
        out.push_str(&format!(
            "{:<24} {:<24} {:<16} {:<8}\n",
            row.title,
            row.path,
            row.group_name.as_deref().unwrap_or("-"),
            if row.value { "yes" } else { "no" }
        ));
    }

    out
}
