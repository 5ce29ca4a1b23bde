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
use anyhow::{Context, Result};
use rolenav_core::Catalog;
use std::path::Path;

/// Print the catalog in use
pub fn show_catalog(ctx: &CommandContext) -> Result<()> {
    println!("{}", ctx.catalog.to_json_pretty()?);
    Ok(())
}

/// Validate a catalog file without starting anything
pub fn check_catalog(path: &Path) -> Result<()> {
    let catalog = Catalog::from_path(path).with_context(|| format!("{} is not a valid catalog", path.display()))?;

    let groups = catalog.nodes().iter().filter(|node| node.is_group()).count();
    println!("Catalog v{}: {} groups, {} capabilities", catalog.version(), groups, catalog.leaf_count());

    Ok(())
}
