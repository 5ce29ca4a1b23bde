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

use crate::ConfigCommands;
use crate::config::RolenavConfig;
use anyhow::Result;
use std::path::Path;

pub fn handle_config_command(config: &RolenavConfig, command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show => show_config(config),
        ConfigCommands::Init { path } => init_config(config, &path),
    }
}

fn show_config(config: &RolenavConfig) -> Result<()> {
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

fn init_config(config: &RolenavConfig, path: &Path) -> Result<()> {
    if path.exists() {
        anyhow::bail!("{} already exists", path.display());
    }
    config.save_to_file(path)?;
    println!("Wrote configuration to {}", path.display());
    Ok(())
}
