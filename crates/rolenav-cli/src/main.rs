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

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;

mod commands;
mod config;

use commands::CommandContext;
use config::RolenavConfig;

#[derive(Parser, Debug)]
#[command(name = "rolenav", about = "Role-based navigation and permission management")]
pub struct Cli {
    /// Path to configuration file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Permission API base URL (overrides $ROLENAV_SERVER_URL)
    #[arg(long)]
    pub server: Option<String>,

    /// Grant file for local mode (overrides $ROLENAV_DATA_FILE)
    #[arg(long)]
    pub data_file: Option<PathBuf>,

    /// Log more; repeat for trace output
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands for the capability catalog
#[derive(Subcommand, Debug)]
#[command(about = "Inspect or validate capability catalogs")]
pub enum CatalogCommands {
    /// Print the catalog in use
    Show,
    /// Validate a catalog file
    Check { file: PathBuf },
}

/// Subcommands for configuration
#[derive(Subcommand, Debug)]
#[command(about = "Inspect or write CLI configuration")]
pub enum ConfigCommands {
    /// Show current effective configuration
    Show,
    /// Write the effective configuration to a new file
    Init { path: PathBuf },
}

/// Top-level commands for rolenav
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the permission API server
    Serve,

    /// List known roles
    Roles,

    /// Show every capability and whether a role holds it
    Grants { role: String },

    /// Show the navigation a role would see
    Nav {
        role: String,
        /// Print the composed tree as JSON
        #[arg(long)]
        json: bool,
    },

    /// Allow or deny one capability for a role
    Grant {
        role: String,
        path: String,
        #[arg(long, conflicts_with = "deny", required_unless_present = "deny")]
        allow: bool,
        #[arg(long)]
        deny: bool,
    },

    /// Catalog inspection
    Catalog {
        #[command(subcommand)]
        command: CatalogCommands,
    },

    /// Inspect or write configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    // `serve` always reports what it is doing
    let level = if matches!(cli.command, Commands::Serve) { level.max(Level::INFO) } else { level };
    tracing_subscriber::fmt().with_max_level(level).with_writer(std::io::stderr).init();

    // Load configuration
    let config = RolenavConfig::resolve_config(cli.config, cli.server, cli.data_file)?;

    // Commands that do not touch grants
    match cli.command {
        Commands::Serve => return commands::serve::serve(&config).await,
        Commands::Config { command } => return commands::config::handle_config_command(&config, command),
        Commands::Catalog {
            command: CatalogCommands::Check { file },
        } => return commands::catalog::check_catalog(&file),
        _ => {}
    }

    let ctx = CommandContext::new(&config).await?;

    // Dispatch commands
    match cli.command {
        Commands::Roles => {
            commands::roles::list_roles(&ctx).await?;
        }
        Commands::Grants { role } => {
            commands::grants::show_grants(&ctx, &role).await?;
        }
        Commands::Nav { role, json } => {
            commands::nav::show_navigation(&ctx, &role, json).await?;
        }
        Commands::Grant { role, path, allow, .. } => {
            commands::grants::set_grant(&ctx, &role, &path, allow).await?;
        }
        Commands::Catalog { command: CatalogCommands::Show } => {
            commands::catalog::show_catalog(&ctx)?;
        }
        Commands::Serve | Commands::Config { .. } | Commands::Catalog { .. } => {}
    }

    Ok(())
}
