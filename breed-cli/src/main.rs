//! # breeds
//!
//! Command-line front end for the local-first breed catalog.
//!
//! ## Commands
//!
//! - `fetch`: Load the next page(s) of breeds into the local store
//! - `list`: List stored breeds
//! - `search`: Search breeds by name, falling back to the local store offline
//! - `show`: Show one breed
//! - `favorite` / `unfavorite`: Mark or unmark a breed
//! - `status`: Show store status
//!
//! ## Example
//!
//! ```bash
//! # Load the first two pages
//! breeds fetch --pages 2
//!
//! # Search and mark a favorite
//! breeds search abys
//! breeds favorite abys
//!
//! # Favorites only
//! breeds list --favorites
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod settings;

use commands::{favorite, fetch, list, search, show, status};
use settings::Settings;

/// Command-line front end for the local-first breed catalog.
#[derive(Parser, Debug)]
#[command(name = "breeds")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Data directory holding the database and the default config file
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Config file (default: <data-dir>/breeds.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database file (overrides storage.database)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// API key sent as x-api-key (overrides remote.api_key and BREEDS_API_KEY)
    #[arg(long, global = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load the next page(s) of breeds into the local store
    Fetch {
        /// Number of pages to load
        #[arg(long, default_value = "1")]
        pages: u32,
    },

    /// List stored breeds
    List {
        /// Only show favorites
        #[arg(long)]
        favorites: bool,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Search breeds by name
    Search {
        /// Name or part of a name
        name: String,

        /// Only search the local store
        #[arg(long)]
        local: bool,
    },

    /// Show one breed
    Show {
        /// Breed id
        id: String,
    },

    /// Mark a breed as favorite
    Favorite {
        /// Breed id
        id: String,
    },

    /// Unmark a favorite
    Unfavorite {
        /// Breed id
        id: String,
    },

    /// Show store status
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = Settings::resolve(
        cli.data_dir,
        cli.config,
        cli.database,
        cli.api_key,
    )
    .await?;
    init_tracing(&settings.config.logging.filter);

    match cli.command {
        Commands::Fetch { pages } => {
            fetch::run(&settings, pages).await?;
        }
        Commands::List { favorites, json } => {
            list::run(&settings, favorites, json).await?;
        }
        Commands::Search { name, local } => {
            search::run(&settings, &name, local).await?;
        }
        Commands::Show { id } => {
            show::run(&settings, &id).await?;
        }
        Commands::Favorite { id } => {
            favorite::set(&settings, &id).await?;
        }
        Commands::Unfavorite { id } => {
            favorite::unset(&settings, &id).await?;
        }
        Commands::Status => {
            status::run(&settings).await?;
        }
    }

    Ok(())
}

/// Log to stderr. `RUST_LOG` wins over the configured filter.
fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
