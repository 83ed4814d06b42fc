//! # GreenBlog CLI (`greenblog`)
//!
//! Runs the history API and offers terminal access to the same history
//! document.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `greenblog init` | Create the data directory and an empty history file |
//! | `greenblog serve` | Start the HTTP API |
//! | `greenblog list` | Print recorded history, newest first |
//! | `greenblog add <day>` | Record a new history entry |
//! | `greenblog plan` | Print the configured meal plan |
//!
//! ## Examples
//!
//! ```bash
//! greenblog --config ./config/greenblog.toml serve
//! greenblog add montag --name "Spaghetti Carbonara" --rating 5 --comment "Perfekt"
//! greenblog list --day montag
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use greenblog::config::{self, Config};
use greenblog::history_cmd;
use greenblog::logging;
use greenblog::models::EntryDraft;
use greenblog::server;

const DEFAULT_CONFIG: &str = "./config/greenblog.toml";

/// GreenBlog: meal-plan history service.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. When the default path does not exist, built-in defaults are used.
#[derive(Parser)]
#[command(name = "greenblog", version, about = "GreenBlog meal-plan history service")]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = DEFAULT_CONFIG)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the data directory and an empty history document.
    ///
    /// Idempotent: an existing history file is never touched.
    Init,

    /// Start the HTTP API.
    ///
    /// Binds to `[server].bind` and serves `/api/history` and `/api/plan`.
    Serve,

    /// Print recorded history, newest entry first.
    List {
        /// Only show entries for this day identifier.
        #[arg(long)]
        day: Option<String>,
    },

    /// Record a new history entry for a day.
    Add {
        /// Day identifier, e.g. `montag`.
        day: String,

        /// The specific dish that was cooked.
        #[arg(long)]
        name: String,

        /// Rating, usually 1–5.
        #[arg(long, default_value_t = 5, allow_hyphen_values = true)]
        rating: i32,

        #[arg(long, default_value = "")]
        comment: String,

        /// Display date; defaults to today as `dd.mm.yyyy`.
        #[arg(long)]
        date: Option<String>,

        /// Link to the recipe.
        #[arg(long)]
        link: Option<String>,
    },

    /// Print the configured meal plan.
    Plan,
}

/// An explicitly chosen config file must exist; the default one may not.
fn resolve_config(path: &Path) -> Result<Config> {
    if path == Path::new(DEFAULT_CONFIG) && !path.exists() {
        return Ok(Config::default());
    }
    config::load_config(path)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = resolve_config(&cli.config)?;
    logging::init(&cfg.log.level)?;

    match cli.command {
        Commands::Init => {
            history_cmd::run_init(&cfg).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::List { day } => {
            history_cmd::run_list(&cfg, day.as_deref()).await?;
        }
        Commands::Add {
            day,
            name,
            rating,
            comment,
            date,
            link,
        } => {
            let draft = EntryDraft {
                date: date.unwrap_or_else(history_cmd::today_display_date),
                specific_name: name,
                rating,
                comment,
                recipe_link: link,
            };
            history_cmd::run_add(&cfg, &day, draft).await?;
        }
        Commands::Plan => {
            history_cmd::run_plan(&cfg)?;
        }
    }

    Ok(())
}
