//! # Streakboard
//!
//! A terminal dashboard for daily goals. Give each goal a daily target in
//! minutes, log the time you spend each day, and keep your streak alive.
//! After every log an AI coach answers with a short motivational message.
//!
//! ## Usage
//!
//! Run without arguments to open the interactive dashboard:
//!
//! ```bash
//! streakboard
//! ```
//!
//! **Dashboard keys**
//! *   `a`: Add a goal
//! *   `l` / `Enter`: Log today's minutes for the selected goal (0 clears today)
//! *   `d`: Delete the selected goal (asks for confirmation)
//! *   `j` / `k`: Move the selection
//! *   `q`: Quit
//!
//! **Command line**
//! ```bash
//! streakboard add "Learn Rust" --target 60
//! streakboard list
//! streakboard log 3f2a 45
//! streakboard log 3f2a 30 --date 2025-01-14
//! streakboard show 3f2a
//! streakboard remove 3f2a
//! ```
//!
//! Tasks are addressed by any unique prefix of their id.
//!
//! ## Configuration
//!
//! *   `STREAKBOARD_DB`: path of the JSON database
//!     (default `~/.local/share/streakboard/tasks.json` on Linux).
//! *   `GEMINI_API_KEY`: enables the Gemini coach. Without it a built-in
//!     offline coach answers.
//! *   `STREAKBOARD_MODEL`, `STREAKBOARD_AI_TIMEOUT_SECS`: coach model and timeout.
//! *   `RUST_LOG`: enables diagnostic logging to stderr.

use std::io;
use std::sync::Arc;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use streakboard::clock::SystemClock;
use streakboard::commands::*;
use streakboard::config::Config;
use streakboard::manager::TaskManager;
use streakboard::motivation::coach_from_config;
use streakboard::storage::JsonFileStore;
use streakboard::tui::run_tui;

#[derive(Parser)]
#[command(name = "streakboard")]
#[command(about = "Daily goal tracker with streaks and a motivational coach", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new goal
    Add {
        /// Goal name (quoted if it has spaces)
        name: String,
        /// Daily target in minutes
        #[arg(short, long, default_value_t = 60)]
        target: i64,
    },
    /// List goals with today's progress
    List,
    /// Show a goal's stats and its last week
    Show {
        /// Task id or unique prefix
        id: String,
    },
    /// Log minutes spent today (0 clears the day)
    Log {
        /// Task id or unique prefix
        id: String,
        /// Minutes spent
        #[arg(allow_hyphen_values = true)]
        minutes: i64,
        /// Day to log for, YYYY-MM-DD (defaults to today)
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Remove a goal and all its logs
    Remove {
        /// Task id or unique prefix
        id: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Generate shell completions
    Completions {
        shell: Shell,
    },
    /// Open the interactive dashboard
    Ui,
}

fn init_tracing() {
    // Off unless RUST_LOG asks for it; the dashboard owns the terminal.
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|raw| EnvFilter::try_new(raw.trim()).ok())
        .unwrap_or_else(|| EnvFilter::new("off"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    if let Some(Commands::Completions { shell }) = cli.command {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "streakboard", &mut io::stdout());
        return Ok(());
    }

    let config = Config::from_env();
    let coach = coach_from_config(&config)?;
    let store = JsonFileStore::new(&config.db_path);
    tracing::debug!(db = %store.path().display(), "opening task database");
    let mut manager = TaskManager::new(store, Arc::new(SystemClock), coach);
    // HTTP timeout plus a second of slack.
    let wait = config.timeout + std::time::Duration::from_secs(1);

    match cli.command {
        Some(Commands::Add { name, target }) => cmd_add(&mut manager, name, target, false),
        Some(Commands::List) => cmd_list(&manager),
        Some(Commands::Show { id }) => cmd_show(&manager, &id),
        Some(Commands::Log { id, minutes, date }) => cmd_log(&mut manager, &id, minutes, date, wait, false),
        Some(Commands::Remove { id, force }) => cmd_remove(&mut manager, &id, force, false),
        Some(Commands::Completions { .. }) => {}
        Some(Commands::Ui) | None => {
            if let Err(e) = run_tui(manager) {
                eprintln!("Error running TUI: {}", e);
            }
        }
    }
    Ok(())
}
