mod commands;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use planbot_service::{EventRouter, ReminderJob, Settings, TokioScheduler};
use planbot_storage::Storage;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "planbot")]
#[command(about = "Chat-driven personal planner with an AI scheduling secretary", long_about = None)]
struct Cli {
    /// Database file (overrides PLANBOT_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP bridge
    Serve {
        #[arg(short, long, default_value = "8087")]
        port: u16,
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,
    },
    /// Talk to the bot from the terminal
    Chat {
        #[arg(short, long, default_value = "1")]
        user: i64,
        /// First name used in the greeting
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Find a scheduling slot in free text
    Slot {
        text: String,
        /// Reference date (defaults to today in the configured zone)
        #[arg(long)]
        today: Option<NaiveDate>,
    },
    /// Parse a deadline (Qn-YYYY or DD.MM.YYYY)
    Due {
        input: String,
        #[arg(long)]
        today: Option<NaiveDate>,
    },
    /// Delete every planning record of a user
    Reset { user: i64 },
    /// Print every record of a user as JSON
    Export { user: i64 },
}

pub(crate) fn ensure_db_dir(db_path: &Path) -> Result<()> {
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

pub(crate) fn open_storage(settings: &Settings) -> Result<Storage> {
    ensure_db_dir(&settings.db_path)?;
    Ok(Storage::open_with_pool_size(&settings.db_path, settings.db_pool_size)?)
}

/// Event router wired to the configured collaborators, plus the channel of fired reminders.
pub(crate) fn build_router(settings: &Settings) -> Result<(Arc<EventRouter>, mpsc::UnboundedReceiver<ReminderJob>)> {
    let storage = Arc::new(open_storage(settings)?);
    let clock = settings.clock();
    let (scheduler, jobs) = TokioScheduler::new(clock);
    let router = EventRouter::new(
        storage,
        settings.build_completer()?,
        settings.build_transcriber()?,
        Arc::new(scheduler),
        clock,
    );
    Ok((Arc::new(router), jobs))
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is normal.
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut settings = Settings::from_env();
    if let Some(db) = cli.db {
        settings.db_path = db;
    }

    match cli.command {
        Commands::Serve { port, host } => commands::serve::run(&settings, port, host).await,
        Commands::Chat { user, name } => commands::chat::run(&settings, user, name).await,
        Commands::Slot { text, today } => commands::tools::run_slot(&text, today.unwrap_or_else(|| settings.clock().today())),
        Commands::Due { input, today } => commands::tools::run_due(&input, today.unwrap_or_else(|| settings.clock().today())),
        Commands::Reset { user } => commands::admin::run_reset(&settings, user),
        Commands::Export { user } => commands::admin::run_export(&settings, user),
    }
}
