//! Orphanage CLI - tooling around the orphaned packages process.
//!
//! Logs go to stderr so stdout can be piped.

mod handlers;
mod lines;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use handlers::{DistgitCommand, Fas2EmailCommand, RogueArgs};
use orphanage_core::{OrphanageApi, Settings};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "orphanage", version)]
#[command(about = "Tooling for the orphaned packages process")]
struct Args {
    /// Config file (defaults to <config dir>/orphanage.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// FASJSON cache TTL in seconds
    #[arg(long, global = true, value_name = "SECS")]
    fasjson_ttl: Option<u64>,

    /// FASJSON cache database
    #[arg(long, global = true, value_name = "PATH")]
    fasjson_db: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Map FAS usernames and groups to email addresses
    #[command(name = "fas2email", alias = "f2e")]
    Fas2Email {
        #[command(subcommand)]
        command: Fas2EmailCommand,
    },

    /// Report Pagure group members who are not packagers
    RoguePackagers(RogueArgs),

    /// Work with Fedora dist-git projects
    #[command(alias = "dg")]
    Distgit {
        #[command(subcommand)]
        command: DistgitCommand,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // RUST_LOG wins over --debug
    let log_level = if args.debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    let settings = load_settings(&args)?;
    debug!("Using cache database {}", settings.fasjson.db.display());

    let api = OrphanageApi::new(settings).context("Failed to open the identity cache")?;

    match args.command {
        Command::Fas2Email { command } => handlers::fas2email(&api, command),
        Command::RoguePackagers(rogue) => handlers::rogue_packagers(&api, rogue),
        Command::Distgit { command } => handlers::distgit(&api, command),
    }
}

fn load_settings(args: &Args) -> Result<Settings> {
    let mut settings: Settings = Settings::figment(args.config.as_deref())?
        .extract()
        .context("Failed to load configuration")?;

    if let Some(ttl) = args.fasjson_ttl {
        settings.fasjson.ttl_secs = ttl;
    }
    if let Some(db) = &args.fasjson_db {
        settings.fasjson.db = db.clone();
    }

    settings.validate()?;
    Ok(settings)
}
