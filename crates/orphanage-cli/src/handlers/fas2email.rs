//! `fas2email`: resolve FAS usernames and `@group` references to emails.

use crate::lines::{read_lines, write_lines};
use anyhow::{Context, Result};
use clap::Subcommand;
use orphanage_core::{sorted_emails, OrphanageApi};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Subcommand, Debug)]
pub enum Fas2EmailCommand {
    /// Remove expired entries from the cache
    Clean,

    /// Print emails for usernames or @groups
    Get {
        /// Usernames, or group names prefixed with @
        #[arg(required = true, num_args = 1..)]
        names: Vec<String>,
    },

    /// Resolve names read from a file, one per line
    #[command(name = "get-file", alias = "getf")]
    GetFile {
        /// Input file, - for stdin
        #[arg(short, long, default_value = "-")]
        input: PathBuf,

        /// Output file, - for stdout
        #[arg(short, long, default_value = "-")]
        output: PathBuf,
    },

    /// Print the members of a group
    Members {
        group: String,
    },

    /// Print cache row counts
    Stats,
}

pub fn run(api: &OrphanageApi, command: Fas2EmailCommand) -> Result<()> {
    let cache = api.cache();

    match command {
        Fas2EmailCommand::Clean => {
            let swept = cache.clean().context("Failed to clean the cache")?;
            info!(
                "Removed {} users and {} groups",
                swept.users, swept.groups
            );
        }
        Fas2EmailCommand::Get { names } => resolve(api, &names, Path::new("-"))?,
        Fas2EmailCommand::GetFile { input, output } => {
            let names = read_lines(&input)?;
            resolve(api, &names, &output)?;
        }
        Fas2EmailCommand::Members { group } => {
            let members = cache
                .get_members(&group)
                .with_context(|| format!("Failed to get members of {}", group))?;
            write_lines(Path::new("-"), &members)?;
        }
        Fas2EmailCommand::Stats => {
            let stats = cache.store().stats()?;
            println!("users: {}", stats.users);
            println!("groups: {}", stats.groups);
            println!("memberships: {}", stats.memberships);
        }
    }

    Ok(())
}

fn resolve(api: &OrphanageApi, names: &[String], output: &Path) -> Result<()> {
    let emails = api
        .cache()
        .get_all_emails(names)
        .context("Failed to resolve emails")?;
    write_lines(output, &sorted_emails(&emails))
}
