//! `distgit`: project maintainers and their emails.

use crate::lines::write_lines;
use anyhow::{Context, Result};
use clap::Subcommand;
use orphanage_core::{sorted_emails, OrphanageApi};
use std::path::Path;

#[derive(Subcommand, Debug)]
pub enum DistgitCommand {
    /// Print all maintainers of a project. Groups are @-prefixed.
    #[command(alias = "maintainers")]
    Maints {
        /// Project path, e.g. rpms/fedpkg
        project: String,

        /// Don't list maintaining groups
        #[arg(short = 'G', long)]
        no_groups: bool,
    },

    /// Print the emails of every maintainer of the given packages
    MaintEmails {
        #[arg(required = true, num_args = 1..)]
        packages: Vec<String>,

        /// Pagure project prefix
        #[arg(long, default_value = "rpms/")]
        prefix: String,

        /// Don't expand maintaining groups
        #[arg(short = 'G', long)]
        no_groups: bool,
    },
}

pub fn run(api: &OrphanageApi, command: DistgitCommand) -> Result<()> {
    match command {
        DistgitCommand::Maints { project, no_groups } => {
            let maints = api
                .pagure()
                .get_all_maints(&project, !no_groups)
                .with_context(|| format!("Failed to get maintainers of {}", project))?;
            write_lines(Path::new("-"), &maints)
        }
        DistgitCommand::MaintEmails {
            packages,
            prefix,
            no_groups,
        } => {
            let emails = api
                .maintainer_emails(&packages, &prefix, !no_groups)
                .context("Failed to resolve maintainer emails")?;
            write_lines(Path::new("-"), &sorted_emails(&emails))
        }
    }
}
