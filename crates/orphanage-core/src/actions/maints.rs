//! Resolve package maintainers to email addresses.

use crate::cache::{EmailCacheClient, EmailMap};
use crate::error::Result;
use crate::pagure::MaintainerDirectory;
use std::collections::BTreeSet;
use tracing::debug;

/// Collect the maintainers of every project, then resolve them all in one
/// expansion.
///
/// `prefix` is prepended to each project name, e.g. `rpms/`. With
/// `include_groups`, maintaining groups are expanded to their members.
pub fn maintainer_emails<S: AsRef<str>>(
    cache: &EmailCacheClient,
    directory: &dyn MaintainerDirectory,
    projects: &[S],
    prefix: &str,
    include_groups: bool,
) -> Result<EmailMap> {
    let mut references = BTreeSet::new();
    for project in projects {
        let project = format!("{}{}", prefix, project.as_ref());
        let maints = directory.list_maintainers(&project, include_groups)?;
        debug!("{} has {} maintainers", project, maints.len());
        references.extend(maints);
    }

    let references: Vec<String> = references.into_iter().collect();
    cache.get_all_emails(&references)
}
