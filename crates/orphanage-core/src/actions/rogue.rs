//! Find group members who are not packagers.
//!
//! Every Pagure group should only contain members of the `packager` FAS
//! group. This walks all Pagure groups, resolves their FAS membership through
//! the cache and reports the outsiders.

use crate::cache::EmailCacheClient;
use crate::config::GroupsConfig;
use crate::error::{OrphanageError, Result};
use crate::pagure::GroupCatalog;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use tracing::{info, warn};

/// What to do when a group exists in Pagure but not in FASJSON.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingGroupPolicy {
    /// Log a warning and continue with the next group.
    #[default]
    Skip,
    /// Abort the whole run.
    Fail,
}

impl MissingGroupPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MissingGroupPolicy::Skip => "skip",
            MissingGroupPolicy::Fail => "fail",
        }
    }
}

impl fmt::Display for MissingGroupPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MissingGroupPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "skip" => Ok(MissingGroupPolicy::Skip),
            "fail" => Ok(MissingGroupPolicy::Fail),
            other => Err(format!("invalid missing group policy {other:?}, expected skip or fail")),
        }
    }
}

/// Non-packager members per group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RogueReport {
    /// Group → offending members. Groups without offenders are omitted.
    pub groups: BTreeMap<String, Vec<String>>,
    /// Every offending member across all groups, sorted.
    pub total: Vec<String>,
    /// Groups skipped because FASJSON does not know them.
    pub skipped: Vec<String>,
}

/// Collect members of each catalog group that are not in the packager group.
pub fn rogue_packagers(
    cache: &EmailCacheClient,
    catalog: &dyn GroupCatalog,
    on_missing: MissingGroupPolicy,
) -> Result<RogueReport> {
    let packagers: BTreeSet<String> = cache
        .get_members(GroupsConfig::PACKAGER_GROUP)?
        .into_iter()
        .collect();

    let mut report = RogueReport::default();
    let mut total = BTreeSet::new();

    for group in catalog.list_groups()? {
        if group == GroupsConfig::PACKAGER_GROUP {
            continue;
        }

        let members = match cache.get_members(&group) {
            Ok(members) => members,
            Err(e @ OrphanageError::NotFound { .. }) => match on_missing {
                MissingGroupPolicy::Skip => {
                    warn!("Skipping group {}: {}", group, e);
                    report.skipped.push(group);
                    continue;
                }
                MissingGroupPolicy::Fail => return Err(e),
            },
            Err(e) => return Err(e),
        };

        let outsiders: Vec<String> = members
            .into_iter()
            .filter(|m| !packagers.contains(m))
            .collect();

        if !outsiders.is_empty() {
            total.extend(outsiders.iter().cloned());
            report.groups.insert(group, outsiders);
        }
    }

    report.total = total.into_iter().collect();
    info!(
        "Found {} non-packagers across {} groups",
        report.total.len(),
        report.groups.len()
    );
    Ok(report)
}
