//! Pagure (dist-git) API client.

use crate::config::NetworkConfig;
use crate::error::Result;
use crate::network::{join_url, HttpClient};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Anything that can enumerate group names.
pub trait GroupCatalog: Send + Sync {
    fn list_groups(&self) -> Result<Vec<String>>;
}

/// Anything that can list who maintains a project.
pub trait MaintainerDirectory: Send + Sync {
    /// Every maintainer of `project`, sorted. Groups are `@`-prefixed.
    fn list_maintainers(&self, project: &str, include_groups: bool) -> Result<Vec<String>>;
}

#[derive(Debug, Deserialize)]
struct GroupsPage {
    groups: Vec<String>,
}

/// Users and groups with access to a project, by role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contributors {
    #[serde(default)]
    pub users: ContributorRoles,
    #[serde(default)]
    pub groups: ContributorRoles,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContributorRoles {
    pub admin: Vec<String>,
    pub collaborators: Vec<Collaborator>,
    pub commit: Vec<String>,
    pub ticket: Vec<String>,
}

impl ContributorRoles {
    fn names(&self) -> impl Iterator<Item = &str> {
        self.admin
            .iter()
            .chain(&self.commit)
            .chain(&self.ticket)
            .map(String::as_str)
            .chain(self.collaborators.iter().map(|c| c.user.as_str()))
    }
}

/// Access limited to some branches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collaborator {
    pub user: String,
    #[serde(default)]
    pub branches: String,
}

/// Pagure REST client.
pub struct PagureClient {
    http: Arc<HttpClient>,
    base_url: String,
}

impl PagureClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Ok(Self::with_http(Arc::new(HttpClient::new()?), base_url))
    }

    pub fn with_http(http: Arc<HttpClient>, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// List group names known to Pagure.
    ///
    /// Only the first page is requested, at the maximum page size.
    pub fn get_groups(&self) -> Result<Vec<String>> {
        let url = format!(
            "{}?per_page={}",
            join_url(&self.base_url, "api/0/groups", &[]),
            NetworkConfig::PAGURE_PER_PAGE
        );
        let page: GroupsPage = self.http.get_json(&url)?;
        Ok(page.groups)
    }

    /// Get the contributors of a project such as `rpms/fedpkg`.
    pub fn get_contributors(&self, project: &str) -> Result<Contributors> {
        let mut segments: Vec<&str> = project.split('/').filter(|s| !s.is_empty()).collect();
        segments.push("contributors");
        let url = join_url(&self.base_url, "api/0", &segments);
        self.http.get_json(&url)
    }

    /// Flatten a project's contributors into one sorted list of names.
    ///
    /// Every role counts. Groups are `@`-prefixed so the list can be fed
    /// straight into email expansion.
    pub fn get_all_maints(&self, project: &str, include_groups: bool) -> Result<Vec<String>> {
        let contributors = self.get_contributors(project)?;

        let mut maints: BTreeSet<String> =
            contributors.users.names().map(str::to_string).collect();
        if include_groups {
            maints.extend(contributors.groups.names().map(|g| format!("@{}", g)));
        }
        Ok(maints.into_iter().collect())
    }
}

impl GroupCatalog for PagureClient {
    fn list_groups(&self) -> Result<Vec<String>> {
        self.get_groups()
    }
}

impl MaintainerDirectory for PagureClient {
    fn list_maintainers(&self, project: &str, include_groups: bool) -> Result<Vec<String>> {
        self.get_all_maints(project, include_groups)
    }
}
