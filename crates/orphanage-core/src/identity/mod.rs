//! Remote identity sources.
//!
//! The cache only needs two lookups from the account system: a user's email
//! addresses and a group's member list. [`IdentitySource`] is that contract;
//! [`FasjsonClient`] implements it against the FASJSON REST API.

mod fasjson;

pub use fasjson::{FasjsonClient, Member, User};

use crate::error::Result;

/// Authoritative source of users, emails and group membership.
///
/// Implementations return [`OrphanageError::NotFound`](crate::OrphanageError::NotFound)
/// for unknown users or groups and a transport error for anything else.
pub trait IdentitySource: Send + Sync {
    /// Look up a user record.
    fn get_user(&self, username: &str) -> Result<User>;

    /// List the members of a group.
    fn get_members(&self, group: &str) -> Result<Vec<Member>>;
}
