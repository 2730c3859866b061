//! Multi-step workflows built on the cache and the remote clients.

mod maints;
mod rogue;

pub use maints::maintainer_emails;
pub use rogue::{rogue_packagers, MissingGroupPolicy, RogueReport};
