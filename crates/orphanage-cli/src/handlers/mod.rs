//! Subcommand handlers, split by domain.

mod distgit;
mod fas2email;
mod rogue;

pub use distgit::{run as distgit, DistgitCommand};
pub use fas2email::{run as fas2email, Fas2EmailCommand};
pub use rogue::{run as rogue_packagers, RogueArgs};
