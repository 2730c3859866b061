//! `rogue-packagers`: list Pagure group members outside the packager group.

use anyhow::{Context, Result};
use clap::Args;
use orphanage_core::{MissingGroupPolicy, OrphanageApi};

#[derive(Args, Debug)]
pub struct RogueArgs {
    /// What to do with Pagure groups unknown to FASJSON [default: from config]
    #[arg(long, value_name = "skip|fail")]
    pub on_missing_group: Option<MissingGroupPolicy>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(api: &OrphanageApi, args: RogueArgs) -> Result<()> {
    let report = api
        .rogue_packagers(args.on_missing_group)
        .context("Failed to collect rogue packagers")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for (group, members) in &report.groups {
        println!("{}: {}", group, members.join(", "));
    }
    println!("total: {}", report.total.join(", "));
    Ok(())
}
