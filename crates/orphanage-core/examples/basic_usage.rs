//! Basic usage example - resolve usernames and @groups to emails

use orphanage_core::{sorted_emails, OrphanageApi, Result, Settings};

fn main() -> Result<()> {
    let names: Vec<String> = std::env::args().skip(1).collect();
    if names.is_empty() {
        eprintln!("usage: basic_usage NAME|@GROUP...");
        return Ok(());
    }

    let settings = Settings::load(None)?;
    println!("Using cache at {}", settings.fasjson.db.display());

    let api = OrphanageApi::new(settings)?;
    let emails = api.cache().get_all_emails(&names)?;

    println!("Resolved {} users:", emails.len());
    for email in sorted_emails(&emails) {
        println!("  - {}", email);
    }

    Ok(())
}
