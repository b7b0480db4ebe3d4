//! Handler for the `init` command.

use anyhow::Result;
use colored::Colorize;
use taskdeck::config::DeckConfig;
use taskdeck::engine::db::Db;

/// Initializes the taskdeck storage directory.
///
/// # Errors
/// Returns error if database initialization fails.
pub fn handle(config: &DeckConfig) -> Result<()> {
    let dir = &config.storage.dir;
    Db::init(dir)?;
    println!("{} Initialized {}", "✓".green(), Db::path(dir).display());
    println!("   Next: taskdeck profile create --name <name> --email <email> --phone <phone>");
    Ok(())
}
