//! Handler for the `categories` command.

use super::Session;
use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use taskdeck::config::DeckConfig;

#[derive(Serialize)]
struct CategoryView {
    name: String,
    tasks: usize,
}

/// Lists the categories in use with their task counts.
///
/// # Errors
/// Returns error if the query fails.
pub fn handle(config: &DeckConfig, json: bool) -> Result<()> {
    let session = Session::open(config)?;
    let categories = session.tasks().categories()?;

    if json {
        let views: Vec<_> = categories
            .into_iter()
            .map(|(name, tasks)| CategoryView { name, tasks })
            .collect();
        println!("{}", serde_json::to_string_pretty(&views)?);
        return Ok(());
    }

    println!("{} Categories:", "🏷".cyan());
    if categories.is_empty() {
        println!("   (none yet; add a task with --category)");
        return Ok(());
    }
    for (name, count) in categories {
        println!("   {} {}", name.cyan(), format!("({count})").dimmed());
    }
    Ok(())
}
