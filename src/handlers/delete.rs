//! Handler for the `delete` command.

use super::{resolve, Session};
use anyhow::Result;
use colored::Colorize;
use taskdeck::config::DeckConfig;

/// Permanently deletes a task.
///
/// # Errors
/// Returns error if the task cannot be resolved.
pub fn handle(config: &DeckConfig, task_ref: &str, strict: bool) -> Result<()> {
    let session = Session::open(config)?;
    let repo = session.tasks();
    let task = resolve(&repo, task_ref, strict)?;

    repo.delete(task.id)?;
    println!("{} Deleted [{}] {}", "✗".red(), task.id, task.title);
    Ok(())
}
