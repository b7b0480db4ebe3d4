//! Handler for the `done` command.

use super::{resolve, Session};
use anyhow::Result;
use colored::Colorize;
use taskdeck::config::DeckConfig;

/// Toggles completion of a task.
///
/// # Errors
/// Returns error if the task cannot be resolved.
pub fn handle(config: &DeckConfig, task_ref: &str, strict: bool) -> Result<()> {
    let session = Session::open(config)?;
    let repo = session.tasks();
    let task = resolve(&repo, task_ref, strict)?;

    let task = repo.toggle_completed(task.id)?;
    if task.is_completed {
        println!("{} Completed [{}] {}", "✓".green(), task.id, task.title);
    } else {
        println!("{} Reopened [{}] {}", "○".yellow(), task.id, task.title);
    }
    Ok(())
}
