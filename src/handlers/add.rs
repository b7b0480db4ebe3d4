//! Handler for the `add` command.

use super::{Session, TaskInput};
use anyhow::Result;
use chrono::Local;
use colored::Colorize;
use taskdeck::config::DeckConfig;
use taskdeck::engine::dates::parse_deadline;
use taskdeck::engine::types::NewTask;

/// Creates a task for the active profile.
///
/// # Errors
/// Returns error if validation fails or the deadline cannot be parsed.
pub fn handle(config: &DeckConfig, title: &str, category: &str, input: TaskInput) -> Result<()> {
    let session = Session::open(config)?;
    let now = Local::now();

    let new = NewTask {
        title: title.to_string(),
        category: category.to_string(),
        description: input.description,
        priority: input.priority,
        deadline: input
            .deadline
            .as_deref()
            .map(|d| parse_deadline(d, &now))
            .transpose()?,
        execution_time: input.execution_time,
        reminder: input.reminder,
        repetition: input.repetition,
        color_marking: input.color,
        icon: input.icon,
    };

    let task = session.tasks().create(&new)?;
    println!(
        "{} Added task [{}] {}",
        "✓".green(),
        task.id.to_string().yellow(),
        task.title
    );
    if task.reminder.is_some() && task.deadline.is_none() {
        println!("   {} reminder has no deadline to count back from", "note:".dimmed());
    }
    Ok(())
}
