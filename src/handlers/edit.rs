//! Handler for the `edit` command.

use super::{resolve, Session, TaskInput};
use anyhow::{bail, Result};
use chrono::Local;
use colored::Colorize;
use taskdeck::config::DeckConfig;
use taskdeck::engine::dates::parse_deadline;
use taskdeck::engine::types::{TaskField, TaskPatch};

/// Field changes requested on the command line.
pub struct EditRequest {
    pub title: Option<String>,
    pub category: Option<String>,
    pub input: TaskInput,
    pub clear: Vec<TaskField>,
}

/// Applies field edits to a task.
///
/// # Errors
/// Returns error if nothing was requested, the task cannot be resolved,
/// or the new values fail validation.
pub fn handle(config: &DeckConfig, task_ref: &str, strict: bool, request: EditRequest) -> Result<()> {
    let session = Session::open(config)?;
    let repo = session.tasks();
    let task = resolve(&repo, task_ref, strict)?;

    let patch = build_patch(request)?;
    if patch.is_empty() {
        bail!("Nothing to change. Pass a field flag or --clear <field>.");
    }

    let updated = repo.update(task.id, patch)?;
    println!("{} Updated [{}] {}", "✓".green(), updated.id, updated.title);
    Ok(())
}

fn build_patch(request: EditRequest) -> Result<TaskPatch> {
    let EditRequest {
        title,
        category,
        input,
        clear,
    } = request;
    let now = Local::now();

    let mut patch = TaskPatch {
        title,
        category,
        description: input.description.map(Some),
        priority: input.priority.map(Some),
        deadline: input
            .deadline
            .as_deref()
            .map(|d| parse_deadline(d, &now))
            .transpose()?
            .map(Some),
        execution_time: input.execution_time.map(Some),
        reminder: input.reminder.map(Some),
        repetition: input.repetition.map(Some),
        color_marking: input.color.map(Some),
        icon: input.icon.map(Some),
    };
    for field in clear {
        patch.clear(field);
    }
    Ok(patch)
}
