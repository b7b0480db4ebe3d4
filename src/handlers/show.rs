//! Handler for the `show` command.

use super::{resolve, Session};
use anyhow::Result;
use chrono::Local;
use colored::Colorize;
use taskdeck::config::DeckConfig;
use taskdeck::engine::labels::Labels;
use taskdeck::engine::types::Task;

/// Prints every field of one task.
///
/// # Errors
/// Returns error if the task cannot be resolved.
pub fn handle(config: &DeckConfig, task_ref: &str, strict: bool, json: bool) -> Result<()> {
    let session = Session::open(config)?;
    let task = resolve(&session.tasks(), task_ref, strict)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&task)?);
        return Ok(());
    }

    print_human(&task, &session.labels());
    Ok(())
}

fn print_human(task: &Task, labels: &Labels) {
    let status = if task.is_completed {
        "COMPLETED".green()
    } else {
        "ACTIVE".yellow()
    };
    println!("[{}] {} ({status})", task.id.to_string().cyan(), task.title.bold());

    if let Some(desc) = &task.description {
        println!();
        for line in desc.lines() {
            println!("   {line}");
        }
        println!();
    }

    field("Category", task.category.as_deref());
    field("Priority", task.priority.map(|p| labels.priority(p)));

    let deadline = task.deadline.map(|d| {
        d.with_timezone(&Local)
            .format("%-d %B %Y, %H:%M")
            .to_string()
    });
    field("Deadline", deadline.as_deref());
    field("Time", task.execution_time.as_deref());

    let reminder = task.reminder.map(|r| match task.reminder_at() {
        Some(at) => format!("{r} ({})", at.with_timezone(&Local).format("%-d %b, %H:%M")),
        None => r.to_string(),
    });
    field("Reminder", reminder.as_deref());
    field("Repeat", task.repetition.as_deref());
    field("Color", task.color_marking.as_deref());
    field("Icon", task.icon.as_deref());
    field("Created", Some(task.created_at.as_str()));
    field("Updated", Some(task.updated_at.as_str()));
}

fn field(name: &str, value: Option<&str>) {
    if let Some(v) = value {
        let label = format!("{name}:");
        println!("   {} {v}", format!("{label:<9}").dimmed());
    }
}
