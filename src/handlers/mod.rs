//! Command handlers. Each `handle` owns its output.

pub mod add;
pub mod categories;
pub mod delete;
pub mod done;
pub mod edit;
pub mod init;
pub mod list;
pub mod profile;
pub mod show;

use anyhow::Result;
use chrono::{DateTime, Local};
use clap::Args;
use colored::{ColoredString, Colorize};
use rusqlite::Connection;
use std::fmt::Write as _;
use taskdeck::config::DeckConfig;
use taskdeck::engine::db::Db;
use taskdeck::engine::labels::Labels;
use taskdeck::engine::repo::{ProfileRepo, TaskRepo};
use taskdeck::engine::resolver::TaskResolver;
use taskdeck::engine::types::{Priority, Profile, Reminder, Task};

/// Optional task fields shared by `add` and `edit`.
#[derive(Debug, Default, Args)]
pub struct TaskInput {
    /// Longer notes, up to 500 characters
    #[arg(long, short = 'd')]
    pub description: Option<String>,
    /// high, medium or low
    #[arg(long, short = 'p')]
    pub priority: Option<Priority>,
    /// RFC 3339, `YYYY-MM-DD [HH:MM]`, `today` or `tomorrow [HH:MM]`
    #[arg(long, short = 'D')]
    pub deadline: Option<String>,
    /// Expected effort, free text (e.g. "1h 30m")
    #[arg(long = "time", short = 't')]
    pub execution_time: Option<String>,
    /// Minutes before the deadline: 0, 5, 10, 15, 30, 60, 120 or 1440 (also 2h, 1d)
    #[arg(long, short = 'r')]
    pub reminder: Option<Reminder>,
    /// How the task recurs, free text (e.g. "weekly")
    #[arg(long = "repeat")]
    pub repetition: Option<String>,
    /// Hex color marking, `#RGB` or `#RRGGBB`
    #[arg(long)]
    pub color: Option<String>,
    #[arg(long)]
    pub icon: Option<String>,
}

/// An open database plus the profile whose tasks commands act on.
pub struct Session {
    pub conn: Connection,
    pub profile: Profile,
}

impl Session {
    /// Connects and loads the active profile.
    ///
    /// # Errors
    /// Returns error if storage is not initialized or no profile is active.
    pub fn open(config: &DeckConfig) -> Result<Self> {
        let conn = Db::connect(&config.storage.dir)?;
        let profile = ProfileRepo::new(&conn).active()?;
        Ok(Self { conn, profile })
    }

    #[must_use]
    pub fn tasks(&self) -> TaskRepo<'_> {
        TaskRepo::new(&self.conn, self.profile.id)
    }

    #[must_use]
    pub fn labels(&self) -> Labels {
        Labels::for_language(self.profile.language)
    }
}

/// Resolves a task reference, printing a note when the match was fuzzy.
///
/// # Errors
/// Returns error if nothing matches.
pub fn resolve(repo: &TaskRepo<'_>, task_ref: &str, strict: bool) -> Result<Task> {
    let resolver = if strict {
        TaskResolver::strict(repo)
    } else {
        TaskResolver::new(repo)
    };
    let result = resolver.resolve(task_ref)?;
    if result.fuzzy {
        println!(
            "   {} matched [{}] {}",
            "~".dimmed(),
            result.task.id,
            result.task.title
        );
    }
    Ok(result.task)
}

/// One-line rendering of a task for lists.
#[must_use]
pub fn task_line(task: &Task, labels: &Labels, now: &DateTime<Local>) -> String {
    let check = if task.is_completed {
        "[✓]".green()
    } else {
        "[ ]".normal()
    };
    let title = if task.is_completed {
        task.title.dimmed().strikethrough()
    } else {
        priority_colored(task.priority, &task.title)
    };

    let mut line = format!("{check} {} {title}", format!("#{}", task.id).dimmed());
    if let Some(priority) = task.priority {
        let _ = write!(line, " {}", priority_colored(Some(priority), labels.priority(priority)));
    }
    if let Some(category) = &task.category {
        let _ = write!(line, " {}", format!("({category})").cyan());
    }
    if let Some(deadline) = task.deadline {
        let _ = write!(line, " {}", labels.deadline(deadline, now).dimmed());
    }
    if task.reminder.is_some() {
        let _ = write!(line, " {}", "🔔".yellow());
    }
    if let Some(repetition) = &task.repetition {
        let _ = write!(line, " {}", format!("↻ {repetition}").dimmed());
    }
    line
}

fn priority_colored(priority: Option<Priority>, text: &str) -> ColoredString {
    match priority {
        Some(Priority::High) => text.red(),
        Some(Priority::Medium) => text.yellow(),
        Some(Priority::Low) => text.green(),
        None => text.normal(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_line_lists_set_fields_in_order() {
        colored::control::set_override(false);
        let task = Task {
            id: 7,
            title: "Buy milk".into(),
            category: Some("Home".into()),
            priority: Some(Priority::Low),
            reminder: Some(Reminder::FifteenMinutes),
            repetition: Some("weekly".into()),
            ..Task::default()
        };
        let line = task_line(&task, &Labels::default(), &Local::now());
        assert_eq!(line, "[ ] #7 Buy milk Low (Home) 🔔 ↻ weekly");

        let bare = Task {
            id: 8,
            title: "Plain".into(),
            is_completed: true,
            ..Task::default()
        };
        assert_eq!(task_line(&bare, &Labels::default(), &Local::now()), "[✓] #8 Plain");
    }
}
