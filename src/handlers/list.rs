//! Handler for the `list` command.

use super::{task_line, Session};
use anyhow::Result;
use chrono::{DateTime, Local};
use colored::Colorize;
use serde::Serialize;
use taskdeck::config::DeckConfig;
use taskdeck::engine::labels::Labels;
use taskdeck::engine::pipeline::{
    derive_view, BucketOrder, SortDirection, SortKey, StatusCounts, StatusFilter, TaskGroup,
    ViewQuery,
};
use tracing::debug;

/// View options from the command line; `None` falls back to config.
#[derive(Debug, Default)]
pub struct ListRequest {
    pub filter: StatusFilter,
    pub search: Option<String>,
    pub sort_by: Option<SortKey>,
    pub direction: Option<SortDirection>,
    pub bucket_order: Option<BucketOrder>,
    pub json: bool,
}

#[derive(Serialize)]
struct ListReport<'a> {
    counts: StatusCounts,
    filter: StatusFilter,
    groups: &'a [TaskGroup<'a>],
}

/// Lists the active profile's tasks, filtered, sorted and grouped by deadline.
///
/// # Errors
/// Returns error if the database query fails.
pub fn handle(config: &DeckConfig, request: ListRequest) -> Result<()> {
    let session = Session::open(config)?;
    let tasks = session.tasks().get_all()?;
    let counts = StatusCounts::of(&tasks);
    let labels = session.labels();
    let now = Local::now();

    let query = ViewQuery {
        filter: request.filter,
        search: request.search.unwrap_or_default(),
        sort_by: request.sort_by,
        direction: request.direction.unwrap_or(config.view.sort_direction),
        bucket_order: request.bucket_order.unwrap_or(config.view.bucket_order),
    };
    let groups = derive_view(&tasks, &query, &now, &labels);
    debug!(?query, groups = groups.len(), "derived task view");

    if request.json {
        let report = ListReport {
            counts,
            filter: query.filter,
            groups: &groups,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_human(&groups, &query, counts, &labels, &now);
    Ok(())
}

fn print_human(
    groups: &[TaskGroup<'_>],
    query: &ViewQuery,
    counts: StatusCounts,
    labels: &Labels,
    now: &DateTime<Local>,
) {
    println!("{} {}", "📋".cyan(), filter_header(query.filter, counts));
    if let Some(key) = query.sort_by {
        println!("   {}", format!("sorted by {key} ({})", query.direction).dimmed());
    }
    if !query.search.trim().is_empty() {
        println!("   {}", format!("search: \"{}\"", query.search.trim()).dimmed());
    }

    if groups.is_empty() {
        println!();
        println!("   ({})", labels.empty());
        return;
    }

    for group in groups {
        println!();
        println!("{}", group.label.bold());
        for task in &group.tasks {
            println!("   {}", task_line(task, labels, now));
        }
    }
}

fn filter_header(active: StatusFilter, counts: StatusCounts) -> String {
    [
        (StatusFilter::All, "All", counts.total),
        (StatusFilter::Active, "Active", counts.active),
        (StatusFilter::Completed, "Completed", counts.completed),
    ]
    .into_iter()
    .map(|(filter, name, count)| {
        let text = if count > 0 {
            format!("{name} ({count})")
        } else {
            name.to_string()
        };
        if filter == active {
            text.green().bold().to_string()
        } else {
            text.dimmed().to_string()
        }
    })
    .collect::<Vec<_>>()
    .join(" · ")
}
