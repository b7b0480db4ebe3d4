//! Task View Pipeline: filter → search → sort → deadline buckets.
//!
//! Every stage is a pure function over borrowed tasks. Nothing here mutates
//! the input slice, so the same inputs always produce the same view.

use super::error::ParseValueError;
use super::labels::Labels;
use super::types::Task;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use feruca::Collator;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Completion-status filter applied before search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl StatusFilter {
    #[must_use]
    pub fn matches(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Active => !task.is_completed,
            Self::Completed => task.is_completed,
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Active => write!(f, "active"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "active" => Ok(Self::Active),
            "completed" | "done" => Ok(Self::Completed),
            _ => Err(ParseValueError::new("filter", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Priority,
    Date,
    Category,
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Priority => write!(f, "priority"),
            Self::Date => write!(f, "date"),
            Self::Category => write!(f, "category"),
        }
    }
}

impl FromStr for SortKey {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "priority" => Ok(Self::Priority),
            "date" | "deadline" => Ok(Self::Date),
            "category" => Ok(Self::Category),
            _ => Err(ParseValueError::new("sort key", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    /// Orients an ascending comparison.
    #[must_use]
    pub fn apply(self, ord: Ordering) -> Ordering {
        match self {
            Self::Asc => ord,
            Self::Desc => ord.reverse(),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asc => write!(f, "asc"),
            Self::Desc => write!(f, "desc"),
        }
    }
}

impl FromStr for SortDirection {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(ParseValueError::new("sort direction", s)),
        }
    }
}

/// How buckets are ordered in the final view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BucketOrder {
    /// Buckets appear in the order their first task is met in the sorted list.
    #[default]
    Encounter,
    /// Dated buckets by calendar day ascending, "No deadline" last.
    Chronological,
}

impl fmt::Display for BucketOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encounter => write!(f, "encounter"),
            Self::Chronological => write!(f, "chronological"),
        }
    }
}

impl FromStr for BucketOrder {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "encounter" => Ok(Self::Encounter),
            "chronological" => Ok(Self::Chronological),
            _ => Err(ParseValueError::new("bucket order", s)),
        }
    }
}

/// The deadline-derived group a task falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketKind {
    NoDeadline,
    Today,
    Tomorrow,
    Day(NaiveDate),
}

impl BucketKind {
    /// Classifies a deadline by its calendar day in `now`'s time zone.
    #[must_use]
    pub fn classify<Tz: TimeZone>(deadline: Option<DateTime<Utc>>, now: &DateTime<Tz>) -> Self {
        let Some(deadline) = deadline else {
            return Self::NoDeadline;
        };
        let today = now.date_naive();
        let day = deadline.with_timezone(&now.timezone()).date_naive();
        if day == today {
            Self::Today
        } else if Some(day) == today.succ_opt() {
            Self::Tomorrow
        } else {
            Self::Day(day)
        }
    }

    fn calendar_day(self, today: NaiveDate) -> Option<NaiveDate> {
        match self {
            Self::NoDeadline => None,
            Self::Today => Some(today),
            Self::Tomorrow => today.succ_opt(),
            Self::Day(d) => Some(d),
        }
    }
}

/// Tasks sharing one bucket, before labelling.
#[derive(Debug, Clone, PartialEq)]
pub struct Bucket<'a> {
    pub kind: BucketKind,
    pub tasks: Vec<&'a Task>,
}

/// A labelled group ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskGroup<'a> {
    pub label: String,
    pub kind: BucketKind,
    pub tasks: Vec<&'a Task>,
}

/// User-driven view parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewQuery {
    pub filter: StatusFilter,
    pub search: String,
    pub sort_by: Option<SortKey>,
    pub direction: SortDirection,
    pub bucket_order: BucketOrder,
}

/// Task counts shown next to the filter options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub total: usize,
    pub active: usize,
    pub completed: usize,
}

impl StatusCounts {
    #[must_use]
    pub fn of(tasks: &[Task]) -> Self {
        let completed = tasks.iter().filter(|t| t.is_completed).count();
        Self {
            total: tasks.len(),
            active: tasks.len() - completed,
            completed,
        }
    }
}

/// Stage 1: keep tasks matching the completion filter.
#[must_use]
pub fn filter_by_status(tasks: &[Task], filter: StatusFilter) -> Vec<&Task> {
    tasks.iter().filter(|t| filter.matches(t)).collect()
}

/// Stage 2: case-insensitive substring match on title or description.
///
/// A blank query keeps everything.
#[must_use]
pub fn search<'a>(tasks: Vec<&'a Task>, query: &str) -> Vec<&'a Task> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return tasks;
    }
    tasks
        .into_iter()
        .filter(|t| {
            t.title.to_lowercase().contains(&needle)
                || t
                    .description
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(&needle))
        })
        .collect()
}

/// Ascending comparison of two tasks on one key.
///
/// Missing priorities rank 0, missing deadlines count as epoch 0, and
/// missing categories compare as the empty string. Categories use Unicode
/// collation, so "Éducation" sorts before "Famille" and "Їжа" before "Яблука".
#[must_use]
pub fn compare(a: &Task, b: &Task, key: SortKey, collator: &mut Collator) -> Ordering {
    match key {
        SortKey::Priority => a.priority_rank().cmp(&b.priority_rank()),
        SortKey::Date => a.deadline_millis().cmp(&b.deadline_millis()),
        SortKey::Category => {
            let (a, b) = (
                a.category.as_deref().unwrap_or(""),
                b.category.as_deref().unwrap_or(""),
            );
            collator.collate(a, b).then_with(|| a.cmp(b))
        }
    }
}

/// Stage 3: order by `sort_by` in `direction`. `None` keeps input order.
///
/// The sort is stable: tasks with equal keys keep their relative order.
pub fn sort_tasks(tasks: &mut [&Task], sort_by: Option<SortKey>, direction: SortDirection) {
    let Some(key) = sort_by else {
        return;
    };
    let mut collator = Collator::default();
    tasks.sort_by(|a, b| direction.apply(compare(a, b, key, &mut collator)));
}

/// Stage 4: bucket tasks by deadline day.
///
/// With `reorder_by`, each bucket's members are re-sorted descending on that
/// key, overriding the order produced by stage 3.
#[must_use]
pub fn group_by_deadline<'a, Tz: TimeZone>(
    tasks: &[&'a Task],
    now: &DateTime<Tz>,
    reorder_by: Option<SortKey>,
    order: BucketOrder,
) -> Vec<Bucket<'a>> {
    let mut buckets: Vec<Bucket<'a>> = Vec::new();
    let mut index: HashMap<BucketKind, usize> = HashMap::new();

    for &task in tasks {
        let kind = BucketKind::classify(task.deadline, now);
        let slot = *index.entry(kind).or_insert_with(|| {
            buckets.push(Bucket {
                kind,
                tasks: Vec::new(),
            });
            buckets.len() - 1
        });
        buckets[slot].tasks.push(task);
    }

    if let Some(key) = reorder_by {
        let mut collator = Collator::default();
        for bucket in &mut buckets {
            bucket.tasks.sort_by(|a, b| compare(b, a, key, &mut collator));
        }
    }

    if order == BucketOrder::Chronological {
        let today = now.date_naive();
        buckets.sort_by_key(|b| {
            let day = b.kind.calendar_day(today);
            (day.is_none(), day)
        });
    }

    buckets
}

/// Runs all four stages and labels the resulting buckets.
///
/// Within-bucket reordering is requested only when sorting by priority.
#[must_use]
pub fn derive_view<'a, Tz: TimeZone>(
    tasks: &'a [Task],
    query: &ViewQuery,
    now: &DateTime<Tz>,
    labels: &Labels,
) -> Vec<TaskGroup<'a>> {
    let filtered = filter_by_status(tasks, query.filter);
    let mut found = search(filtered, &query.search);
    sort_tasks(&mut found, query.sort_by, query.direction);

    let reorder_by = query.sort_by.filter(|k| *k == SortKey::Priority);
    group_by_deadline(&found, now, reorder_by, query.bucket_order)
        .into_iter()
        .map(|b| TaskGroup {
            label: labels.bucket(b.kind),
            kind: b.kind,
            tasks: b.tasks,
        })
        .collect()
}
