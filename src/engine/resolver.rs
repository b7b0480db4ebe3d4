//! Task Resolver: matches what a user typed to one of their tasks.

use super::error::{DeckError, Result};
use super::repo::TaskRepo;
use super::types::Task;
use std::collections::HashSet;

const MIN_SCORE: f64 = 0.3;

pub struct ResolveResult {
    pub task: Task,
    pub confidence: f64,
    /// Set when the task was picked by title similarity rather than by id or
    /// exact title.
    pub fuzzy: bool,
}

pub struct TaskResolver<'a> {
    repo: &'a TaskRepo<'a>,
    strict: bool,
}

impl<'a> TaskResolver<'a> {
    /// Creates a new resolver.
    #[must_use]
    pub fn new(repo: &'a TaskRepo<'a>) -> Self {
        Self {
            repo,
            strict: false,
        }
    }

    /// Creates a resolver that accepts only ids and exact titles.
    #[must_use]
    pub fn strict(repo: &'a TaskRepo<'a>) -> Self {
        Self { repo, strict: true }
    }

    /// Resolves a user query into a task: numeric id, then exact title
    /// (case-insensitive), then best fuzzy title match.
    ///
    /// # Errors
    /// Returns `NotFound` if nothing matches.
    pub fn resolve(&self, query: &str) -> Result<ResolveResult> {
        let query = query.trim();
        if let Ok(id) = query.parse::<i64>() {
            if let Some(task) = self.repo.find_by_id(id)? {
                return Ok(ResolveResult {
                    task,
                    confidence: 1.0,
                    fuzzy: false,
                });
            }
        }

        let tasks = self.repo.get_all()?;
        let query_lower = query.to_lowercase();

        if let Some(task) = tasks
            .iter()
            .find(|t| t.title.to_lowercase() == query_lower)
        {
            return Ok(ResolveResult {
                task: task.clone(),
                confidence: 1.0,
                fuzzy: false,
            });
        }

        if self.strict {
            return Err(DeckError::not_found("task", query));
        }
        Self::fuzzy_resolve(tasks, query, &query_lower)
    }

    fn fuzzy_resolve(tasks: Vec<Task>, query: &str, query_lower: &str) -> Result<ResolveResult> {
        let words: Vec<_> = query_lower.split_whitespace().collect();

        let mut matches: Vec<_> = tasks
            .into_iter()
            .map(|t| (calculate_score(&t, query_lower, &words), t))
            .filter(|(s, _)| *s > MIN_SCORE)
            .collect();

        // Stable: equal scores keep the repository's newest-first order.
        matches.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        let (confidence, task) = matches
            .into_iter()
            .next()
            .ok_or_else(|| DeckError::not_found("task", query))?;

        Ok(ResolveResult {
            task,
            confidence,
            fuzzy: true,
        })
    }
}

/// Calculates a match score between a task title and a query.
fn calculate_score(task: &Task, query: &str, query_words: &[&str]) -> f64 {
    let title_lower = task.title.to_lowercase();

    let mut score = 0.0;

    if title_lower.contains(query) {
        score += 0.7;
    }

    for word in query_words {
        if title_lower.contains(word) {
            score += 0.25;
        }
    }

    if title_lower.starts_with(query) {
        score += 0.3;
    }

    score += string_similarity(&title_lower, query) * 0.4;

    score.min(1.0)
}

#[allow(clippy::cast_precision_loss)]
fn string_similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let a_chars: HashSet<char> = a.chars().collect();
    let b_chars: HashSet<char> = b.chars().collect();

    let intersection = a_chars.intersection(&b_chars).count();
    let union = a_chars.union(&b_chars).count();

    if union == 0 {
        return 0.0;
    }

    intersection as f64 / union as f64
}
