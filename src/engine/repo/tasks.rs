//! Task Repository: task CRUD scoped to a single profile.

use crate::engine::error::{DeckError, Result};
use crate::engine::pipeline::StatusCounts;
use crate::engine::types::{NewTask, Priority, Reminder, Task, TaskPatch};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, warn};

pub const TASK_SELECT: &str = "SELECT id, profile_id, title, category, description, priority, \
     deadline, execution_time, reminder, color_marking, icon, completed, created_at, updated_at, \
     repetition FROM tasks";

/// Every query is restricted to `profile_id`; tasks of other profiles are
/// invisible through this repository.
pub struct TaskRepo<'a> {
    conn: &'a Connection,
    profile_id: i64,
}

impl<'a> TaskRepo<'a> {
    /// Creates a repository for one profile's tasks.
    #[must_use]
    pub fn new(conn: &'a Connection, profile_id: i64) -> Self {
        Self { conn, profile_id }
    }

    /// Validates and inserts a new task.
    ///
    /// # Errors
    /// Returns a validation error, or a database error if the insert fails.
    pub fn create(&self, new: &NewTask) -> Result<Task> {
        new.validate()?;
        self.conn.execute(
            "INSERT INTO tasks (profile_id, title, category, description, priority, deadline,
                                execution_time, reminder, color_marking, icon, repetition)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                self.profile_id,
                new.title.trim(),
                new.category.trim(),
                new.description,
                new.priority.map(Priority::key),
                new.deadline.map(|d| d.to_rfc3339()),
                new.execution_time,
                new.reminder.map(String::from),
                new.color_marking,
                new.icon,
                non_blank(new.repetition.as_deref())
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!(task_id = id, profile_id = self.profile_id, "task created");
        self.get(id)
    }

    /// Retrieves all tasks, most recently created first.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn get_all(&self) -> Result<Vec<Task>> {
        let sql = format!("{TASK_SELECT} WHERE profile_id = ?1 ORDER BY created_at DESC, id DESC");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![self.profile_id], |r| Self::row_to_task(r))?;
        let mut tasks = Vec::new();
        for task in rows {
            tasks.push(task?);
        }
        Ok(tasks)
    }

    /// Finds a task by its internal ID.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn find_by_id(&self, id: i64) -> Result<Option<Task>> {
        let sql = format!("{TASK_SELECT} WHERE id = ?1 AND profile_id = ?2");
        Ok(self
            .conn
            .query_row(&sql, params![id, self.profile_id], |r| Self::row_to_task(r))
            .optional()?)
    }

    /// Like `find_by_id`, but a missing task is an error.
    ///
    /// # Errors
    /// Returns `DeckError::NotFound` if no such task exists for this profile.
    pub fn get(&self, id: i64) -> Result<Task> {
        self.find_by_id(id)?
            .ok_or_else(|| DeckError::not_found("task", id))
    }

    /// Applies a partial update and returns the stored result.
    ///
    /// # Errors
    /// Returns `NotFound`, a validation error, or a database error.
    pub fn update(&self, id: i64, patch: TaskPatch) -> Result<Task> {
        let mut task = self.get(id)?;
        patch.apply(&mut task)?;
        self.conn.execute(
            "UPDATE tasks SET title = ?1, category = ?2, description = ?3, priority = ?4,
                    deadline = ?5, execution_time = ?6, reminder = ?7, color_marking = ?8,
                    icon = ?9, completed = ?10, repetition = ?11, updated_at = CURRENT_TIMESTAMP
             WHERE id = ?12 AND profile_id = ?13",
            params![
                task.title,
                task.category,
                task.description,
                task.priority.map(Priority::key),
                task.deadline.map(|d| d.to_rfc3339()),
                task.execution_time,
                task.reminder.map(String::from),
                task.color_marking,
                task.icon,
                task.is_completed,
                non_blank(task.repetition.as_deref()),
                id,
                self.profile_id
            ],
        )?;
        debug!(task_id = id, "task updated");
        self.get(id)
    }

    /// Sets the completion flag.
    ///
    /// # Errors
    /// Returns `NotFound` if the task does not exist for this profile.
    pub fn set_completed(&self, id: i64, completed: bool) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE tasks SET completed = ?1, updated_at = CURRENT_TIMESTAMP
             WHERE id = ?2 AND profile_id = ?3",
            params![completed, id, self.profile_id],
        )?;
        if changed == 0 {
            return Err(DeckError::not_found("task", id));
        }
        debug!(task_id = id, completed, "task completion set");
        Ok(())
    }

    /// Flips the completion flag and returns the updated task.
    ///
    /// # Errors
    /// Returns `NotFound` if the task does not exist for this profile.
    pub fn toggle_completed(&self, id: i64) -> Result<Task> {
        let task = self.get(id)?;
        self.set_completed(id, !task.is_completed)?;
        self.get(id)
    }

    /// Permanently removes a task.
    ///
    /// # Errors
    /// Returns `NotFound` if the task does not exist for this profile.
    pub fn delete(&self, id: i64) -> Result<()> {
        let changed = self.conn.execute(
            "DELETE FROM tasks WHERE id = ?1 AND profile_id = ?2",
            params![id, self.profile_id],
        )?;
        if changed == 0 {
            return Err(DeckError::not_found("task", id));
        }
        debug!(task_id = id, "task deleted");
        Ok(())
    }

    /// Distinct categories in use, with task counts, ordered by name.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn categories(&self) -> Result<Vec<(String, usize)>> {
        let mut stmt = self.conn.prepare(
            "SELECT category, COUNT(*) FROM tasks
             WHERE profile_id = ?1 AND category IS NOT NULL AND category <> ''
             GROUP BY category ORDER BY category COLLATE NOCASE",
        )?;
        let rows = stmt.query_map(params![self.profile_id], |r| {
            Ok((r.get::<_, String>(0)?, r.get::<_, i64>(1)?))
        })?;

        let mut categories = Vec::new();
        for row in rows {
            let (name, count) = row?;
            categories.push((name, usize::try_from(count).unwrap_or(0)));
        }
        Ok(categories)
    }

    /// Total, active and completed counts.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn counts(&self) -> Result<StatusCounts> {
        let (total, completed): (i64, i64) = self.conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(completed), 0) FROM tasks WHERE profile_id = ?1",
            params![self.profile_id],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )?;
        let total = usize::try_from(total).unwrap_or(0);
        let completed = usize::try_from(completed).unwrap_or(0);
        Ok(StatusCounts {
            total,
            active: total.saturating_sub(completed),
            completed,
        })
    }

    /// Converts a database row to a Task.
    ///
    /// Malformed optional columns are logged and read as absent.
    ///
    /// # Errors
    /// Returns a `rusqlite` error if a required column cannot be read.
    pub fn row_to_task(row: &rusqlite::Row) -> rusqlite::Result<Task> {
        let id: i64 = row.get(0)?;

        let priority = row.get::<_, Option<String>>(5)?.and_then(|raw| {
            raw.parse::<Priority>()
                .inspect_err(|_| warn!(task_id = id, %raw, "unrecognised priority; ignoring"))
                .ok()
        });
        let deadline = row.get::<_, Option<String>>(6)?.and_then(|raw| {
            DateTime::parse_from_rfc3339(&raw)
                .map(|d| d.with_timezone(&Utc))
                .inspect_err(|_| warn!(task_id = id, %raw, "malformed deadline; ignoring"))
                .ok()
        });
        let reminder = row.get::<_, Option<String>>(8)?.and_then(|raw| {
            raw.parse::<Reminder>()
                .inspect_err(|_| warn!(task_id = id, %raw, "unrecognised reminder; ignoring"))
                .ok()
        });

        Ok(Task {
            id,
            profile_id: row.get(1)?,
            title: row.get(2)?,
            category: row.get(3)?,
            description: row.get(4)?,
            priority,
            deadline,
            execution_time: row.get(7)?,
            reminder,
            repetition: row.get(14)?,
            color_marking: row.get(9)?,
            icon: row.get(10)?,
            is_completed: row.get(11)?,
            created_at: row.get(12)?,
            updated_at: row.get(13)?,
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::db::Db;
    use crate::engine::repo::ProfileRepo;
    use crate::engine::types::{NewProfile, TaskField};
    use chrono::TimeZone;

    fn setup() -> (Connection, i64) {
        let conn = Db::open_in_memory().unwrap();
        let id = add_profile(&conn, "owner@example.com");
        (conn, id)
    }

    fn add_profile(conn: &Connection, email: &str) -> i64 {
        ProfileRepo::new(conn)
            .create(&NewProfile {
                name: "Owner".into(),
                email: email.into(),
                phone: "123".into(),
            })
            .unwrap()
            .id
    }

    #[test]
    fn test_create_and_fetch_round_trips_optional_fields() {
        let (conn, owner) = setup();
        let repo = TaskRepo::new(&conn, owner);
        let deadline = Utc.with_ymd_and_hms(2026, 10, 20, 15, 0, 0).unwrap();

        let mut new = NewTask::new("  Submit report ", "Work");
        new.priority = Some(Priority::High);
        new.deadline = Some(deadline);
        new.reminder = Some(Reminder::HalfHour);
        new.color_marking = Some("#FF6B6B".into());
        new.repetition = Some(" weekly ".into());

        let task = repo.create(&new).unwrap();
        assert_eq!(task.title, "Submit report");
        assert_eq!(task.category.as_deref(), Some("Work"));
        assert_eq!(task.priority, Some(Priority::High));
        assert_eq!(task.deadline, Some(deadline));
        assert_eq!(task.reminder, Some(Reminder::HalfHour));
        assert_eq!(task.repetition.as_deref(), Some("weekly"));
        assert!(!task.is_completed);
        assert_eq!(task.profile_id, owner);
    }

    #[test]
    fn test_create_rejects_invalid() {
        let (conn, owner) = setup();
        let repo = TaskRepo::new(&conn, owner);
        let err = repo.create(&NewTask::new("", "Work")).unwrap_err();
        assert!(matches!(err, DeckError::Validation { field: "title", .. }));
        assert!(repo.get_all().unwrap().is_empty());
    }

    #[test]
    fn test_get_all_newest_first() {
        let (conn, owner) = setup();
        let repo = TaskRepo::new(&conn, owner);
        let a = repo.create(&NewTask::new("first", "x")).unwrap();
        let b = repo.create(&NewTask::new("second", "x")).unwrap();
        let ids: Vec<i64> = repo.get_all().unwrap().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![b.id, a.id]);
    }

    #[test]
    fn test_tasks_are_scoped_to_owner() {
        let (conn, owner) = setup();
        let other = add_profile(&conn, "other@example.com");
        let mine = TaskRepo::new(&conn, owner);
        let theirs = TaskRepo::new(&conn, other);

        let task = mine.create(&NewTask::new("private", "x")).unwrap();
        assert!(theirs.get_all().unwrap().is_empty());
        assert!(theirs.find_by_id(task.id).unwrap().is_none());
        assert!(matches!(
            theirs.delete(task.id),
            Err(DeckError::NotFound { .. })
        ));
        assert!(mine.find_by_id(task.id).unwrap().is_some());
    }

    #[test]
    fn test_update_patch() {
        let (conn, owner) = setup();
        let repo = TaskRepo::new(&conn, owner);
        let mut new = NewTask::new("draft", "x");
        new.icon = Some("star".into());
        let task = repo.create(&new).unwrap();

        let mut patch = TaskPatch {
            title: Some("final".into()),
            description: Some(Some("details".into())),
            repetition: Some(Some("every Monday".into())),
            ..TaskPatch::default()
        };
        patch.clear(TaskField::Icon);
        let updated = repo.update(task.id, patch).unwrap();

        assert_eq!(updated.title, "final");
        assert_eq!(updated.description.as_deref(), Some("details"));
        assert_eq!(updated.repetition.as_deref(), Some("every Monday"));
        assert_eq!(updated.icon, None);

        let mut clear = TaskPatch::default();
        clear.clear(TaskField::Repetition);
        assert_eq!(repo.update(task.id, clear).unwrap().repetition, None);
    }

    #[test]
    fn test_toggle_and_delete() {
        let (conn, owner) = setup();
        let repo = TaskRepo::new(&conn, owner);
        let task = repo.create(&NewTask::new("toggle me", "x")).unwrap();

        assert!(repo.toggle_completed(task.id).unwrap().is_completed);
        assert!(!repo.toggle_completed(task.id).unwrap().is_completed);

        repo.delete(task.id).unwrap();
        assert!(repo.find_by_id(task.id).unwrap().is_none());
        assert!(matches!(repo.delete(task.id), Err(DeckError::NotFound { .. })));
    }

    #[test]
    fn test_categories_and_counts() {
        let (conn, owner) = setup();
        let repo = TaskRepo::new(&conn, owner);
        repo.create(&NewTask::new("a", "work")).unwrap();
        let b = repo.create(&NewTask::new("b", "Home")).unwrap();
        repo.create(&NewTask::new("c", "work")).unwrap();
        repo.set_completed(b.id, true).unwrap();

        assert_eq!(
            repo.categories().unwrap(),
            vec![("Home".to_string(), 1), ("work".to_string(), 2)]
        );
        assert_eq!(
            repo.counts().unwrap(),
            StatusCounts {
                total: 3,
                active: 2,
                completed: 1
            }
        );
    }

    #[test]
    fn test_malformed_columns_degrade_to_absent() {
        let (conn, owner) = setup();
        conn.execute(
            "INSERT INTO tasks (profile_id, title, category, priority, deadline, reminder)
             VALUES (?1, 'legacy', 'x', 'Urgent', 'someday', '7')",
            params![owner],
        )
        .unwrap();

        let tasks = TaskRepo::new(&conn, owner).get_all().unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].priority, None);
        assert_eq!(tasks[0].deadline, None);
        assert_eq!(tasks[0].reminder, None);
    }

    #[test]
    fn test_legacy_ukrainian_priority_is_read() {
        let (conn, owner) = setup();
        conn.execute(
            "INSERT INTO tasks (profile_id, title, category, priority) VALUES (?1, 'old', 'x', 'Високий')",
            params![owner],
        )
        .unwrap();
        let tasks = TaskRepo::new(&conn, owner).get_all().unwrap();
        assert_eq!(tasks[0].priority, Some(Priority::High));
    }
}
