use anyhow::{Context, Result};
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};

pub const DB_FILE: &str = "taskdeck.db";

pub struct Db;

impl Db {
    /// Path of the database file inside a storage directory.
    #[must_use]
    pub fn path(dir: &Path) -> PathBuf {
        dir.join(DB_FILE)
    }

    /// Creates the storage directory and `SQLite` schema.
    ///
    /// # Errors
    /// Returns error if directory creation, DB opening, or migration fails.
    pub fn init(dir: &Path) -> Result<Connection> {
        if !dir.exists() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }

        let conn = Self::open(&Self::path(dir))?;
        Self::migrate(&conn)?;
        Ok(conn)
    }

    /// Connects to an existing database.
    ///
    /// # Errors
    /// Returns error if the database file does not exist or cannot be opened.
    pub fn connect(dir: &Path) -> Result<Connection> {
        let db_path = Self::path(dir);
        if !db_path.exists() {
            anyhow::bail!("taskdeck not initialized. Run `taskdeck init` first.");
        }
        let conn = Self::open(&db_path)?;
        Self::migrate(&conn)?;
        Ok(conn)
    }

    /// Opens a migrated in-memory database.
    ///
    /// # Errors
    /// Returns error if migration fails.
    pub fn open_in_memory() -> Result<Connection> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Self::migrate(&conn)?;
        Ok(conn)
    }

    fn open(path: &Path) -> Result<Connection> {
        let conn = Connection::open(path).context("Failed to open database")?;
        conn.pragma_update(None, "foreign_keys", "ON")
            .context("Failed to enable foreign keys")?;
        Ok(conn)
    }

    /// Applies the schema migrations.
    fn migrate(conn: &Connection) -> Result<()> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS profiles (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT UNIQUE NOT NULL,
                phone TEXT NOT NULL,
                language TEXT NOT NULL DEFAULT 'en',
                avatar BLOB,
                avatar_type TEXT,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )",
            [],
        )
        .context("Failed to create profiles table")?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS tasks (
                id INTEGER PRIMARY KEY,
                profile_id INTEGER NOT NULL,
                title TEXT NOT NULL,
                category TEXT,
                description TEXT,
                priority TEXT,
                deadline TEXT,
                execution_time TEXT,
                reminder TEXT,
                color_marking TEXT,
                icon TEXT,
                repetition TEXT,
                completed INTEGER NOT NULL DEFAULT 0,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY(profile_id) REFERENCES profiles(id) ON DELETE CASCADE
            )",
            [],
        )
        .context("Failed to create tasks table")?;

        if !Self::has_column(conn, "tasks", "repetition")? {
            conn.execute("ALTER TABLE tasks ADD COLUMN repetition TEXT", [])
                .context("Failed to add tasks.repetition")?;
        }

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_tasks_profile ON tasks(profile_id, created_at)",
            [],
        )
        .context("Failed to create tasks index")?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS state (
                key TEXT PRIMARY KEY,
                value TEXT
            )",
            [],
        )
        .context("Failed to create state table")?;

        Ok(())
    }

    fn has_column(conn: &Connection, table: &str, column: &str) -> Result<bool> {
        let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
        let names = stmt.query_map([], |r| r.get::<_, String>(1))?;
        for name in names {
            if name? == column {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_requires_init() {
        let dir = tempfile::tempdir().unwrap();
        let err = Db::connect(dir.path()).unwrap_err();
        assert!(err.to_string().contains("not initialized"));

        Db::init(dir.path()).unwrap();
        assert!(Db::path(dir.path()).exists());
        assert!(Db::connect(dir.path()).is_ok());
    }

    #[test]
    fn test_init_creates_nested_dir_and_is_repeatable() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        Db::init(&nested).unwrap();
        Db::init(&nested).unwrap();
        assert!(Db::path(&nested).exists());
    }

    #[test]
    fn test_migrate_adds_repetition_to_older_tasks_table() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE tasks (
                id INTEGER PRIMARY KEY,
                profile_id INTEGER NOT NULL,
                title TEXT NOT NULL,
                category TEXT,
                description TEXT,
                priority TEXT,
                deadline TEXT,
                execution_time TEXT,
                reminder TEXT,
                color_marking TEXT,
                icon TEXT,
                completed INTEGER NOT NULL DEFAULT 0,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );",
        )
        .unwrap();
        assert!(!Db::has_column(&conn, "tasks", "repetition").unwrap());

        Db::migrate(&conn).unwrap();
        assert!(Db::has_column(&conn, "tasks", "repetition").unwrap());
        Db::migrate(&conn).unwrap();
    }
}
