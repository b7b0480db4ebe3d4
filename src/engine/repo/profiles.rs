//! Profile Repository: local user profiles and the active-profile pointer.

use crate::engine::error::{DeckError, Result};
use crate::engine::types::{Avatar, ImageType, Language, NewProfile, Profile};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, warn};

const PROFILE_SELECT: &str =
    "SELECT id, name, email, phone, language, avatar, avatar_type, created_at FROM profiles";

pub struct ProfileRepo<'a> {
    conn: &'a Connection,
}

impl<'a> ProfileRepo<'a> {
    #[must_use]
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Registers a new profile.
    ///
    /// # Errors
    /// Returns a validation error, `Conflict` if the email is taken, or a
    /// database error.
    pub fn create(&self, new: &NewProfile) -> Result<Profile> {
        new.validate()?;
        let email = new.normalized_email();
        if self.find_by_email(&email)?.is_some() {
            return Err(DeckError::Conflict(format!(
                "A profile with email '{email}' already exists"
            )));
        }

        self.conn.execute(
            "INSERT INTO profiles (name, email, phone, language) VALUES (?1, ?2, ?3, ?4)",
            params![
                new.name.trim(),
                email,
                new.phone.trim(),
                Language::default().code()
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!(profile_id = id, "profile created");
        self.get(id)
    }

    /// # Errors
    /// Returns an error if the query fails.
    pub fn find_by_id(&self, id: i64) -> Result<Option<Profile>> {
        let sql = format!("{PROFILE_SELECT} WHERE id = ?1");
        Ok(self
            .conn
            .query_row(&sql, params![id], |r| Self::row_to_profile(r))
            .optional()?)
    }

    /// # Errors
    /// Returns `NotFound` if the profile does not exist.
    pub fn get(&self, id: i64) -> Result<Profile> {
        self.find_by_id(id)?
            .ok_or_else(|| DeckError::not_found("profile", id))
    }

    /// Finds a profile by email (case-insensitive).
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn find_by_email(&self, email: &str) -> Result<Option<Profile>> {
        let sql = format!("{PROFILE_SELECT} WHERE email = ?1");
        Ok(self
            .conn
            .query_row(&sql, params![email.trim().to_lowercase()], |r| {
                Self::row_to_profile(r)
            })
            .optional()?)
    }

    /// # Errors
    /// Returns an error if the query fails.
    pub fn get_all(&self) -> Result<Vec<Profile>> {
        let sql = format!("{PROFILE_SELECT} ORDER BY id");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], |r| Self::row_to_profile(r))?;
        let mut profiles = Vec::new();
        for p in rows {
            profiles.push(p?);
        }
        Ok(profiles)
    }

    /// Makes `id` the profile whose tasks commands operate on.
    ///
    /// # Errors
    /// Returns `NotFound` if the profile does not exist.
    pub fn set_active(&self, id: i64) -> Result<()> {
        self.get(id)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO state (key, value) VALUES ('active_profile', ?1)",
            params![id.to_string()],
        )?;
        Ok(())
    }

    /// # Errors
    /// Returns an error if the state query fails.
    pub fn active_id(&self) -> Result<Option<i64>> {
        let res: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM state WHERE key = 'active_profile'",
                [],
                |r| r.get(0),
            )
            .optional()?;
        Ok(res.and_then(|s| s.parse().ok()))
    }

    /// The active profile.
    ///
    /// # Errors
    /// Returns `NoActiveProfile` if none is set or it no longer exists.
    pub fn active(&self) -> Result<Profile> {
        let Some(id) = self.active_id()? else {
            return Err(DeckError::NoActiveProfile);
        };
        self.find_by_id(id)?.ok_or(DeckError::NoActiveProfile)
    }

    /// # Errors
    /// Rejects a blank name; returns `NotFound` for an unknown profile.
    pub fn rename(&self, id: i64, name: &str) -> Result<Profile> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DeckError::validation("name", "must not be empty"));
        }
        self.touch(
            id,
            "UPDATE profiles SET name = ?1, updated_at = CURRENT_TIMESTAMP WHERE id = ?2",
            params![name, id],
        )?;
        self.get(id)
    }

    /// # Errors
    /// Returns `NotFound` for an unknown profile.
    pub fn set_language(&self, id: i64, language: Language) -> Result<()> {
        self.touch(
            id,
            "UPDATE profiles SET language = ?1, updated_at = CURRENT_TIMESTAMP WHERE id = ?2",
            params![language.code(), id],
        )
    }

    /// # Errors
    /// Returns `NotFound` for an unknown profile.
    pub fn set_avatar(&self, id: i64, avatar: &Avatar) -> Result<()> {
        self.touch(
            id,
            "UPDATE profiles SET avatar = ?1, avatar_type = ?2, updated_at = CURRENT_TIMESTAMP
             WHERE id = ?3",
            params![avatar.data, avatar.image_type.mime(), id],
        )
    }

    /// # Errors
    /// Returns `NotFound` for an unknown profile.
    pub fn clear_avatar(&self, id: i64) -> Result<()> {
        self.touch(
            id,
            "UPDATE profiles SET avatar = NULL, avatar_type = NULL,
                    updated_at = CURRENT_TIMESTAMP WHERE id = ?1",
            params![id],
        )
    }

    fn touch(&self, id: i64, sql: &str, params: impl rusqlite::Params) -> Result<()> {
        if self.conn.execute(sql, params)? == 0 {
            return Err(DeckError::not_found("profile", id));
        }
        debug!(profile_id = id, "profile updated");
        Ok(())
    }

    fn row_to_profile(row: &rusqlite::Row) -> rusqlite::Result<Profile> {
        let id: i64 = row.get(0)?;
        let raw_language: String = row.get(4)?;
        let language = raw_language.parse().unwrap_or_else(|_| {
            warn!(profile_id = id, %raw_language, "unknown language; using default");
            Language::default()
        });

        let data: Option<Vec<u8>> = row.get(5)?;
        let mime: Option<String> = row.get(6)?;
        let avatar = match (data, mime.as_deref().and_then(ImageType::from_mime)) {
            (Some(data), Some(image_type)) => Some(Avatar { image_type, data }),
            _ => None,
        };

        Ok(Profile {
            id,
            name: row.get(1)?,
            email: row.get(2)?,
            phone: row.get(3)?,
            language,
            avatar,
            created_at: row.get(7)?,
        })
    }
}
