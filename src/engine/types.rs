//! Core types for taskdeck.
//!
//! Priorities, reminders and languages are stored under stable keys and only
//! translated at render time (see `labels.rs`), so comparisons never depend on
//! the display language.

use super::error::{DeckError, ParseValueError, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const TITLE_MAX_CHARS: usize = 100;
pub const DESCRIPTION_MAX_CHARS: usize = 500;
pub const MAX_AVATAR_BYTES: usize = 2 * 1024 * 1024;

/// Task priority. Missing or unrecognised priorities rank below `Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    #[must_use]
    pub fn rank(self) -> u8 {
        match self {
            Self::High => 3,
            Self::Medium => 2,
            Self::Low => 1,
        }
    }

    /// Rank of an optional priority; absent ranks 0.
    #[must_use]
    pub fn rank_of(priority: Option<Self>) -> u8 {
        priority.map_or(0, Self::rank)
    }

    /// Stable storage key.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Priority {
    type Err = ParseValueError;

    /// Accepts the storage key as well as the English and Ukrainian labels
    /// that older records carry.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high" | "h" | "високий" => Ok(Self::High),
            "medium" | "m" | "середній" => Ok(Self::Medium),
            "low" | "l" | "низький" => Ok(Self::Low),
            _ => Err(ParseValueError::new("priority", s)),
        }
    }
}

/// Reminder lead time before the deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Reminder {
    AtDeadline,
    FiveMinutes,
    TenMinutes,
    FifteenMinutes,
    HalfHour,
    OneHour,
    TwoHours,
    OneDay,
}

impl Reminder {
    pub const ALL: [Self; 8] = [
        Self::AtDeadline,
        Self::FiveMinutes,
        Self::TenMinutes,
        Self::FifteenMinutes,
        Self::HalfHour,
        Self::OneHour,
        Self::TwoHours,
        Self::OneDay,
    ];

    #[must_use]
    pub fn minutes(self) -> u32 {
        match self {
            Self::AtDeadline => 0,
            Self::FiveMinutes => 5,
            Self::TenMinutes => 10,
            Self::FifteenMinutes => 15,
            Self::HalfHour => 30,
            Self::OneHour => 60,
            Self::TwoHours => 120,
            Self::OneDay => 1440,
        }
    }

    #[must_use]
    pub fn from_minutes(minutes: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.minutes() == minutes)
    }

    /// When the reminder should fire for the given deadline.
    #[must_use]
    pub fn fires_at(self, deadline: DateTime<Utc>) -> DateTime<Utc> {
        deadline - Duration::minutes(i64::from(self.minutes()))
    }
}

impl fmt::Display for Reminder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.minutes() {
            0 => write!(f, "at deadline"),
            m if m % 1440 == 0 => write!(f, "{}d before", m / 1440),
            m if m % 60 == 0 => write!(f, "{}h before", m / 60),
            m => write!(f, "{m}m before"),
        }
    }
}

impl FromStr for Reminder {
    type Err = ParseValueError;

    /// Accepts plain minutes ("15") or a unit suffix ("15m", "1h", "1d").
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let err = || ParseValueError::new("reminder", s);
        let trimmed = s.trim().to_lowercase();
        let (digits, factor) = match trimmed.chars().last() {
            Some('m') => (&trimmed[..trimmed.len() - 1], 1),
            Some('h') => (&trimmed[..trimmed.len() - 1], 60),
            Some('d') => (&trimmed[..trimmed.len() - 1], 1440),
            _ => (trimmed.as_str(), 1),
        };
        let amount: u32 = digits.trim().parse().map_err(|_| err())?;
        amount
            .checked_mul(factor)
            .and_then(Self::from_minutes)
            .ok_or_else(err)
    }
}

impl From<Reminder> for String {
    fn from(r: Reminder) -> Self {
        r.minutes().to_string()
    }
}

impl TryFrom<String> for Reminder {
    type Error = ParseValueError;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        s.parse()
    }
}

/// Display languages a profile can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ua,
    Pl,
    De,
    Es,
    Fr,
    It,
    Pt,
    Tr,
    Zh,
    Ja,
    Ko,
    Sv,
    Ar,
}

impl Language {
    pub const ALL: [Self; 14] = [
        Self::En,
        Self::Ua,
        Self::Pl,
        Self::De,
        Self::Es,
        Self::Fr,
        Self::It,
        Self::Pt,
        Self::Tr,
        Self::Zh,
        Self::Ja,
        Self::Ko,
        Self::Sv,
        Self::Ar,
    ];

    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Ua => "ua",
            Self::Pl => "pl",
            Self::De => "de",
            Self::Es => "es",
            Self::Fr => "fr",
            Self::It => "it",
            Self::Pt => "pt",
            Self::Tr => "tr",
            Self::Zh => "zh",
            Self::Ja => "ja",
            Self::Ko => "ko",
            Self::Sv => "sv",
            Self::Ar => "ar",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = ParseValueError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let code = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|l| l.code() == code)
            .ok_or_else(|| ParseValueError::new("language", s))
    }
}

/// A task owned by one profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i64,
    #[serde(skip)]
    pub profile_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub priority: Option<Priority>,
    pub deadline: Option<DateTime<Utc>>,
    pub execution_time: Option<String>,
    pub reminder: Option<Reminder>,
    /// Free-text recurrence note, e.g. "weekly".
    pub repetition: Option<String>,
    pub color_marking: Option<String>,
    pub icon: Option<String>,
    pub is_completed: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl Task {
    /// Deadline as epoch milliseconds; a missing deadline counts as epoch 0.
    #[must_use]
    pub fn deadline_millis(&self) -> i64 {
        self.deadline.map_or(0, |d| d.timestamp_millis())
    }

    #[must_use]
    pub fn priority_rank(&self) -> u8 {
        Priority::rank_of(self.priority)
    }

    #[must_use]
    pub fn reminder_at(&self) -> Option<DateTime<Utc>> {
        Some(self.reminder?.fires_at(self.deadline?))
    }
}

/// A task creation request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub category: String,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub deadline: Option<DateTime<Utc>>,
    pub execution_time: Option<String>,
    pub reminder: Option<Reminder>,
    pub repetition: Option<String>,
    pub color_marking: Option<String>,
    pub icon: Option<String>,
}

impl NewTask {
    #[must_use]
    pub fn new(title: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            category: category.into(),
            ..Self::default()
        }
    }

    /// # Errors
    /// Returns `DeckError::Validation` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        validate_title(&self.title)?;
        validate_category(&self.category)?;
        if let Some(desc) = &self.description {
            validate_description(desc)?;
        }
        if let Some(color) = &self.color_marking {
            validate_color(color)?;
        }
        Ok(())
    }
}

/// Fields a task edit may touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskField {
    Description,
    Priority,
    Deadline,
    ExecutionTime,
    Reminder,
    Repetition,
    Color,
    Icon,
}

impl FromStr for TaskField {
    type Err = ParseValueError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "description" => Ok(Self::Description),
            "priority" => Ok(Self::Priority),
            "deadline" => Ok(Self::Deadline),
            "time" | "execution-time" => Ok(Self::ExecutionTime),
            "reminder" => Ok(Self::Reminder),
            "repeat" | "repetition" => Ok(Self::Repetition),
            "color" => Ok(Self::Color),
            "icon" => Ok(Self::Icon),
            _ => Err(ParseValueError::new("clearable field", s)),
        }
    }
}

/// A partial task update. `Some(None)` clears an optional field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub category: Option<String>,
    pub description: Option<Option<String>>,
    pub priority: Option<Option<Priority>>,
    pub deadline: Option<Option<DateTime<Utc>>>,
    pub execution_time: Option<Option<String>>,
    pub reminder: Option<Option<Reminder>>,
    pub repetition: Option<Option<String>>,
    pub color_marking: Option<Option<String>>,
    pub icon: Option<Option<String>>,
}

impl TaskPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn clear(&mut self, field: TaskField) {
        match field {
            TaskField::Description => self.description = Some(None),
            TaskField::Priority => self.priority = Some(None),
            TaskField::Deadline => self.deadline = Some(None),
            TaskField::ExecutionTime => self.execution_time = Some(None),
            TaskField::Reminder => self.reminder = Some(None),
            TaskField::Repetition => self.repetition = Some(None),
            TaskField::Color => self.color_marking = Some(None),
            TaskField::Icon => self.icon = Some(None),
        }
    }

    /// # Errors
    /// Returns `DeckError::Validation` for values a new task would reject.
    pub fn validate(&self) -> Result<()> {
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        if let Some(category) = &self.category {
            validate_category(category)?;
        }
        if let Some(Some(desc)) = &self.description {
            validate_description(desc)?;
        }
        if let Some(Some(color)) = &self.color_marking {
            validate_color(color)?;
        }
        Ok(())
    }

    /// Validates, then writes the touched fields into `task`.
    ///
    /// # Errors
    /// Returns `DeckError::Validation`; `task` is left untouched on error.
    pub fn apply(self, task: &mut Task) -> Result<()> {
        self.validate()?;
        if let Some(title) = self.title {
            task.title = title.trim().to_string();
        }
        if let Some(category) = self.category {
            task.category = Some(category.trim().to_string());
        }
        if let Some(v) = self.description {
            task.description = v;
        }
        if let Some(v) = self.priority {
            task.priority = v;
        }
        if let Some(v) = self.deadline {
            task.deadline = v;
        }
        if let Some(v) = self.execution_time {
            task.execution_time = v;
        }
        if let Some(v) = self.reminder {
            task.reminder = v;
        }
        if let Some(v) = self.repetition {
            task.repetition = v;
        }
        if let Some(v) = self.color_marking {
            task.color_marking = v;
        }
        if let Some(v) = self.icon {
            task.icon = v;
        }
        Ok(())
    }
}

fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(DeckError::validation("title", "must not be empty"));
    }
    if title.trim().chars().count() > TITLE_MAX_CHARS {
        return Err(DeckError::validation(
            "title",
            format!("must be at most {TITLE_MAX_CHARS} characters"),
        ));
    }
    Ok(())
}

fn validate_category(category: &str) -> Result<()> {
    if category.trim().is_empty() {
        return Err(DeckError::validation("category", "must not be empty"));
    }
    Ok(())
}

fn validate_description(desc: &str) -> Result<()> {
    if desc.chars().count() > DESCRIPTION_MAX_CHARS {
        return Err(DeckError::validation(
            "description",
            format!("must be at most {DESCRIPTION_MAX_CHARS} characters"),
        ));
    }
    Ok(())
}

fn validate_color(color: &str) -> Result<()> {
    let hex = color.strip_prefix('#').unwrap_or("");
    let ok = matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit());
    if !ok {
        return Err(DeckError::validation("color", format!("'{color}' is not #RGB or #RRGGBB")));
    }
    Ok(())
}

/// Supported avatar image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageType {
    Jpeg,
    Png,
}

impl ImageType {
    #[must_use]
    pub fn mime(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }

    #[must_use]
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "image/jpeg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            _ => None,
        }
    }

    /// Sniffs the format from the file's magic number.
    #[must_use]
    pub fn detect(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(Self::Jpeg)
        } else if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
            Some(Self::Png)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Avatar {
    pub image_type: ImageType,
    pub data: Vec<u8>,
}

impl Avatar {
    /// # Errors
    /// Rejects files over 2 MiB and anything that is not JPEG or PNG.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        if data.len() > MAX_AVATAR_BYTES {
            return Err(DeckError::validation("avatar", "file is larger than 2 MiB"));
        }
        let Some(image_type) = ImageType::detect(&data) else {
            return Err(DeckError::validation("avatar", "only JPG and PNG images are allowed"));
        };
        Ok(Self { image_type, data })
    }

    #[must_use]
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.image_type.mime(), STANDARD.encode(&self.data))
    }
}

/// A local user profile. Every task belongs to exactly one profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub language: Language,
    pub avatar: Option<Avatar>,
    pub created_at: String,
}

/// A profile registration request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProfile {
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl NewProfile {
    /// # Errors
    /// All fields are required; the email must contain `@`.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(DeckError::validation("name", "must not be empty"));
        }
        if self.phone.trim().is_empty() {
            return Err(DeckError::validation("phone", "must not be empty"));
        }
        let email = self.email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(DeckError::validation("email", format!("'{email}' is not an email address")));
        }
        Ok(())
    }

    /// Email as stored: trimmed and lower-cased.
    #[must_use]
    pub fn normalized_email(&self) -> String {
        self.email.trim().to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_priority_parses_keys_and_legacy_labels() {
        assert_eq!("High".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!("Середній".parse::<Priority>().unwrap(), Priority::Medium);
        assert_eq!("низький".parse::<Priority>().unwrap(), Priority::Low);
        assert!("urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn test_priority_ranks() {
        assert_eq!(Priority::rank_of(Some(Priority::High)), 3);
        assert_eq!(Priority::rank_of(Some(Priority::Low)), 1);
        assert_eq!(Priority::rank_of(None), 0);
    }

    #[test]
    fn test_reminder_parsing() {
        assert_eq!("15".parse::<Reminder>().unwrap(), Reminder::FifteenMinutes);
        assert_eq!("1h".parse::<Reminder>().unwrap(), Reminder::OneHour);
        assert_eq!("1d".parse::<Reminder>().unwrap(), Reminder::OneDay);
        assert_eq!("0".parse::<Reminder>().unwrap(), Reminder::AtDeadline);
        assert!("7".parse::<Reminder>().is_err());
        assert!("soon".parse::<Reminder>().is_err());
    }

    #[test]
    fn test_reminder_serializes_as_string_minutes() {
        let json = serde_json::to_string(&Reminder::HalfHour).unwrap();
        assert_eq!(json, "\"30\"");
    }

    #[test]
    fn test_reminder_fires_before_deadline() {
        let deadline = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let task = Task {
            deadline: Some(deadline),
            reminder: Some(Reminder::OneHour),
            ..Task::default()
        };
        assert_eq!(
            task.reminder_at(),
            Some(Utc.with_ymd_and_hms(2026, 3, 1, 11, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_language_codes() {
        assert_eq!("UA".parse::<Language>().unwrap(), Language::Ua);
        assert!("xx".parse::<Language>().is_err());
        assert_eq!(Language::default(), Language::En);
    }

    #[test]
    fn test_new_task_requires_title_and_category() {
        assert!(NewTask::new("Buy milk", "Home").validate().is_ok());
        assert!(matches!(
            NewTask::new("  ", "Home").validate(),
            Err(DeckError::Validation { field: "title", .. })
        ));
        assert!(matches!(
            NewTask::new("Buy milk", "").validate(),
            Err(DeckError::Validation { field: "category", .. })
        ));
    }

    #[test]
    fn test_new_task_length_limits() {
        let long_title = "x".repeat(TITLE_MAX_CHARS + 1);
        assert!(NewTask::new(long_title, "Home").validate().is_err());

        let mut task = NewTask::new("ok", "Home");
        task.description = Some("d".repeat(DESCRIPTION_MAX_CHARS));
        assert!(task.validate().is_ok());
        task.description = Some("d".repeat(DESCRIPTION_MAX_CHARS + 1));
        assert!(task.validate().is_err());
    }

    #[test]
    fn test_color_validation() {
        let mut task = NewTask::new("ok", "Home");
        task.color_marking = Some("#FF6B6B".into());
        assert!(task.validate().is_ok());
        task.color_marking = Some("#0bf".into());
        assert!(task.validate().is_ok());
        task.color_marking = Some("red".into());
        assert!(task.validate().is_err());
    }

    #[test]
    fn test_patch_apply_and_clear() {
        let mut task = Task {
            title: "Old".into(),
            priority: Some(Priority::Low),
            icon: Some("star".into()),
            ..Task::default()
        };
        let mut patch = TaskPatch {
            title: Some(" New ".into()),
            priority: Some(Some(Priority::High)),
            ..TaskPatch::default()
        };
        patch.clear(TaskField::Icon);
        patch.apply(&mut task).unwrap();

        assert_eq!(task.title, "New");
        assert_eq!(task.priority, Some(Priority::High));
        assert_eq!(task.icon, None);
    }

    #[test]
    fn test_repetition_is_patchable_and_clearable() {
        assert_eq!("repeat".parse::<TaskField>().unwrap(), TaskField::Repetition);

        let mut task = Task::default();
        TaskPatch {
            repetition: Some(Some("weekly".into())),
            ..TaskPatch::default()
        }
        .apply(&mut task)
        .unwrap();
        assert_eq!(task.repetition.as_deref(), Some("weekly"));

        let mut clear = TaskPatch::default();
        clear.clear(TaskField::Repetition);
        clear.apply(&mut task).unwrap();
        assert_eq!(task.repetition, None);
    }

    #[test]
    fn test_patch_rejects_invalid_without_mutating() {
        let mut task = Task {
            title: "Keep".into(),
            ..Task::default()
        };
        let patch = TaskPatch {
            title: Some(String::new()),
            ..TaskPatch::default()
        };
        assert!(patch.apply(&mut task).is_err());
        assert_eq!(task.title, "Keep");
    }

    #[test]
    fn test_avatar_detection() {
        let png = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0];
        let avatar = Avatar::from_bytes(png).unwrap();
        assert_eq!(avatar.image_type, ImageType::Png);
        assert!(avatar.data_uri().starts_with("data:image/png;base64,"));

        assert!(Avatar::from_bytes(b"GIF89a".to_vec()).is_err());

        let mut huge = vec![0xFF, 0xD8, 0xFF];
        huge.resize(MAX_AVATAR_BYTES + 1, 0);
        assert!(Avatar::from_bytes(huge).is_err());
    }

    #[test]
    fn test_new_profile_validation() {
        let ok = NewProfile {
            name: "Olena".into(),
            email: " Olena@Example.COM ".into(),
            phone: "+380".into(),
        };
        assert!(ok.validate().is_ok());
        assert_eq!(ok.normalized_email(), "olena@example.com");

        let bad = NewProfile {
            email: "nope".into(),
            ..ok
        };
        assert!(bad.validate().is_err());
    }
}
