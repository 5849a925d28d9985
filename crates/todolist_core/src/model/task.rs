//! Task domain model.
//!
//! # Responsibility
//! - Define the canonical to-do record persisted by the task store.
//! - Provide completion helpers, search matching and display text.
//!
//! # Invariants
//! - `id` is stable and never reused for another task.
//! - A valid task has a non-blank `title`.
//! - `server_id == 0` marks a locally created task; `> 0` is the remote id.

use crate::sync::remote::RemoteTodo;
use chrono::{Local, TimeZone};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of a task in the local store.
pub type TaskId = Uuid;

/// `server_id` value for tasks that never came from the remote API.
pub const LOCAL_SERVER_ID: i64 = 0;

pub const NO_DESCRIPTION_TEXT: &str = "Нет описания";
pub const UNKNOWN_DATE_TEXT: &str = "Дата неизвестна";
pub const COMPLETED_STATUS_TEXT: &str = "Выполнено";
pub const NOT_COMPLETED_STATUS_TEXT: &str = "Не выполнено";

const CREATED_AT_FORMAT: &str = "%d.%m.%Y, %H:%M";

/// Validation failures for [`Task`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    EmptyTitle,
    NegativeServerId(i64),
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "task title must not be empty"),
            Self::NegativeServerId(value) => {
                write!(f, "task server_id must be >= 0, got {value}")
            }
        }
    }
}

impl Error for TaskValidationError {}

/// One to-do entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: Option<String>,
    pub is_completed: bool,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Remote identifier; `0` for locally created tasks.
    pub server_id: i64,
}

impl Task {
    /// Creates a new local, incomplete task stamped with the current time.
    pub fn new(title: impl Into<String>, description: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description,
            is_completed: false,
            created_at: now_epoch_ms(),
            server_id: LOCAL_SERVER_ID,
        }
    }

    /// Maps a remote record into a fresh local task.
    ///
    /// The remote API carries no description or creation date, so the
    /// description stays empty and the creation date is the import time.
    pub fn from_remote(todo: &RemoteTodo) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: todo.todo.clone().unwrap_or_default(),
            description: None,
            is_completed: todo.completed.unwrap_or(false),
            created_at: now_epoch_ms(),
            server_id: todo.id.unwrap_or(LOCAL_SERVER_ID),
        }
    }

    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.title.trim().is_empty() {
            return Err(TaskValidationError::EmptyTitle);
        }
        if self.server_id < 0 {
            return Err(TaskValidationError::NegativeServerId(self.server_id));
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    pub fn toggle_completion(&mut self) {
        self.is_completed = !self.is_completed;
    }

    pub fn mark_completed(&mut self) {
        self.is_completed = true;
    }

    pub fn mark_incomplete(&mut self) {
        self.is_completed = false;
    }

    pub fn is_local(&self) -> bool {
        self.server_id == LOCAL_SERVER_ID
    }

    pub fn is_remote(&self) -> bool {
        self.server_id > LOCAL_SERVER_ID
    }

    /// Case-insensitive substring match against title or description.
    ///
    /// An empty query matches every task.
    pub fn matches(&self, query: &str) -> bool {
        let needle = query.to_lowercase();
        self.title.to_lowercase().contains(&needle)
            || self
                .description
                .as_deref()
                .is_some_and(|description| description.to_lowercase().contains(&needle))
    }

    pub fn display_description(&self) -> &str {
        self.description.as_deref().unwrap_or(NO_DESCRIPTION_TEXT)
    }

    pub fn status_text(&self) -> &'static str {
        if self.is_completed {
            COMPLETED_STATUS_TEXT
        } else {
            NOT_COMPLETED_STATUS_TEXT
        }
    }

    /// Creation date in the local time zone.
    pub fn formatted_created_at(&self) -> String {
        format_created_at(self.created_at, &Local)
    }

    /// Plain-text card used when sharing a task outside the app.
    pub fn share_text(&self) -> String {
        self.share_text_in(&Local)
    }

    pub fn share_text_in<Tz: TimeZone>(&self, tz: &Tz) -> String
    where
        Tz::Offset: Display,
    {
        format!(
            "Задача: {}\n\n{}\n\nСтатус: {}\nДата создания: {}",
            self.title,
            self.display_description(),
            self.status_text(),
            format_created_at(self.created_at, tz)
        )
    }
}

/// Formats epoch milliseconds as `dd.mm.yyyy, HH:MM` in `tz`.
pub fn format_created_at<Tz: TimeZone>(epoch_ms: i64, tz: &Tz) -> String
where
    Tz::Offset: Display,
{
    match tz.timestamp_millis_opt(epoch_ms).single() {
        Some(datetime) => datetime.format(CREATED_AT_FORMAT).to_string(),
        None => UNKNOWN_DATE_TEXT.to_string(),
    }
}

pub(crate) fn now_epoch_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::{format_created_at, Task, TaskValidationError, UNKNOWN_DATE_TEXT};
    use chrono::Utc;

    #[test]
    fn blank_title_is_invalid() {
        let task = Task::new("   \n", None);
        assert_eq!(task.validate(), Err(TaskValidationError::EmptyTitle));
    }

    #[test]
    fn toggling_twice_restores_state() {
        let mut task = Task::new("water plants", None);
        task.toggle_completion();
        assert!(task.is_completed);
        task.toggle_completion();
        assert!(!task.is_completed);
    }

    #[test]
    fn matches_is_case_insensitive_on_title_and_description() {
        let task = Task::new("Buy Milk", Some("From the Corner shop".to_string()));
        assert!(task.matches("milk"));
        assert!(task.matches("CORNER"));
        assert!(task.matches(""));
        assert!(!task.matches("bread"));
    }

    #[test]
    fn display_description_falls_back_only_for_missing_text() {
        let mut task = Task::new("x", None);
        assert_eq!(task.display_description(), "Нет описания");
        task.description = Some(String::new());
        assert_eq!(task.display_description(), "");
    }

    #[test]
    fn created_at_formats_in_given_zone() {
        // 2025-08-21T09:05:00Z
        assert_eq!(format_created_at(1_755_767_100_000, &Utc), "21.08.2025, 09:05");
        assert_eq!(format_created_at(i64::MAX, &Utc), UNKNOWN_DATE_TEXT);
    }

    #[test]
    fn share_text_contains_all_fields() {
        let mut task = Task::new("Test Task", Some("Test Description".to_string()));
        task.created_at = 1_755_767_100_000;
        let text = task.share_text_in(&Utc);
        assert_eq!(
            text,
            "Задача: Test Task\n\nTest Description\n\nСтатус: Не выполнено\nДата создания: 21.08.2025, 09:05"
        );
    }
}
