//! Detail/edit flow for one task.
//!
//! # Responsibility
//! - Hold an editable draft for a new or existing task.
//! - Persist the draft through `TaskService` on save.
//!
//! # Invariants
//! - A new draft with a blank title is discarded on save, never stored.
//! - Saving an existing task never clears its title.

use crate::model::task::{now_epoch_ms, Task, TaskId};
use crate::repo::task_repo::{RepoError, RepoResult, TaskRepository};
use crate::service::task_service::TaskService;
use log::debug;

/// Editable draft bound to a service.
pub struct TaskEditor<'svc, R: TaskRepository> {
    service: &'svc TaskService<R>,
    original: Option<Task>,
    title: String,
    description: String,
    opened_at: i64,
}

impl<'svc, R: TaskRepository> TaskEditor<'svc, R> {
    /// Opens an editor for `id`, or a blank draft when `id` is `None`.
    ///
    /// # Errors
    /// - `RepoError::NotFound` when `id` does not exist.
    pub fn open(service: &'svc TaskService<R>, id: Option<TaskId>) -> RepoResult<Self> {
        let original = match id {
            Some(id) => Some(service.get_task(id)?.ok_or(RepoError::NotFound(id))?),
            None => None,
        };
        let (title, description) = original.as_ref().map_or_else(
            || (String::new(), String::new()),
            |task| {
                (
                    task.title.clone(),
                    task.description.clone().unwrap_or_default(),
                )
            },
        );

        Ok(Self {
            service,
            original,
            title,
            description,
            opened_at: now_epoch_ms(),
        })
    }

    pub fn is_new(&self) -> bool {
        self.original.is_none()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Creation date of the edited task, or the time the draft was opened.
    pub fn created_at(&self) -> i64 {
        self.original
            .as_ref()
            .map_or(self.opened_at, |task| task.created_at)
    }

    /// Whether the draft differs from what is stored.
    pub fn is_dirty(&self) -> bool {
        match &self.original {
            Some(task) => {
                task.title != self.title
                    || task.description.as_deref().unwrap_or_default() != self.description
            }
            None => !self.title.trim().is_empty() || !self.description.trim().is_empty(),
        }
    }

    /// Persists the draft.
    ///
    /// Returns `Ok(None)` when a new draft has a blank title and nothing was
    /// stored; otherwise returns the stored task.
    pub fn save(&mut self) -> RepoResult<Option<Task>> {
        let description = Some(self.description.as_str()).filter(|text| !text.trim().is_empty());

        let saved = match &self.original {
            None if self.title.trim().is_empty() => {
                debug!("event=task_editor_save module=service status=skip reason=empty_draft");
                return Ok(None);
            }
            None => self.service.add_task(&self.title, description)?,
            Some(task) if !self.is_dirty() => task.clone(),
            Some(task) => {
                // Unchanged fields are passed as `None` and keep their stored value.
                let title = Some(self.title.as_str()).filter(|title| *title != task.title);
                let description = Some(self.description.as_str()).filter(|text| {
                    task.description.as_deref().unwrap_or_default() != *text
                });
                self.service.update_task(task.id, title, description)?
            }
        };

        self.title = saved.title.clone();
        self.description = saved.description.clone().unwrap_or_default();
        self.original = Some(saved.clone());
        Ok(Some(saved))
    }
}
