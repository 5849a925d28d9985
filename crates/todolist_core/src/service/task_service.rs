//! Task use-case service.
//!
//! # Responsibility
//! - Provide stable CRUD, query and search entry points for core callers.
//! - Merge remote todos into the local store.
//!
//! # Invariants
//! - Titles and descriptions are trimmed before they reach the repository.
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Service layer remains storage-agnostic.

use crate::model::task::{Task, TaskId, TaskValidationError, LOCAL_SERVER_ID};
use crate::repo::task_repo::{RepoError, RepoResult, TaskListQuery, TaskOrigin, TaskRepository};
use crate::sync::remote::RemoteTodo;
use log::{info, warn};
use std::collections::HashMap;

/// Use-case service wrapper for task operations.
pub struct TaskService<R: TaskRepository> {
    repo: R,
}

/// Outcome of merging one batch of remote todos.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub inserted: usize,
    pub updated: usize,
    /// Todos without a usable id, or new todos without text.
    pub skipped: usize,
    /// Every inserted or updated task, in first-seen payload order.
    pub tasks: Vec<Task>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MergeAction {
    Untouched,
    Updated,
    Inserted,
}

impl<R: TaskRepository> TaskService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a local task.
    ///
    /// # Contract
    /// - Title and description are trimmed.
    /// - Blank titles are rejected with `RepoError::Validation`.
    /// - Returns the stored task.
    pub fn add_task(&self, title: &str, description: Option<&str>) -> RepoResult<Task> {
        let title = title.trim();
        if title.is_empty() {
            return Err(TaskValidationError::EmptyTitle.into());
        }

        let task = Task::new(title, description.map(|text| text.trim().to_string()));
        self.repo.create_task(&task)?;
        info!("event=task_create module=service status=ok task_id={}", task.id);
        Ok(task)
    }

    /// Edits title and/or description; `None` keeps the stored value.
    ///
    /// # Contract
    /// - `Some` blank title is rejected before any write.
    /// - Missing tasks return `RepoError::NotFound`.
    pub fn update_task(
        &self,
        id: TaskId,
        title: Option<&str>,
        description: Option<&str>,
    ) -> RepoResult<Task> {
        let title = title.map(str::trim);
        if title.is_some_and(str::is_empty) {
            return Err(TaskValidationError::EmptyTitle.into());
        }

        let mut task = self.require_task(id)?;
        if let Some(title) = title {
            task.title = title.to_string();
        }
        if let Some(description) = description {
            task.description = Some(description.trim().to_string());
        }
        self.repo.update_task(&task)?;
        Ok(task)
    }

    pub fn delete_task(&self, id: TaskId) -> RepoResult<()> {
        self.repo.delete_task(id)?;
        info!("event=task_delete module=service status=ok task_id={id}");
        Ok(())
    }

    /// Flips completion and returns the new state.
    pub fn toggle_task_completion(&self, id: TaskId) -> RepoResult<bool> {
        let mut task = self.require_task(id)?;
        task.toggle_completion();
        self.repo.update_task(&task)?;
        Ok(task.is_completed)
    }

    pub fn set_task_completion(&self, id: TaskId, completed: bool) -> RepoResult<Task> {
        let mut task = self.require_task(id)?;
        if completed {
            task.mark_completed();
        } else {
            task.mark_incomplete();
        }
        self.repo.update_task(&task)?;
        Ok(task)
    }

    pub fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        self.repo.get_task(id)
    }

    /// All tasks in storage order: open first, then newest first.
    pub fn get_all_tasks(&self) -> RepoResult<Vec<Task>> {
        self.repo.list_tasks(&TaskListQuery::default())
    }

    pub fn get_completed_tasks(&self) -> RepoResult<Vec<Task>> {
        self.repo.list_tasks(&TaskListQuery {
            completion: Some(true),
            ..TaskListQuery::default()
        })
    }

    pub fn get_incomplete_tasks(&self) -> RepoResult<Vec<Task>> {
        self.repo.list_tasks(&TaskListQuery {
            completion: Some(false),
            ..TaskListQuery::default()
        })
    }

    /// Tasks that were imported from the remote API.
    pub fn get_server_tasks(&self) -> RepoResult<Vec<Task>> {
        self.list_by_origin(TaskOrigin::Remote)
    }

    pub fn get_local_tasks(&self) -> RepoResult<Vec<Task>> {
        self.list_by_origin(TaskOrigin::Local)
    }

    /// Case-insensitive search over title and description.
    ///
    /// A blank query returns every task.
    pub fn search_tasks(&self, query: &str) -> RepoResult<Vec<Task>> {
        Ok(search_in(self.get_all_tasks()?, query))
    }

    /// Same as [`Self::search_tasks`], restricted to locally created tasks.
    pub fn search_local_tasks(&self, query: &str) -> RepoResult<Vec<Task>> {
        Ok(search_in(self.get_local_tasks()?, query))
    }

    /// Removes every task and returns how many were deleted.
    pub fn clear_all_tasks(&self) -> RepoResult<usize> {
        let removed = self.repo.delete_all_tasks()?;
        info!("event=task_clear module=service status=ok removed={removed}");
        Ok(removed)
    }

    /// Upserts remote todos by `server_id` in one atomic batch.
    ///
    /// # Contract
    /// - A todo whose id matches a stored task updates its completion and,
    ///   when the todo has text, its title. Description and creation date are
    ///   kept.
    /// - Any other todo with an id and text is inserted as a new task.
    /// - Todos without an id, with `id <= 0`, or new ones without text are
    ///   skipped.
    /// - Repeated ids in one payload touch the same task; the last one wins.
    /// - Only the writes share one transaction. Stored remote tasks are read
    ///   before it opens, so callers serialize merges (see `TaskQueue`).
    pub fn merge_remote_todos(&self, todos: &[RemoteTodo]) -> RepoResult<MergeReport> {
        let mut by_server_id: HashMap<i64, (Task, MergeAction)> = self
            .get_server_tasks()?
            .into_iter()
            .map(|task| (task.server_id, (task, MergeAction::Untouched)))
            .collect();
        let mut touched_order: Vec<i64> = Vec::new();
        let mut skipped = 0usize;

        for todo in todos {
            let Some(server_id) = todo.id.filter(|id| *id > LOCAL_SERVER_ID) else {
                skipped += 1;
                continue;
            };
            let text = todo
                .todo
                .as_deref()
                .map(str::trim)
                .filter(|text| !text.is_empty());

            match by_server_id.get_mut(&server_id) {
                Some((task, action)) => {
                    if let Some(text) = text {
                        task.title = text.to_string();
                    }
                    task.is_completed = todo.completed.unwrap_or(false);
                    if *action == MergeAction::Untouched {
                        *action = MergeAction::Updated;
                        touched_order.push(server_id);
                    }
                }
                None => {
                    let Some(text) = text else {
                        warn!(
                            "event=remote_merge module=service status=skip server_id={server_id} reason=empty_title"
                        );
                        skipped += 1;
                        continue;
                    };
                    let mut task = Task::from_remote(todo);
                    task.title = text.to_string();
                    by_server_id.insert(server_id, (task, MergeAction::Inserted));
                    touched_order.push(server_id);
                }
            }
        }

        let mut report = MergeReport {
            skipped,
            ..MergeReport::default()
        };
        let mut created = Vec::new();
        let mut updated = Vec::new();
        for server_id in touched_order {
            let Some((task, action)) = by_server_id.remove(&server_id) else {
                continue;
            };
            match action {
                MergeAction::Inserted => created.push(task.clone()),
                MergeAction::Updated => updated.push(task.clone()),
                MergeAction::Untouched => continue,
            }
            report.tasks.push(task);
        }
        report.inserted = created.len();
        report.updated = updated.len();

        self.repo.save_batch(&created, &updated)?;
        info!(
            "event=remote_merge module=service status=ok inserted={} updated={} skipped={}",
            report.inserted, report.updated, report.skipped
        );
        Ok(report)
    }

    fn require_task(&self, id: TaskId) -> RepoResult<Task> {
        self.repo.get_task(id)?.ok_or(RepoError::NotFound(id))
    }

    fn list_by_origin(&self, origin: TaskOrigin) -> RepoResult<Vec<Task>> {
        self.repo.list_tasks(&TaskListQuery {
            origin,
            ..TaskListQuery::default()
        })
    }
}

/// Keeps tasks matching `query`; blank queries keep everything.
pub fn search_in(tasks: Vec<Task>, query: &str) -> Vec<Task> {
    let query = query.trim();
    if query.is_empty() {
        return tasks;
    }
    tasks.into_iter().filter(|task| task.matches(query)).collect()
}
