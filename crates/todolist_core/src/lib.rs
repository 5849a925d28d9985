//! Core domain logic for the to-do list.
//! This crate is the single source of truth for task invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod queue;
pub mod repo;
pub mod service;
pub mod sync;

pub use config::{AppConfig, ConfigError};
pub use logging::{
    default_log_level, init_logging, init_logging_from_config, logging_status, LoggingError,
};
pub use model::plural::{tasks_count_label, TasksWord};
pub use model::task::{Task, TaskId, TaskValidationError};
pub use queue::{JobHandle, QueueError, StoreService, SyncedTasks, TaskQueue};
pub use repo::task_repo::{
    RepoError, RepoResult, SqliteTaskRepository, TaskListQuery, TaskOrigin, TaskRepository,
};
pub use service::list_view::{filter_tasks, sort_tasks, TaskFilter, TaskListView, TaskSort};
pub use service::task_editor::TaskEditor;
pub use service::task_service::{MergeReport, TaskService};
pub use sync::remote::{
    HttpTodoSource, RemoteTodo, SyncError, SyncResult, TodoSource, TodosResponse,
};
pub use sync::synchronizer::sync_from_remote;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
