//! Fetch-then-merge sync pass.

use crate::repo::task_repo::TaskRepository;
use crate::service::task_service::{MergeReport, TaskService};
use crate::sync::remote::{SyncResult, TodoSource};
use log::{error, info};
use std::time::Instant;

/// Pulls todos from `source` and merges them into the local store.
///
/// A payload without a `todos` list merges nothing. Fetch and merge errors
/// are logged and returned unchanged; the local store is left as it was.
pub fn sync_from_remote<R, S>(service: &TaskService<R>, source: &S) -> SyncResult<MergeReport>
where
    R: TaskRepository,
    S: TodoSource + ?Sized,
{
    let started_at = Instant::now();
    info!("event=remote_sync module=sync status=start");

    let result = source.fetch_todos().and_then(|response| {
        let todos = response.todos.unwrap_or_default();
        Ok(service.merge_remote_todos(&todos)?)
    });

    match &result {
        Ok(report) => info!(
            "event=remote_sync module=sync status=ok duration_ms={} inserted={} updated={} skipped={}",
            started_at.elapsed().as_millis(),
            report.inserted,
            report.updated,
            report.skipped
        ),
        Err(err) => error!(
            "event=remote_sync module=sync status=error duration_ms={} error={}",
            started_at.elapsed().as_millis(),
            err
        ),
    }

    result
}
