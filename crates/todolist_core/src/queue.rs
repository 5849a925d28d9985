//! Serial background queue for task store access.
//!
//! # Responsibility
//! - Own the SQLite connection on one worker thread.
//! - Run submitted jobs in FIFO order and hand results back to the caller.
//!
//! # Invariants
//! - At most one job touches the connection at a time.
//! - A panicking job resolves its own handle with `JobPanicked` and leaves
//!   the worker running. A panicking callback is logged and dropped.
//! - Dropping the queue drains already submitted jobs before the worker exits.

use crate::db::{open_db, open_db_in_memory, DbError};
use crate::model::task::Task;
use crate::repo::task_repo::{RepoResult, SqliteTaskRepository};
use crate::service::task_service::{MergeReport, TaskService};
use crate::sync::remote::{SyncResult, TodoSource};
use crate::sync::synchronizer::sync_from_remote;
use log::{debug, error};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::JoinHandle;
use std::time::Duration;

const WORKER_THREAD_NAME: &str = "todolist-store";

type Job = Box<dyn FnOnce(&Connection) + Send + 'static>;

/// Service type handed to queued jobs.
pub type StoreService<'conn> = TaskService<SqliteTaskRepository<'conn>>;

/// Queue-level failures, separate from what the job itself returns.
#[derive(Debug)]
pub enum QueueError {
    Db(DbError),
    /// Worker thread could not be started.
    Spawn(String),
    /// Worker stopped before delivering a result.
    Disconnected,
    JobPanicked,
    Timeout,
}

impl Display for QueueError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Spawn(message) => write!(f, "failed to start store worker: {message}"),
            Self::Disconnected => write!(f, "store worker is not running"),
            Self::JobPanicked => write!(f, "store job panicked"),
            Self::Timeout => write!(f, "timed out waiting for store job"),
        }
    }
}

impl Error for QueueError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for QueueError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

/// Pending result of a queued job.
pub struct JobHandle<T> {
    rx: Receiver<Result<T, QueueError>>,
}

impl<T> JobHandle<T> {
    /// Blocks until the job finishes.
    pub fn wait(self) -> Result<T, QueueError> {
        self.rx.recv().unwrap_or(Err(QueueError::Disconnected))
    }

    pub fn wait_timeout(self, timeout: Duration) -> Result<T, QueueError> {
        match self.rx.recv_timeout(timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(QueueError::Timeout),
            Err(RecvTimeoutError::Disconnected) => Err(QueueError::Disconnected),
        }
    }

    /// Non-blocking poll; `None` while the job is still pending.
    pub fn try_result(&self) -> Option<Result<T, QueueError>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(QueueError::Disconnected)),
        }
    }
}

/// Tasks as stored after a sync pass, with the merge summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncedTasks {
    pub report: MergeReport,
    pub tasks: Vec<Task>,
}

/// Single worker thread owning the task store connection.
pub struct TaskQueue {
    sender: Option<Sender<Job>>,
    worker: Option<JoinHandle<()>>,
}

impl TaskQueue {
    /// Opens (and migrates) the database file, then starts the worker.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, QueueError> {
        Self::with_connection(open_db(path)?)
    }

    pub fn open_in_memory() -> Result<Self, QueueError> {
        Self::with_connection(open_db_in_memory()?)
    }

    /// Starts the worker on an already migrated connection.
    pub fn with_connection(conn: Connection) -> Result<Self, QueueError> {
        let (sender, receiver) = mpsc::channel::<Job>();
        let worker = std::thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || {
                debug!("event=queue_start module=queue status=ok");
                for job in receiver {
                    job(&conn);
                }
                debug!("event=queue_stop module=queue status=ok");
            })
            .map_err(|err| QueueError::Spawn(err.to_string()))?;

        Ok(Self {
            sender: Some(sender),
            worker: Some(worker),
        })
    }

    /// Queues `job` and returns a handle to its result.
    pub fn submit<T, F>(&self, job: F) -> JobHandle<T>
    where
        T: Send + 'static,
        F: for<'conn> FnOnce(&StoreService<'conn>) -> T + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        self.enqueue(job, move |result| {
            let _ = tx.send(result);
        });
        JobHandle { rx }
    }

    /// Queues `job`; `callback` receives its result on the worker thread.
    pub fn dispatch<T, F, C>(&self, job: F, callback: C)
    where
        T: Send + 'static,
        F: for<'conn> FnOnce(&StoreService<'conn>) -> T + Send + 'static,
        C: FnOnce(Result<T, QueueError>) + Send + 'static,
    {
        self.enqueue(job, callback);
    }

    /// Loads the local snapshot, then syncs with `source` in the background.
    ///
    /// The first handle resolves before the sync starts; the second resolves
    /// to the tasks as stored after the merge.
    pub fn load_with_background_sync<S>(
        &self,
        source: S,
    ) -> (JobHandle<RepoResult<Vec<Task>>>, JobHandle<SyncResult<SyncedTasks>>)
    where
        S: TodoSource + Send + 'static,
    {
        let local = self.submit(|service| service.get_all_tasks());
        let synced = self.submit(move |service| -> SyncResult<SyncedTasks> {
            let report = sync_from_remote(service, &source)?;
            let tasks = service.get_all_tasks()?;
            Ok(SyncedTasks { report, tasks })
        });
        (local, synced)
    }

    fn enqueue<T, F, C>(&self, job: F, callback: C)
    where
        T: Send + 'static,
        F: for<'conn> FnOnce(&StoreService<'conn>) -> T + Send + 'static,
        C: FnOnce(Result<T, QueueError>) + Send + 'static,
    {
        let Some(sender) = self.sender.as_ref() else {
            callback(Err(QueueError::Disconnected));
            return;
        };

        let wrapped: Job = Box::new(move |conn: &Connection| {
            let service = TaskService::new(SqliteTaskRepository::new(conn));
            let result = catch_unwind(AssertUnwindSafe(|| job(&service))).map_err(|_| {
                error!("event=queue_job module=queue status=error error_code=job_panicked");
                QueueError::JobPanicked
            });
            if catch_unwind(AssertUnwindSafe(|| callback(result))).is_err() {
                error!("event=queue_job module=queue status=error error_code=callback_panicked");
            }
        });

        if sender.send(wrapped).is_err() {
            // The rejected job (and its callback) is dropped with the error;
            // handles built on it observe `Disconnected`.
            error!("event=queue_submit module=queue status=error error_code=worker_gone");
        }
    }
}

impl Drop for TaskQueue {
    fn drop(&mut self) {
        drop(self.sender.take());
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!("event=queue_stop module=queue status=error error_code=worker_panicked");
            }
        }
    }
}
