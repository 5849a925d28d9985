use std::sync::mpsc;
use std::time::Duration;

use todolist_core::{
    QueueError, RemoteTodo, SyncError, SyncResult, TaskQueue, TodoSource, TodosResponse,
};

const WAIT: Duration = Duration::from_secs(5);

struct StaticSource(Vec<RemoteTodo>);

impl TodoSource for StaticSource {
    fn fetch_todos(&self) -> SyncResult<TodosResponse> {
        Ok(TodosResponse {
            todos: Some(self.0.clone()),
            ..TodosResponse::default()
        })
    }
}

struct OfflineSource;

impl TodoSource for OfflineSource {
    fn fetch_todos(&self) -> SyncResult<TodosResponse> {
        Err(SyncError::Http("connection refused".to_string()))
    }
}

#[test]
fn jobs_run_in_submission_order() {
    let queue = TaskQueue::open_in_memory().unwrap();

    let first = queue.submit(|service| service.add_task("first", None));
    let second = queue.submit(|service| service.add_task("second", None));
    let listed = queue.submit(|service| service.get_all_tasks());

    let first = first.wait().unwrap().unwrap();
    let second = second.wait().unwrap().unwrap();
    let titles: Vec<String> = listed
        .wait_timeout(WAIT)
        .unwrap()
        .unwrap()
        .into_iter()
        .map(|task| task.title)
        .collect();

    assert!(second.created_at >= first.created_at);
    assert_eq!(titles.len(), 2);
    assert!(titles.contains(&"first".to_string()));
}

#[test]
fn dispatch_delivers_result_to_callback() {
    let queue = TaskQueue::open_in_memory().unwrap();
    let (tx, rx) = mpsc::channel();

    queue.dispatch(
        |service| service.add_task("callback", None).map(|task| task.title),
        move |result| {
            tx.send(result).unwrap();
        },
    );

    let title = rx.recv_timeout(WAIT).unwrap().unwrap().unwrap();
    assert_eq!(title, "callback");
}

#[test]
fn panicking_job_does_not_stop_worker() {
    let queue = TaskQueue::open_in_memory().unwrap();

    let panicked = queue.submit(|_service| -> usize { panic!("job failed") });
    assert!(matches!(
        panicked.wait_timeout(WAIT),
        Err(QueueError::JobPanicked)
    ));

    let after = queue.submit(|service| service.add_task("still alive", None));
    assert_eq!(after.wait_timeout(WAIT).unwrap().unwrap().title, "still alive");
}

#[test]
fn dropping_queue_drains_pending_jobs() {
    let queue = TaskQueue::open_in_memory().unwrap();
    let handle = queue.submit(|service| service.add_task("pending", None));
    drop(queue);

    assert_eq!(handle.wait().unwrap().unwrap().title, "pending");
}

#[test]
fn load_then_background_sync() {
    let queue = TaskQueue::open_in_memory().unwrap();
    queue
        .submit(|service| service.add_task("local", None))
        .wait()
        .unwrap()
        .unwrap();

    let source = StaticSource(vec![RemoteTodo {
        id: Some(11),
        todo: Some("from server".to_string()),
        completed: Some(true),
        user_id: Some(3),
    }]);
    let (local, synced) = queue.load_with_background_sync(source);

    let local = local.wait_timeout(WAIT).unwrap().unwrap();
    assert_eq!(local.len(), 1);

    let synced = synced.wait_timeout(WAIT).unwrap().unwrap();
    assert_eq!(synced.report.inserted, 1);
    assert_eq!(synced.tasks.len(), 2);
    assert!(synced.tasks.iter().any(|task| task.server_id == 11));
}

#[test]
fn background_sync_failure_keeps_local_snapshot() {
    let queue = TaskQueue::open_in_memory().unwrap();
    queue
        .submit(|service| service.add_task("local", None))
        .wait()
        .unwrap()
        .unwrap();

    let (local, synced) = queue.load_with_background_sync(OfflineSource);
    assert_eq!(local.wait_timeout(WAIT).unwrap().unwrap().len(), 1);
    assert!(matches!(
        synced.wait_timeout(WAIT).unwrap(),
        Err(SyncError::Http(_))
    ));

    let after = queue.submit(|service| service.get_all_tasks());
    assert_eq!(after.wait().unwrap().unwrap().len(), 1);
}

#[test]
fn queue_opens_file_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("tasks.sqlite3");

    {
        let queue = TaskQueue::open(&path).unwrap();
        queue
            .submit(|service| service.add_task("persisted", None))
            .wait()
            .unwrap()
            .unwrap();
    }

    let reopened = TaskQueue::open(&path).unwrap();
    let tasks = reopened
        .submit(|service| service.get_all_tasks())
        .wait()
        .unwrap()
        .unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].title, "persisted");
}

#[test]
fn panicking_callback_does_not_stop_worker() {
    let queue = TaskQueue::open_in_memory().unwrap();

    queue.dispatch(
        |_service| 1usize,
        |_result| panic!("callback failed"),
    );

    let after = queue.submit(|service| service.get_all_tasks());
    assert!(after.wait_timeout(WAIT).unwrap().unwrap().is_empty());
}
