use todolist_core::db::open_db_in_memory;
use todolist_core::{
    RepoError, SqliteTaskRepository, TaskService, TaskValidationError,
};
use uuid::Uuid;

#[test]
fn add_task_trims_input_and_rejects_blank_title() {
    let conn = open_db_in_memory().unwrap();
    let service = TaskService::new(SqliteTaskRepository::new(&conn));

    let task = service.add_task("  buy milk ", Some(" 2 litres ")).unwrap();
    assert_eq!(task.title, "buy milk");
    assert_eq!(task.description.as_deref(), Some("2 litres"));
    assert!(!task.is_completed);
    assert!(task.is_local());

    let err = service.add_task("   ", None).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(TaskValidationError::EmptyTitle)
    ));
    assert_eq!(service.get_all_tasks().unwrap().len(), 1);
}

#[test]
fn update_task_keeps_fields_passed_as_none() {
    let conn = open_db_in_memory().unwrap();
    let service = TaskService::new(SqliteTaskRepository::new(&conn));

    let task = service.add_task("report", Some("quarterly")).unwrap();
    let renamed = service.update_task(task.id, Some("final report"), None).unwrap();
    assert_eq!(renamed.title, "final report");
    assert_eq!(renamed.description.as_deref(), Some("quarterly"));
    assert_eq!(renamed.created_at, task.created_at);

    let described = service.update_task(task.id, None, Some("")).unwrap();
    assert_eq!(described.title, "final report");
    assert_eq!(described.description.as_deref(), Some(""));

    let err = service.update_task(task.id, Some(" "), None).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
    let stored = service.get_task(task.id).unwrap().unwrap();
    assert_eq!(stored.title, "final report");
}

#[test]
fn update_missing_task_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = TaskService::new(SqliteTaskRepository::new(&conn));

    let id = Uuid::new_v4();
    let err = service.update_task(id, Some("title"), None).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(missing) if missing == id));
    assert!(matches!(
        service.toggle_task_completion(id),
        Err(RepoError::NotFound(_))
    ));
}

#[test]
fn toggle_twice_restores_state() {
    let conn = open_db_in_memory().unwrap();
    let service = TaskService::new(SqliteTaskRepository::new(&conn));

    let task = service.add_task("water plants", None).unwrap();
    assert!(service.toggle_task_completion(task.id).unwrap());
    assert!(service.get_task(task.id).unwrap().unwrap().is_completed);
    assert!(!service.toggle_task_completion(task.id).unwrap());
    assert!(!service.get_task(task.id).unwrap().unwrap().is_completed);

    let done = service.set_task_completion(task.id, true).unwrap();
    assert!(done.is_completed);
    let again = service.set_task_completion(task.id, true).unwrap();
    assert!(again.is_completed);
}

#[test]
fn completion_queries_split_tasks() {
    let conn = open_db_in_memory().unwrap();
    let service = TaskService::new(SqliteTaskRepository::new(&conn));

    let done = service.add_task("done", None).unwrap();
    service.add_task("open", None).unwrap();
    service.toggle_task_completion(done.id).unwrap();

    let completed = service.get_completed_tasks().unwrap();
    let incomplete = service.get_incomplete_tasks().unwrap();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].title, "done");
    assert_eq!(incomplete.len(), 1);
    assert_eq!(incomplete[0].title, "open");
}

#[test]
fn search_matches_title_or_description_case_insensitively() {
    let conn = open_db_in_memory().unwrap();
    let service = TaskService::new(SqliteTaskRepository::new(&conn));

    service.add_task("Купить молоко", None).unwrap();
    service.add_task("Позвонить", Some("Маме про МОЛОКО")).unwrap();
    service.add_task("Спортзал", None).unwrap();

    let hits = service.search_tasks("молоко").unwrap();
    assert_eq!(hits.len(), 2);
    assert!(service.search_tasks("хлеб").unwrap().is_empty());
    assert_eq!(service.search_tasks("  ").unwrap().len(), 3);
}

#[test]
fn local_queries_exclude_imported_tasks() {
    let conn = open_db_in_memory().unwrap();
    let service = TaskService::new(SqliteTaskRepository::new(&conn));

    service.add_task("local note", None).unwrap();
    let report = service
        .merge_remote_todos(&[todolist_core::RemoteTodo {
            id: Some(5),
            todo: Some("remote note".to_string()),
            completed: Some(false),
            user_id: Some(1),
        }])
        .unwrap();
    assert_eq!(report.inserted, 1);

    let local = service.search_local_tasks("note").unwrap();
    assert_eq!(local.len(), 1);
    assert_eq!(local[0].title, "local note");
    assert_eq!(service.search_tasks("note").unwrap().len(), 2);
    assert_eq!(service.get_server_tasks().unwrap()[0].server_id, 5);
    assert_eq!(service.get_local_tasks().unwrap().len(), 1);
}

#[test]
fn delete_and_clear() {
    let conn = open_db_in_memory().unwrap();
    let service = TaskService::new(SqliteTaskRepository::new(&conn));

    let first = service.add_task("first", None).unwrap();
    service.add_task("second", None).unwrap();
    service.add_task("third", None).unwrap();

    service.delete_task(first.id).unwrap();
    assert!(service.get_task(first.id).unwrap().is_none());
    assert!(matches!(
        service.delete_task(first.id),
        Err(RepoError::NotFound(_))
    ));

    assert_eq!(service.clear_all_tasks().unwrap(), 2);
    assert!(service.get_all_tasks().unwrap().is_empty());
}
