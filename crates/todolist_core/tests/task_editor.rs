use todolist_core::db::open_db_in_memory;
use todolist_core::{RepoError, SqliteTaskRepository, TaskEditor, TaskService};
use uuid::Uuid;

#[test]
fn new_draft_with_blank_title_is_not_saved() {
    let conn = open_db_in_memory().unwrap();
    let service = TaskService::new(SqliteTaskRepository::new(&conn));

    let mut editor = TaskEditor::open(&service, None).unwrap();
    assert!(editor.is_new());
    editor.set_description("only a description");

    assert_eq!(editor.save().unwrap(), None);
    assert!(service.get_all_tasks().unwrap().is_empty());
}

#[test]
fn new_draft_is_created_once_then_updated() {
    let conn = open_db_in_memory().unwrap();
    let service = TaskService::new(SqliteTaskRepository::new(&conn));

    let mut editor = TaskEditor::open(&service, None).unwrap();
    editor.set_title(" Pay rent ");
    editor.set_description("before the 5th");
    assert!(editor.is_dirty());

    let created = editor.save().unwrap().unwrap();
    assert_eq!(created.title, "Pay rent");
    assert!(!editor.is_new());
    assert!(!editor.is_dirty());

    editor.set_title("Pay rent and bills");
    let updated = editor.save().unwrap().unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(service.get_all_tasks().unwrap().len(), 1);
    assert_eq!(
        service.get_task(created.id).unwrap().unwrap().title,
        "Pay rent and bills"
    );
}

#[test]
fn existing_task_loads_and_saves_changes() {
    let conn = open_db_in_memory().unwrap();
    let service = TaskService::new(SqliteTaskRepository::new(&conn));
    let task = service.add_task("draft", None).unwrap();

    let mut editor = TaskEditor::open(&service, Some(task.id)).unwrap();
    assert_eq!(editor.title(), "draft");
    assert_eq!(editor.description(), "");
    assert_eq!(editor.created_at(), task.created_at);
    assert!(!editor.is_dirty());

    let unchanged = editor.save().unwrap().unwrap();
    assert_eq!(unchanged, task);

    editor.set_description("with details");
    let saved = editor.save().unwrap().unwrap();
    assert_eq!(saved.description.as_deref(), Some("with details"));
    assert_eq!(saved.created_at, task.created_at);
}

#[test]
fn clearing_title_of_existing_task_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let service = TaskService::new(SqliteTaskRepository::new(&conn));
    let task = service.add_task("keep", None).unwrap();

    let mut editor = TaskEditor::open(&service, Some(task.id)).unwrap();
    editor.set_title("   ");
    assert!(matches!(editor.save(), Err(RepoError::Validation(_))));
    assert_eq!(service.get_task(task.id).unwrap().unwrap().title, "keep");
}

#[test]
fn opening_unknown_id_fails() {
    let conn = open_db_in_memory().unwrap();
    let service = TaskService::new(SqliteTaskRepository::new(&conn));

    let id = Uuid::new_v4();
    assert!(matches!(
        TaskEditor::open(&service, Some(id)),
        Err(RepoError::NotFound(missing)) if missing == id
    ));
}

#[test]
fn editing_title_only_keeps_missing_description() {
    let conn = open_db_in_memory().unwrap();
    let service = TaskService::new(SqliteTaskRepository::new(&conn));
    let task = service.add_task("untitled", None).unwrap();

    let mut editor = TaskEditor::open(&service, Some(task.id)).unwrap();
    editor.set_title("renamed");
    let saved = editor.save().unwrap().unwrap();
    assert_eq!(saved.description, None);

    let stored = service.get_task(task.id).unwrap().unwrap();
    assert_eq!(stored.title, "renamed");
    assert_eq!(stored.description, None);
    assert_eq!(stored.display_description(), "Нет описания");
}

#[test]
fn editing_description_only_keeps_title() {
    let conn = open_db_in_memory().unwrap();
    let service = TaskService::new(SqliteTaskRepository::new(&conn));
    let task = service.add_task("groceries", Some("milk")).unwrap();

    let mut editor = TaskEditor::open(&service, Some(task.id)).unwrap();
    editor.set_description("");
    let saved = editor.save().unwrap().unwrap();
    assert_eq!(saved.title, "groceries");
    assert_eq!(saved.description.as_deref(), Some(""));
}
