//! `todolist` command-line entry point.
//!
//! # Responsibility
//! - Resolve configuration from flags and environment, then start logging.
//! - Drive `todolist_core` use cases and render their results.

mod cli;

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use log::info;
use todolist_core::db::open_db;
use todolist_core::{
    init_logging_from_config, AppConfig, HttpTodoSource, SqliteTaskRepository, Task, TaskEditor,
    TaskFilter, TaskId, TaskListView, TaskQueue, TaskRepository, TaskService, TaskSort,
};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;
    init_logging_from_config(&config, true).context("failed to start logging")?;
    info!(
        "event=cli_start module=cli status=ok db_path={}",
        config.db_path.display()
    );

    match cli.command {
        Command::Sync { url } => run_sync(&config, url),
        command => {
            let conn = open_db(&config.db_path)
                .with_context(|| format!("failed to open {}", config.db_path.display()))?;
            let service = TaskService::new(SqliteTaskRepository::new(&conn));
            run_local(&service, command)
        }
    }
}

fn resolve_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = AppConfig::from_env()?;
    if let Some(db) = &cli.db {
        config.db_path = db.clone();
    }
    if let Some(log_dir) = &cli.log_dir {
        config.log_dir = std::path::absolute(log_dir)
            .with_context(|| format!("invalid log dir {}", log_dir.display()))?;
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    Ok(config)
}

fn run_local<R: TaskRepository>(service: &TaskService<R>, command: Command) -> Result<()> {
    match command {
        Command::List { filter, sort, json } => list(service, filter, sort, json),
        Command::Add { title, description } => {
            let task = service.add_task(&title, description.as_deref())?;
            println!("Добавлено: {} ({})", task.title, short_id(task.id));
            Ok(())
        }
        Command::Edit {
            id,
            title,
            description,
        } => {
            let id = resolve_id(service, &id)?;
            let mut editor = TaskEditor::open(service, Some(id))?;
            if let Some(title) = title {
                editor.set_title(title);
            }
            if let Some(description) = description {
                editor.set_description(description);
            }
            if let Some(task) = editor.save()? {
                print_details(&task);
            }
            Ok(())
        }
        Command::Toggle { id } => {
            let id = resolve_id(service, &id)?;
            let completed = service.toggle_task_completion(id)?;
            println!("{}: {}", short_id(id), status_text(completed));
            Ok(())
        }
        Command::Delete { id } => {
            let id = resolve_id(service, &id)?;
            service.delete_task(id)?;
            println!("Удалено: {}", short_id(id));
            Ok(())
        }
        Command::Show { id } => {
            let task = find_task(service, &id)?;
            print_details(&task);
            Ok(())
        }
        Command::Share { id } => {
            let task = find_task(service, &id)?;
            println!("{}", task.share_text());
            Ok(())
        }
        Command::Search { query, local } => {
            let tasks = if local {
                service.search_local_tasks(&query)?
            } else {
                service.search_tasks(&query)?
            };
            print_rows(&tasks);
            Ok(())
        }
        Command::Clear => {
            let removed = service.clear_all_tasks()?;
            println!("Удалено: {}", TaskListView::count_label(removed));
            Ok(())
        }
        Command::Sync { .. } => bail!("sync runs on the task queue"),
    }
}

fn list<R: TaskRepository>(
    service: &TaskService<R>,
    filter: TaskFilter,
    sort: TaskSort,
    json: bool,
) -> Result<()> {
    let mut view = TaskListView::new();
    view.reload(service.get_all_tasks()?);
    view.set_filter(filter);
    view.set_sort(sort);
    let tasks = view.visible();

    if json {
        println!("{}", serde_json::to_string_pretty(&tasks)?);
    } else {
        print_rows(&tasks);
    }
    Ok(())
}

fn run_sync(config: &AppConfig, url: Option<String>) -> Result<()> {
    let base_url = url.unwrap_or_else(|| config.remote_base_url.clone());
    let source = HttpTodoSource::new(base_url, config.request_timeout)?;
    let queue = TaskQueue::open(&config.db_path)?;

    let (local, synced) = queue.load_with_background_sync(source);
    let local = local.wait()??;
    println!("Локально: {}", TaskListView::count_label(local.len()));

    let synced = synced.wait()??;
    println!(
        "Синхронизировано: добавлено {}, обновлено {}, пропущено {}",
        synced.report.inserted, synced.report.updated, synced.report.skipped
    );
    print_rows(&synced.tasks);
    Ok(())
}

fn find_task<R: TaskRepository>(service: &TaskService<R>, prefix: &str) -> Result<Task> {
    let id = resolve_id(service, prefix)?;
    service
        .get_task(id)?
        .ok_or_else(|| anyhow!("task {prefix} not found"))
}

/// Resolves a full id or a unique, case-insensitive prefix of one.
fn resolve_id<R: TaskRepository>(service: &TaskService<R>, prefix: &str) -> Result<TaskId> {
    let prefix = prefix.trim().to_ascii_lowercase();
    if prefix.is_empty() {
        bail!("task id must not be empty");
    }
    if let Ok(id) = TaskId::parse_str(&prefix) {
        return Ok(id);
    }

    let matches: Vec<TaskId> = service
        .get_all_tasks()?
        .into_iter()
        .map(|task| task.id)
        .filter(|id| id.to_string().starts_with(&prefix))
        .collect();
    match matches.as_slice() {
        [id] => Ok(*id),
        [] => bail!("no task matches id {prefix}"),
        _ => bail!("id prefix {prefix} matches {} tasks", matches.len()),
    }
}

fn print_rows(tasks: &[Task]) {
    for task in tasks {
        let mark = if task.is_completed { 'x' } else { ' ' };
        let origin = if task.is_remote() { " *" } else { "" };
        println!("[{mark}] {}  {}{origin}", short_id(task.id), task.title);
    }
    println!("{}", TaskListView::count_label(tasks.len()));
}

fn print_details(task: &Task) {
    println!("{}", task.title);
    println!("{}", task.display_description());
    println!("Статус: {}", task.status_text());
    println!("Дата создания: {}", task.formatted_created_at());
    println!("id: {}", task.id);
}

fn status_text(completed: bool) -> &'static str {
    if completed {
        todolist_core::model::task::COMPLETED_STATUS_TEXT
    } else {
        todolist_core::model::task::NOT_COMPLETED_STATUS_TEXT
    }
}

fn short_id(id: TaskId) -> String {
    id.simple().to_string()[..8].to_string()
}
