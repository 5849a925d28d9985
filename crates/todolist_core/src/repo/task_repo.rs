//! Task repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over the `tasks` table.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Write paths call `Task::validate()` before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Listing order is incomplete first, then newest first, then `uuid`.

use crate::db::DbError;
use crate::model::task::{Task, TaskId, TaskValidationError, LOCAL_SERVER_ID};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const TASK_SELECT_SQL: &str = "SELECT
    uuid,
    title,
    description,
    is_completed,
    created_at,
    server_id
FROM tasks";

const TASK_ORDER_SQL: &str = " ORDER BY is_completed ASC, created_at DESC, uuid ASC";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for task persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(TaskValidationError),
    Db(DbError),
    NotFound(TaskId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted task data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<TaskValidationError> for RepoError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Which side created a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TaskOrigin {
    #[default]
    Any,
    /// `server_id == 0`.
    Local,
    /// `server_id > 0`.
    Remote,
}

/// Query options for listing tasks.
#[derive(Debug, Clone, Default)]
pub struct TaskListQuery {
    /// `Some(true)` keeps only completed tasks, `Some(false)` only open ones.
    pub completion: Option<bool>,
    pub origin: TaskOrigin,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for task CRUD operations.
pub trait TaskRepository {
    fn create_task(&self, task: &Task) -> RepoResult<TaskId>;
    fn update_task(&self, task: &Task) -> RepoResult<()>;
    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>>;
    fn find_by_server_id(&self, server_id: i64) -> RepoResult<Option<Task>>;
    fn list_tasks(&self, query: &TaskListQuery) -> RepoResult<Vec<Task>>;
    fn delete_task(&self, id: TaskId) -> RepoResult<()>;
    fn delete_all_tasks(&self) -> RepoResult<usize>;
    /// Inserts `created` and updates `updated` as one atomic unit.
    fn save_batch(&self, created: &[Task], updated: &[Task]) -> RepoResult<()>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn insert(&self, task: &Task) -> RepoResult<()> {
        task.validate()?;

        self.conn.execute(
            "INSERT INTO tasks (
                uuid,
                title,
                description,
                is_completed,
                created_at,
                server_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                task.id.to_string(),
                task.title.as_str(),
                task.description.as_deref(),
                bool_to_int(task.is_completed),
                task.created_at,
                task.server_id,
            ],
        )?;

        Ok(())
    }

    fn update(&self, task: &Task) -> RepoResult<()> {
        task.validate()?;

        let changed = self.conn.execute(
            "UPDATE tasks
             SET
                title = ?1,
                description = ?2,
                is_completed = ?3,
                created_at = ?4,
                server_id = ?5,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?6;",
            params![
                task.title.as_str(),
                task.description.as_deref(),
                bool_to_int(task.is_completed),
                task.created_at,
                task.server_id,
                task.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(task.id));
        }

        Ok(())
    }

    fn query_one(&self, filter_sql: &str, value: Value) -> RepoResult<Option<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} WHERE {filter_sql} LIMIT 1;"))?;
        let mut rows = stmt.query([value])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row)?));
        }

        Ok(None)
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn create_task(&self, task: &Task) -> RepoResult<TaskId> {
        self.insert(task)?;
        Ok(task.id)
    }

    fn update_task(&self, task: &Task) -> RepoResult<()> {
        self.update(task)
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        self.query_one("uuid = ?1", Value::Text(id.to_string()))
    }

    fn find_by_server_id(&self, server_id: i64) -> RepoResult<Option<Task>> {
        if server_id <= LOCAL_SERVER_ID {
            return Ok(None);
        }
        self.query_one("server_id = ?1", Value::Integer(server_id))
    }

    fn list_tasks(&self, query: &TaskListQuery) -> RepoResult<Vec<Task>> {
        let mut sql = format!("{TASK_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(completed) = query.completion {
            sql.push_str(" AND is_completed = ?");
            bind_values.push(Value::Integer(bool_to_int(completed)));
        }

        match query.origin {
            TaskOrigin::Any => {}
            TaskOrigin::Local => sql.push_str(" AND server_id = 0"),
            TaskOrigin::Remote => sql.push_str(" AND server_id > 0"),
        }

        sql.push_str(TASK_ORDER_SQL);

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut tasks = Vec::new();

        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }

        Ok(tasks)
    }

    fn delete_task(&self, id: TaskId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM tasks WHERE uuid = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn delete_all_tasks(&self) -> RepoResult<usize> {
        Ok(self.conn.execute("DELETE FROM tasks;", [])?)
    }

    fn save_batch(&self, created: &[Task], updated: &[Task]) -> RepoResult<()> {
        // Dropping the transaction on an early `?` rolls every row back.
        let tx = self.conn.unchecked_transaction()?;
        for task in updated {
            self.update(task)?;
        }
        for task in created {
            self.insert(task)?;
        }
        tx.commit()?;
        Ok(())
    }
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let uuid_text: String = row.get("uuid")?;
    let id = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in tasks.uuid"))
    })?;

    let is_completed = match row.get::<_, i64>("is_completed")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_completed value `{other}` in tasks.is_completed"
            )));
        }
    };

    let task = Task {
        id,
        title: row.get("title")?,
        description: row.get("description")?,
        is_completed,
        created_at: row.get("created_at")?,
        server_id: row.get("server_id")?,
    };
    task.validate().map_err(|err| {
        RepoError::InvalidData(format!("invalid row `{}` in tasks: {err}", task.id))
    })?;
    Ok(task)
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
