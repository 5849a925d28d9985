//! Opening the task store.
//!
//! File stores use WAL journaling; in-memory stores keep SQLite defaults.

use super::migrations::apply_migrations;
use super::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone, Copy)]
enum Location<'a> {
    File(&'a Path),
    Memory,
}

impl Display for Location<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "mode=file path={}", path.display()),
            Self::Memory => write!(f, "mode=memory"),
        }
    }
}

/// Opens (creating if needed) the task store at `path` and migrates it.
///
/// Missing parent directories are created first.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    open_at(Location::File(path.as_ref()))
}

/// Opens a private in-memory task store, migrated and ready to use.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_at(Location::Memory)
}

fn open_at(location: Location<'_>) -> DbResult<Connection> {
    let started_at = Instant::now();
    let result = connect(location).and_then(|mut conn| {
        configure(&conn, location)?;
        apply_migrations(&mut conn)?;
        Ok(conn)
    });

    let duration_ms = started_at.elapsed().as_millis();
    match &result {
        Ok(_) => info!("event=db_open module=db status=ok {location} duration_ms={duration_ms}"),
        Err(err) => error!(
            "event=db_open module=db status=error {location} duration_ms={duration_ms} error={err}"
        ),
    }
    result
}

fn connect(location: Location<'_>) -> DbResult<Connection> {
    match location {
        Location::File(path) => {
            if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
                std::fs::create_dir_all(dir).map_err(|source| DbError::CreateDir {
                    path: dir.to_path_buf(),
                    source,
                })?;
            }
            Ok(Connection::open(path)?)
        }
        Location::Memory => Ok(Connection::open_in_memory()?),
    }
}

fn configure(conn: &Connection, location: Location<'_>) -> DbResult<()> {
    conn.pragma_update(None, "foreign_keys", true)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    if let Location::File(_) = location {
        // journal_mode answers with the mode actually in effect.
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
            row.get::<_, String>(0)
        })?;
    }
    Ok(())
}
