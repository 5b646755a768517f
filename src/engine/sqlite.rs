use std::path::{Path, PathBuf};

use log::{debug, info};
use rusqlite::types::ValueRef;
use rusqlite::OpenFlags;

use crate::error::{Error, Result};
use super::{Column, Connection, Cursor, Engine, Record, Value};

/// The path that opens a private in-memory database.
pub const MEMORY_PATH: &str = ":memory:";

/// An embedded SQLite engine addressed by a local path.
#[derive(Clone, Debug)]
pub struct Sqlite {
    path: PathBuf,
    create: bool,
}

impl Sqlite {
    /// Creates an engine for the database at the given path. With `create`, a missing database
    /// (and its parent directories) is created on connect, otherwise connecting fails.
    pub fn new(path: impl Into<PathBuf>, create: bool) -> Self {
        Self { path: path.into(), create }
    }

    /// Creates an engine for a private in-memory database.
    pub fn memory() -> Self {
        Self::new(MEMORY_PATH, true)
    }

    /// The database path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn is_memory(&self) -> bool {
        self.path.as_os_str() == MEMORY_PATH
    }
}

impl Engine for Sqlite {
    type Connection = SqliteConnection;

    fn connect(&self) -> Result<SqliteConnection> {
        if self.is_memory() {
            info!("Opening in-memory database");
            return Ok(SqliteConnection { conn: rusqlite::Connection::open_in_memory()? });
        }

        let mut flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        if self.create {
            flags |= OpenFlags::SQLITE_OPEN_CREATE;
            if let Some(dir) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
                std::fs::create_dir_all(dir)?;
            }
        }

        info!("Opening database {}", self.path.display());
        let conn = rusqlite::Connection::open_with_flags(&self.path, flags)?;
        Ok(SqliteConnection { conn })
    }
}

/// A connection to a SQLite database.
pub struct SqliteConnection {
    conn: rusqlite::Connection,
}

impl Connection for SqliteConnection {
    fn execute(&mut self, statement: &str) -> Result<()> {
        let mut stmt = prepare_single(&self.conn, statement)?;
        let mut rows = stmt.query([])?;
        let mut discarded = 0;
        while rows.next()?.is_some() {
            discarded += 1;
        }
        if discarded > 0 {
            debug!("Discarded {} rows", discarded);
        }
        Ok(())
    }

    fn query(
        &mut self,
        statement: &str,
        visit: &mut dyn FnMut(&mut dyn Cursor) -> Result<()>,
    ) -> Result<()> {
        let mut stmt = prepare_single(&self.conn, statement)?;
        let columns = stmt.column_names().into_iter().map(Column::new).collect();
        let rows = stmt.query([])?;
        // The cursor borrows the statement, so it has to be dropped first.
        let result = visit(&mut SqliteCursor { columns, rows });
        result
    }
}

/// A cursor over the rows of a prepared statement.
struct SqliteCursor<'stmt> {
    columns: Vec<Column>,
    rows: rusqlite::Rows<'stmt>,
}

impl Cursor for SqliteCursor<'_> {
    fn columns(&self) -> &[Column] {
        &self.columns
    }

    fn next_record(&mut self) -> Result<Option<&dyn Record>> {
        Ok(self.rows.next()?.map(|row| row as &dyn Record))
    }
}

impl Record for rusqlite::Row<'_> {
    fn value(&self, index: usize) -> Result<Value> {
        Ok(match self.get_ref(index)? {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(i) => Value::Integer(i),
            ValueRef::Real(f) => Value::Float(f),
            ValueRef::Text(bytes) => Value::Text(String::from_utf8(bytes.to_vec())?),
            ValueRef::Blob(bytes) => Value::Blob(bytes.to_vec()),
        })
    }
}

// Prepares exactly one statement. A trailing ";", whitespace or comments may follow it, but a
// second statement is an error rather than being dropped by prepare().
fn prepare_single<'conn>(
    conn: &'conn rusqlite::Connection,
    statement: &str,
) -> Result<rusqlite::Statement<'conn>> {
    let mut batch = rusqlite::Batch::new(conn, statement);
    let stmt = batch.next()?.ok_or_else(|| Error::Sql("No SQL statement given".into()))?;
    match batch.next() {
        Ok(None) => Ok(stmt),
        Ok(Some(_)) | Err(_) => Err(Error::Sql("Only one SQL statement can be run at a time".into())),
    }
}
