// The engine interface is the only thing the shell knows about the database. Query planning,
// storage and transactions all live behind it.
pub mod memory;
pub mod sqlite;

use std::fmt::Display;

use crate::error::Result;

pub use memory::Memory;
pub use sqlite::Sqlite;

/// An embedded database engine.
pub trait Engine {
    type Connection: Connection;

    /// Opens a connection to the database, creating the database if the engine is configured to.
    fn connect(&self) -> Result<Self::Connection>;
}

/// A database connection.
pub trait Connection {
    /// Executes a statement for its side effects. Any rows it yields are discarded.
    fn execute(&mut self, statement: &str) -> Result<()>;

    /// Executes a query and hands its cursor to the visitor. The prepared statement and the
    /// cursor are released before this returns, whatever the visitor's outcome.
    fn query(
        &mut self,
        statement: &str,
        visit: &mut dyn FnMut(&mut dyn Cursor) -> Result<()>,
    ) -> Result<()>;
}

/// A forward-only, single-pass result cursor.
pub trait Cursor {
    /// Metadata for the result columns, in order.
    fn columns(&self) -> &[Column];

    /// Advances to the next record, or returns None when the result is exhausted.
    fn next_record(&mut self) -> Result<Option<&dyn Record>>;
}

/// The record a cursor is currently positioned on.
pub trait Record {
    /// Reads the value of a column by its 0-based index.
    fn value(&self, index: usize) -> Result<Value>;
}

/// Result column metadata.
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    /// The column name.
    pub name: String,
    /// The display label, e.g. an AS alias. Equal to the name when there is none.
    pub label: String,
}

impl Column {
    /// Creates a column whose label is its name.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self { label: name.clone(), name }
    }

    /// Creates a column with a distinct display label.
    pub fn labeled(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self { name: name.into(), label: label.into() }
    }
}

/// A column value read from a record.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Float(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(v) if v.is_finite() && v.fract() == 0.0 => write!(f, "{:.1}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Text(s) => write!(f, "{}", s),
            Value::Blob(bytes) => {
                for b in bytes {
                    write!(f, "{:02x}", b)?;
                }
                Ok(())
            }
        }
    }
}
