use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::{Error, Result};
use super::{Column, Connection, Cursor, Engine, Record, Value};

/// Scripted engine for testing. Answers queries from canned tables keyed by the exact statement
/// text, records every statement it receives, and can be told to fail. Clones share the script,
/// so a test can keep a handle and inspect it after the shell has taken the connection.
#[derive(Clone, Default)]
pub struct Memory {
    script: Arc<RwLock<Script>>,
}

#[derive(Default)]
struct Script {
    tables: HashMap<String, Table>,
    failures: HashMap<String, String>,
    received: Vec<String>,
    opened: usize,
    closed: usize,
}

impl Memory {
    /// Creates an engine that knows no statements.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers the given query with a canned table.
    pub fn with_table(self, statement: &str, table: Table) -> Result<Self> {
        self.script.write()?.tables.insert(statement.to_string(), table);
        Ok(self)
    }

    /// Fails the given statement with an engine error.
    pub fn with_failure(self, statement: &str, message: &str) -> Result<Self> {
        self.script.write()?.failures.insert(statement.to_string(), message.to_string());
        Ok(self)
    }

    /// Every statement received so far, in order, whether it succeeded or not.
    pub fn received(&self) -> Result<Vec<String>> {
        Ok(self.script.read()?.received.clone())
    }

    /// The number of cursors handed out and not yet released.
    pub fn open_cursors(&self) -> Result<usize> {
        let script = self.script.read()?;
        Ok(script.opened - script.closed)
    }
}

impl Engine for Memory {
    type Connection = MemoryConnection;

    fn connect(&self) -> Result<MemoryConnection> {
        Ok(MemoryConnection { script: self.script.clone() })
    }
}

/// A connection to a scripted engine.
pub struct MemoryConnection {
    script: Arc<RwLock<Script>>,
}

impl MemoryConnection {
    fn receive(&self, statement: &str) -> Result<()> {
        let mut script = self.script.write()?;
        script.received.push(statement.to_string());
        match script.failures.get(statement) {
            Some(message) => Err(Error::Sql(message.clone())),
            None => Ok(()),
        }
    }
}

impl Connection for MemoryConnection {
    fn execute(&mut self, statement: &str) -> Result<()> {
        self.receive(statement)
    }

    fn query(
        &mut self,
        statement: &str,
        visit: &mut dyn FnMut(&mut dyn Cursor) -> Result<()>,
    ) -> Result<()> {
        self.receive(statement)?;
        let table = self.script.read()?.tables.get(statement).cloned().ok_or_else(
            || Error::Sql(format!("no canned result for: {}", statement))
        )?;
        self.script.write()?.opened += 1;
        let mut cursor = MemoryCursor {
            columns: table.columns,
            rows: table.rows.into_iter(),
            current: None,
            position: 0,
            fail_at: table.fail_at,
            script: self.script.clone(),
        };
        visit(&mut cursor)
    }
}

/// A canned query result.
#[derive(Clone, Debug, Default)]
pub struct Table {
    columns: Vec<Column>,
    rows: Vec<MemoryRecord>,
    fail_at: Option<(usize, String)>,
}

impl Table {
    /// Creates an empty result with the given columns.
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns, ..Default::default() }
    }

    /// Appends a row.
    pub fn row(mut self, values: Vec<Value>) -> Self {
        self.rows.push(MemoryRecord { cells: values.into_iter().map(Ok).collect() });
        self
    }

    /// Makes reading a single cell of the last appended row fail.
    pub fn broken_cell(mut self, column: usize, message: &str) -> Self {
        if let Some(cell) = self.rows.last_mut().and_then(|r| r.cells.get_mut(column)) {
            *cell = Err(message.to_string());
        }
        self
    }

    /// Makes advancing to the row with the given 0-based index fail.
    pub fn fail_at(mut self, row: usize, message: &str) -> Self {
        self.fail_at = Some((row, message.to_string()));
        self
    }
}

#[derive(Clone, Debug)]
struct MemoryRecord {
    cells: Vec<std::result::Result<Value, String>>,
}

impl Record for MemoryRecord {
    fn value(&self, index: usize) -> Result<Value> {
        match self.cells.get(index) {
            Some(Ok(value)) => Ok(value.clone()),
            Some(Err(message)) => Err(Error::Sql(message.clone())),
            None => Err(Error::Value(format!("column index {} out of range", index))),
        }
    }
}

struct MemoryCursor {
    columns: Vec<Column>,
    rows: std::vec::IntoIter<MemoryRecord>,
    current: Option<MemoryRecord>,
    position: usize,
    fail_at: Option<(usize, String)>,
    script: Arc<RwLock<Script>>,
}

impl Cursor for MemoryCursor {
    fn columns(&self) -> &[Column] {
        &self.columns
    }

    fn next_record(&mut self) -> Result<Option<&dyn Record>> {
        if let Some((row, message)) = &self.fail_at {
            if *row == self.position {
                return Err(Error::Sql(message.clone()));
            }
        }
        self.current = self.rows.next();
        if self.current.is_some() {
            self.position += 1;
        }
        Ok(self.current.as_ref().map(|r| r as &dyn Record))
    }
}

impl Drop for MemoryCursor {
    fn drop(&mut self) {
        if let Ok(mut script) = self.script.write() {
            script.closed += 1;
        }
    }
}
