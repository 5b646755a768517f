use std::path::PathBuf;

use serde_derive::Deserialize;

use crate::engine::Sqlite;
use crate::error::Result;

/// The configuration file read when none is given. It may be absent.
pub const DEFAULT_FILE: &str = "config/dbshell";

/// Whether input is read through the line editor.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interactive {
    /// When stdin is a terminal.
    Auto,
    Always,
    Never,
}

/// Shell configuration. Defaults are overridden by the config file, then by DBSHELL_* variables.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// The database path. ":memory:" opens a private in-memory database.
    pub db_path: String,
    /// Create the database if it doesn't exist.
    pub create: bool,
    pub log_level: String,
    pub prompt: String,
    pub continuation_prompt: String,
    /// History file for the line editor. Empty disables persistent history.
    pub history_file: String,
    pub interactive: Interactive,
}

impl Config {
    /// Loads the configuration. An explicitly given file must exist.
    pub fn new(file: Option<&str>) -> Result<Self> {
        let c = config::Config::builder()
            .set_default("db_path", "res/rootdb.db")?
            .set_default("create", true)?
            .set_default("log_level", "warn")?
            .set_default("prompt", "dbshell> ")?
            .set_default("continuation_prompt", "      -> ")?
            .set_default("history_file", "")?
            .set_default("interactive", "auto")?

            .add_source(config::File::with_name(file.unwrap_or(DEFAULT_FILE)).required(file.is_some()))
            .add_source(config::Environment::with_prefix("DBSHELL"));

        Ok(c.build()?.try_deserialize()?)
    }

    /// The engine for the configured database.
    pub fn engine(&self) -> Sqlite {
        Sqlite::new(&self.db_path, self.create)
    }

    /// The line editor's history file, if any.
    pub fn history_file(&self) -> Option<PathBuf> {
        match self.history_file.is_empty() {
            true => None,
            false => Some(PathBuf::from(&self.history_file)),
        }
    }
}
