use std::fmt::Display;

/// Result returning Error
pub type Result<T> = std::result::Result<T, Error>;

/// dbshell errors. Config, Internal and Io end the session, the rest are reported and skipped.
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    Config(String),
    Internal(String),
    Io(String),
    Sql(String),
    Value(String),
}

impl Error {
    /// Whether the error ends the session instead of just the current statement.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Config(_) | Error::Internal(_) | Error::Io(_))
    }
}

impl std::error::Error for Error {}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Config(s) | Error::Internal(s) | Error::Io(s) | Error::Sql(s) | Error::Value(s) => {
                write!(f, "{}", s)
            }
        }
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Sql(err.to_string())
    }
}

impl From<rustyline::error::ReadlineError> for Error {
    fn from(err: rustyline::error::ReadlineError) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<std::string::FromUtf8Error> for Error {
    fn from(err: std::string::FromUtf8Error) -> Self {
        Error::Value(err.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for Error {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Error::Internal(err.to_string())
    }
}
