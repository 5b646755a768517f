pub mod config;
pub mod engine;
pub mod error;
pub mod shell;

pub use self::config::Config;
pub use self::shell::Shell;
