use std::io::IsTerminal;

use dbshell::config::Interactive;
use dbshell::engine::Engine;
use dbshell::error::{Error, Result};
use dbshell::shell::reader::{Lines, Terminal};
use dbshell::{Config, Shell};
use log::info;

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() > 2 {
        return Err(Error::Config("Usage: dbshell [config_file_path]".to_string()));
    }
    let config = Config::new(args.get(1).map(String::as_str))?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_level.as_str()),
    )
    .init();

    let connection = config.engine().connect()?;
    info!("Connected to {}", config.db_path);

    let interactive = match config.interactive {
        Interactive::Auto => std::io::stdin().is_terminal(),
        Interactive::Always => true,
        Interactive::Never => false,
    };
    if interactive {
        println!("Terminate each statement with a line holding only ';'. Enter an empty statement to exit.");
    }

    let mut shell = Shell::new(connection, std::io::stdout().lock(), std::io::stderr());
    if interactive {
        let mut source = Terminal::new(&config.prompt, &config.continuation_prompt, config.history_file())?;
        shell.run(&mut source)?;
    } else {
        shell.run(&mut Lines::new(std::io::stdin().lock()))?;
    }
    Ok(())
}
