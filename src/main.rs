use anyhow::Result;

mod buffer;
mod builtins;
mod config;
mod editor;
mod error;
mod executor;
mod graphemes;
mod input;
mod renderer;
mod session;
mod shell;
mod terminal;

use config::Config;
use executor::SystemExecutor;
use session::ProcessDirectory;
use shell::Shell;
use terminal::StdTerminal;

fn main() -> Result<()> {
    env_logger::init();

    let config = Config::from_env();
    log::debug!("starting with {config:?}");

    let mut shell = Shell::new(StdTerminal::new(), SystemExecutor, ProcessDirectory, config);
    shell.run()?;
    Ok(())
}
