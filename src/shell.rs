use crate::builtins::Builtin;
use crate::config::Config;
use crate::editor::{FileSession, Outcome};
use crate::error::ShellError;
use crate::executor::Executor;
use crate::session::WorkingDirectory;
use crate::terminal::Terminal;

use std::io::Write;
use std::path::Path;

/// Lines starting with this open the rest of the line in the editor.
pub const EDITOR_PREFIX: &str = "mi ";

#[derive(Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

pub struct Shell<T, E, D> {
    term: T,
    executor: E,
    cwd: D,
    config: Config,
}

impl<T, E, D> Shell<T, E, D>
where
    T: Terminal,
    E: Executor,
    D: WorkingDirectory,
{
    pub fn new(term: T, executor: E, cwd: D, config: Config) -> Self {
        Self {
            term,
            executor,
            cwd,
            config,
        }
    }

    /// Prompt, read, dispatch until the editor quits or input runs out.
    pub fn run(&mut self) -> Result<(), ShellError> {
        loop {
            self.prompt()?;

            let line = match self.term.read_line(self.config.max_line_len) {
                Ok(Some(line)) => line,
                Ok(None) => {
                    writeln!(self.term)?;
                    return Ok(());
                }
                Err(e) => {
                    self.report(e)?;
                    continue;
                }
            };

            if self.dispatch(&line)? == Flow::Exit {
                log::info!("editor quit, leaving shell");
                return Ok(());
            }
        }
    }

    pub fn dispatch(&mut self, line: &str) -> Result<Flow, ShellError> {
        let line = line.strip_suffix('\n').unwrap_or(line);

        if let Some(name) = line.strip_prefix(EDITOR_PREFIX) {
            return self.edit(name);
        }

        let mut tokens = line.split_whitespace();
        let Some(command) = tokens.next() else {
            return Ok(Flow::Continue);
        };
        let argument = tokens.next();

        let result = match Builtin::lookup(command) {
            Some(builtin) => {
                log::debug!("builtin {} {:?}", builtin.name(), argument);
                builtin.run(argument, &mut self.cwd, &mut self.term)
            }
            None => self.forward(line),
        };
        if let Err(e) = result {
            self.report(e)?;
        }
        Ok(Flow::Continue)
    }

    fn prompt(&mut self) -> Result<(), ShellError> {
        match self.cwd.current() {
            Ok(cwd) => write!(self.term, "{} $ ", cwd.display())?,
            Err(e) => self.report(ShellError::file_access("getcwd", ".", e))?,
        }
        self.term.flush()?;
        Ok(())
    }

    fn forward(&mut self, line: &str) -> Result<(), ShellError> {
        log::debug!("forwarding {line:?}");
        let cwd = self
            .cwd
            .current()
            .map_err(|e| ShellError::file_access("getcwd", ".", e))?;
        self.term.flush()?;
        self.executor
            .execute(line, &cwd)
            .map_err(|source| ShellError::Spawn {
                line: line.to_string(),
                source,
            })
    }

    fn edit(&mut self, name: &str) -> Result<Flow, ShellError> {
        let outcome = self.open_editor(name);
        match outcome {
            Ok(Outcome::Quit) => Ok(Flow::Exit),
            Ok(Outcome::Continue) => Ok(Flow::Continue),
            Err(e) => {
                self.report(e)?;
                Ok(Flow::Continue)
            }
        }
    }

    fn open_editor(&mut self, name: &str) -> Result<Outcome, ShellError> {
        if name.is_empty() {
            return Err(ShellError::MissingOperand("mi"));
        }
        let path = self
            .cwd
            .resolve(Path::new(name))
            .map_err(|e| ShellError::file_access("mi", name, e))?;
        let mut session = FileSession::open(name, path, &mut self.term)?;
        session.run(&mut self.term, &self.config)
    }

    /// Shows a recoverable error to the user; anything fatal is passed back.
    fn report(&mut self, err: ShellError) -> Result<(), ShellError> {
        if err.is_fatal() {
            return Err(err);
        }
        log::warn!("{err}");
        writeln!(self.term, "{err}")?;
        Ok(())
    }
}
