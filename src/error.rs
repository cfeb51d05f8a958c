use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("{op}: {}: {source}", .path.display())]
    FileAccess {
        op: &'static str,
        path: PathBuf,
        source: io::Error,
    },

    #[error("cd: {}: {source}", .path.display())]
    DirectoryChange { path: PathBuf, source: io::Error },

    #[error("{0}: missing operand")]
    MissingOperand(&'static str),

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("{line}: {source}")]
    Spawn { line: String, source: io::Error },

    #[error("input line longer than {limit} bytes, discarded")]
    LineTooLong { limit: usize },

    #[error("insert buffer is full ({limit} characters)")]
    BufferFull { limit: usize },

    /// Terminal I/O. Nothing sensible can continue after this.
    #[error("terminal I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ShellError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, ShellError::Io(_))
    }

    pub fn file_access(op: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        ShellError::FileAccess {
            op,
            path: path.into(),
            source,
        }
    }
}
