use std::io;
use std::path::{Path, PathBuf};

/// Where relative paths are resolved and child processes start.
pub trait WorkingDirectory {
    fn current(&self) -> io::Result<PathBuf>;

    fn change(&mut self, path: &Path) -> io::Result<()>;

    fn resolve(&self, path: &Path) -> io::Result<PathBuf> {
        Ok(self.current()?.join(path))
    }
}

/// The process-wide working directory, read fresh on every call.
pub struct ProcessDirectory;

impl WorkingDirectory for ProcessDirectory {
    fn current(&self) -> io::Result<PathBuf> {
        std::env::current_dir()
    }

    fn change(&mut self, path: &Path) -> io::Result<()> {
        std::env::set_current_dir(path)
    }
}
