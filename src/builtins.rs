use crate::error::ShellError;
use crate::renderer;
use crate::session::WorkingDirectory;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Cd,
    Mkdir,
    Rmdir,
    Clear,
    Touch,
}

// Scanned in order, first match wins.
const TABLE: [Builtin; 5] = [
    Builtin::Cd,
    Builtin::Mkdir,
    Builtin::Rmdir,
    Builtin::Clear,
    Builtin::Touch,
];

impl Builtin {
    pub fn name(self) -> &'static str {
        match self {
            Builtin::Cd => "cd",
            Builtin::Mkdir => "mkdir",
            Builtin::Rmdir => "rmdir",
            Builtin::Clear => "clear",
            Builtin::Touch => "touch",
        }
    }

    pub fn lookup(command: &str) -> Option<Builtin> {
        TABLE.iter().copied().find(|b| b.name() == command)
    }

    pub fn run<D, W>(self, argument: Option<&str>, cwd: &mut D, out: &mut W) -> Result<(), ShellError>
    where
        D: WorkingDirectory,
        W: Write,
    {
        match self {
            Builtin::Cd => change_directory(argument, cwd),
            Builtin::Mkdir => make_directory(&self.target(argument, cwd)?),
            Builtin::Rmdir => {
                let path = self.target(argument, cwd)?;
                fs::remove_dir(&path).map_err(|e| ShellError::file_access("rmdir", path, e))
            }
            Builtin::Clear => Ok(renderer::clear_screen(out)?),
            Builtin::Touch => touch(&self.target(argument, cwd)?),
        }
    }

    fn target<D: WorkingDirectory>(self, argument: Option<&str>, cwd: &D) -> Result<PathBuf, ShellError> {
        let arg = argument.ok_or(ShellError::MissingOperand(self.name()))?;
        cwd.resolve(Path::new(arg))
            .map_err(|e| ShellError::file_access(self.name(), arg, e))
    }
}

fn change_directory<D: WorkingDirectory>(argument: Option<&str>, cwd: &mut D) -> Result<(), ShellError> {
    let path = match argument {
        Some(arg) => PathBuf::from(arg),
        None => std::env::var_os("HOME")
            .map(PathBuf::from)
            .ok_or(ShellError::MissingOperand("cd"))?,
    };
    cwd.change(&path)
        .map_err(|source| ShellError::DirectoryChange { path, source })
}

/// World-writable before umask, as `mkdir(2)` callers traditionally ask for.
fn make_directory(path: &Path) -> Result<(), ShellError> {
    let mut builder = fs::DirBuilder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o777);
    }
    builder
        .create(path)
        .map_err(|e| ShellError::file_access("mkdir", path, e))
}

/// Always opens for truncating write: touching an existing file empties it.
fn touch(path: &Path) -> Result<(), ShellError> {
    File::create(path)
        .map(drop)
        .map_err(|e| ShellError::file_access("touch", path, e))
}
