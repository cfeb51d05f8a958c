use std::io;
use std::path::Path;
use std::process::Command;

/// Runs command lines the shell does not handle itself.
pub trait Executor {
    /// Blocks until the command finishes. Its exit status is not reported.
    fn execute(&mut self, line: &str, cwd: &Path) -> io::Result<()>;
}

/// Hands the line to the platform shell with inherited stdio.
pub struct SystemExecutor;

impl Executor for SystemExecutor {
    fn execute(&mut self, line: &str, cwd: &Path) -> io::Result<()> {
        let status = system_command(line).current_dir(cwd).status()?;
        log::debug!("`{line}` exited with {status}");
        Ok(())
    }
}

#[cfg(not(windows))]
fn system_command(line: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(line);
    cmd
}

#[cfg(windows)]
fn system_command(line: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(line);
    cmd
}
