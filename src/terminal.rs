use crate::error::ShellError;
use crossterm::{
    event::{self, Event, KeyEvent, KeyEventKind},
    terminal,
};
use std::io::{self, BufRead, Read, Stdin, Stdout, Write};
use std::ops::{Deref, DerefMut};

/// Everything the shell and the editor need from the user's terminal.
pub trait Terminal: Write {
    /// Reads one line, trailing newline included. `Ok(None)` at end of input.
    fn read_line(&mut self, limit: usize) -> Result<Option<String>, ShellError>;

    /// Blocks until one key press arrives. Only meaningful in raw mode.
    fn read_key(&mut self) -> io::Result<KeyEvent>;

    fn enable_raw_mode(&mut self) -> io::Result<()>;

    fn disable_raw_mode(&mut self) -> io::Result<()>;
}

pub struct StdTerminal {
    stdin: Stdin,
    stdout: Stdout,
}

impl StdTerminal {
    pub fn new() -> Self {
        Self {
            stdin: io::stdin(),
            stdout: io::stdout(),
        }
    }
}

impl Write for StdTerminal {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stdout.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stdout.flush()
    }
}

impl Terminal for StdTerminal {
    fn read_line(&mut self, limit: usize) -> Result<Option<String>, ShellError> {
        read_bounded_line(&mut self.stdin.lock(), limit)
    }

    fn read_key(&mut self) -> io::Result<KeyEvent> {
        loop {
            if let Event::Key(key) = event::read()? {
                // Release/repeat events only show up with enhanced keyboard flags.
                if key.kind == KeyEventKind::Press {
                    return Ok(key);
                }
            }
        }
    }

    fn enable_raw_mode(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()
    }

    fn disable_raw_mode(&mut self) -> io::Result<()> {
        terminal::disable_raw_mode()
    }
}

/// Reads up to and including the next `\n`, refusing lines whose content is
/// longer than `limit` bytes. A refused line is consumed to its end so the next
/// read starts on a fresh line.
pub fn read_bounded_line<R: BufRead>(
    reader: &mut R,
    limit: usize,
) -> Result<Option<String>, ShellError> {
    let mut bytes = Vec::new();
    let n = reader
        .by_ref()
        .take((limit as u64).saturating_add(1))
        .read_until(b'\n', &mut bytes)?;
    if n == 0 {
        return Ok(None);
    }

    if bytes.last() != Some(&b'\n') && bytes.len() > limit {
        let mut rest = Vec::new();
        loop {
            rest.clear();
            let m = reader.by_ref().take(4096).read_until(b'\n', &mut rest)?;
            if m == 0 || rest.last() == Some(&b'\n') {
                break;
            }
        }
        return Err(ShellError::LineTooLong { limit });
    }

    Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
}

/// Holds the terminal in raw mode. Dropping it puts the terminal back, whichever
/// way the owning scope is left.
pub struct RawModeGuard<'a, T: Terminal> {
    term: &'a mut T,
}

impl<'a, T: Terminal> RawModeGuard<'a, T> {
    pub fn acquire(term: &'a mut T) -> io::Result<Self> {
        term.enable_raw_mode()?;
        log::debug!("raw mode on");
        Ok(Self { term })
    }
}

impl<T: Terminal> Deref for RawModeGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.term
    }
}

impl<T: Terminal> DerefMut for RawModeGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.term
    }
}

impl<T: Terminal> Drop for RawModeGuard<'_, T> {
    fn drop(&mut self) {
        match self.term.disable_raw_mode() {
            Ok(()) => log::debug!("raw mode off"),
            Err(e) => log::error!("could not restore terminal mode: {e}"),
        }
    }
}
