use crate::buffer::EditBuffer;
use crate::config::Config;
use crate::error::ShellError;
use crate::graphemes::advance_column;
use crate::input::{self, InsertCommand};
use crate::renderer;
use crate::terminal::{RawModeGuard, Terminal};

use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditorMode {
    LineCommand,
    Insert,
}

#[derive(Debug, PartialEq, Eq)]
pub enum LineCommand {
    Write,
    Quit,
    WriteQuit,
    Insert,
    Unknown(String),
}

impl LineCommand {
    pub fn parse(line: &str) -> Self {
        match line {
            ":w" => LineCommand::Write,
            ":q" => LineCommand::Quit,
            ":wq" => LineCommand::WriteQuit,
            ":i" => LineCommand::Insert,
            other => LineCommand::Unknown(other.to_string()),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Quit,
}

/// One file opened with `mi`. Owns the only handle to it; every reopen swaps
/// the handle here so nothing holds a closed one.
pub struct FileSession {
    name: String,
    path: PathBuf,
    file: File,
    mode: EditorMode,
}

impl FileSession {
    pub fn open<W: Write>(name: &str, path: PathBuf, out: &mut W) -> Result<Self, ShellError> {
        let file = match OpenOptions::new().read(true).append(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                writeln!(out, "File not found. Creating a new file: {name}")?;
                log::info!("creating {}", path.display());
                OpenOptions::new()
                    .read(true)
                    .write(true)
                    .create(true)
                    .truncate(true)
                    .open(&path)
                    .map_err(|e| ShellError::file_access("mi", &path, e))?
            }
            Err(e) => return Err(ShellError::file_access("mi", &path, e)),
        };
        writeln!(out, "File opened: {name}")?;
        log::info!("editing {}", path.display());

        Ok(Self {
            name: name.to_string(),
            path,
            file,
            mode: EditorMode::LineCommand,
        })
    }

    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    /// The line-command loop. Returns once the user quits or input ends.
    pub fn run<T: Terminal>(&mut self, term: &mut T, config: &Config) -> Result<Outcome, ShellError> {
        write!(
            term,
            "Commands:\n\
             :i  - Enter insert mode\n\
             :w  - Save the file\n\
             :q  - Quit the editor\n\
             :wq - Save and quit\n\n"
        )?;
        term.flush()?;

        loop {
            let line = match term.read_line(config.max_line_len) {
                Ok(Some(line)) => line,
                Ok(None) => {
                    log::info!("input closed while editing {}", self.name);
                    return Ok(Outcome::Quit);
                }
                Err(e) if !e.is_fatal() => {
                    report(term, e)?;
                    continue;
                }
                Err(e) => return Err(e),
            };
            let line = line.strip_suffix('\n').unwrap_or(&line);

            match self.process_command(LineCommand::parse(line), term, config) {
                Ok(Outcome::Continue) => {}
                Ok(Outcome::Quit) => return Ok(Outcome::Quit),
                Err(e) if !e.is_fatal() => report(term, e)?,
                Err(e) => return Err(e),
            }
            term.flush()?;
        }
    }

    pub fn process_command<T: Terminal>(
        &mut self,
        command: LineCommand,
        term: &mut T,
        config: &Config,
    ) -> Result<Outcome, ShellError> {
        log::debug!("{:?} in {:?} mode", command, self.mode());
        match command {
            LineCommand::Write => {
                writeln!(term, "\nSaving file...")?;
                self.sync()?;
                writeln!(term, "File saved.")?;
                Ok(Outcome::Continue)
            }
            LineCommand::Quit => {
                writeln!(term, "\nQuitting editor. File contents are saved.")?;
                Ok(Outcome::Quit)
            }
            LineCommand::WriteQuit => {
                writeln!(term, "\nSaving and quitting...")?;
                self.sync()?;
                Ok(Outcome::Quit)
            }
            LineCommand::Insert => {
                self.enter_insert_mode(term, config)?;
                Ok(Outcome::Continue)
            }
            LineCommand::Unknown(text) => Err(ShellError::UnknownCommand(text)),
        }
    }

    pub fn enter_insert_mode<T: Terminal>(&mut self, term: &mut T, config: &Config) -> Result<(), ShellError> {
        self.mode = EditorMode::Insert;
        log::info!("insert mode on {}", self.name);
        writeln!(term, "Entering insert mode. Press ESC to leave insert mode.")?;
        let origin = self.dump_content(term)?;

        let mut buffer = EditBuffer::with_limit(config.max_buffer_len).starting_at(origin);
        {
            let mut raw = RawModeGuard::acquire(term)?;
            loop {
                match input::map_key(raw.read_key()?) {
                    InsertCommand::Exit => break,
                    InsertCommand::Backspace => {
                        if let Some(removed) = buffer.pop() {
                            renderer::erase(&mut *raw, &removed, &buffer)?;
                        }
                    }
                    InsertCommand::InsertChar(c) => match buffer.push(c) {
                        Ok(()) => renderer::echo(&mut *raw, c)?,
                        Err(e) => {
                            log::warn!("{e}");
                            renderer::bell(&mut *raw)?;
                        }
                    },
                    InsertCommand::Unknown => {}
                }
                raw.flush()?;
            }
        }
        self.mode = EditorMode::LineCommand;

        writeln!(term, "\nExiting insert mode.\nSaving file...")?;
        self.append(&buffer)?;
        log::info!("appended {} chars to {}", buffer.len_chars(), self.name);
        Ok(())
    }

    /// Shows the file and returns the column the display cursor ends on.
    fn dump_content<W: Write>(&mut self, out: &mut W) -> Result<usize, ShellError> {
        let mut content = Vec::new();
        self.file
            .seek(SeekFrom::Start(0))
            .and_then(|_| self.file.read_to_end(&mut content))
            .map_err(|e| ShellError::file_access("read", &self.path, e))?;
        renderer::dump(out, &content)?;
        Ok(advance_column(&String::from_utf8_lossy(&content), 0))
    }

    /// Opens a fresh append handle, recreating the file if it vanished. The old
    /// handle is only dropped once the new one is in hand.
    fn reopen(&mut self) -> Result<&mut File, ShellError> {
        let file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(&self.path)
            .map_err(|e| ShellError::file_access("save", &self.path, e))?;
        self.file = file;
        Ok(&mut self.file)
    }

    fn sync(&mut self) -> Result<(), ShellError> {
        let path = self.path.clone();
        self.reopen()?
            .sync_all()
            .map_err(|e| ShellError::file_access("save", path, e))
    }

    fn append(&mut self, buffer: &EditBuffer) -> Result<(), ShellError> {
        let path = self.path.clone();
        let file = self.reopen()?;
        buffer
            .write_to(&mut *file)
            .and_then(|()| file.flush())
            .map_err(|e| ShellError::file_access("save", path, e))
    }
}

fn report<W: Write>(out: &mut W, err: ShellError) -> Result<(), ShellError> {
    log::warn!("{err}");
    writeln!(out, "{err}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminal::testing::ScriptedTerminal;
    use crossterm::event::KeyCode;
    use std::fs;
    use tempfile::tempdir;

    fn open(path: &std::path::Path, term: &mut ScriptedTerminal) -> FileSession {
        FileSession::open("f.txt", path.to_path_buf(), term).unwrap()
    }

    #[test]
    fn parse_line_commands() {
        assert_eq!(LineCommand::parse(":w"), LineCommand::Write);
        assert_eq!(LineCommand::parse(":q"), LineCommand::Quit);
        assert_eq!(LineCommand::parse(":wq"), LineCommand::WriteQuit);
        assert_eq!(LineCommand::parse(":i"), LineCommand::Insert);
        assert_eq!(LineCommand::parse(":x"), LineCommand::Unknown(":x".into()));
        assert_eq!(LineCommand::parse("hello"), LineCommand::Unknown("hello".into()));
        assert_eq!(LineCommand::parse(":w "), LineCommand::Unknown(":w ".into()));
    }

    #[test]
    fn opening_missing_file_creates_it() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("f.txt");
        let mut term = ScriptedTerminal::new();

        let session = open(&path, &mut term);
        assert!(path.is_file());
        assert_eq!(session.mode(), EditorMode::LineCommand);
        let out = term.output_text();
        assert!(out.contains("File not found. Creating a new file: f.txt"));
        assert!(out.contains("File opened: f.txt"));
    }

    #[test]
    fn opening_existing_file_keeps_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("f.txt");
        fs::write(&path, "old text\n").unwrap();
        let mut term = ScriptedTerminal::new();

        let mut session = open(&path, &mut term);
        assert!(!term.output_text().contains("Creating"));

        term.push_key(KeyCode::Esc);
        session.enter_insert_mode(&mut term, &Config::default()).unwrap();
        assert!(term.output_text().contains("old text\n"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "old text\n");
    }

    #[test]
    fn typed_text_is_appended_and_shown_again() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("f.txt");
        let mut term = ScriptedTerminal::new();
        let config = Config::default();

        let mut session = open(&path, &mut term);
        term.type_str("hi");
        term.push_key(KeyCode::Esc);
        session.enter_insert_mode(&mut term, &config).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "hi");
        assert_eq!(session.mode(), EditorMode::LineCommand);
        drop(session);

        let mut term = ScriptedTerminal::new();
        let mut session = open(&path, &mut term);
        term.push_key(KeyCode::Esc);
        session.enter_insert_mode(&mut term, &config).unwrap();
        let out = term.output_text();
        let banner = out.find("Entering insert mode").unwrap();
        assert!(out[banner..].contains("hi"));
    }

    #[test]
    fn backspace_on_empty_buffer_is_noop() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("f.txt");
        let mut term = ScriptedTerminal::new();
        let mut session = open(&path, &mut term);

        term.push_key(KeyCode::Backspace);
        term.push_key(KeyCode::Backspace);
        term.type_str("ab");
        term.push_key(KeyCode::Backspace);
        term.push_key(KeyCode::Esc);
        session.enter_insert_mode(&mut term, &Config::default()).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "a");
        // Only the one real deletion is drawn.
        assert_eq!(term.output_text().matches("\u{8} \u{8}").count(), 1);
    }

    #[test]
    fn backspace_after_tab_returns_to_line_start() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("f.txt");
        let mut term = ScriptedTerminal::new();
        let mut session = open(&path, &mut term);

        term.push_key(KeyCode::Tab);
        term.push_key(KeyCode::Backspace);
        term.push_key(KeyCode::Esc);
        session.enter_insert_mode(&mut term, &Config::default()).unwrap();

        let out = term.output_text();
        assert!(out.contains("\t\u{1b}[1G"));
        assert!(!out.contains("\t\u{8} \u{8}"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn backspace_after_tab_respects_existing_text() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("f.txt");
        fs::write(&path, "line\nabc").unwrap();
        let mut term = ScriptedTerminal::new();
        let mut session = open(&path, &mut term);

        term.push_key(KeyCode::Tab);
        term.push_key(KeyCode::Backspace);
        term.push_key(KeyCode::Esc);
        session.enter_insert_mode(&mut term, &Config::default()).unwrap();

        // Back to column 3, just after "abc".
        assert!(term.output_text().contains("\t\u{1b}[4G"));
    }

    #[test]
    fn enter_inserts_newline() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("f.txt");
        let mut term = ScriptedTerminal::new();
        let mut session = open(&path, &mut term);

        term.type_str("a");
        term.push_key(KeyCode::Enter);
        term.type_str("b");
        term.push_key(KeyCode::Esc);
        session.enter_insert_mode(&mut term, &Config::default()).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "a\nb");
    }

    #[test]
    fn full_buffer_rings_and_drops_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("f.txt");
        let mut term = ScriptedTerminal::new();
        let mut session = open(&path, &mut term);
        let config = Config {
            max_buffer_len: 3,
            ..Config::default()
        };

        term.type_str("abcde");
        term.push_key(KeyCode::Esc);
        session.enter_insert_mode(&mut term, &config).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "abc");
        assert_eq!(term.output_text().matches('\u{7}').count(), 2);
    }

    #[test]
    fn raw_mode_is_scoped_to_insert() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("f.txt");
        let mut term = ScriptedTerminal::new();
        let mut session = open(&path, &mut term);

        term.type_str("x");
        term.push_key(KeyCode::Esc);
        session.enter_insert_mode(&mut term, &Config::default()).unwrap();
        assert!(!term.raw);
        assert_eq!(term.raw_sessions, 1);
    }

    #[test]
    fn raw_mode_restored_when_keys_fail() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("f.txt");
        let mut term = ScriptedTerminal::new();
        let mut session = open(&path, &mut term);

        // No Escape queued: the key source runs dry mid-session.
        term.type_str("lost");
        let err = session
            .enter_insert_mode(&mut term, &Config::default())
            .unwrap_err();
        assert!(err.is_fatal());
        assert!(!term.raw);
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn write_keeps_editing_and_leaves_file_alone() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("f.txt");
        fs::write(&path, "body").unwrap();
        let mut term = ScriptedTerminal::new();
        let mut session = open(&path, &mut term);

        let outcome = session
            .process_command(LineCommand::Write, &mut term, &Config::default())
            .unwrap();
        assert_eq!(outcome, Outcome::Continue);
        assert_eq!(session.mode(), EditorMode::LineCommand);
        assert!(term.output_text().contains("File saved."));
        assert_eq!(fs::read_to_string(&path).unwrap(), "body");
    }

    #[test]
    fn write_recreates_removed_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("f.txt");
        let mut term = ScriptedTerminal::new();
        let mut session = open(&path, &mut term);
        fs::remove_file(&path).unwrap();

        session
            .process_command(LineCommand::Write, &mut term, &Config::default())
            .unwrap();
        assert!(path.is_file());
    }

    #[test]
    fn quit_and_write_quit_end_the_session() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("f.txt");
        let config = Config::default();

        for command in [LineCommand::Quit, LineCommand::WriteQuit] {
            let mut term = ScriptedTerminal::new();
            let mut session = open(&path, &mut term);
            let outcome = session.process_command(command, &mut term, &config).unwrap();
            assert_eq!(outcome, Outcome::Quit);
        }
    }

    #[test]
    fn run_reports_unknown_and_keeps_going() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("f.txt");
        let mut term = ScriptedTerminal::with_lines(&["hello", ":x", ":w", ":q", ":i"]);
        let mut session = open(&path, &mut term);

        let outcome = session.run(&mut term, &Config::default()).unwrap();
        assert_eq!(outcome, Outcome::Quit);
        let out = term.output_text();
        assert!(out.contains("Unknown command: hello"));
        assert!(out.contains("Unknown command: :x"));
        assert!(out.contains("File saved."));
        assert!(out.contains("Quitting editor."));
        // `:i` after `:q` is never read.
        assert_eq!(term.raw_sessions, 0);
    }

    #[test]
    fn run_quits_at_end_of_input() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("f.txt");
        let mut term = ScriptedTerminal::with_lines(&[":w"]);
        let mut session = open(&path, &mut term);
        assert_eq!(
            session.run(&mut term, &Config::default()).unwrap(),
            Outcome::Quit
        );
    }

    #[test]
    fn insert_twice_then_save() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("f.txt");
        let mut term = ScriptedTerminal::with_lines(&[":i", ":i", ":w", ":wq"]);
        let mut session = open(&path, &mut term);
        term.type_str("one");
        term.push_key(KeyCode::Esc);
        term.type_str(" two");
        term.push_key(KeyCode::Esc);

        let outcome = session.run(&mut term, &Config::default()).unwrap();
        assert_eq!(outcome, Outcome::Quit);
        assert_eq!(fs::read_to_string(&path).unwrap(), "one two");
        assert_eq!(term.raw_sessions, 2);
    }
}
