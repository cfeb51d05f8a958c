use crate::buffer::EditBuffer;
use crate::graphemes::advance_column;
use crossterm::terminal::{Clear, ClearType};
use crossterm::{cursor, execute, queue};
use std::io::{Result, Write};

pub fn clear_screen<W: Write>(out: &mut W) -> Result<()> {
    execute!(out, Clear(ClearType::All), cursor::MoveTo(0, 0))
}

/// Echo one typed character. Raw mode turns off output post-processing, so a
/// bare `\n` would not return the carriage.
pub fn echo<W: Write>(out: &mut W, c: char) -> Result<()> {
    match c {
        '\n' => write!(out, "\r\n"),
        c => write!(out, "{c}"),
    }
}

/// Undo the echo of `removed`, with `remaining` being the buffer after removal.
pub fn erase<W: Write>(out: &mut W, removed: &str, remaining: &EditBuffer) -> Result<()> {
    let col = u16::try_from(remaining.trailing_line_width()).unwrap_or(u16::MAX);
    if removed.ends_with('\n') || removed.ends_with('\r') {
        queue!(
            out,
            cursor::MoveUp(1),
            cursor::MoveToColumn(col),
            Clear(ClearType::UntilNewLine)
        )
    } else if advance_column(removed, 0) == 1 {
        write!(out, "\u{8} \u{8}")
    } else {
        // Tabs and wide clusters span several columns.
        queue!(out, cursor::MoveToColumn(col), Clear(ClearType::UntilNewLine))
    }
}

pub fn bell<W: Write>(out: &mut W) -> Result<()> {
    write!(out, "\u{7}")
}

/// Dump file content as-is, so typing continues right where the file ends.
pub fn dump<W: Write>(out: &mut W, content: &[u8]) -> Result<()> {
    out.write_all(content)?;
    out.flush()
}
