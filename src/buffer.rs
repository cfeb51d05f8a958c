use crate::error::ShellError;
use crate::graphemes::{last_grapheme_start, trailing_line_width};
use ropey::Rope;
use std::io::{self, Write};

/// Keystrokes collected during one insert-mode session. Only ever grows or
/// shrinks at the end.
#[derive(Clone, Debug)]
pub struct EditBuffer {
    text: Rope,
    limit: usize,
    // Column the first typed character lands on.
    origin: usize,
}

impl EditBuffer {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            text: Rope::new(),
            limit,
            origin: 0,
        }
    }

    pub fn starting_at(mut self, column: usize) -> Self {
        self.origin = column;
        self
    }

    #[inline]
    pub fn len_chars(&self) -> usize {
        self.text.len_chars()
    }

    pub fn push(&mut self, c: char) -> Result<(), ShellError> {
        let end = self.text.len_chars();
        if end >= self.limit {
            return Err(ShellError::BufferFull { limit: self.limit });
        }
        self.text.insert_char(end, c);
        Ok(())
    }

    /// Removes the last grapheme cluster and hands it back, `None` when empty.
    pub fn pop(&mut self) -> Option<String> {
        let end = self.text.len_chars();
        if end == 0 {
            return None;
        }
        let start = last_grapheme_start(&self.text);
        let removed = self.text.slice(start..end).to_string();
        self.text.remove(start..end);
        Some(removed)
    }

    /// Cursor column after echoing the whole buffer.
    pub fn trailing_line_width(&self) -> usize {
        trailing_line_width(self.text.slice(..), self.origin)
    }

    pub fn write_to<W: Write>(&self, writer: W) -> io::Result<()> {
        self.text.write_to(writer)
    }
}
