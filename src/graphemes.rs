use ropey::{Rope, RopeSlice};
use unicode_segmentation::{GraphemeCursor, GraphemeIncomplete, UnicodeSegmentation};
use unicode_width::UnicodeWidthStr;

pub const TAB_STOP: usize = 8;

/// Previous grapheme boundary (absolute *byte* index) before `from_byte`.
/// Walks Ropey chunks backwards as the cursor asks for them.
fn prev_grapheme_byte(text: &Rope, from_byte: usize) -> usize {
    let mut cursor = GraphemeCursor::new(from_byte, text.len_bytes(), true);
    let (mut chunk, mut chunk_start, _, _) = text.chunk_at_byte(from_byte);

    loop {
        match cursor.prev_boundary(chunk, chunk_start) {
            Ok(Some(b)) => return b,
            Ok(None) => return 0,
            Err(GraphemeIncomplete::PrevChunk) => {
                let (c, start, _, _) = text.chunk_at_byte(chunk_start - 1);
                chunk = c;
                chunk_start = start;
            }
            Err(GraphemeIncomplete::PreContext(end)) => {
                let (c, start, _, _) = text.chunk_at_byte(end - 1);
                cursor.provide_context(&c[..end - start], start);
            }
            Err(_) => {
                // Not expected when walking backwards; fall back to one char.
                let ci = text.byte_to_char(from_byte);
                return text.char_to_byte(ci.saturating_sub(1));
            }
        }
    }
}

/// Absolute *char* index where the last grapheme cluster of `text` begins.
/// Returns 0 for an empty rope.
pub fn last_grapheme_start(text: &Rope) -> usize {
    let len = text.len_bytes();
    if len == 0 {
        return 0;
    }
    text.byte_to_char(prev_grapheme_byte(text, len))
}

/// Terminal column reached after printing `text` starting at column `col`.
/// Tabs jump to the next stop; wide clusters take two columns.
pub fn advance_column(text: &str, mut col: usize) -> usize {
    for g in UnicodeSegmentation::graphemes(text, true) {
        col = match g {
            "\t" => (col / TAB_STOP + 1) * TAB_STOP,
            "\n" | "\r\n" | "\r" => 0,
            g => col + g.width(),
        };
    }
    col
}

/// Column the cursor sits at after echoing `text`, when the first line of
/// `text` was started at column `origin`.
pub fn trailing_line_width(text: RopeSlice, origin: usize) -> usize {
    let last = text.len_lines().saturating_sub(1);
    let start = if last == 0 { origin } else { 0 };
    advance_column(&text.line(last).to_string(), start)
}
