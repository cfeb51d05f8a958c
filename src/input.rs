use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

const ESC: char = '\u{1b}';
const BS: char = '\u{8}';
const DEL: char = '\u{7f}';

#[derive(Debug, PartialEq)]
pub enum InsertCommand {
    InsertChar(char),
    Backspace,
    // Leaves insert mode and saves
    Exit,
    Unknown,
}

pub fn map_key(event: KeyEvent) -> InsertCommand {
    if event.kind != KeyEventKind::Press {
        return InsertCommand::Unknown;
    }

    let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);
    match event.code {
        KeyCode::Esc | KeyCode::Char(ESC) => InsertCommand::Exit,
        KeyCode::Backspace | KeyCode::Char(BS) | KeyCode::Char(DEL) => InsertCommand::Backspace,
        KeyCode::Char('h') if ctrl => InsertCommand::Backspace,
        KeyCode::Char(_) if ctrl => InsertCommand::Unknown,
        KeyCode::Char(c) if c.is_control() => InsertCommand::Unknown,
        KeyCode::Char(c) => InsertCommand::InsertChar(c),
        KeyCode::Enter => InsertCommand::InsertChar('\n'),
        KeyCode::Tab => InsertCommand::InsertChar('\t'),
        _ => InsertCommand::Unknown,
    }
}
