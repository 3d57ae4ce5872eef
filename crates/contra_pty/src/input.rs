//! The inverse of a terminal-input decoder: encoders that turn typed key
//! and mouse events back into the wire bytes a real terminal would have
//! sent, grounded on `vtinput`'s keyboard/mouse vocabulary but scoped to
//! what §6's input-device contract names (`input_key`, `input_mouse`).

use bitflags::bitflags;
use smallvec::SmallVec;

bitflags! {
    #[derive(Debug, PartialOrd, PartialEq, Eq, Clone, Copy, Hash)]
    pub struct KeyModifiers: u8 {
        const NONE = 0b0000_0000;
        const SHIFT = 0b0000_0001;
        const CONTROL = 0b0000_0010;
        const ALT = 0b0000_0100;
        const SUPER = 0b0000_1000;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    Backspace,
    Enter,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
    Tab,
    BackTab,
    Delete,
    Insert,
    F(u8),
    Char(char),
    Esc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyEvent {
    #[must_use]
    pub const fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseEventKind {
    Down(MouseButton),
    Up(MouseButton),
    Drag(MouseButton),
    Moved,
    ScrollUp,
    ScrollDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseEvent {
    pub kind: MouseEventKind,
    pub modifiers: KeyModifiers,
}

/// Encode `ESC [ <final>` for a cursor key, applying the xterm modifier
/// convention (`CSI 1 ; <mods+1> <final>`) when any modifier beyond shift
/// is held, matching how real terminals distinguish e.g. `Alt+Left`.
fn push_csi_cursor(out: &mut SmallVec<[u8; 8]>, final_byte: u8, modifiers: KeyModifiers) {
    out.push(0x1B);
    out.push(b'[');
    if modifiers.is_empty() {
        out.push(final_byte);
        return;
    }
    let code = 1 + modifiers.bits();
    out.push(b'1');
    out.push(b';');
    for b in code.to_string().bytes() {
        out.push(b);
    }
    out.push(final_byte);
}

fn push_tilde(out: &mut SmallVec<[u8; 8]>, n: u32, modifiers: KeyModifiers) {
    out.push(0x1B);
    out.push(b'[');
    for b in n.to_string().bytes() {
        out.push(b);
    }
    if !modifiers.is_empty() {
        out.push(b';');
        for b in (1 + modifiers.bits()).to_string().bytes() {
            out.push(b);
        }
    }
    out.push(b'~');
}

/// Encode a single key event into the bytes a terminal emulator's PTY
/// input side would have produced.
#[must_use]
pub fn input_key(event: KeyEvent) -> SmallVec<[u8; 8]> {
    let mut out = SmallVec::new();
    let alt = event.modifiers.contains(KeyModifiers::ALT);
    if alt {
        out.push(0x1B);
    }
    match event.code {
        KeyCode::Char(c) => {
            if event.modifiers.contains(KeyModifiers::CONTROL) {
                let upper = c.to_ascii_uppercase();
                if upper.is_ascii_alphabetic() {
                    out.push((upper as u8) & 0x1F);
                    return out;
                }
            }
            let mut buf = [0u8; 4];
            out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
        }
        KeyCode::Enter => out.push(b'\r'),
        KeyCode::Backspace => out.push(0x7F),
        KeyCode::Tab => out.push(b'\t'),
        KeyCode::BackTab => {
            out.push(0x1B);
            out.extend_from_slice(b"[Z");
        }
        KeyCode::Esc => out.push(0x1B),
        KeyCode::Left => push_csi_cursor(&mut out, b'D', event.modifiers),
        KeyCode::Right => push_csi_cursor(&mut out, b'C', event.modifiers),
        KeyCode::Up => push_csi_cursor(&mut out, b'A', event.modifiers),
        KeyCode::Down => push_csi_cursor(&mut out, b'B', event.modifiers),
        KeyCode::Home => push_csi_cursor(&mut out, b'H', event.modifiers),
        KeyCode::End => push_csi_cursor(&mut out, b'F', event.modifiers),
        KeyCode::PageUp => push_tilde(&mut out, 5, event.modifiers),
        KeyCode::PageDown => push_tilde(&mut out, 6, event.modifiers),
        KeyCode::Insert => push_tilde(&mut out, 2, event.modifiers),
        KeyCode::Delete => push_tilde(&mut out, 3, event.modifiers),
        KeyCode::F(n @ 1..=4) => {
            out.push(0x1B);
            out.push(b'O');
            out.push(b'P' + (n - 1));
        }
        KeyCode::F(n) => {
            let code = match n {
                5 => 15,
                6 => 17,
                7 => 18,
                8 => 19,
                9 => 20,
                10 => 21,
                11 => 23,
                12 => 24,
                _ => 24,
            };
            push_tilde(&mut out, code, KeyModifiers::NONE);
        }
    }
    out
}

/// Encode a mouse event as an SGR-protocol (`CSI < ... M`/`m`) mouse
/// report, the form preferred by modern terminals because it is not
/// limited to 223 columns/rows.
#[must_use]
pub fn input_mouse(event: MouseEvent, x: u16, y: u16) -> SmallVec<[u8; 16]> {
    let mut out = SmallVec::new();
    let (mut code, release) = match event.kind {
        MouseEventKind::Down(b) => (button_code(b), false),
        MouseEventKind::Up(b) => (button_code(b), true),
        MouseEventKind::Drag(b) => (button_code(b) + 32, false),
        MouseEventKind::Moved => (35, false),
        MouseEventKind::ScrollUp => (64, false),
        MouseEventKind::ScrollDown => (65, false),
    };
    if event.modifiers.contains(KeyModifiers::SHIFT) {
        code += 4;
    }
    if event.modifiers.contains(KeyModifiers::ALT) {
        code += 8;
    }
    if event.modifiers.contains(KeyModifiers::CONTROL) {
        code += 16;
    }
    out.push(0x1B);
    out.extend_from_slice(b"[<");
    for b in code.to_string().bytes() {
        out.push(b);
    }
    out.push(b';');
    for b in (x + 1).to_string().bytes() {
        out.push(b);
    }
    out.push(b';');
    for b in (y + 1).to_string().bytes() {
        out.push(b);
    }
    out.push(if release { b'm' } else { b'M' });
    out
}

fn button_code(b: MouseButton) -> u32 {
    match b {
        MouseButton::Left => 0,
        MouseButton::Middle => 1,
        MouseButton::Right => 2,
    }
}
