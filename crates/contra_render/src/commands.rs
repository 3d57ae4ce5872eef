//! Outgoing ANSI command primitives.
//!
//! Small `Encode`-implementing structs, one per operation, generalized
//! from the cursor/clear/screen/mode command groups of a typical ANSI
//! command-encoding crate: each type owns just the parameters for one
//! control sequence and writes itself into a byte buffer on demand.

use smallvec::SmallVec;

/// A single SGR parameter: either a bare code or a colon-joined
/// sub-parameter group (`38:2:r:g:b`), matching the two shapes
/// `contra_term::sgr` accepts on the way in.
#[derive(Debug, Clone)]
pub enum SgrParam {
    Single(u16),
    Group(SmallVec<[u16; 5]>),
}

pub trait Encode {
    fn encode(&self, out: &mut Vec<u8>);
}

fn write_csi_n(out: &mut Vec<u8>, n: u16, final_byte: u8) {
    out.extend_from_slice(b"\x1b[");
    if n != 1 {
        let mut buf = itoa::Buffer::new();
        out.extend_from_slice(buf.format(n).as_bytes());
    }
    out.push(final_byte);
}

pub struct MoveTo {
    pub row: u16,
    pub col: u16,
}

impl Encode for MoveTo {
    fn encode(&self, out: &mut Vec<u8>) {
        let mut buf = itoa::Buffer::new();
        out.extend_from_slice(b"\x1b[");
        out.extend_from_slice(buf.format(self.row + 1).as_bytes());
        out.push(b';');
        out.extend_from_slice(buf.format(self.col + 1).as_bytes());
        out.push(b'H');
    }
}

pub struct MoveUp(pub u16);
pub struct MoveDown(pub u16);
pub struct MoveLeft(pub u16);
pub struct MoveRight(pub u16);

impl Encode for MoveUp {
    fn encode(&self, out: &mut Vec<u8>) {
        write_csi_n(out, self.0, b'A');
    }
}
impl Encode for MoveDown {
    fn encode(&self, out: &mut Vec<u8>) {
        write_csi_n(out, self.0, b'B');
    }
}
impl Encode for MoveRight {
    fn encode(&self, out: &mut Vec<u8>) {
        write_csi_n(out, self.0, b'C');
    }
}
impl Encode for MoveLeft {
    fn encode(&self, out: &mut Vec<u8>) {
        write_csi_n(out, self.0, b'D');
    }
}

pub struct InsertLine(pub u16);
pub struct DeleteLine(pub u16);
pub struct InsertChar(pub u16);
pub struct DeleteChar(pub u16);
pub struct EraseChars(pub u16);

impl Encode for InsertLine {
    fn encode(&self, out: &mut Vec<u8>) {
        write_csi_n(out, self.0, b'L');
    }
}
impl Encode for DeleteLine {
    fn encode(&self, out: &mut Vec<u8>) {
        write_csi_n(out, self.0, b'M');
    }
}
impl Encode for InsertChar {
    fn encode(&self, out: &mut Vec<u8>) {
        write_csi_n(out, self.0, b'@');
    }
}
impl Encode for DeleteChar {
    fn encode(&self, out: &mut Vec<u8>) {
        write_csi_n(out, self.0, b'P');
    }
}
impl Encode for EraseChars {
    fn encode(&self, out: &mut Vec<u8>) {
        write_csi_n(out, self.0, b'X');
    }
}

pub struct ShowCursor;
pub struct HideCursor;

impl Encode for ShowCursor {
    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(b"\x1b[?25h");
    }
}
impl Encode for HideCursor {
    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(b"\x1b[?25l");
    }
}

/// `CSI Ps J`, erase in display.
pub enum ClearScreen {
    ToEnd,
    ToStart,
    All,
}

impl Encode for ClearScreen {
    fn encode(&self, out: &mut Vec<u8>) {
        let ps = match self {
            ClearScreen::ToEnd => b'0',
            ClearScreen::ToStart => b'1',
            ClearScreen::All => b'2',
        };
        out.extend_from_slice(b"\x1b[");
        out.push(ps);
        out.push(b'J');
    }
}

pub struct SetGraphicsRendition(pub Vec<SgrParam>);

impl Encode for SetGraphicsRendition {
    fn encode(&self, out: &mut Vec<u8>) {
        if self.0.is_empty() {
            return;
        }
        out.extend_from_slice(b"\x1b[");
        let mut buf = itoa::Buffer::new();
        for (i, param) in self.0.iter().enumerate() {
            if i > 0 {
                out.push(b';');
            }
            match param {
                SgrParam::Single(n) => out.extend_from_slice(buf.format(*n).as_bytes()),
                SgrParam::Group(values) => {
                    for (j, v) in values.iter().enumerate() {
                        if j > 0 {
                            out.push(b':');
                        }
                        out.extend_from_slice(buf.format(*v).as_bytes());
                    }
                }
            }
        }
        out.push(b'm');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_to_is_one_indexed() {
        let mut out = Vec::new();
        MoveTo { row: 0, col: 0 }.encode(&mut out);
        assert_eq!(out, b"\x1b[1;1H");
    }

    #[test]
    fn move_up_omits_count_of_one() {
        let mut out = Vec::new();
        MoveUp(1).encode(&mut out);
        assert_eq!(out, b"\x1b[A");
        out.clear();
        MoveUp(3).encode(&mut out);
        assert_eq!(out, b"\x1b[3A");
    }

    #[test]
    fn sgr_mixes_single_and_grouped_params() {
        let mut out = Vec::new();
        SetGraphicsRendition(vec![
            SgrParam::Single(1),
            SgrParam::Group(SmallVec::from_slice(&[38, 2, 10, 20, 30])),
        ])
        .encode(&mut out);
        assert_eq!(out, b"\x1b[1;38:2:10:20:30m");
    }
}
