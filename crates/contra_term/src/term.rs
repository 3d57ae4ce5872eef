//! The interpreter: drives a [`contra_parser::SequenceDecoder`] against a
//! [`contra_model::Board`], turning decoded events into grid mutation
//! exactly as `ansi::term_t` does over `ansi::board_t` in the original
//! implementation.

use contra_model::{Board, Cell, Character, TerminalModes};
use contra_parser::{Sequence, SequenceDecoder, SequenceHandler};

/// Unicode bidi formatting characters: LRE/RLE/PDF/LRO/RLO
/// (`U+202A..=U+202E`) and LRI/RLI/FSI/PDI (`U+2066..=U+2069`). These (and
/// any other character `c2w` scores at width 0) are written through
/// [`Term::insert_marker`] rather than [`Term::insert_graph`].
fn is_bidi_format_char(c: char) -> bool {
    matches!(c as u32, 0x202A..=0x202E | 0x2066..=0x2069)
}

/// A saved-cursor snapshot for `DECSC`/`DECRC` (`ESC 7` / `ESC 8`).
#[derive(Debug, Clone, Copy)]
struct SavedCursor {
    x: u16,
    y: u16,
    attr: contra_model::Attribute,
}

/// The terminal interpreter. Owns the grid and the byte-level decoder
/// that feeds it, plus any bytes the interpreter itself wants to write
/// back upstream (device attribute/status replies).
pub struct Term {
    pub board: Board,
    decoder: SequenceDecoder,
    /// Bytes queued by DA/DA2/DSR replies, drained by the PTY session.
    pub pending_output: Vec<u8>,
    saved_cursor: Option<SavedCursor>,
}

impl Term {
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            board: Board::new(width, height),
            decoder: SequenceDecoder::new(),
            pending_output: Vec::new(),
            saved_cursor: None,
        }
    }

    /// Feed a chunk of PTY output through the decoder. Per the
    /// chunking-independence invariant this gives identical results
    /// regardless of how the caller splits reads across calls.
    pub fn write(&mut self, bytes: &[u8]) {
        let mut decoder = std::mem::take(&mut self.decoder);
        decoder.process_buffer(bytes, self);
        self.decoder = decoder;
    }

    /// Flush an in-progress sequence at end of stream.
    pub fn end_of_stream(&mut self) {
        let mut decoder = std::mem::take(&mut self.decoder);
        decoder.process_end(self);
        self.decoder = decoder;
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.board.resize(width, height);
    }

    // ---- graphic character insertion -----------------------------------

    fn insert_graph(&mut self, c: char, width: u8) {
        // A character pending from a previous wrap-eligible write at the
        // line's edge (xenl) lands here now, before this one is placed.
        if self.board.cursor.pending_wrap {
            self.board.cursor.pending_wrap = false;
            self.do_nel();
        }

        let y = self.board.cursor.y;
        self.board.ensure_line_used(y);
        let simd = self.board.tstate.modes.contains(TerminalModes::SIMD);
        let dir: i32 = if simd { -1 } else { 1 };
        let autowrap = self.board.tstate.modes.contains(TerminalModes::DECAWM);

        let (home, limit) = {
            let line = self.board.line(y);
            (line.home, line.limit)
        };
        let (slh, sll) = if simd {
            (i32::from(limit), i32::from(home))
        } else {
            (i32::from(home), i32::from(limit))
        };

        let cur_x = i32::from(self.board.cursor.x);
        let x1 = cur_x + dir * i32::from(width - 1);
        if (x1 - sll) * dir >= 0 && (cur_x - slh) * dir >= 0 {
            self.do_nel();
        }

        let y = self.board.cursor.y;
        let cur_x = i32::from(self.board.cursor.x);
        let x_l = if simd { cur_x - i32::from(width - 1) } else { cur_x };
        let attr = self.board.cursor.attr;
        let cell = Cell {
            ch: Character::from_char(c),
            attr,
            width,
        };
        if self.board.tstate.modes.contains(TerminalModes::IRM) && !simd {
            self.board
                .line_mut(y)
                .insert_chars(x_l.max(0) as usize, usize::from(width), attr);
        }
        self.board
            .line_mut(y)
            .write_cells(x_l.max(0) as usize, &[cell], dir as i8);

        let new_x = cur_x + dir * i32::from(width);
        let last_col = i32::from(self.board.width()) - 1;
        if (new_x - sll) * dir >= 0 {
            if autowrap {
                self.board.cursor.pending_wrap = true;
                self.board.cursor.x = (new_x - dir).clamp(0, last_col) as u16;
            } else {
                self.board.cursor.pending_wrap = false;
                self.board.cursor.x = (new_x - dir).clamp(0, last_col) as u16;
            }
        } else {
            self.board.cursor.pending_wrap = false;
            self.board.cursor.x = new_x.clamp(0, last_col) as u16;
        }
    }

    /// Writes a zero-width bidi marker or combining mark directly at the
    /// cursor's current data column, without advancing the cursor or
    /// shifting the rest of the line. This mirrors `insert_marker`'s
    /// overwrite-in-place behavior from the original implementation; the
    /// same treatment is extended to plain combining marks (any
    /// non-marker character `c2w` scores at width 0) since the original's
    /// `insert_graph` has no real handling for that case beyond an abort.
    fn insert_marker(&mut self, c: char) {
        let y = self.board.cursor.y;
        self.board.ensure_line_used(y);
        let simd = self.board.tstate.modes.contains(TerminalModes::SIMD);
        let dir: i8 = if simd { -1 } else { 1 };
        let attr = self.board.cursor.attr;
        let ch = if is_bidi_format_char(c) {
            Character::marker(c)
        } else {
            Character::cluster_extension(c)
        };
        let cell = Cell { ch, attr, width: 0 };
        let x = self.board.cursor.x;
        self.board.line_mut(y).write_cells(x as usize, &[cell], dir);
    }

    // ---- control characters --------------------------------------------

    fn do_bel(&mut self) {
        // Ringing the bell has no grid effect; a front end observes it via
        // its own side channel (not modeled here).
    }

    fn do_bs(&mut self) {
        let modes = self.board.tstate.modes;
        if modes.contains(TerminalModes::SIMD) {
            let mut limit = self.board.width();
            if !modes.contains(TerminalModes::XENL) {
                limit -= 1;
            }
            if self.board.cursor.x < limit {
                self.board.cursor.x += 1;
            }
        } else if self.board.cursor.x > 0 {
            self.board.cursor.x -= 1;
        }
    }

    fn do_ht(&mut self) {
        let y = self.board.cursor.y;
        self.board.ensure_line_used(y);
        let x = self.board.cursor.x;
        let width = self.board.width();
        let xdst = self.board.tstate.next_tab_stop(x, width);
        let count = xdst.saturating_sub(x);
        if count > 0 {
            let attr = self.board.cursor.attr;
            let fills = vec![Cell { ch: Character::NUL, attr, width: 1 }; count as usize];
            self.board.line_mut(y).write_cells(x as usize, &fills, 1);
            self.board.cursor.x = xdst;
        }
    }

    pub(crate) fn do_cr(&mut self) {
        let y = self.board.cursor.y;
        self.board.ensure_line_used(y);
        let simd = self.board.tstate.modes.contains(TerminalModes::SIMD);
        let (home, limit) = {
            let line = self.board.line(y);
            (line.home, line.limit)
        };
        let mut x = if simd { limit } else { home };
        if !self.board.tstate.modes.contains(TerminalModes::DCSM_PRESENTATION) {
            x = self.board.line(y).to_data_position(x);
        }
        self.board.cursor.x = x;
        self.board.cursor.pending_wrap = false;
    }

    /// Shared vertical-motion primitive for IND/RI/LF/VT/FF: moves the
    /// cursor `delta` rows, rotating the ring to append/retire rows when
    /// it would run off either edge (only when `to_append_newline`), and
    /// optionally round-tripping `cur.x` through the outgoing/incoming
    /// line's presentation position so a column position made under
    /// `DCSM=PRESENTATION` on an RTL line still lands on the same glyph.
    fn do_generic_ff(&mut self, delta: i32, to_append_newline: bool, to_adjust_x: bool) {
        if delta == 0 {
            return;
        }
        let y0 = self.board.cursor.y;
        let mut x = self.board.cursor.x;
        if to_adjust_x {
            x = self.board.line(y0).to_presentation_position(x);
        }

        let height = i32::from(self.board.height());
        if delta > 0 {
            if i32::from(y0) + delta < height {
                self.board.cursor.y = (i32::from(y0) + delta) as u16;
            } else {
                let overflow = delta - (height - 1 - i32::from(y0));
                self.board.cursor.y = (height - 1) as u16;
                if to_append_newline {
                    self.board.rotate(overflow);
                }
            }
        } else if i32::from(y0) + delta >= 0 {
            self.board.cursor.y = (i32::from(y0) + delta) as u16;
        } else {
            let underflow = delta + i32::from(y0);
            self.board.cursor.y = 0;
            if to_append_newline {
                self.board.rotate(underflow);
            }
        }

        let y1 = self.board.cursor.y;
        self.board.ensure_line_used(y1);
        self.board.cursor.x = if to_adjust_x {
            self.board.line(y1).to_data_position(x)
        } else {
            x
        };
    }

    fn do_ind(&mut self) {
        let adjust = !self.board.tstate.modes.contains(TerminalModes::DCSM_PRESENTATION);
        self.do_generic_ff(1, true, adjust);
    }

    fn do_ri(&mut self) {
        let adjust = !self.board.tstate.modes.contains(TerminalModes::DCSM_PRESENTATION);
        self.do_generic_ff(-1, true, adjust);
    }

    fn do_lf(&mut self) {
        let to_call_cr = self.board.tstate.modes.contains(TerminalModes::LNM);
        let dcsm = self.board.tstate.modes.contains(TerminalModes::DCSM_PRESENTATION);
        self.do_generic_ff(1, true, !to_call_cr && !dcsm);
        if to_call_cr {
            self.do_cr();
        }
    }

    fn do_vt(&mut self) {
        let modes = self.board.tstate.modes;
        let to_call_cr =
            modes.contains(TerminalModes::VT_AFFECTED_BY_LNM) && modes.contains(TerminalModes::LNM);
        let append = modes.contains(TerminalModes::VT_APPENDING_NEWLINE);
        self.do_generic_ff(1, append, !to_call_cr);
        if to_call_cr {
            self.do_cr();
        }
    }

    fn do_ff(&mut self) {
        let modes = self.board.tstate.modes;
        let to_call_cr =
            modes.contains(TerminalModes::FF_AFFECTED_BY_LNM) && modes.contains(TerminalModes::LNM);

        if modes.contains(TerminalModes::FF_CLEARING_SCREEN) {
            if modes.contains(TerminalModes::FF_USING_PAGE_HOME) {
                let y = self.board.cursor.y;
                let mut x = self.board.cursor.x;
                if !to_call_cr {
                    x = self.board.line(y).to_presentation_position(x);
                }
                let attr = self.board.cursor.attr;
                self.board.clear_all();
                self.board.cursor.attr = attr;
                let new_y = self.board.tstate.page_home;
                if !to_call_cr {
                    x = self.board.line(new_y).to_data_position(x);
                }
                self.board.cursor.x = x;
                self.board.cursor.y = new_y;
            } else {
                let attr = self.board.cursor.attr;
                self.board.clear_all();
                self.board.cursor.attr = attr;
            }
        } else {
            self.do_generic_ff(1, true, !to_call_cr);
        }

        if to_call_cr {
            self.do_cr();
        }
    }

    pub(crate) fn do_nel(&mut self) {
        // LF's line home/limit only take effect on the destination row,
        // so CR must run after LF lands the cursor on the new line.
        self.do_lf();
        self.do_cr();
    }

    fn do_hts(&mut self) {
        let x = self.board.cursor.x;
        self.board.tstate.set_tab_stop(x);
    }

    fn do_ris(&mut self) {
        let (w, h) = (self.board.width(), self.board.height());
        self.board = Board::new(w, h);
        self.saved_cursor = None;
    }

    fn do_decsc(&mut self) {
        self.saved_cursor = Some(SavedCursor {
            x: self.board.cursor.x,
            y: self.board.cursor.y,
            attr: self.board.cursor.attr,
        });
    }

    fn do_decrc(&mut self) {
        if let Some(saved) = self.saved_cursor {
            self.board.cursor.x = saved.x.min(self.board.width().saturating_sub(1));
            self.board.cursor.y = saved.y.min(self.board.height().saturating_sub(1));
            self.board.cursor.attr = saved.attr;
            self.board.cursor.pending_wrap = false;
        }
    }

    /// `ESC # 8`: fill the whole screen with `E`, for margin/alignment
    /// testing.
    fn do_decaln(&mut self) {
        let (w, h) = (self.board.width(), self.board.height());
        for y in 0..h {
            let line = self.board.ensure_line_used(y);
            let cells = vec![Cell::printable('E', contra_model::Attribute::default()); w as usize];
            line.write_cells(0, &cells, 1);
        }
    }
}

impl SequenceHandler for Term {
    fn insert_char(&mut self, c: char) {
        let w = contra_encoding::c2w(c);
        if w <= 0 || is_bidi_format_char(c) {
            self.insert_marker(c);
        } else {
            self.insert_graph(c, w as u8);
        }
    }

    fn control_character(&mut self, byte: u8) {
        match byte {
            0x07 => self.do_bel(),
            0x08 => self.do_bs(),
            0x09 => self.do_ht(),
            0x0A => self.do_lf(),
            0x0B => self.do_vt(),
            0x0C => self.do_ff(),
            0x0D => self.do_cr(),
            0x84 => self.do_ind(),
            0x85 => self.do_nel(),
            0x88 => self.do_hts(),
            0x8D => self.do_ri(),
            _ => tracing::debug!(byte, "unhandled control character"),
        }
    }

    fn escape_sequence(&mut self, seq: &Sequence) {
        if seq.intermediates.as_slice() == [b'#'] && seq.final_byte == b'8' {
            self.do_decaln();
            return;
        }
        match seq.final_byte {
            b'7' => self.do_decsc(),
            b'8' => self.do_decrc(),
            b'c' => self.do_ris(),
            b'D' => self.do_ind(),
            b'E' => self.do_nel(),
            b'H' => self.do_hts(),
            b'M' => self.do_ri(),
            _ => tracing::debug!(final_byte = seq.final_byte, "unrecognized escape sequence"),
        }
    }

    fn control_sequence(&mut self, seq: &Sequence) {
        crate::csi::dispatch(self, seq);
    }

    fn command_string(&mut self, seq: &Sequence) {
        tracing::debug!(kind = ?seq.kind, "unhandled command string");
    }

    fn character_string(&mut self, seq: &Sequence) {
        tracing::debug!(kind = ?seq.kind, "unhandled character string");
    }

    fn invalid_sequence(&mut self, seq: &Sequence) {
        tracing::debug!(kind = ?seq.kind, "invalid sequence dropped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(term: &Term, y: u16) -> String {
        term.board
            .line(y)
            .cells()
            .iter()
            .map(|c| c.ch.code_point())
            .collect()
    }

    #[test]
    fn plain_text_advances_cursor() {
        let mut term = Term::new(10, 3);
        term.write(b"abc");
        assert_eq!(&text_of(&term, 0)[..3], "abc");
        assert_eq!(term.board.cursor.x, 3);
        assert_eq!(term.board.cursor.y, 0);
    }

    #[test]
    fn lf_moves_down_and_cr_resets_column_and_lnm_combines_them() {
        let mut term = Term::new(10, 3);
        term.write(b"ab\r\ncd");
        assert_eq!(&text_of(&term, 0)[..2], "ab");
        assert_eq!(&text_of(&term, 1)[..2], "cd");
        assert_eq!(term.board.cursor.y, 1);
        assert_eq!(term.board.cursor.x, 2);
    }

    #[test]
    fn autowrap_at_line_end_moves_to_next_row() {
        let mut term = Term::new(4, 3);
        term.write(b"abcd");
        // "abcd" fills row 0 exactly; xenl permits the cursor to rest at
        // the pending-wrap column without actually wrapping yet.
        assert_eq!(term.board.cursor.y, 0);
        term.write(b"e");
        assert_eq!(term.board.cursor.y, 1);
        assert_eq!(&text_of(&term, 1)[..1], "e");
    }

    #[test]
    fn tab_advances_to_next_stop_and_fills_with_nul() {
        let mut term = Term::new(20, 1);
        term.write(b"a\t");
        assert_eq!(term.board.cursor.x, 8);
    }

    #[test]
    fn backspace_moves_left_but_not_past_column_zero() {
        let mut term = Term::new(10, 1);
        term.write(b"ab\x08\x08\x08");
        assert_eq!(term.board.cursor.x, 0);
    }

    #[test]
    fn csi_cup_moves_cursor_to_one_based_position() {
        let mut term = Term::new(10, 10);
        term.write(b"\x1b[3;5H");
        assert_eq!(term.board.cursor.y, 2);
        assert_eq!(term.board.cursor.x, 4);
    }

    #[test]
    fn sgr_bold_sets_attribute_flag() {
        let mut term = Term::new(10, 1);
        term.write(b"\x1b[1mA");
        assert!(term.board.line(0).cells()[0]
            .attr
            .aflags
            .contains(contra_model::AttributeFlags::BOLD));
    }

    #[test]
    fn dch_deletes_and_pads_end_of_line() {
        let mut term = Term::new(10, 1);
        term.write(b"0123456789\x1b[H\x1b[2C\x1b[3P");
        assert_eq!(text_of(&term, 0), "0156789\0\0\0");
    }

    #[test]
    fn ich_shifts_right_and_drops_overflow() {
        let mut term = Term::new(5, 1);
        term.write(b"abcde\x1b[H\x1b[2@");
        assert_eq!(text_of(&term, 0), "\0\0abc");
    }

    #[test]
    fn decstbm_sets_scroll_region_and_homes_cursor() {
        let mut term = Term::new(10, 24);
        term.write(b"\x1b[5;10r");
        assert_eq!(term.board.tstate.page_home, 4);
        assert_eq!(term.board.tstate.page_limit, 10);
        assert_eq!(term.board.cursor.y, 4);
    }

    #[test]
    fn decset_hides_cursor() {
        let mut term = Term::new(10, 3);
        term.write(b"\x1b[?25l");
        assert!(!term
            .board
            .tstate
            .modes
            .contains(contra_model::TerminalModes::DECTCEM));
        term.write(b"\x1b[?25h");
        assert!(term
            .board
            .tstate
            .modes
            .contains(contra_model::TerminalModes::DECTCEM));
    }

    #[test]
    fn dsr_cursor_position_report_is_queued_as_pending_output() {
        let mut term = Term::new(10, 10);
        term.write(b"\x1b[4;6H\x1b[6n");
        assert_eq!(term.pending_output, b"\x1b[5;6R");
    }

    #[test]
    fn ris_resets_board_to_blank() {
        let mut term = Term::new(5, 2);
        term.write(b"hello\x1bc");
        assert_eq!(text_of(&term, 0), "\0\0\0\0\0");
        assert_eq!(term.board.cursor.x, 0);
    }

    #[test]
    fn decsc_decrc_round_trip_cursor_position() {
        let mut term = Term::new(10, 10);
        term.write(b"\x1b[5;5H\x1b7");
        term.write(b"\x1b[1;1H\x1b8");
        assert_eq!(term.board.cursor.y, 4);
        assert_eq!(term.board.cursor.x, 4);
    }

    #[test]
    fn irm_shifts_existing_content_right_instead_of_overwriting() {
        let mut term = Term::new(10, 1);
        term.write(b"abcde\x1b[H\x1b[4h");
        term.write(b"X");
        assert_eq!(&text_of(&term, 0)[..6], "Xabcde");
    }

    #[test]
    fn sds_reverses_presentation_order_of_inner_run() {
        let mut term = Term::new(10, 1);
        // Open an RTL directed string at the cursor's current column
        // (0), write "cdef" inside it, then close it.
        term.write(b"ab\x1b[2]cdef\x1b[0]gh");
        let line = term.board.line(0);
        // Data order is unaffected: "ab" + "cdef" + "gh".
        assert_eq!(text_of(&term, 0), "abcdefgh\0\0");
        // But "cdef" (data columns 2..6) reads "fedc" in presentation
        // order, matching the directed-string table's own unit test.
        assert_eq!(line.to_presentation_position(2), 5);
        assert_eq!(line.to_presentation_position(5), 2);
    }
}

