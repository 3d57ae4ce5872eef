//! The differential renderer itself.
//!
//! Grounded on `tty_observer`: cache the last frame's content per row
//! (`screen_buffer`), detect scrolling by matching row identity rather
//! than content, diff each changed row against its cache entry, and
//! reconcile the remote cursor and DECTCEM state last.

use contra_encoding::{ByteSink, encode_utf8_into};
use contra_model::{Attribute, Cell};

use crate::commands::{
    ClearScreen, DeleteChar, DeleteLine, Encode, HideCursor, InsertChar, InsertLine, MoveTo,
    SetGraphicsRendition, ShowCursor,
};
use crate::sgr_diff::{apply_default_attribute, diff_sgr};
use crate::termcap::TermcapSgrType;
use crate::view::TermView;

#[derive(Debug, Clone)]
struct LineBuffer {
    id: u64,
    version: u64,
    content: Vec<Cell>,
}

impl LineBuffer {
    fn invalid() -> Self {
        Self {
            id: u64::MAX,
            version: u64::MAX,
            content: Vec::new(),
        }
    }
}

pub struct DifferentialRenderer {
    screen_buffer: Vec<LineBuffer>,
    cap: TermcapSgrType,
    remote_attr: Attribute,
    remote_cursor: (u16, u16),
    remote_dectcem: bool,
    remote_reverse: bool,
    /// Whether the rendered page's bottom row is also the physical
    /// terminal's last row. When true, a scroll's `DL` pass alone
    /// reveals the right blank space and the compensating `IL` pass at
    /// the far edge can be skipped.
    pub is_terminal_bottom: bool,
}

impl DifferentialRenderer {
    #[must_use]
    pub fn new(cap: TermcapSgrType) -> Self {
        Self {
            screen_buffer: Vec::new(),
            cap,
            remote_attr: Attribute::default(),
            remote_cursor: (0, 0),
            remote_dectcem: true,
            remote_reverse: false,
            is_terminal_bottom: true,
        }
    }

    pub fn update(&mut self, view: &dyn TermView, out: &mut dyn ByteSink) {
        let mut buf = Vec::new();
        let height = view.height();

        if self.screen_buffer.len() != height as usize {
            tracing::debug!(
                old = self.screen_buffer.len(),
                new = height,
                "view height changed, forcing full redraw"
            );
            self.screen_buffer = (0..height).map(|_| LineBuffer::invalid()).collect();
            self.remote_attr = Attribute::default();
            ClearScreen::All.encode(&mut buf);
            MoveTo { row: 0, col: 0 }.encode(&mut buf);
        }

        if view.reverse_video() != self.remote_reverse {
            self.remote_reverse = view.reverse_video();
            buf.extend_from_slice(if self.remote_reverse {
                b"\x1b[?5h"
            } else {
                b"\x1b[?5l"
            });
        }

        if self.rows_changed(view) {
            self.trace_line_scroll(view, &mut buf);
            self.render_content(view, &mut buf);
        }

        self.reconcile_cursor(view, &mut buf);

        if !buf.is_empty() {
            out.write(&buf);
        }
    }

    fn rows_changed(&self, view: &dyn TermView) -> bool {
        (0..view.height()).any(|row| {
            let cached = &self.screen_buffer[row as usize];
            cached.id != view.line_id(row) || cached.version != view.line_version(row)
        })
    }

    /// Detect a uniform whole-page scroll by finding the smallest `delta`
    /// for which the cached row ids, shifted by `delta`, exactly match
    /// the view's current row ids over their overlap. When found, emit a
    /// `DL`-then-`IL` pass instead of redrawing every shifted row, then
    /// reorder `screen_buffer` in place to match so the content-diff
    /// pass below only has to touch the rows that actually changed.
    fn trace_line_scroll(&mut self, view: &dyn TermView, buf: &mut Vec<u8>) {
        let height = view.height();
        if height == 0 {
            return;
        }
        let Some(delta) = self.find_scroll_delta(view) else {
            return;
        };
        if delta == 0 {
            return;
        }

        if delta > 0 {
            let n = delta as u16;
            MoveTo { row: 0, col: 0 }.encode(buf);
            DeleteLine(n).encode(buf);
            if !self.is_terminal_bottom {
                MoveTo {
                    row: height - n,
                    col: 0,
                }
                .encode(buf);
                InsertLine(n).encode(buf);
            }
            self.screen_buffer.rotate_left(n as usize);
            for entry in &mut self.screen_buffer[(height - n) as usize..] {
                *entry = LineBuffer::invalid();
            }
        } else {
            let n = (-delta) as u16;
            MoveTo { row: 0, col: 0 }.encode(buf);
            InsertLine(n).encode(buf);
            if !self.is_terminal_bottom {
                MoveTo { row: height, col: 0 }.encode(buf);
                DeleteLine(n).encode(buf);
            }
            self.screen_buffer.rotate_right(n as usize);
            for entry in &mut self.screen_buffer[..n as usize] {
                *entry = LineBuffer::invalid();
            }
        }
    }

    fn find_scroll_delta(&self, view: &dyn TermView) -> Option<i32> {
        let height = view.height() as i32;
        for delta in 1..height {
            if (0..height - delta).all(|row| {
                self.screen_buffer[(row + delta) as usize].id == view.line_id(row as u16)
            }) {
                return Some(delta);
            }
            if (0..height - delta).all(|row| {
                self.screen_buffer[row as usize].id == view.line_id((row + delta) as u16)
            }) {
                return Some(-delta);
            }
        }
        None
    }

    fn render_content(&mut self, view: &dyn TermView, buf: &mut Vec<u8>) {
        for row in 0..view.height() {
            let id = view.line_id(row);
            let version = view.line_version(row);
            if self.screen_buffer[row as usize].id == id
                && self.screen_buffer[row as usize].version == version
            {
                continue;
            }
            let new_content: Vec<Cell> = view
                .get_cells_in_presentation(row)
                .into_iter()
                .map(|c| Cell {
                    attr: apply_default_attribute(c.attr, view.default_fg(), view.default_bg()),
                    ..c
                })
                .collect();
            self.render_line(row, &new_content, buf);
            self.screen_buffer[row as usize] = LineBuffer {
                id,
                version,
                content: new_content,
            };
        }
    }

    fn render_line(&mut self, row: u16, new: &[Cell], buf: &mut Vec<u8>) {
        let old = &self.screen_buffer[row as usize].content;

        let mut prefix = 0usize;
        while prefix < old.len().min(new.len()) && old[prefix] == new[prefix] {
            prefix += 1;
        }
        while prefix > 0 && new.get(prefix).is_some_and(|c| c.ch.is_wide_extension()) {
            prefix -= 1;
        }

        let mut suffix = 0usize;
        while suffix < old.len().min(new.len()) - prefix
            && old[old.len() - 1 - suffix] == new[new.len() - 1 - suffix]
        {
            suffix += 1;
        }
        while suffix > 0
            && new
                .get(new.len() - suffix)
                .is_some_and(|c| c.ch.is_wide_extension())
        {
            suffix -= 1;
        }

        let old_mid = &old[prefix..old.len() - suffix];
        let new_mid = &new[prefix..new.len() - suffix];
        if old_mid.is_empty() && new_mid.is_empty() {
            return;
        }

        MoveTo {
            row,
            col: prefix as u16,
        }
        .encode(buf);

        if suffix > 0 && old_mid.len() != new_mid.len() {
            if new_mid.len() > old_mid.len() {
                InsertChar((new_mid.len() - old_mid.len()) as u16).encode(buf);
            } else {
                DeleteChar((old_mid.len() - new_mid.len()) as u16).encode(buf);
            }
        }

        for cell in new_mid {
            if cell.width == 0 {
                if cell.ch.is_cluster_extension() {
                    let mut b = [0u8; 4];
                    let n = encode_utf8_into(cell.ch.code_point(), &mut b);
                    buf.extend_from_slice(&b[..n]);
                }
                continue;
            }
            let codes = diff_sgr(&self.cap, self.remote_attr, cell.attr);
            if !codes.is_empty() {
                SetGraphicsRendition(codes).encode(buf);
                self.remote_attr = cell.attr;
            }
            let mut b = [0u8; 4];
            let n = encode_utf8_into(cell.ch.code_point(), &mut b);
            buf.extend_from_slice(&b[..n]);
        }
    }

    fn reconcile_cursor(&mut self, view: &dyn TermView, buf: &mut Vec<u8>) {
        let pos = view.cursor_position();
        if pos != self.remote_cursor {
            MoveTo {
                row: pos.1,
                col: pos.0,
            }
            .encode(buf);
            self.remote_cursor = pos;
        }
        let visible = view.cursor_visible();
        if visible != self.remote_dectcem {
            if visible {
                ShowCursor.encode(buf);
            } else {
                HideCursor.encode(buf);
            }
            self.remote_dectcem = visible;
        }
    }
}

impl Default for DifferentialRenderer {
    fn default() -> Self {
        Self::new(TermcapSgrType::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contra_model::{Board, ColorSpec};
    use pretty_assertions::assert_eq;

    fn out_as_string(out: &[u8]) -> String {
        String::from_utf8_lossy(out).into_owned()
    }

    #[test]
    fn first_frame_clears_and_writes_full_content() {
        let mut board = Board::new(5, 2);
        board.line_mut(0).write_cells(
            0,
            &"hello"
                .chars()
                .map(|c| Cell::printable(c, Attribute::default()))
                .collect::<Vec<_>>(),
            1,
        );

        let mut renderer = DifferentialRenderer::default();
        let mut out: Vec<u8> = Vec::new();
        renderer.update(&board, &mut out);

        let s = out_as_string(&out);
        assert!(s.starts_with("\x1b[2J"));
        assert!(s.contains("hello"));
    }

    #[test]
    fn unchanged_frame_emits_nothing() {
        let board = Board::new(5, 2);
        let mut renderer = DifferentialRenderer::default();
        let mut out: Vec<u8> = Vec::new();
        renderer.update(&board, &mut out);
        out.clear();
        renderer.update(&board, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn color_change_uses_minimized_sgr() {
        let mut board = Board::new(5, 1);
        let mut renderer = DifferentialRenderer::default();
        let mut out: Vec<u8> = Vec::new();
        renderer.update(&board, &mut out);

        let mut attr = Attribute::default();
        attr.fg = ColorSpec::Indexed(1);
        board
            .line_mut(0)
            .write_cells(0, &[Cell::printable('x', attr)], 1);
        out.clear();
        renderer.update(&board, &mut out);
        let s = out_as_string(&out);
        assert!(s.contains("31"));
        assert!(s.contains('x'));
    }
}
