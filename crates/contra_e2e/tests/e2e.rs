//! The six end-to-end scenarios from spec §8, each driven through the
//! real decoder → interpreter → board stack (and, for scenario 5, the
//! differential renderer on top of a bare [`contra_render::TermView`]
//! double) rather than any one module in isolation.

use contra_model::{Attribute, AttributeFlags, Board, Cell, ColorSpec};
use contra_render::{DifferentialRenderer, TermView, TermcapSgrType};
use contra_term::Term;
use pretty_assertions::assert_eq;

fn text_of(term: &Term, y: u16) -> String {
    term.board
        .line(y)
        .cells()
        .iter()
        .map(|c| c.ch.code_point())
        .collect()
}

/// Scenario 1: `"hello\r日\n"` on 5×3 → line 0 is `"日llo"` (the wide
/// glyph occupies columns 0-1, a `wide_extension` cell at column 1;
/// columns 2-4 are `l, l, o`); cursor ends at (0, 1).
#[test]
fn scenario_1_wide_character_overwrite_at_line_start() {
    let mut term = Term::new(5, 3);
    term.write("hello\r日\n".as_bytes());

    let line = term.board.line(0);
    assert_eq!(line.cells()[0].ch.code_point(), '日');
    assert_eq!(line.cells()[0].width, 2);
    assert!(line.cells()[1].is_wide_extension());
    assert_eq!(line.cells()[1].attr, line.cells()[0].attr);
    assert_eq!(line.cells()[2].ch.code_point(), 'l');
    assert_eq!(line.cells()[3].ch.code_point(), 'l');
    assert_eq!(line.cells()[4].ch.code_point(), 'o');

    assert_eq!(term.board.cursor.x, 0);
    assert_eq!(term.board.cursor.y, 1);
}

/// Scenario 2: `"\e[38:5:196;4mABCDE"` on 5×1 → every cell carries
/// `{fg = indexed 196, underline single}`, and the presentation map is
/// the identity over the whole row (no directed strings were opened).
#[test]
fn scenario_2_sub_parameter_indexed_color_with_underline() {
    let mut term = Term::new(5, 1);
    term.write(b"\x1b[38:5:196;4mABCDE");

    let line = term.board.line(0);
    for (i, c) in "ABCDE".chars().enumerate() {
        let cell = line.cells()[i];
        assert_eq!(cell.ch.code_point(), c);
        assert_eq!(cell.attr.fg, ColorSpec::Indexed(196));
        assert!(cell.attr.aflags.contains(AttributeFlags::UNDERLINE_SINGLE));
    }
    for x in 0..5u16 {
        assert_eq!(line.to_presentation_position(x), x);
    }
}

/// Scenario 3: `"ab\e[2]cdef\e[1]gh\e[0]ij\r"` on 10×1 (ECMA-48 SDS) →
/// data order is `"abcdefghij"` unchanged, but the RTL run opened by
/// `\e[2]` reads `"fedc"` in presentation order, so the full row
/// presents as `"abfedcghij"`; `to_data_position(0, 2) == 5`.
#[test]
fn scenario_3_sds_directed_string_reverses_presentation_order() {
    let mut term = Term::new(10, 1);
    term.write("ab\x1b[2]cdef\x1b[1]gh\x1b[0]ij\r".as_bytes());

    assert_eq!(text_of(&term, 0), "abcdefghij");

    let line = term.board.line(0);
    assert_eq!(line.to_data_position(2), 5);

    let presentation: String = (0..10)
        .map(|p| {
            let d = line.to_data_position(p);
            line.cells()[d as usize].ch.code_point()
        })
        .collect();
    assert_eq!(presentation, "abfedcghij");

    assert_eq!(term.board.cursor.x, 0);
}

/// Scenario 4: `"\e[H0123456789\e[1;3H\e[3P"` on 10×1 → `CSI 3 P` at
/// the cursor (column 2, 0-indexed) deletes three cells, shifting the
/// remainder left and padding the vacated tail with NUL/default-width
/// blanks: `"0156789   "` (as NUL code points, not literal spaces),
/// and presentation order is unchanged (no directed strings are open).
#[test]
fn scenario_4_dch_deletes_and_pads_with_default_blanks() {
    let mut term = Term::new(10, 1);
    term.write(b"\x1b[H0123456789\x1b[1;3H\x1b[3P");

    assert_eq!(text_of(&term, 0), "0156789\0\0\0");
    let line = term.board.line(0);
    for (i, cell) in line.cells().iter().enumerate() {
        if i >= 7 {
            assert_eq!(cell.ch.code_point(), '\0');
            assert!(cell.attr.is_default());
            assert_eq!(cell.width, 1);
        }
    }
    for x in 0..10u16 {
        assert_eq!(line.to_presentation_position(x), x);
    }
}

/// A minimal [`TermView`] double so the renderer's scroll trace can be
/// exercised directly against a hand-built sequence of row ids/versions
/// instead of a live `Board` scroll (which would require a full
/// scrollback-less ring to reach the exact `[A,B,C,D] -> [B,C,D,E]`
/// shape named in spec §8 scenario 5).
struct FakeView {
    ids: Vec<u64>,
    height: u16,
}

impl TermView for FakeView {
    fn width(&self) -> u16 {
        10
    }
    fn height(&self) -> u16 {
        self.height
    }
    fn line_id(&self, row: u16) -> u64 {
        self.ids[row as usize]
    }
    fn line_version(&self, row: u16) -> u64 {
        // Distinct per id so unchanged rows are recognized as such and
        // the renderer's content diff only has to deal with the scroll
        // trace, which is what this scenario is pinning.
        self.ids[row as usize]
    }
    fn get_cells_in_presentation(&self, _row: u16) -> Vec<Cell> {
        vec![Cell::blank(Attribute::default()); self.width as usize]
    }
    fn cursor_position(&self) -> (u16, u16) {
        (0, 0)
    }
    fn cursor_visible(&self) -> bool {
        true
    }
    fn reverse_video(&self) -> bool {
        false
    }
    fn default_fg(&self) -> ColorSpec {
        ColorSpec::Default
    }
    fn default_bg(&self) -> ColorSpec {
        ColorSpec::Default
    }
}

/// Scenario 5: board lines with ids `[A,B,C,D]` scroll to `[B,C,D,E]`;
/// the renderer emits `CSI M` (DL 1) at row 0 and `CSI L` (IL 1) at row
/// 3 when the rendered page is not also the physical terminal's last
/// row (`is_terminal_bottom == false`); with `is_terminal_bottom ==
/// true` the trailing IL is omitted since the DL pass alone already
/// reveals the blank row at the bottom.
#[test]
fn scenario_5_scroll_trace_emits_dl_then_il() {
    let before = FakeView {
        ids: vec![10, 11, 12, 13],
        height: 4,
    };
    let after = FakeView {
        ids: vec![11, 12, 13, 14],
        height: 4,
    };

    let mut renderer = DifferentialRenderer::new(TermcapSgrType::default());
    renderer.is_terminal_bottom = false;
    let mut out = Vec::new();
    renderer.update(&before, &mut out);
    out.clear();

    renderer.update(&after, &mut out);
    let s = String::from_utf8_lossy(&out);
    assert!(s.contains("\x1b[M"), "expected DL 1 (CSI M) in {s:?}");
    assert!(s.contains("\x1b[L"), "expected IL 1 (CSI L) in {s:?}");
    let dl_pos = s.find("\x1b[M").unwrap();
    let il_pos = s.find("\x1b[L").unwrap();
    assert!(dl_pos < il_pos, "DL must precede IL in {s:?}");
}

#[test]
fn scenario_5_terminal_bottom_omits_trailing_il() {
    let before = FakeView {
        ids: vec![10, 11, 12, 13],
        height: 4,
    };
    let after = FakeView {
        ids: vec![11, 12, 13, 14],
        height: 4,
    };

    let mut renderer = DifferentialRenderer::new(TermcapSgrType::default());
    assert!(renderer.is_terminal_bottom);
    let mut out = Vec::new();
    renderer.update(&before, &mut out);
    out.clear();

    renderer.update(&after, &mut out);
    let s = String::from_utf8_lossy(&out);
    assert!(s.contains("\x1b[M"));
    assert!(!s.contains("\x1b[L"), "trailing IL should be omitted: {s:?}");
}

/// Scenario 6: transitioning attribute from `{bold, fg=red}` to
/// `{fg=red}` emits the minimal `CSI 22 m` (bold/faint off), never the
/// wholesale `CSI 0;31 m` reset-then-reapply.
#[test]
fn scenario_6_sgr_minimization_emits_targeted_off_code() {
    let mut board = Board::new(5, 1);
    let mut bold_red = Attribute::default();
    bold_red.aflags |= AttributeFlags::BOLD;
    bold_red.fg = ColorSpec::Indexed(1);
    board
        .line_mut(0)
        .write_cells(0, &[Cell::printable('x', bold_red)], 1);

    let mut renderer = DifferentialRenderer::default();
    let mut out = Vec::new();
    renderer.update(&board, &mut out);
    out.clear();

    let mut red_only = Attribute::default();
    red_only.fg = ColorSpec::Indexed(1);
    board
        .line_mut(0)
        .write_cells(0, &[Cell::printable('x', red_only)], 1);
    renderer.update(&board, &mut out);

    let s = String::from_utf8_lossy(&out);
    assert!(s.contains("22"), "expected a bold/faint-off code in {s:?}");
    assert!(!s.contains("\x1b[0;31m"), "must not do a full reset+reapply: {s:?}");
    assert!(!s.contains("\x1b[0m31"), "must not do a full reset+reapply: {s:?}");
}
