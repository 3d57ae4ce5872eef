//! CSI final-byte dispatch.
//!
//! Mode numbers for `SM`/`RM` and `DECSET`/`DECRST` are not invented here:
//! they are the exact assignments recovered from the original
//! implementation's `construct_mode_spec` table (`ansi::mode_spec`) —
//! `DCSM`=9, `LNM`=20, `GRCM`=21, `ZDM`=22 as ANSI (`CSI Ps h`) modes, and
//! `SIMD`/`XENL`/`XENL_ECH`/`HOME_IL` as contra-private (`CSI ? Ps h`)
//! modes 9201..=9204, alongside the standard DEC private modes `DECAWM`=7,
//! `DECSCNM`=5, `DECTCEM`=25.

use contra_model::TerminalModes;
use contra_parser::Sequence;

use crate::term::Term;

pub(crate) fn dispatch(term: &mut Term, seq: &Sequence) {
    match (seq.private_marker, seq.final_byte) {
        (None, b'h') => set_ansi_mode(term, seq, true),
        (None, b'l') => set_ansi_mode(term, seq, false),
        (Some(b'?'), b'h') => set_dec_mode(term, seq, true),
        (Some(b'?'), b'l') => set_dec_mode(term, seq, false),
        (None, b'c') => device_attributes(term),
        (Some(b'>'), b'c') => device_attributes_secondary(term),
        _ => dispatch_plain(term, seq),
    }
}

fn dispatch_plain(term: &mut Term, seq: &Sequence) {
    match seq.final_byte {
        b'A' => cuu(term, seq),
        b'B' => cud(term, seq),
        b'C' => cuf(term, seq),
        b'D' => cub(term, seq),
        b'H' | b'f' => cup(term, seq),
        b'G' => cha(term, seq),
        b'd' => vpa(term, seq),
        b'J' => ed(term, seq),
        b'K' => el(term, seq),
        b'L' => il(term, seq),
        b'M' => dl(term, seq),
        b'@' => ich(term, seq),
        b'P' => dch(term, seq),
        b'X' => ech(term, seq),
        b'S' => su(term, seq),
        b'T' => sd(term, seq),
        b'r' => decstbm(term, seq),
        b'm' => crate::sgr::apply_sgr(&mut term.board.cursor.attr, &seq.params),
        b'n' => dsr(term, seq),
        b']' => sds(term, seq),
        b'[' => srs(term, seq),
        _ => tracing::debug!(
            final_byte = seq.final_byte,
            "unrecognized control sequence"
        ),
    }
}

fn clamp_row(term: &Term, y: i32) -> u16 {
    y.clamp(0, i32::from(term.board.height()) - 1) as u16
}

fn clamp_col(term: &Term, x: i32) -> u16 {
    x.clamp(0, i32::from(term.board.width())) as u16
}

fn cuu(term: &mut Term, seq: &Sequence) {
    let n = seq.param_nonzero_or(0, 1);
    let y = i32::from(term.board.cursor.y) - n;
    term.board.cursor.y = clamp_row(term, y);
    term.board.cursor.pending_wrap = false;
}

fn cud(term: &mut Term, seq: &Sequence) {
    let n = seq.param_nonzero_or(0, 1);
    let y = i32::from(term.board.cursor.y) + n;
    term.board.cursor.y = clamp_row(term, y);
    term.board.cursor.pending_wrap = false;
}

fn cuf(term: &mut Term, seq: &Sequence) {
    let n = seq.param_nonzero_or(0, 1);
    let x = i32::from(term.board.cursor.x) + n;
    term.board.cursor.x = clamp_col(term, x);
    term.board.cursor.pending_wrap = false;
}

fn cub(term: &mut Term, seq: &Sequence) {
    let n = seq.param_nonzero_or(0, 1);
    let x = i32::from(term.board.cursor.x) - n;
    term.board.cursor.x = clamp_col(term, x);
    term.board.cursor.pending_wrap = false;
}

fn cup(term: &mut Term, seq: &Sequence) {
    let row = seq.param_nonzero_or(0, 1) - 1;
    let col = seq.param_nonzero_or(1, 1) - 1;
    term.board.cursor.y = clamp_row(term, row);
    term.board.cursor.x = clamp_col(term, col);
    term.board.cursor.pending_wrap = false;
}

fn cha(term: &mut Term, seq: &Sequence) {
    let col = seq.param_nonzero_or(0, 1) - 1;
    term.board.cursor.x = clamp_col(term, col);
    term.board.cursor.pending_wrap = false;
}

fn vpa(term: &mut Term, seq: &Sequence) {
    let row = seq.param_nonzero_or(0, 1) - 1;
    term.board.cursor.y = clamp_row(term, row);
    term.board.cursor.pending_wrap = false;
}

/// ED: erase in display. `0` below cursor (inclusive), `1` above cursor
/// (inclusive), `2`/`3` the whole screen.
fn ed(term: &mut Term, seq: &Sequence) {
    let ps = seq.param_or(0, 0);
    let attr = term.board.cursor.attr;
    let y = term.board.cursor.y;
    let x = usize::from(term.board.cursor.x);
    let width = usize::from(term.board.width());
    let height = term.board.height();
    match ps {
        0 => {
            term.board.line_mut(y).erase_chars(x, width - x, attr);
            for row in (y + 1)..height {
                term.board.ensure_line_used(row);
                term.board.line_mut(row).erase_chars(0, width, attr);
            }
        }
        1 => {
            term.board.line_mut(y).erase_chars(0, x + 1, attr);
            for row in 0..y {
                term.board.ensure_line_used(row);
                term.board.line_mut(row).erase_chars(0, width, attr);
            }
        }
        _ => {
            for row in 0..height {
                term.board.ensure_line_used(row);
                term.board.line_mut(row).erase_chars(0, width, attr);
            }
        }
    }
}

/// EL: erase in line. `0` to end of line, `1` from start, `2` whole line.
fn el(term: &mut Term, seq: &Sequence) {
    let ps = seq.param_or(0, 0);
    let attr = term.board.cursor.attr;
    let y = term.board.cursor.y;
    let x = usize::from(term.board.cursor.x);
    let width = usize::from(term.board.width());
    let line = term.board.line_mut(y);
    match ps {
        0 => line.erase_chars(x, width - x, attr),
        1 => line.erase_chars(0, x + 1, attr),
        _ => line.erase_chars(0, width, attr),
    }
}

/// IL: insert `Ps` blank lines at the cursor row, shifting the rest of
/// the scroll region down.
fn il(term: &mut Term, seq: &Sequence) {
    let n = seq.param_nonzero_or(0, 1);
    let y = term.board.cursor.y;
    let bottom = term.board.tstate.page_limit;
    term.board.scroll_region(y, bottom, -n);
    if term.board.tstate.modes.contains(TerminalModes::HOME_IL) {
        term.board.cursor.x = term.board.line(y).home;
    }
}

/// DL: delete `Ps` lines at the cursor row, shifting the rest of the
/// scroll region up and filling at the bottom with blanks.
fn dl(term: &mut Term, seq: &Sequence) {
    let n = seq.param_nonzero_or(0, 1);
    let y = term.board.cursor.y;
    let bottom = term.board.tstate.page_limit;
    term.board.scroll_region(y, bottom, n);
    if term.board.tstate.modes.contains(TerminalModes::HOME_IL) {
        term.board.cursor.x = term.board.line(y).home;
    }
}

fn ich(term: &mut Term, seq: &Sequence) {
    let n = seq.param_nonzero_or(0, 1) as usize;
    let attr = term.board.cursor.attr;
    let y = term.board.cursor.y;
    let x = usize::from(term.board.cursor.x);
    term.board.line_mut(y).insert_chars(x, n, attr);
}

fn dch(term: &mut Term, seq: &Sequence) {
    let n = seq.param_nonzero_or(0, 1) as usize;
    let attr = term.board.cursor.attr;
    let y = term.board.cursor.y;
    let x = usize::from(term.board.cursor.x);
    term.board.line_mut(y).delete_chars(x, n, attr);
}

fn ech(term: &mut Term, seq: &Sequence) {
    let n = seq.param_nonzero_or(0, 1) as usize;
    let attr = term.board.cursor.attr;
    let y = term.board.cursor.y;
    let x = usize::from(term.board.cursor.x);
    term.board.line_mut(y).erase_chars(x, n, attr);
}

/// SU: scroll the whole page up `Ps` lines (content moves up).
fn su(term: &mut Term, seq: &Sequence) {
    let n = seq.param_nonzero_or(0, 1);
    let (top, bottom) = (term.board.tstate.page_home, term.board.tstate.page_limit);
    term.board.scroll_region(top, bottom, n);
}

/// SD: scroll the whole page down `Ps` lines (content moves down).
fn sd(term: &mut Term, seq: &Sequence) {
    let n = seq.param_nonzero_or(0, 1);
    let (top, bottom) = (term.board.tstate.page_home, term.board.tstate.page_limit);
    term.board.scroll_region(top, bottom, -n);
}

/// DECSTBM: set the page scroll region.
fn decstbm(term: &mut Term, seq: &Sequence) {
    let height = term.board.height();
    let top = seq.param_nonzero_or(0, 1) - 1;
    let bottom = seq.param_or(1, i32::from(height));
    term.board
        .set_scroll_region(top.max(0) as u16, bottom.max(1) as u16);
    term.board.cursor.y = term.board.tstate.page_home;
    term.board.cursor.x = 0;
    term.board.cursor.pending_wrap = false;
}

fn set_ansi_mode(term: &mut Term, seq: &Sequence, value: bool) {
    for group in &seq.params {
        let Some(&n) = group.first() else { continue };
        let bit = match n {
            4 => Some(TerminalModes::IRM),
            9 => Some(TerminalModes::DCSM_PRESENTATION),
            20 => Some(TerminalModes::LNM),
            21 => Some(TerminalModes::GRCM),
            22 => Some(TerminalModes::ZDM),
            _ => None,
        };
        match bit {
            Some(bit) => term.board.tstate.modes.set(bit, value),
            None => tracing::debug!(mode = n, value, "unrecognized ANSI mode"),
        }
    }
}

fn set_dec_mode(term: &mut Term, seq: &Sequence, value: bool) {
    for group in &seq.params {
        let Some(&n) = group.first() else { continue };
        let bit = match n {
            5 => Some(TerminalModes::DECSCNM),
            7 => Some(TerminalModes::DECAWM),
            25 => Some(TerminalModes::DECTCEM),
            9201 => Some(TerminalModes::SIMD),
            9202 => Some(TerminalModes::XENL),
            9203 => Some(TerminalModes::XENL_ECH),
            9204 => Some(TerminalModes::HOME_IL),
            _ => None,
        };
        match bit {
            Some(bit) => term.board.tstate.modes.set(bit, value),
            None => tracing::debug!(mode = n, value, "unrecognized DEC private mode"),
        }
    }
}

/// DA: primary device attributes. Reports as a VT220-class terminal with
/// no optional features, the same minimal reply `vtio`-adjacent test
/// harnesses accept.
fn device_attributes(term: &mut Term) {
    term.pending_output.extend_from_slice(b"\x1b[?62c");
}

/// DA2: secondary device attributes (terminal type; firmware version;
/// ROM cartridge number, always 0 here).
fn device_attributes_secondary(term: &mut Term) {
    term.pending_output.extend_from_slice(b"\x1b[>0;0;0c");
}

/// DSR: device status report. `Ps=5` asks "are you OK" (reply `0n` =
/// yes); `Ps=6` asks for the cursor position (reply `CSI row ; col R`,
/// 1-based).
fn dsr(term: &mut Term, seq: &Sequence) {
    match seq.param_or(0, 0) {
        6 => {
            let row = term.board.cursor.y + 1;
            let col = term.board.cursor.x + 1;
            term.pending_output
                .extend_from_slice(format!("\x1b[{row};{col}R").as_bytes());
        }
        5 => term.pending_output.extend_from_slice(b"\x1b[0n"),
        _ => {}
    }
}

/// SDS: `Ps=0` closes the innermost open directed string at the cursor's
/// data column; `Ps=1`/`Ps=2` opens a new LTR/RTL one there.
fn sds(term: &mut Term, seq: &Sequence) {
    let ps = seq.param_or(0, 0);
    let y = term.board.cursor.y;
    let x = term.board.cursor.x;
    let line = term.board.line_mut(y);
    if ps == 0 {
        line.directed_strings_mut().close_innermost(x);
    } else {
        line.directed_strings_mut().start_directed_string(x, ps == 2);
    }
}

/// SRS: `Ps=0` closes the innermost open string; `Ps=1` opens a nested
/// reversed run at the cursor's data column.
fn srs(term: &mut Term, seq: &Sequence) {
    let ps = seq.param_or(0, 0);
    let y = term.board.cursor.y;
    let x = term.board.cursor.x;
    let line = term.board.line_mut(y);
    if ps == 0 {
        line.directed_strings_mut().close_innermost(x);
    } else {
        line.directed_strings_mut().start_reversed_string(x, true);
    }
}
