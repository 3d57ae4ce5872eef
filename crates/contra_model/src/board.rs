use crate::attribute::Attribute;
use crate::line::Line;

bitflags::bitflags! {
    /// Terminal mode bits, mirroring the ANSI `SM`/`RM` and DEC private
    /// `DECSET`/`DECRST` mode sets this board is sensitive to. Defaults
    /// follow a conventional terminal: line feed implies carriage
    /// return, autowrap and the cursor are visible, screen reverse
    /// video is off, and the implicit-movement direction is forward.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TerminalModes: u32 {
        /// LNM: linefeed/new-line mode.
        const LNM           = 1 << 0;
        /// DCSM: coordinates interpreted in presentation order rather
        /// than data order for CR/ECH/ICH/DCH.
        const DCSM_PRESENTATION = 1 << 1;
        /// GRCM: use the "combining" graphic character set semantics.
        const GRCM          = 1 << 2;
        /// ZDM: zero-default mode, `Pn=0` behaves like `Pn` omitted.
        const ZDM           = 1 << 3;
        /// SIMD: selects implicit movement direction (set = backward).
        const SIMD          = 1 << 4;
        /// xenl: one column past `width-1` is reachable (pending wrap).
        const XENL          = 1 << 5;
        /// xenl-ech: ECH/ICH/DCH act on the last column while pending-wrap.
        const XENL_ECH      = 1 << 6;
        /// home-IL: IL/DL/ICH move the cursor to the line's home column.
        const HOME_IL       = 1 << 7;
        /// DECAWM: autowrap.
        const DECAWM        = 1 << 8;
        /// DECTCEM: cursor visible.
        const DECTCEM       = 1 << 9;
        /// DECSCNM: reverse video across the whole screen.
        const DECSCNM       = 1 << 10;
        /// IRM: insert/replace mode — graphic characters push the rest
        /// of the line right instead of overwriting it.
        const IRM           = 1 << 11;
        /// VT is subject to the same LNM-gated CR as LF.
        const VT_AFFECTED_BY_LNM = 1 << 12;
        /// VT always appends a newline regardless of LNM.
        const VT_APPENDING_NEWLINE = 1 << 13;
        /// FF clears the screen and homes the cursor instead of acting
        /// as a line feed.
        const FF_CLEARING_SCREEN = 1 << 14;
        /// FF is subject to the same LNM-gated CR as LF.
        const FF_AFFECTED_BY_LNM = 1 << 15;
        /// A screen-clearing FF homes the cursor to `page_home` instead
        /// of row 0.
        const FF_USING_PAGE_HOME = 1 << 16;
    }
}

impl Default for TerminalModes {
    fn default() -> Self {
        Self::LNM
            | Self::DCSM_PRESENTATION
            | Self::GRCM
            | Self::ZDM
            | Self::XENL
            | Self::XENL_ECH
            | Self::DECAWM
            | Self::DECTCEM
            | Self::VT_AFFECTED_BY_LNM
            | Self::VT_APPENDING_NEWLINE
            | Self::FF_AFFECTED_BY_LNM
    }
}

/// Terminal-wide state that lives alongside the grid but is not itself
/// cell data: modes, tab stops, and the page-level scroll region.
#[derive(Debug, Clone)]
pub struct TerminalState {
    pub modes: TerminalModes,
    pub tab_stops: Vec<u16>,
    pub page_home: u16,
    pub page_limit: u16,
}

impl TerminalState {
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            modes: TerminalModes::default(),
            tab_stops: default_tab_stops(width),
            page_home: 0,
            page_limit: height,
        }
    }

    /// The implicit movement direction: `+1` forward, `-1` backward
    /// under SIMD.
    #[must_use]
    pub fn simd_dir(&self) -> i8 {
        if self.modes.contains(TerminalModes::SIMD) {
            -1
        } else {
            1
        }
    }

    #[must_use]
    pub fn next_tab_stop(&self, x: u16, width: u16) -> u16 {
        self.tab_stops
            .iter()
            .copied()
            .find(|&stop| stop > x)
            .unwrap_or(width.saturating_sub(1))
            .min(width.saturating_sub(1))
    }

    pub fn reset_tab_stops(&mut self, width: u16) {
        self.tab_stops = default_tab_stops(width);
    }

    /// HTS: set a tab stop at `col` (`ESC H` / C1 `0x88`).
    pub fn set_tab_stop(&mut self, col: u16) {
        if let Err(pos) = self.tab_stops.binary_search(&col) {
            self.tab_stops.insert(pos, col);
        }
    }

    /// TBC: clear the tab stop at `col`, if any.
    pub fn clear_tab_stop(&mut self, col: u16) {
        self.tab_stops.retain(|&c| c != col);
    }

    /// TBC Ps=3: clear every tab stop.
    pub fn clear_all_tab_stops(&mut self) {
        self.tab_stops.clear();
    }
}

fn default_tab_stops(width: u16) -> Vec<u16> {
    (1..width).step_by(8).collect()
}

/// The cursor: position, current attribute, and the pending-wrap flag
/// that lets `x == width` be reachable under xenl without the line
/// being mutated until the next graphic character arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub x: u16,
    pub y: u16,
    pub attr: Attribute,
    pub pending_wrap: bool,
}

impl Cursor {
    #[must_use]
    pub fn new() -> Self {
        Self {
            x: 0,
            y: 0,
            attr: Attribute::default(),
            pending_wrap: false,
        }
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Self::new()
    }
}

/// The fixed `width × height` grid: a ring buffer of [`Line`] so vertical
/// scroll is a rotation-offset update rather than a bulk copy.
#[derive(Debug, Clone)]
pub struct Board {
    width: u16,
    height: u16,
    rotation: usize,
    lines: Vec<Line>,
    next_line_id: u64,
    pub cursor: Cursor,
    pub default_fg: crate::color::ColorSpec,
    pub default_bg: crate::color::ColorSpec,
    pub tstate: TerminalState,
}

impl Board {
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        let mut next_line_id = 0u64;
        let lines = (0..height)
            .map(|_| {
                let id = next_line_id;
                next_line_id += 1;
                Line::new(width, id)
            })
            .collect();
        Self {
            width,
            height,
            rotation: 0,
            lines,
            next_line_id,
            cursor: Cursor::new(),
            default_fg: crate::color::ColorSpec::Default,
            default_bg: crate::color::ColorSpec::Default,
            tstate: TerminalState::new(width, height),
        }
    }

    #[must_use]
    pub fn width(&self) -> u16 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u16 {
        self.height
    }

    fn physical_index(&self, y: u16) -> usize {
        (self.rotation + y as usize) % self.lines.len()
    }

    #[must_use]
    pub fn line(&self, y: u16) -> &Line {
        let idx = self.physical_index(y);
        &self.lines[idx]
    }

    #[must_use]
    pub fn line_mut(&mut self, y: u16) -> &mut Line {
        let idx = self.physical_index(y);
        &mut self.lines[idx]
    }

    /// Ensure line `y` has been initialized for the current rotation
    /// epoch (lazily re-homed after [`Self::rotate`] cleared it).
    pub fn ensure_line_used(&mut self, y: u16) -> &mut Line {
        let idx = self.physical_index(y);
        if !self.lines[idx].lflags.contains(crate::line::LineFlags::IS_LINE_USED) {
            let id = self.next_line_id;
            self.next_line_id += 1;
            self.lines[idx].reset(self.width, id);
        }
        &mut self.lines[idx]
    }

    /// Move `delta` lines off the top of the visible page (`delta > 0`)
    /// or off the bottom (`delta < 0`), in O(1) via the rotation offset.
    /// The lines newly exposed at the trailing edge are marked unused so
    /// the next write reinitializes them under a fresh id.
    pub fn rotate(&mut self, delta: i32) {
        if delta == 0 || self.lines.is_empty() {
            return;
        }
        let len = self.lines.len() as i32;
        let norm = ((delta % len) + len) % len;
        self.rotation = (self.rotation + norm as usize) % self.lines.len();

        let exposed = norm.unsigned_abs() as u16;
        let start = if delta > 0 { self.height - exposed } else { 0 };
        for y in start..start + exposed.min(self.height) {
            let idx = self.physical_index(y);
            self.lines[idx].lflags.remove(crate::line::LineFlags::IS_LINE_USED);
        }
    }

    /// Scroll the rows `[top, bottom)` by `delta` (positive = content
    /// moves up, exposing blank rows at the bottom of the region;
    /// negative = content moves down). When the region spans the whole
    /// board this is the O(1) ring rotation; a restricted scroll region
    /// (`DECSTBM`) instead moves line content row by row, which keeps
    /// each row's `id` attached to its content.
    pub fn scroll_region(&mut self, top: u16, bottom: u16, delta: i32) {
        if delta == 0 || top >= bottom || bottom > self.height {
            return;
        }
        if top == 0 && bottom == self.height {
            self.rotate(delta);
            return;
        }
        let region_len = i32::from(bottom - top);
        let norm = delta.clamp(-region_len, region_len);
        let step = if norm > 0 { 1 } else { -1 };
        let n = norm.abs();
        let mut i = if step > 0 { 0 } else { region_len - 1 };
        for _ in 0..region_len {
            let dst_y = top as i32 + i;
            let src_y = dst_y + n * step;
            if src_y >= top as i32 && src_y < bottom as i32 {
                let idx_src = self.physical_index(src_y as u16);
                let content = self.lines[idx_src].clone();
                let idx_dst = self.physical_index(dst_y as u16);
                self.lines[idx_dst] = content;
            } else {
                let idx_dst = self.physical_index(dst_y as u16);
                let id = self.next_line_id;
                self.next_line_id += 1;
                self.lines[idx_dst].reset(self.width, id);
            }
            i += step;
        }
    }

    /// DECSTBM: set the page scroll region to `[top, bottom)`, clamped
    /// to the board's height and kept non-empty.
    pub fn set_scroll_region(&mut self, top: u16, bottom: u16) {
        let top = top.min(self.height.saturating_sub(1));
        let bottom = bottom.clamp(top + 1, self.height);
        self.tstate.page_home = top;
        self.tstate.page_limit = bottom;
    }

    /// Clear and mark-unused every line (`RIS`/`ED 2`-style full reset).
    pub fn clear_all(&mut self) {
        for line in &mut self.lines {
            let id = self.next_line_id;
            self.next_line_id += 1;
            line.reset(self.width, id);
        }
        self.cursor = Cursor::new();
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        for line in &mut self.lines {
            line.resize(width);
        }
        if height as usize > self.lines.len() {
            for _ in self.lines.len()..height as usize {
                let id = self.next_line_id;
                self.next_line_id += 1;
                self.lines.push(Line::new(width, id));
            }
        } else {
            self.lines.truncate(height as usize);
        }
        self.width = width;
        self.height = height;
        self.tstate.reset_tab_stops(width);
        self.tstate.page_limit = self.tstate.page_limit.min(height);
        self.cursor.x = self.cursor.x.min(width);
        self.cursor.y = self.cursor.y.min(height.saturating_sub(1));
    }
}
