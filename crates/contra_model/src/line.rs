use crate::cell::Cell;
use crate::directed_string::DirectedStringTable;

bitflags::bitflags! {
    /// Per-line flags (`lflags` in spec terms).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct LineFlags: u8 {
        /// Set once a line has been written to since it was last
        /// exposed by a ring rotation; cleared by [`Line::reset`].
        const IS_LINE_USED = 1 << 0;
        /// The line's physical presentation direction is right-to-left.
        const RIGHT_TO_LEFT = 1 << 1;
    }
}

/// One row of the board: a contiguous run of [`Cell`] plus identity,
/// versioning, and the state a horizontal-scroll / bidi line needs.
#[derive(Debug, Clone)]
pub struct Line {
    cells: Vec<Cell>,
    id: u64,
    version: u64,
    pub lflags: LineFlags,
    pub home: u16,
    pub limit: u16,
    dstrings: DirectedStringTable,
}

impl Line {
    #[must_use]
    pub fn new(width: u16, id: u64) -> Self {
        Self {
            cells: vec![Cell::blank(crate::attribute::Attribute::default()); width as usize],
            id,
            version: 0,
            lflags: LineFlags::empty(),
            home: 0,
            limit: width,
            dstrings: DirectedStringTable::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[must_use]
    pub fn is_right_to_left(&self) -> bool {
        self.lflags.contains(LineFlags::RIGHT_TO_LEFT)
    }

    /// Re-initialize a ring slot for reuse under a freshly allocated
    /// `id`, at the given `width`. Called the first time a rotated-in
    /// line is written to.
    pub fn reset(&mut self, width: u16, id: u64) {
        self.cells.clear();
        self.cells
            .resize(width as usize, Cell::blank(crate::attribute::Attribute::default()));
        self.id = id;
        self.version = 0;
        self.lflags = LineFlags::empty();
        self.home = 0;
        self.limit = width;
        self.dstrings.clear();
    }

    pub fn touch(&mut self) {
        self.version += 1;
        self.lflags |= LineFlags::IS_LINE_USED;
    }

    #[must_use]
    pub fn directed_strings(&self) -> &DirectedStringTable {
        &self.dstrings
    }

    #[must_use]
    pub fn directed_strings_mut(&mut self) -> &mut DirectedStringTable {
        &mut self.dstrings
    }

    #[must_use]
    pub fn to_presentation_position(&self, x_data: u16) -> u16 {
        self.dstrings
            .to_presentation_position(self.cells.len() as u16, self.is_right_to_left(), x_data)
    }

    #[must_use]
    pub fn to_data_position(&self, p_pres: u16) -> u16 {
        self.dstrings
            .to_data_position(self.cells.len() as u16, self.is_right_to_left(), p_pres)
    }

    #[must_use]
    pub fn calculate_data_ranges_from_presentation_range(
        &self,
        pres_lo: u16,
        pres_hi: u16,
    ) -> Vec<(u16, u16)> {
        self.dstrings.calculate_data_ranges_from_presentation_range(
            self.cells.len() as u16,
            self.is_right_to_left(),
            pres_lo,
            pres_hi,
        )
    }

    /// Write `new_cells` contiguously at data column `x`, cleaning up
    /// any wide-character pair straddled at either edge and extending
    /// the line if the write runs past its current end.
    ///
    /// `dir` selects which edge `x` names: `+1` anchors the write at its
    /// left edge (the usual left-to-right case), `-1` anchors it at its
    /// right edge (`x` is the column just after the last cell written,
    /// used when writing backwards under SIMD).
    pub fn write_cells(&mut self, x: usize, new_cells: &[Cell], dir: i8) {
        if new_cells.is_empty() {
            return;
        }
        let w = new_cells.len();
        let start = if dir >= 0 {
            x
        } else {
            x.saturating_sub(w - 1)
        };
        let end = start + w;

        if end > self.cells.len() {
            self.cells.resize(
                end,
                Cell::blank(crate::attribute::Attribute::default()),
            );
        }

        self.clear_dangling_half_left(start);
        self.clear_dangling_half_right(end);

        self.cells[start..end].copy_from_slice(new_cells);
        self.touch();
    }

    fn clear_dangling_half_left(&mut self, pos: usize) {
        if pos >= self.cells.len() || !self.cells[pos].is_wide_extension() {
            return;
        }
        let attr = self.cells[pos].attr;
        let mut q = pos as isize - 1;
        while q >= 0 {
            let idx = q as usize;
            let is_wide = self.cells[idx].is_wide_extension() || self.cells[idx].is_wide_body();
            self.cells[idx] = Cell::printable(' ', attr);
            if !is_wide {
                break;
            }
            q -= 1;
        }
    }

    fn clear_dangling_half_right(&mut self, pos: usize) {
        let attr = if pos < self.cells.len() {
            self.cells[pos].attr
        } else {
            return;
        };
        let mut q = pos;
        while q < self.cells.len() && self.cells[q].is_wide_extension() {
            self.cells[q] = Cell::printable(' ', attr);
            q += 1;
        }
    }

    /// ECH: overwrite `count` cells starting at data column `at` with
    /// blanks of `attr`, without shifting anything. Cleans up wide
    /// pairs straddling either edge of the erased range.
    pub fn erase_chars(&mut self, at: usize, count: usize, attr: crate::attribute::Attribute) {
        let len = self.cells.len();
        let at = at.min(len);
        let end = at.saturating_add(count).min(len);
        if at >= end {
            return;
        }
        self.clear_dangling_half_left(at);
        self.clear_dangling_half_right(end);
        for c in &mut self.cells[at..end] {
            *c = Cell::blank(attr);
        }
        self.touch();
    }

    /// ICH: insert `count` blank cells of `attr` at data column `at`,
    /// shifting the cells from `at` onward to the right. The line keeps
    /// its current length — cells shifted past the end are dropped.
    pub fn insert_chars(&mut self, at: usize, count: usize, attr: crate::attribute::Attribute) {
        let len = self.cells.len();
        if len == 0 {
            return;
        }
        let at = at.min(len);
        self.clear_dangling_half_left(at);
        let n = count.min(len - at);
        for _ in 0..n {
            self.cells.pop();
            self.cells.insert(at, Cell::blank(attr));
        }
        self.touch();
    }

    /// DCH: delete `count` cells starting at data column `at`, shifting
    /// the remainder of the line left and padding the vacated columns
    /// at the end with blanks of `attr`.
    pub fn delete_chars(&mut self, at: usize, count: usize, attr: crate::attribute::Attribute) {
        let len = self.cells.len();
        if len == 0 {
            return;
        }
        let at = at.min(len);
        self.clear_dangling_half_left(at);
        let n = count.min(len - at);
        for _ in 0..n {
            self.cells.remove(at);
            self.cells.push(Cell::blank(attr));
        }
        self.touch();
    }

    /// Attach a zero-width cell (`cluster_extension` or `marker`, per
    /// [`Cell`]'s width invariant) adjacent to data column `at`,
    /// matching the implicit-movement direction `dir`: forward (`dir >=
    /// 0`) inserts just after `at` so marks already there stay in front
    /// of it; reverse (`dir < 0`) inserts just before `at`, absorbing
    /// it ahead of the cursor's next backward step. The line keeps its
    /// current length — the cell shifted off the far end is dropped.
    pub fn insert_zero_width(&mut self, at: usize, cell: Cell, dir: i8) {
        debug_assert_eq!(cell.width, 0);
        let len = self.cells.len();
        if len == 0 {
            return;
        }
        let at = at.min(len);
        if dir >= 0 {
            let pos = (at + 1).min(self.cells.len());
            self.cells.pop();
            self.cells.insert(pos, cell);
        } else {
            self.cells.insert(at, cell);
            self.cells.pop();
        }
        self.touch();
    }

    /// Truncate or pad the line to exactly `width` cells, used when the
    /// board is resized.
    pub fn resize(&mut self, width: u16) {
        self.cells.resize(
            width as usize,
            Cell::blank(crate::attribute::Attribute::default()),
        );
        self.limit = self.limit.min(width);
        self.touch();
    }
}
