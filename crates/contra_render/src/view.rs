use contra_model::{Attribute, Board, Cell, ColorSpec, TerminalModes};

/// Read-only window onto a terminal's current state, exactly what the
/// renderer needs and nothing it can mutate: dimensions, per-row
/// identity for scroll detection, presentation-ordered content, and the
/// cursor/DECTCEM/default-color state it has to reconcile on the remote
/// side.
pub trait TermView {
    fn width(&self) -> u16;
    fn height(&self) -> u16;
    fn line_id(&self, row: u16) -> u64;
    fn line_version(&self, row: u16) -> u64;
    fn get_cells_in_presentation(&self, row: u16) -> Vec<Cell>;
    fn cursor_position(&self) -> (u16, u16);
    fn cursor_visible(&self) -> bool;
    fn reverse_video(&self) -> bool;
    fn default_fg(&self) -> ColorSpec;
    fn default_bg(&self) -> ColorSpec;
}

impl TermView for Board {
    fn width(&self) -> u16 {
        Board::width(self)
    }

    fn height(&self) -> u16 {
        Board::height(self)
    }

    fn line_id(&self, row: u16) -> u64 {
        self.line(row).id()
    }

    fn line_version(&self, row: u16) -> u64 {
        self.line(row).version()
    }

    /// Reorder the line's data-order cells into presentation order by
    /// walking every presentation column through
    /// [`contra_model::Line::to_data_position`] — the directed-string
    /// table remaps coordinates without ever physically moving cells,
    /// so the renderer has to undo that remapping to get what a reader
    /// actually sees left to right.
    fn get_cells_in_presentation(&self, row: u16) -> Vec<Cell> {
        let line = self.line(row);
        let blank = Cell::blank(Attribute::default());
        (0..line.len() as u16)
            .map(|p| {
                let d = line.to_data_position(p);
                line.cells().get(d as usize).copied().unwrap_or(blank)
            })
            .collect()
    }

    fn cursor_position(&self) -> (u16, u16) {
        (self.cursor.x, self.cursor.y)
    }

    fn cursor_visible(&self) -> bool {
        self.tstate.modes.contains(TerminalModes::DECTCEM)
    }

    fn reverse_video(&self) -> bool {
        self.tstate.modes.contains(TerminalModes::DECSCNM)
    }

    fn default_fg(&self) -> ColorSpec {
        self.default_fg
    }

    fn default_bg(&self) -> ColorSpec {
        self.default_bg
    }
}
