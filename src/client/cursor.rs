use chess::{File, Rank, Square};

use crate::client::BoardMirror;

/// Keyboard navigation over the board: a 2-axis cursor plus a two-step
/// select-source / select-destination protocol on Enter.
///
/// Row 0 is the top of the rendered board (rank 8 from white's seat).
pub struct SquareCursor {
    row: usize,
    col: usize,
    source: Option<Square>,
}

impl Default for SquareCursor {
    fn default() -> Self {
        Self::new()
    }
}

impl SquareCursor {
    pub fn new() -> Self {
        SquareCursor {
            row: 0,
            col: 0,
            source: None,
        }
    }

    pub fn up(&mut self) {
        self.row = self.row.saturating_sub(1);
    }

    pub fn down(&mut self) {
        if self.row < 7 {
            self.row += 1;
        }
    }

    pub fn left(&mut self) {
        self.col = self.col.saturating_sub(1);
    }

    pub fn right(&mut self) {
        if self.col < 7 {
            self.col += 1;
        }
    }

    /// The square under the cursor.
    pub fn square(&self) -> Square {
        Square::make_square(Rank::from_index(7 - self.row), File::from_index(self.col))
    }

    pub fn source(&self) -> Option<Square> {
        self.source
    }

    /// Enter pressed. The first press picks up a selectable piece; the
    /// second resolves to a (source, destination) pair and funnels into
    /// the same submission path as drag-and-drop.
    pub fn press(&mut self, mirror: &BoardMirror) -> Option<(Square, Square)> {
        match self.source.take() {
            Some(source) => Some((source, self.square())),
            None => {
                if mirror.can_select(self.square()) {
                    self.source = Some(self.square());
                }
                None
            }
        }
    }
}
