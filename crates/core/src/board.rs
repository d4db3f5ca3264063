//! Board: columns of holes waiting to be tapped.
//!
//! Row 0 of each column is the front row. Removing the front hole leaves a gap
//! until [`Board::shift_forward`] compacts the column again.

use std::collections::HashMap;

use crate::error::BoardError;
use crate::hole::{Hole, HoleState};
use crate::layout::Layout;
use crate::types::HoleId;

#[derive(Debug, Clone)]
pub struct Board {
    columns: Vec<Vec<Hole>>,
    layout: Layout,
}

impl Board {
    /// Build a board from columns of holes. Rows and positions are assigned
    /// from each hole's index in its column.
    pub fn new(columns: Vec<Vec<Hole>>, layout: Layout) -> Self {
        let mut board = Self { columns, layout };
        for column in 0..board.columns.len() {
            board.shift_forward(column);
        }
        board
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, column: usize) -> Option<&[Hole]> {
        self.columns.get(column).map(Vec::as_slice)
    }

    pub fn columns(&self) -> impl Iterator<Item = &[Hole]> {
        self.columns.iter().map(Vec::as_slice)
    }

    /// Front hole of a column, if the column exists and has one.
    pub fn front(&self, column: usize) -> Option<&Hole> {
        self.columns.get(column).and_then(|c| c.first())
    }

    pub fn hole(&self, id: HoleId) -> Option<&Hole> {
        self.columns.iter().flatten().find(|h| h.id == id)
    }

    /// Column and array index of a hole still on the board.
    pub fn locate(&self, id: HoleId) -> Option<(usize, usize)> {
        self.columns.iter().enumerate().find_map(|(c, holes)| {
            holes.iter().position(|h| h.id == id).map(|r| (c, r))
        })
    }

    pub fn hole_count(&self) -> usize {
        self.columns.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.iter().all(Vec::is_empty)
    }

    /// Take the front hole out of a column. Remaining holes keep their old
    /// row numbers until [`Board::shift_forward`] runs.
    pub fn remove_front(&mut self, column: usize) -> Result<Hole, BoardError> {
        let holes = self
            .columns
            .get_mut(column)
            .ok_or(BoardError::UnknownColumn(column))?;
        if holes.is_empty() {
            return Err(BoardError::EmptyColumn(column));
        }
        Ok(holes.remove(0))
    }

    /// Put a hole back at the front of a column (undo of `remove_front`).
    pub fn restore_front(&mut self, column: usize, hole: Hole) {
        if let Some(holes) = self.columns.get_mut(column) {
            holes.insert(0, hole);
            self.shift_forward(column);
        }
    }

    /// Renumber a column so row index equals array position and recompute
    /// positions. Only row 0 is front row afterwards.
    pub fn shift_forward(&mut self, column: usize) {
        let column_count = self.columns.len();
        let layout = self.layout;
        if let Some(holes) = self.columns.get_mut(column) {
            for (row, hole) in holes.iter_mut().enumerate() {
                hole.state = HoleState::OnBoard { column, row };
                hole.position = layout.hole_position(column, row, column_count);
            }
        }
    }

    /// Pair every grouped hole with the hole directly behind it. Pairs never
    /// overlap: once a hole is someone's partner it cannot start a new pair.
    pub fn pair_grouped(&self) -> PartnerTable {
        let mut table = PartnerTable::default();
        for holes in &self.columns {
            let mut row = 0;
            while row < holes.len() {
                let hole = &holes[row];
                if hole.is_grouped() && !table.contains(hole.id) {
                    if let Some(behind) = holes.get(row + 1) {
                        table.link(hole.id, behind.id);
                        row += 2;
                        continue;
                    }
                    log::warn!("grouped hole {} has no hole behind it", hole.id);
                }
                row += 1;
            }
        }
        table
    }
}

/// Symmetric hole → partner side table for grouped holes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartnerTable {
    partners: HashMap<HoleId, HoleId>,
}

impl PartnerTable {
    pub fn link(&mut self, a: HoleId, b: HoleId) {
        self.partners.insert(a, b);
        self.partners.insert(b, a);
    }

    pub fn partner(&self, id: HoleId) -> Option<HoleId> {
        self.partners.get(&id).copied()
    }

    pub fn contains(&self, id: HoleId) -> bool {
        self.partners.contains_key(&id)
    }

    /// Drop a destroyed hole and the back-reference its partner holds.
    pub fn forget(&mut self, id: HoleId) {
        if let Some(partner) = self.partners.remove(&id) {
            if self.partners.get(&partner) == Some(&id) {
                self.partners.remove(&partner);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.partners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.partners.is_empty()
    }
}
