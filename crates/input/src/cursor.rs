//! Column cursor for keyboard play.

/// Selected column, clamped to the board width.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnCursor {
    column: usize,
}

impl ColumnCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn left(&mut self) {
        self.column = self.column.saturating_sub(1);
    }

    pub fn right(&mut self, column_count: usize) {
        if self.column + 1 < column_count {
            self.column += 1;
        }
    }

    /// Jump to a column, ignoring out-of-range requests.
    pub fn select(&mut self, column: usize, column_count: usize) {
        if column < column_count {
            self.column = column;
        }
    }

    /// Pull the cursor back inside a board that got narrower.
    pub fn clamp(&mut self, column_count: usize) {
        self.column = self.column.min(column_count.saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_stays_on_board() {
        let mut cursor = ColumnCursor::new();
        cursor.left();
        assert_eq!(cursor.column(), 0);
        cursor.right(3);
        cursor.right(3);
        cursor.right(3);
        assert_eq!(cursor.column(), 2);
        cursor.select(7, 3);
        assert_eq!(cursor.column(), 2);
        cursor.clamp(1);
        assert_eq!(cursor.column(), 0);
    }
}
