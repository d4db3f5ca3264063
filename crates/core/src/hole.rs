//! Holes and their lifecycle states.

use crate::types::{CarId, HoleColor, HoleId, SpecialKind, Vec3};

/// Where a hole is in its lifecycle.
///
/// This replaces independent availability / on-container / front-row flags:
/// every combination the matcher cares about is one variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoleState {
    /// Sitting on the board. Front row iff `row == 0`.
    OnBoard { column: usize, row: usize },
    /// Left the board and is flying into its container.
    Moving,
    /// Resting in its container, waiting for a car.
    Waiting,
    /// A car is driving into it.
    Claimed { car: CarId },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Hole {
    pub id: HoleId,
    pub color: HoleColor,
    pub special: SpecialKind,
    /// Colour is hidden until the hole leaves the board.
    pub mystery: bool,
    pub position: Vec3,
    pub state: HoleState,
}

impl Hole {
    pub fn new(id: HoleId, color: HoleColor) -> Self {
        Self {
            id,
            color,
            special: SpecialKind::None,
            mystery: false,
            position: Vec3::ZERO,
            state: HoleState::OnBoard { column: 0, row: 0 },
        }
    }

    pub fn with_special(mut self, special: SpecialKind) -> Self {
        self.special = special;
        self
    }

    pub fn with_mystery(mut self, mystery: bool) -> Self {
        self.mystery = mystery;
        self
    }

    /// Not yet claimed by a car.
    pub fn is_available(&self) -> bool {
        !matches!(self.state, HoleState::Claimed { .. })
    }

    /// Has finished its flight into a container.
    pub fn is_on_container(&self) -> bool {
        matches!(self.state, HoleState::Waiting | HoleState::Claimed { .. })
    }

    pub fn is_front_row(&self) -> bool {
        matches!(self.state, HoleState::OnBoard { row: 0, .. })
    }

    pub fn is_grouped(&self) -> bool {
        self.special == SpecialKind::Grouped
    }

    /// Colour as a player may see it right now.
    pub fn visible_color(&self) -> Option<HoleColor> {
        if self.mystery {
            None
        } else {
            Some(self.color)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_flags_follow_variant() {
        let mut hole = Hole::new(HoleId(1), HoleColor::Red);
        assert!(hole.is_available());
        assert!(hole.is_front_row());
        assert!(!hole.is_on_container());

        hole.state = HoleState::OnBoard { column: 0, row: 2 };
        assert!(!hole.is_front_row());

        hole.state = HoleState::Moving;
        assert!(hole.is_available());
        assert!(!hole.is_on_container());

        hole.state = HoleState::Waiting;
        assert!(hole.is_available());
        assert!(hole.is_on_container());

        hole.state = HoleState::Claimed { car: CarId(0) };
        assert!(!hole.is_available());
        assert!(hole.is_on_container());
    }

    #[test]
    fn mystery_hides_color() {
        let hole = Hole::new(HoleId(1), HoleColor::Blue).with_mystery(true);
        assert_eq!(hole.visible_color(), None);
    }
}
