//! Read-only view of a level for renderers and the AI adapter.

use serde::Serialize;

use crate::cars::CarState;
use crate::hole::{Hole, HoleState};
use crate::level::Level;
use crate::types::{CarId, ContainerId, HoleColor, HoleId, LevelStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct HoleView {
    pub id: HoleId,
    /// `None` while a mystery hole is still on the board.
    pub color: Option<HoleColor>,
    pub grouped: bool,
    pub partner: Option<HoleId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum HolePhase {
    Moving,
    Waiting,
    Claimed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ContainerView {
    pub id: ContainerId,
    pub hole: Option<HoleView>,
    pub phase: Option<HolePhase>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CarPhase {
    Parked,
    Driving,
    Returning,
    Falling,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct CarView {
    pub id: CarId,
    pub color: HoleColor,
    pub model: u8,
    pub phase: CarPhase,
    pub target: Option<ContainerId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct LevelSnapshot {
    pub status: LevelStatus,
    pub elapsed_ms: u64,
    pub time_remaining_secs: Option<u32>,
    pub timer_warning: bool,
    /// Columns front row first.
    pub columns: Vec<Vec<HoleView>>,
    pub containers: Vec<ContainerView>,
    pub cars: Vec<CarView>,
    pub pending_partners: Vec<HoleId>,
    pub fallback_active: bool,
}

impl LevelSnapshot {
    pub fn holes_on_board(&self) -> usize {
        self.columns.iter().map(Vec::len).sum()
    }

    pub fn empty_containers(&self) -> usize {
        self.containers.iter().filter(|c| c.hole.is_none()).count()
    }
}

impl Level {
    pub fn snapshot(&self) -> LevelSnapshot {
        let mut snap = LevelSnapshot::default();
        self.snapshot_into(&mut snap);
        snap
    }

    /// Fill an existing snapshot, reusing its allocations.
    pub fn snapshot_into(&self, out: &mut LevelSnapshot) {
        out.status = self.status;
        out.elapsed_ms = self.timeline.now_ms();
        out.time_remaining_secs = self.time_remaining_secs();
        out.timer_warning = self.is_timed() && self.timer.is_warning();
        out.fallback_active = self.fallback_active;

        out.columns.resize_with(self.board.column_count(), Vec::new);
        for (dst, holes) in out.columns.iter_mut().zip(self.board.columns()) {
            dst.clear();
            dst.extend(holes.iter().map(|h| self.hole_view(h)));
        }

        out.containers.clear();
        out.containers.extend(self.containers.iter().map(|c| {
            let hole = c.hole();
            ContainerView {
                id: c.id,
                hole: hole.map(|h| self.hole_view(h)),
                phase: hole.map(|h| match h.state {
                    HoleState::Claimed { .. } => HolePhase::Claimed,
                    HoleState::Waiting => HolePhase::Waiting,
                    HoleState::Moving | HoleState::OnBoard { .. } => HolePhase::Moving,
                }),
            }
        }));

        out.cars.clear();
        out.cars.extend(self.cars.iter().map(|car| {
            let (phase, target) = match car.state {
                CarState::Parked => (CarPhase::Parked, None),
                CarState::Driving { container, .. } => (CarPhase::Driving, Some(container)),
                CarState::Returning => (CarPhase::Returning, None),
                CarState::Falling { container, .. } => (CarPhase::Falling, Some(container)),
            };
            CarView {
                id: car.id,
                color: car.color,
                model: car.model,
                phase,
                target,
            }
        }));

        out.pending_partners.clear();
        out.pending_partners.extend(self.pending.iter().copied());
    }

    fn hole_view(&self, hole: &Hole) -> HoleView {
        HoleView {
            id: hole.id,
            color: hole.visible_color(),
            grouped: hole.is_grouped(),
            partner: self.partners.partner(hole.id),
        }
    }
}
