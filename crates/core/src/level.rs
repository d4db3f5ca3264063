//! Level: the single owner of one running board.
//!
//! A `Level` owns the board, both pools, the timeline of pending
//! continuations, the countdown and the collaborators. Everything the
//! matching flow does goes through `&mut Level`, so there is no shared state
//! to keep consistent and no callback that can outlive its level.

use std::collections::VecDeque;

use crate::animator::{Animator, TweenTimings};
use crate::board::{Board, PartnerTable};
use crate::cars::{Car, CarPool};
use crate::containers::ContainerPool;
use crate::error::LevelDataError;
use crate::hole::Hole;
use crate::layout::Layout;
use crate::level_data::LevelData;
use crate::probe::{CorridorProbe, PathProbe};
use crate::timeline::{Continuation, Timeline};
use crate::timer::{CountdownTimer, TimerTick};
use crate::types::{CarId, FailReason, HoleId, LevelEvent, LevelStatus};

pub struct Level {
    pub(crate) board: Board,
    pub(crate) containers: ContainerPool,
    pub(crate) cars: CarPool,
    pub(crate) partners: PartnerTable,
    pub(crate) pending: VecDeque<HoleId>,
    pub(crate) status: LevelStatus,
    /// Only one fallback car may be on the road at a time.
    pub(crate) fallback_active: bool,
    /// Cars already in the fallback car's way when it set off.
    pub(crate) fallback_blockers: Vec<CarId>,
    pub(crate) timeline: Timeline,
    pub(crate) timer: CountdownTimer,
    pub(crate) events: Vec<LevelEvent>,
    pub(crate) probe: Box<dyn PathProbe>,
    pub(crate) animator: Box<dyn Animator>,
    name: Option<String>,
    timed: bool,
}

impl std::fmt::Debug for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Level")
            .field("name", &self.name)
            .field("status", &self.status)
            .field("holes_on_board", &self.board.hole_count())
            .field("cars", &self.cars.len())
            .field("pending", &self.pending)
            .field("fallback_active", &self.fallback_active)
            .finish_non_exhaustive()
    }
}

impl Level {
    /// Build a level with the default corridor probe and tween timings.
    pub fn load(data: &LevelData, layout: Layout) -> Result<Self, LevelDataError> {
        Self::with_collaborators(
            data,
            layout,
            Box::new(CorridorProbe::default()),
            Box::new(TweenTimings::default()),
        )
    }

    pub fn with_collaborators(
        data: &LevelData,
        layout: Layout,
        probe: Box<dyn PathProbe>,
        animator: Box<dyn Animator>,
    ) -> Result<Self, LevelDataError> {
        data.validate()?;

        let mut next_hole = 0u32;
        let columns: Vec<Vec<Hole>> = data
            .columns
            .iter()
            .map(|column| {
                column
                    .holes
                    .iter()
                    .map(|h| {
                        let id = HoleId(next_hole);
                        next_hole += 1;
                        Hole::new(id, h.color)
                            .with_special(h.special)
                            .with_mystery(h.mystery)
                    })
                    .collect()
            })
            .collect();
        let board = Board::new(columns, layout);
        let partners = board.pair_grouped();

        let containers = ContainerPool::new(
            (0..data.container_count).map(|i| layout.container_position(i, data.container_count)),
        );

        let cars = data
            .cars
            .iter()
            .enumerate()
            .map(|(i, c)| {
                Car::new(CarId(i as u32), c.color, c.start)
                    .with_model(c.model)
                    .with_path(c.path.clone())
            })
            .collect();

        let mut timer = CountdownTimer::new();
        if data.timed {
            timer.start(data.time_limit_secs);
        }

        log::info!(
            "loaded level {:?}: {} holes in {} columns, {} containers, {} cars",
            data.name,
            board.hole_count(),
            board.column_count(),
            data.container_count,
            data.cars.len()
        );

        Ok(Self {
            board,
            containers,
            cars: CarPool::new(cars),
            partners,
            pending: VecDeque::new(),
            status: LevelStatus::Playing,
            fallback_active: false,
            fallback_blockers: Vec::new(),
            timeline: Timeline::new(),
            timer,
            events: Vec::new(),
            probe,
            animator,
            name: data.name.clone(),
            timed: data.timed,
        })
    }

    /// Advance the countdown and run every continuation that has fallen due.
    pub fn tick(&mut self, elapsed_ms: u32) {
        if self.status.is_terminal() {
            return;
        }

        match self.timer.tick(elapsed_ms) {
            TimerTick::Warning => self.events.push(LevelEvent::TimerWarning {
                remaining_secs: self.timer.remaining_secs(),
            }),
            TimerTick::Expired => {
                self.fail(FailReason::TimeUp);
                return;
            }
            TimerTick::Running => {}
        }

        self.timeline.advance(elapsed_ms);
        while !self.status.is_terminal() {
            let Some(step) = self.timeline.pop_due() else {
                break;
            };
            self.run(step);
        }
    }

    /// Cancel everything still scheduled. Called before the level is dropped
    /// or replaced.
    pub fn teardown(&mut self) {
        let cancelled = self.timeline.cancel_all();
        self.timer.stop();
        self.pending.clear();
        log::debug!("level torn down, {cancelled} continuation(s) cancelled");
    }

    pub(crate) fn run(&mut self, step: Continuation) {
        match step {
            Continuation::HoleArrived {
                hole,
                container,
                skip_full_check,
            } => self.on_hole_arrived(hole, container, skip_full_check),
            Continuation::CarArrived { car } => self.on_car_arrived(car),
            Continuation::ContainerCleared { container } => self.on_container_cleared(container),
            Continuation::CarRemoved { car } => self.on_car_removed(car),
            Continuation::CarReturned { car } => self.on_car_returned(car),
            Continuation::Sweep => self.sweep(),
        }
    }

    pub(crate) fn fail(&mut self, reason: FailReason) {
        if self.status.is_terminal() {
            return;
        }
        self.status = LevelStatus::Failed(reason);
        self.timer.stop();
        self.events.push(LevelEvent::LevelFailed { reason });
        log::info!("level failed: {}", reason.as_str());
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn status(&self) -> LevelStatus {
        self.status
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn containers(&self) -> &ContainerPool {
        &self.containers
    }

    pub fn cars(&self) -> &CarPool {
        &self.cars
    }

    pub fn partners(&self) -> &PartnerTable {
        &self.partners
    }

    pub fn pending_partners(&self) -> impl Iterator<Item = HoleId> + '_ {
        self.pending.iter().copied()
    }

    pub fn is_fallback_active(&self) -> bool {
        self.fallback_active
    }

    pub fn is_timed(&self) -> bool {
        self.timed
    }

    /// Whole seconds left on the countdown, `None` for untimed levels.
    pub fn time_remaining_secs(&self) -> Option<u32> {
        self.timed.then(|| self.timer.remaining_secs())
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.timeline.now_ms()
    }

    /// Continuations still waiting on the timeline.
    pub fn pending_steps(&self) -> usize {
        self.timeline.pending()
    }

    /// Nothing is moving and nothing is scheduled.
    pub fn is_settled(&self) -> bool {
        self.timeline.is_idle()
    }

    pub fn drain_events(&mut self) -> std::vec::Drain<'_, LevelEvent> {
        self.events.drain(..)
    }
}
