//! Match resolution: taps, hole arrivals, car dispatch and the global sweep.
//!
//! A hole goes through these steps:
//!
//! 1. tapped at the front of its column and moved into the nearest empty
//!    container (the column shifts forward at once),
//! 2. lands in the container ([`Continuation::HoleArrived`]),
//! 3. gets claimed by the nearest car of its colour with a clear route,
//! 4. the car arrives and falls in ([`Continuation::CarArrived`]),
//! 5. the container is released ([`Continuation::ContainerCleared`]) and the
//!    car leaves the pool ([`Continuation::CarRemoved`]).
//!
//! When no car with a clear route exists, the level either fails (every
//! container is full of waiting holes) or sends the nearest car of the colour
//! anyway as the single fallback move. A fallback car whose route is still
//! blocked when it gets there is bumped back home.

use arrayvec::ArrayVec;

use crate::cars::{CarState, Removal};
use crate::error::MoveError;
use crate::hole::HoleState;
use crate::level::Level;
use crate::timeline::Continuation;
use crate::types::{
    CarId, ContainerId, FailReason, HoleColor, HoleId, LevelEvent, LevelStatus, Vec3,
    SWEEP_DELAY_MS,
};

/// What a tap did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TapOutcome {
    /// Holes that left the board, tapped hole first.
    pub moved: ArrayVec<HoleId, 2>,
    /// Grouped partner left behind to wait for a free container.
    pub queued: Option<HoleId>,
}

impl TapOutcome {
    /// Nothing moved and nothing was queued.
    pub fn is_ignored(&self) -> bool {
        self.moved.is_empty() && self.queued.is_none()
    }
}

impl Level {
    /// Tap the front hole of a column.
    pub fn tap_column(&mut self, column: usize) -> Result<TapOutcome, MoveError> {
        if self.status.is_terminal() {
            return Err(MoveError::LevelOver);
        }
        let hole = self.board.front(column).ok_or(MoveError::NotEligible)?.id;
        self.tap(hole)
    }

    /// Tap a hole. Only front-row holes react; grouped holes try to take the
    /// partner directly behind them along.
    pub fn tap(&mut self, hole: HoleId) -> Result<TapOutcome, MoveError> {
        if self.status.is_terminal() {
            return Err(MoveError::LevelOver);
        }
        let tapped = self.board.hole(hole).ok_or(MoveError::NotEligible)?;
        let HoleState::OnBoard { column, row: 0 } = tapped.state else {
            return Err(MoveError::NotEligible);
        };
        let partner = if tapped.is_grouped() {
            self.partners
                .partner(hole)
                .filter(|&p| self.board.locate(p) == Some((column, 1)))
        } else {
            None
        };

        let mut outcome = TapOutcome::default();
        let Some(partner) = partner else {
            outcome.moved.push(self.move_front(column, false)?);
            return Ok(outcome);
        };

        match self.containers.count_empty() {
            0 => {
                log::debug!("grouped tap on {hole} ignored, no empty container");
            }
            1 => {
                outcome.moved.push(self.move_front(column, false)?);
                if self.enqueue_partner(partner) {
                    outcome.queued = Some(partner);
                }
            }
            _ => {
                outcome.moved.push(self.move_front(column, false)?);
                if !self.status.is_terminal() {
                    match self.move_front(column, true) {
                        Ok(id) => outcome.moved.push(id),
                        Err(e) => log::warn!("partner {partner} of {hole} did not move: {e}"),
                    }
                }
            }
        }
        Ok(outcome)
    }

    fn enqueue_partner(&mut self, partner: HoleId) -> bool {
        if self.pending.contains(&partner) {
            return false;
        }
        self.pending.push_back(partner);
        self.events.push(LevelEvent::PartnerQueued { hole: partner });
        log::debug!("partner {partner} queued for a free container");
        true
    }

    /// Move the front hole of `column` into the nearest empty container.
    ///
    /// Board, container and column shift are updated before this returns;
    /// only the landing is deferred.
    fn move_front(&mut self, column: usize, skip_full_check: bool) -> Result<HoleId, MoveError> {
        let origin = self.board.front(column).ok_or(MoveError::NotEligible)?.position;
        let Some(container) = self
            .containers
            .find_nearest_empty(|c| c.position.distance(origin))
        else {
            self.events.push(LevelEvent::NoSpaceAvailable);
            return Err(MoveError::NoContainerAvailable);
        };
        let target = self
            .containers
            .get(container)
            .map(|c| c.position)
            .unwrap_or(origin);

        let mut hole = self
            .board
            .remove_front(column)
            .map_err(|_| MoveError::NotEligible)?;
        let id = hole.id;
        let revealed = hole.mystery.then_some(hole.color);
        hole.mystery = false;
        hole.state = HoleState::Moving;

        if let Err(err) = self.containers.occupy(container, hole) {
            log::error!("could not place {id} into {container}: {err}");
            self.board.restore_front(column, err.into_rejected());
            return Err(MoveError::NoContainerAvailable);
        }
        self.board.shift_forward(column);

        if let Some(color) = revealed {
            self.events.push(LevelEvent::HoleRevealed { hole: id, color });
        }
        self.events.push(LevelEvent::HoleMoved { hole: id, container });

        let duration = self.animator.hole_move_ms(id, origin, target);
        self.timeline.schedule(
            duration,
            Continuation::HoleArrived {
                hole: id,
                container,
                skip_full_check,
            },
        );
        log::debug!("{id} moving from column {column} to {container} ({duration}ms)");
        Ok(id)
    }

    pub(crate) fn on_hole_arrived(
        &mut self,
        hole: HoleId,
        container: ContainerId,
        skip_full_check: bool,
    ) {
        let Some(slot) = self.containers.get_mut(container) else {
            return;
        };
        let position = slot.position;
        let Some(landed) = slot
            .hole_mut()
            .filter(|h| h.id == hole && h.state == HoleState::Moving)
        else {
            log::debug!("stale arrival of {hole} at {container}");
            return;
        };
        landed.state = HoleState::Waiting;
        landed.position = position;
        let color = landed.color;
        self.events.push(LevelEvent::HolePlaced { hole, container });

        self.match_arrival(container, color, position, skip_full_check);
    }

    fn match_arrival(
        &mut self,
        container: ContainerId,
        color: HoleColor,
        target: Vec3,
        skip_full_check: bool,
    ) {
        if let Some(car) = self
            .cars
            .find_closest_unblocked(color, target, self.probe.as_ref())
        {
            if self.fallback_active {
                log::debug!("{container} waits for the fallback move to finish");
                return;
            }
            self.dispatch(car, container, false);
            self.timeline.schedule_sweep(SWEEP_DELAY_MS);
            return;
        }

        if !skip_full_check && self.containers.are_all_full() {
            self.fail(FailReason::NoSpace);
            return;
        }

        if !self.fallback_active && !self.dispatch_fallback(container, color, target) {
            log::info!("no {color} car available for {container}");
        }
        self.timeline.schedule_sweep(SWEEP_DELAY_MS);
    }

    /// Send the nearest car of `color` regardless of what stands in its way.
    /// Remembers the cars blocking it now, so only a new obstacle bumps it.
    fn dispatch_fallback(
        &mut self,
        container: ContainerId,
        color: HoleColor,
        target: Vec3,
    ) -> bool {
        let Some(car) = self.cars.find_closest_any(color, target) else {
            return false;
        };
        self.fallback_blockers = self
            .cars
            .get(car)
            .map(|driver| self.probe.blockers(driver, target, &self.cars))
            .unwrap_or_default();
        self.fallback_active = true;
        self.dispatch(car, container, true);
        true
    }

    fn dispatch(&mut self, car: CarId, container: ContainerId, fallback: bool) {
        let Some(slot) = self.containers.get_mut(container) else {
            return;
        };
        let target = slot.position;
        let Some(hole) = slot.hole_mut() else {
            return;
        };
        let Some(driver) = self.cars.get_mut(car) else {
            return;
        };
        hole.state = HoleState::Claimed { car };
        driver.state = CarState::Driving {
            container,
            hole: hole.id,
            fallback,
        };
        let duration = self.animator.car_drive_ms(driver, target);
        self.timeline.schedule(duration, Continuation::CarArrived { car });
        self.events.push(LevelEvent::CarDispatched {
            car,
            container,
            fallback,
        });
        log::debug!("{car} dispatched to {container} ({duration}ms, fallback={fallback})");
    }

    pub(crate) fn on_car_arrived(&mut self, car: CarId) {
        let Some(driver) = self.cars.get(car) else {
            return;
        };
        let CarState::Driving {
            container,
            hole,
            fallback,
        } = driver.state
        else {
            return;
        };
        let Some(target) = self.containers.get(container).map(|c| c.position) else {
            return;
        };

        if fallback {
            let blockers = self.probe.blockers(driver, target, &self.cars);
            let obstacle = blockers
                .iter()
                .find(|b| !self.fallback_blockers.contains(*b));
            if let Some(obstacle) = obstacle {
                log::debug!("{obstacle} moved into the way of {car}");
                self.bump(car, container, hole);
                return;
            }
            self.fallback_active = false;
            self.fallback_blockers.clear();
        }
        if let Some(driver) = self.cars.get_mut(car) {
            driver.state = CarState::Falling { container, hole };
            driver.position = target;
        }
        let cleanup = self.animator.container_cleanup_ms();
        let fall = self.animator.car_fall_ms();
        self.timeline
            .schedule(cleanup, Continuation::ContainerCleared { container });
        self.timeline.schedule(fall, Continuation::CarRemoved { car });
        self.events.push(LevelEvent::CarDelivered { car, container });
        self.timeline.schedule_sweep(0);
    }

    /// A fallback car hit another car on the way: the hole becomes available
    /// again and the car drives home.
    fn bump(&mut self, car: CarId, container: ContainerId, hole: HoleId) {
        if let Some(h) = self
            .containers
            .get_mut(container)
            .and_then(|c| c.hole_mut())
            .filter(|h| h.id == hole)
        {
            h.state = HoleState::Waiting;
        }
        let Some(driver) = self.cars.get_mut(car) else {
            return;
        };
        driver.state = CarState::Returning;
        let duration = self.animator.car_return_ms(driver);
        self.timeline
            .schedule(duration, Continuation::CarReturned { car });
        self.events.push(LevelEvent::CarBumped { car });
        log::debug!("{car} bumped on the way to {container}");
    }

    pub(crate) fn on_car_returned(&mut self, car: CarId) {
        let Some(driver) = self.cars.get_mut(car) else {
            return;
        };
        if driver.state != CarState::Returning {
            return;
        }
        driver.state = CarState::Parked;
        driver.position = driver.start;
        self.fallback_active = false;
        self.fallback_blockers.clear();
        self.events.push(LevelEvent::CarReturned { car });
        self.sweep();
    }

    pub(crate) fn on_container_cleared(&mut self, container: ContainerId) {
        let claimed = self
            .containers
            .get(container)
            .and_then(|c| c.hole())
            .is_some_and(|h| matches!(h.state, HoleState::Claimed { .. }));
        if !claimed {
            return;
        }
        if let Some(hole) = self.containers.release(container) {
            self.partners.forget(hole.id);
            self.events.push(LevelEvent::HoleCleared {
                hole: hole.id,
                container,
            });
        }
        self.check_pending_partners();
        self.sweep();
    }

    pub(crate) fn on_car_removed(&mut self, car: CarId) {
        match self.cars.remove(car) {
            Removal::NotFound => {}
            Removal::Removed => self.events.push(LevelEvent::CarRemoved { car }),
            Removal::Emptied => {
                self.events.push(LevelEvent::CarRemoved { car });
                self.on_pool_emptied();
            }
        }
    }

    /// Declare the level won once the car pool is empty. Returns whether this
    /// call did it; later calls and calls after a failure do nothing.
    pub fn on_pool_emptied(&mut self) -> bool {
        if self.status != LevelStatus::Playing || !self.cars.is_empty() {
            return false;
        }
        self.status = LevelStatus::Won;
        self.timer.stop();
        self.events.push(LevelEvent::LevelWon);
        log::info!("level won after {}ms", self.timeline.now_ms());
        true
    }

    /// Move queued partners while containers are free. Entries are consumed
    /// whether or not they can still move.
    fn check_pending_partners(&mut self) {
        while self.containers.count_empty() > 0 && !self.status.is_terminal() {
            let Some(hole) = self.pending.pop_front() else {
                break;
            };
            match self.board.hole(hole).map(|h| h.state) {
                Some(HoleState::OnBoard { column, row: 0 }) => {
                    if let Err(e) = self.move_front(column, true) {
                        log::debug!("queued partner {hole} did not move: {e}");
                    }
                }
                _ => log::debug!("dropping queued partner {hole}, no longer at the front"),
            }
        }
    }

    /// Offer every waiting hole to a car with a clear route. Fails the level
    /// when nothing matched and every container is full of waiting holes;
    /// otherwise a free fallback gate sends one car the blocked way.
    pub(crate) fn sweep(&mut self) {
        if self.status.is_terminal() {
            return;
        }
        let waiting: Vec<(ContainerId, HoleColor, Vec3)> = self
            .containers
            .waiting()
            .filter_map(|c| c.hole().map(|h| (c.id, h.color, c.position)))
            .collect();

        let mut matched = false;
        for &(container, color, target) in &waiting {
            if let Some(car) = self
                .cars
                .find_closest_unblocked(color, target, self.probe.as_ref())
            {
                self.dispatch(car, container, false);
                matched = true;
            }
        }

        if matched {
            self.timeline.schedule_sweep(0);
        } else if self.containers.are_all_full() {
            self.fail(FailReason::NoSpace);
        } else if !self.fallback_active {
            for (container, color, target) in waiting {
                if self.dispatch_fallback(container, color, target) {
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animator::TweenTimings;
    use crate::layout::Layout;
    use crate::level_data::{CarData, ColumnData, HoleData, LevelData};
    use crate::probe::OpenRoad;

    fn level(columns: Vec<Vec<HoleData>>, containers: usize, cars: &[HoleColor]) -> Level {
        let data = LevelData {
            columns: columns
                .into_iter()
                .map(|holes| ColumnData { holes })
                .collect(),
            container_count: containers,
            timed: false,
            cars: cars
                .iter()
                .enumerate()
                .map(|(i, &c)| CarData::new(c, Vec3::new(i as f32 * 2.0, 0.0, 10.0)))
                .collect(),
            ..LevelData::default()
        };
        Level::with_collaborators(
            &data,
            Layout::default(),
            Box::new(OpenRoad),
            Box::new(TweenTimings::default()),
        )
        .unwrap()
    }

    #[test]
    fn tap_moves_and_shifts_immediately() {
        let mut lvl = level(
            vec![vec![HoleData::plain(HoleColor::Red), HoleData::plain(HoleColor::Blue)]],
            2,
            &[HoleColor::Red, HoleColor::Blue],
        );
        let out = lvl.tap_column(0).unwrap();
        assert_eq!(out.moved.as_slice(), &[HoleId(0)]);
        assert!(lvl.board().front(0).unwrap().is_front_row());
        assert_eq!(lvl.board().front(0).unwrap().id, HoleId(1));
        let placed = lvl.containers().holding(HoleId(0)).unwrap();
        assert_eq!(placed.hole().unwrap().state, HoleState::Moving);
    }

    #[test]
    fn back_row_tap_is_not_eligible() {
        let mut lvl = level(
            vec![vec![HoleData::plain(HoleColor::Red), HoleData::plain(HoleColor::Red)]],
            1,
            &[HoleColor::Red],
        );
        assert_eq!(lvl.tap(HoleId(1)), Err(MoveError::NotEligible));
        assert_eq!(lvl.tap_column(3), Err(MoveError::NotEligible));
    }

    #[test]
    fn arrival_dispatches_matching_car() {
        let mut lvl = level(vec![vec![HoleData::plain(HoleColor::Red)]], 1, &[HoleColor::Red]);
        lvl.tap_column(0).unwrap();
        lvl.tick(crate::types::HOLE_MOVE_MS);
        let car = lvl.cars().get(CarId(0)).unwrap();
        assert!(matches!(car.state, CarState::Driving { fallback: false, .. }));
        assert!(!lvl.containers().get(ContainerId(0)).unwrap().hole().unwrap().is_available());
    }

    #[test]
    fn win_is_declared_once() {
        let mut lvl = level(vec![vec![HoleData::plain(HoleColor::Red)]], 1, &[HoleColor::Red]);
        lvl.tap_column(0).unwrap();
        for _ in 0..400 {
            lvl.tick(crate::types::TICK_MS);
        }
        assert_eq!(lvl.status(), LevelStatus::Won);
        assert!(!lvl.on_pool_emptied());
        let wins = lvl
            .drain_events()
            .filter(|e| *e == LevelEvent::LevelWon)
            .count();
        assert_eq!(wins, 1);
    }

    #[test]
    fn stale_pending_entry_is_dropped_without_a_move() {
        let mut lvl = level(
            vec![vec![
                HoleData::plain(HoleColor::Red),
                HoleData::plain(HoleColor::Red),
            ]],
            1,
            &[HoleColor::Red, HoleColor::Red],
        );
        // Hole 1 sits behind hole 0, so it cannot move when its turn comes.
        lvl.pending.push_back(HoleId(1));
        lvl.check_pending_partners();

        assert_eq!(lvl.pending_partners().count(), 0);
        assert_eq!(lvl.board().hole_count(), 2);
        assert_eq!(lvl.containers().count_empty(), 1);
    }

    #[test]
    fn enqueue_is_at_most_once() {
        let mut lvl = level(vec![vec![HoleData::plain(HoleColor::Red)]], 1, &[HoleColor::Red]);
        assert!(lvl.enqueue_partner(HoleId(0)));
        assert!(!lvl.enqueue_partner(HoleId(0)));
        assert_eq!(lvl.pending_partners().count(), 1);
    }
}
