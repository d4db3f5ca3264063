//! Container pool: the fixed row of slots holes fly into.

use crate::error::ContainerError;
use crate::hole::{Hole, HoleState};
use crate::types::{ContainerId, HoleId, Vec3};

#[derive(Debug, Clone)]
pub struct Container {
    pub id: ContainerId,
    pub position: Vec3,
    slot: Option<Hole>,
}

impl Container {
    pub fn new(id: ContainerId, position: Vec3) -> Self {
        Self {
            id,
            position,
            slot: None,
        }
    }

    pub fn hole(&self) -> Option<&Hole> {
        self.slot.as_ref()
    }

    pub fn hole_mut(&mut self) -> Option<&mut Hole> {
        self.slot.as_mut()
    }

    pub fn is_empty(&self) -> bool {
        self.slot.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ContainerPool {
    containers: Vec<Container>,
}

impl ContainerPool {
    pub fn new(positions: impl IntoIterator<Item = Vec3>) -> Self {
        let containers = positions
            .into_iter()
            .enumerate()
            .map(|(i, p)| Container::new(ContainerId(i as u32), p))
            .collect();
        Self { containers }
    }

    pub fn len(&self) -> usize {
        self.containers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Container> {
        self.containers.iter()
    }

    pub fn get(&self, id: ContainerId) -> Option<&Container> {
        self.containers.get(id.0 as usize)
    }

    pub fn get_mut(&mut self, id: ContainerId) -> Option<&mut Container> {
        self.containers.get_mut(id.0 as usize)
    }

    /// Container currently holding the given hole.
    pub fn holding(&self, hole: HoleId) -> Option<&Container> {
        self.containers
            .iter()
            .find(|c| c.hole().is_some_and(|h| h.id == hole))
    }

    /// Nearest empty container by the caller's metric. Scans in index order
    /// and keeps the first of equally distant candidates.
    pub fn find_nearest_empty(&self, metric: impl Fn(&Container) -> f32) -> Option<ContainerId> {
        let mut best: Option<(ContainerId, f32)> = None;
        for container in self.containers.iter().filter(|c| c.is_empty()) {
            let d = metric(container);
            match best {
                Some((_, best_d)) if d >= best_d => {}
                _ => best = Some((container.id, d)),
            }
        }
        best.map(|(id, _)| id)
    }

    /// Place a hole in an empty container. On failure nothing is mutated and
    /// the hole comes back inside the error.
    pub fn occupy(&mut self, id: ContainerId, hole: Hole) -> Result<(), ContainerError> {
        let Some(container) = self.containers.get_mut(id.0 as usize) else {
            return Err(ContainerError::UnknownContainer {
                container: id,
                rejected: Box::new(hole),
            });
        };
        if container.slot.is_some() {
            return Err(ContainerError::AlreadyOccupied {
                container: id,
                rejected: Box::new(hole),
            });
        }
        container.slot = Some(hole);
        Ok(())
    }

    /// Empty a container, returning whatever it held. Releasing an empty or
    /// unknown container is a no-op.
    pub fn release(&mut self, id: ContainerId) -> Option<Hole> {
        self.containers
            .get_mut(id.0 as usize)
            .and_then(|c| c.slot.take())
    }

    pub fn count_empty(&self) -> usize {
        self.containers.iter().filter(|c| c.is_empty()).count()
    }

    /// Every container holds a hole that has landed and is still waiting for
    /// a car. Holes in flight or already claimed keep this false.
    pub fn are_all_full(&self) -> bool {
        !self.containers.is_empty()
            && self.containers.iter().all(|c| {
                c.hole()
                    .is_some_and(|h| h.is_available() && h.is_on_container())
            })
    }

    /// Containers whose hole is resting and unclaimed, in index order.
    pub fn waiting(&self) -> impl Iterator<Item = &Container> {
        self.containers
            .iter()
            .filter(|c| c.hole().is_some_and(|h| h.state == HoleState::Waiting))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CarId, HoleColor};

    fn pool(n: usize) -> ContainerPool {
        ContainerPool::new((0..n).map(|i| Vec3::new(i as f32 * 3.0, 1.0, 5.0)))
    }

    fn hole(id: u32, state: HoleState) -> Hole {
        let mut h = Hole::new(HoleId(id), HoleColor::Red);
        h.state = state;
        h
    }

    #[test]
    fn nearest_empty_prefers_first_on_ties() {
        let pool = pool(3);
        assert_eq!(pool.find_nearest_empty(|_| 1.0), Some(ContainerId(0)));
        let target = Vec3::new(6.0, 1.0, 5.0);
        assert_eq!(
            pool.find_nearest_empty(|c| c.position.distance(target)),
            Some(ContainerId(2))
        );
    }

    #[test]
    fn nearest_empty_skips_occupied() {
        let mut pool = pool(2);
        pool.occupy(ContainerId(0), hole(1, HoleState::Moving)).unwrap();
        assert_eq!(pool.find_nearest_empty(|_| 0.0), Some(ContainerId(1)));
        pool.occupy(ContainerId(1), hole(2, HoleState::Moving)).unwrap();
        assert_eq!(pool.find_nearest_empty(|_| 0.0), None);
    }

    #[test]
    fn occupy_rejects_without_mutation() {
        let mut pool = pool(1);
        pool.occupy(ContainerId(0), hole(1, HoleState::Moving)).unwrap();
        let err = pool
            .occupy(ContainerId(0), hole(2, HoleState::Moving))
            .unwrap_err();
        match err {
            ContainerError::AlreadyOccupied { container, rejected } => {
                assert_eq!(container, ContainerId(0));
                assert_eq!(rejected.id, HoleId(2));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(pool.get(ContainerId(0)).unwrap().hole().unwrap().id, HoleId(1));
    }

    #[test]
    fn release_is_idempotent() {
        let mut pool = pool(1);
        pool.occupy(ContainerId(0), hole(1, HoleState::Waiting)).unwrap();
        assert!(pool.release(ContainerId(0)).is_some());
        assert!(pool.release(ContainerId(0)).is_none());
        assert_eq!(pool.count_empty(), 1);
    }

    #[test]
    fn all_full_requires_waiting_holes() {
        let mut pool = pool(2);
        pool.occupy(ContainerId(0), hole(1, HoleState::Waiting)).unwrap();
        assert!(!pool.are_all_full());

        pool.occupy(ContainerId(1), hole(2, HoleState::Moving)).unwrap();
        assert!(!pool.are_all_full(), "hole in flight is not resting yet");

        pool.get_mut(ContainerId(1)).unwrap().hole_mut().unwrap().state =
            HoleState::Claimed { car: CarId(0) };
        assert!(!pool.are_all_full(), "claimed hole is about to be cleared");

        pool.get_mut(ContainerId(1)).unwrap().hole_mut().unwrap().state = HoleState::Waiting;
        assert!(pool.are_all_full());
    }
}
