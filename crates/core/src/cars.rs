//! Car pool: parked cars waiting to be sent into matching holes.

use crate::probe::PathProbe;
use crate::types::{CarId, ContainerId, HoleColor, HoleId, Vec3};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarState {
    /// Parked at its start position and free to be dispatched.
    Parked,
    /// Driving towards a container.
    Driving {
        container: ContainerId,
        hole: HoleId,
        fallback: bool,
    },
    /// Bumped into another car and heading back to its start.
    Returning,
    /// Falling into its hole; removed from the pool once the fall ends.
    Falling { container: ContainerId, hole: HoleId },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Car {
    pub id: CarId,
    pub color: HoleColor,
    pub model: u8,
    pub start: Vec3,
    /// Waypoints driven through before heading to the target container.
    pub path: Vec<Vec3>,
    pub position: Vec3,
    pub state: CarState,
}

impl Car {
    pub fn new(id: CarId, color: HoleColor, start: Vec3) -> Self {
        Self {
            id,
            color,
            model: 1,
            start,
            path: Vec::new(),
            position: start,
            state: CarState::Parked,
        }
    }

    pub fn with_path(mut self, path: Vec<Vec3>) -> Self {
        self.path = path;
        self
    }

    pub fn with_model(mut self, model: u8) -> Self {
        self.model = model;
        self
    }

    pub fn is_available(&self) -> bool {
        self.state == CarState::Parked
    }

    /// Points driven through from the current position to `target`.
    pub fn route(&self, target: Vec3) -> impl Iterator<Item = Vec3> + '_ {
        std::iter::once(self.position)
            .chain(self.path.iter().copied())
            .chain(std::iter::once(target))
    }

    pub fn route_length(&self, target: Vec3) -> f32 {
        let mut length = 0.0;
        let mut prev = self.position;
        for point in self.route(target).skip(1) {
            length += prev.distance(point);
            prev = point;
        }
        length
    }
}

/// Result of removing a car from the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    NotFound,
    Removed,
    /// The last car left; the level may be complete.
    Emptied,
}

#[derive(Debug, Clone, Default)]
pub struct CarPool {
    cars: Vec<Car>,
}

impl CarPool {
    pub fn new(cars: Vec<Car>) -> Self {
        Self { cars }
    }

    pub fn len(&self) -> usize {
        self.cars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cars.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Car> {
        self.cars.iter()
    }

    pub fn get(&self, id: CarId) -> Option<&Car> {
        self.cars.iter().find(|c| c.id == id)
    }

    pub fn get_mut(&mut self, id: CarId) -> Option<&mut Car> {
        self.cars.iter_mut().find(|c| c.id == id)
    }

    /// Nearest available car of `color` whose route to `target` is clear.
    pub fn find_closest_unblocked(
        &self,
        color: HoleColor,
        target: Vec3,
        probe: &dyn PathProbe,
    ) -> Option<CarId> {
        self.closest(color, target, |car| !probe.is_path_blocked(car, target, self))
    }

    /// Nearest available car of `color`, ignoring obstructions.
    pub fn find_closest_any(&self, color: HoleColor, target: Vec3) -> Option<CarId> {
        self.closest(color, target, |_| true)
    }

    fn closest(
        &self,
        color: HoleColor,
        target: Vec3,
        accept: impl Fn(&Car) -> bool,
    ) -> Option<CarId> {
        let mut best: Option<(CarId, f32)> = None;
        for car in self
            .cars
            .iter()
            .filter(|c| c.color == color && c.is_available())
        {
            let d = car.position.distance(target);
            if best.is_some_and(|(_, best_d)| d >= best_d) {
                continue;
            }
            if accept(car) {
                best = Some((car.id, d));
            }
        }
        best.map(|(id, _)| id)
    }

    pub fn remove(&mut self, id: CarId) -> Removal {
        let Some(index) = self.cars.iter().position(|c| c.id == id) else {
            return Removal::NotFound;
        };
        self.cars.remove(index);
        if self.cars.is_empty() {
            Removal::Emptied
        } else {
            Removal::Removed
        }
    }

    pub fn count_color(&self, color: HoleColor) -> usize {
        self.cars.iter().filter(|c| c.color == color).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::{CorridorProbe, OpenRoad};

    fn car(id: u32, color: HoleColor, x: f32, z: f32) -> Car {
        Car::new(CarId(id), color, Vec3::new(x, 0.0, z))
    }

    #[test]
    fn closest_filters_color_and_availability() {
        let mut pool = CarPool::new(vec![
            car(0, HoleColor::Red, 0.0, 10.0),
            car(1, HoleColor::Blue, 0.0, 6.0),
            car(2, HoleColor::Red, 0.0, 20.0),
        ]);
        let target = Vec3::new(0.0, 0.0, 5.0);
        assert_eq!(
            pool.find_closest_unblocked(HoleColor::Red, target, &OpenRoad),
            Some(CarId(0))
        );

        pool.get_mut(CarId(0)).unwrap().state = CarState::Returning;
        assert_eq!(pool.find_closest_any(HoleColor::Red, target), Some(CarId(2)));
        assert_eq!(pool.find_closest_any(HoleColor::Green, target), None);
    }

    #[test]
    fn blocked_car_is_skipped_but_still_found_by_any() {
        // Car 1 parks behind car 0 in the same lane.
        let pool = CarPool::new(vec![
            car(0, HoleColor::Blue, 0.0, 10.0),
            car(1, HoleColor::Red, 0.0, 13.0),
        ]);
        let target = Vec3::new(0.0, 0.0, 5.0);
        let probe = CorridorProbe::default();
        assert_eq!(pool.find_closest_unblocked(HoleColor::Red, target, &probe), None);
        assert_eq!(pool.find_closest_any(HoleColor::Red, target), Some(CarId(1)));
    }

    #[test]
    fn remove_reports_emptied_once() {
        let mut pool = CarPool::new(vec![car(0, HoleColor::Red, 0.0, 0.0), car(1, HoleColor::Red, 1.0, 0.0)]);
        assert_eq!(pool.remove(CarId(0)), Removal::Removed);
        assert_eq!(pool.remove(CarId(0)), Removal::NotFound);
        assert_eq!(pool.remove(CarId(1)), Removal::Emptied);
        assert_eq!(pool.remove(CarId(1)), Removal::NotFound);
    }

    #[test]
    fn route_length_follows_waypoints() {
        let c = car(0, HoleColor::Red, 0.0, 10.0).with_path(vec![Vec3::new(0.0, 0.0, 8.0)]);
        assert_eq!(c.route_length(Vec3::new(0.0, 0.0, 5.0)), 5.0);
    }
}
