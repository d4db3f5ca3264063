//! Path obstruction queries.
//!
//! The matcher never looks at geometry itself. It asks a [`PathProbe`]
//! whether a car could drive to a container right now.

use crate::cars::{Car, CarPool, CarState};
use crate::types::{CarId, Vec3};

pub trait PathProbe {
    /// Cars standing between `car` and `target`, in pool order.
    fn blockers(&self, car: &Car, target: Vec3, pool: &CarPool) -> Vec<CarId>;

    /// True if something stands between `car` and `target`.
    fn is_path_blocked(&self, car: &Car, target: Vec3, pool: &CarPool) -> bool {
        !self.blockers(car, target, pool).is_empty()
    }
}

/// Treats a route as blocked when another car that is standing still
/// (parked or driving home) sits within `radius` of any route segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorridorProbe {
    pub radius: f32,
}

impl Default for CorridorProbe {
    fn default() -> Self {
        Self { radius: 0.9 }
    }
}

impl CorridorProbe {
    fn blocks(&self, car: &Car, other: &Car, target: Vec3) -> bool {
        if other.id == car.id || !matches!(other.state, CarState::Parked | CarState::Returning) {
            return false;
        }
        let mut prev = car.position;
        for point in car.route(target).skip(1) {
            if other.position.distance_to_segment(prev, point) < self.radius {
                return true;
            }
            prev = point;
        }
        false
    }
}

impl PathProbe for CorridorProbe {
    fn blockers(&self, car: &Car, target: Vec3, pool: &CarPool) -> Vec<CarId> {
        pool.iter()
            .filter(|other| self.blocks(car, other, target))
            .map(|other| other.id)
            .collect()
    }

    fn is_path_blocked(&self, car: &Car, target: Vec3, pool: &CarPool) -> bool {
        pool.iter().any(|other| self.blocks(car, other, target))
    }
}

/// Never blocked.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenRoad;

impl PathProbe for OpenRoad {
    fn blockers(&self, _car: &Car, _target: Vec3, _pool: &CarPool) -> Vec<CarId> {
        Vec::new()
    }

    fn is_path_blocked(&self, _car: &Car, _target: Vec3, _pool: &CarPool) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HoleColor;

    #[test]
    fn neighbouring_lane_does_not_block() {
        let front = Car::new(CarId(0), HoleColor::Red, Vec3::new(2.0, 0.0, 10.0));
        let me = Car::new(CarId(1), HoleColor::Red, Vec3::new(0.0, 0.0, 13.0));
        let pool = CarPool::new(vec![front, me.clone()]);
        let probe = CorridorProbe::default();
        assert!(!probe.is_path_blocked(&me, Vec3::new(0.0, 1.0, 5.0), &pool));
    }

    #[test]
    fn car_leaving_stops_blocking() {
        let front = Car::new(CarId(0), HoleColor::Red, Vec3::new(0.0, 0.0, 10.0));
        let me = Car::new(CarId(1), HoleColor::Blue, Vec3::new(0.0, 0.0, 13.0));
        let mut pool = CarPool::new(vec![front, me.clone()]);
        let probe = CorridorProbe::default();
        let target = Vec3::new(0.0, 1.0, 5.0);
        assert!(probe.is_path_blocked(&me, target, &pool));

        pool.get_mut(CarId(0)).unwrap().state = CarState::Falling {
            container: crate::types::ContainerId(0),
            hole: crate::types::HoleId(0),
        };
        assert!(!probe.is_path_blocked(&me, target, &pool));
    }

    #[test]
    fn blockers_lists_every_car_in_the_lane() {
        let near = Car::new(CarId(0), HoleColor::Red, Vec3::new(0.0, 0.0, 10.0));
        let aside = Car::new(CarId(1), HoleColor::Red, Vec3::new(4.0, 0.0, 10.0));
        let far = Car::new(CarId(2), HoleColor::Red, Vec3::new(0.0, 0.0, 13.0));
        let me = Car::new(CarId(3), HoleColor::Blue, Vec3::new(0.0, 0.0, 16.0));
        let pool = CarPool::new(vec![near, aside, far, me.clone()]);
        let target = Vec3::new(0.0, 1.0, 5.0);
        assert_eq!(
            CorridorProbe::default().blockers(&me, target, &pool),
            vec![CarId(0), CarId(2)]
        );
        assert!(OpenRoad.blockers(&me, target, &pool).is_empty());
    }
}
