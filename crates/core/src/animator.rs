//! Transition durations.
//!
//! Movement is not simulated here. The level asks an [`Animator`] how long a
//! transition takes, lets a presentation layer play it, and schedules the
//! completion step on its timeline.

use crate::cars::Car;
use crate::types::{
    HoleId, Vec3, CAR_FALL_MS, CAR_MAX_DRIVE_MS, CAR_RETURN_MS, CAR_SPEED, CONTAINER_CLEANUP_MS,
    HOLE_MOVE_MS,
};

pub trait Animator {
    /// Hole flight from the board into a container.
    fn hole_move_ms(&mut self, hole: HoleId, from: Vec3, to: Vec3) -> u32;
    /// Car drive along its route into a container.
    fn car_drive_ms(&mut self, car: &Car, target: Vec3) -> u32;
    /// From the start of a car's fall until its container is free.
    fn container_cleanup_ms(&mut self) -> u32;
    /// From the start of a car's fall until the car leaves the pool.
    fn car_fall_ms(&mut self) -> u32;
    /// Bumped car driving back to its start.
    fn car_return_ms(&mut self, car: &Car) -> u32;
}

/// Fixed tween timings; car drives scale with route length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TweenTimings {
    pub hole_move_ms: u32,
    pub car_speed: f32,
    pub car_max_drive_ms: u32,
    pub container_cleanup_ms: u32,
    pub car_fall_ms: u32,
    pub car_return_ms: u32,
}

impl Default for TweenTimings {
    fn default() -> Self {
        Self {
            hole_move_ms: HOLE_MOVE_MS,
            car_speed: CAR_SPEED,
            car_max_drive_ms: CAR_MAX_DRIVE_MS,
            container_cleanup_ms: CONTAINER_CLEANUP_MS,
            car_fall_ms: CAR_FALL_MS,
            car_return_ms: CAR_RETURN_MS,
        }
    }
}

impl TweenTimings {
    /// Every transition completes on the next tick.
    pub fn instant() -> Self {
        Self {
            hole_move_ms: 0,
            car_speed: f32::INFINITY,
            car_max_drive_ms: 0,
            container_cleanup_ms: 0,
            car_fall_ms: 0,
            car_return_ms: 0,
        }
    }
}

impl Animator for TweenTimings {
    fn hole_move_ms(&mut self, _hole: HoleId, _from: Vec3, _to: Vec3) -> u32 {
        self.hole_move_ms
    }

    fn car_drive_ms(&mut self, car: &Car, target: Vec3) -> u32 {
        if self.car_speed <= 0.0 {
            return self.car_max_drive_ms;
        }
        let ms = car.route_length(target) / self.car_speed * 1000.0;
        (ms.round() as u32).min(self.car_max_drive_ms)
    }

    fn container_cleanup_ms(&mut self) -> u32 {
        self.container_cleanup_ms
    }

    fn car_fall_ms(&mut self) -> u32 {
        self.car_fall_ms
    }

    fn car_return_ms(&mut self, _car: &Car) -> u32 {
        self.car_return_ms
    }
}
