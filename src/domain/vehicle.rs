// Drivable vehicles: a per-kind stat table and one shared driving model.

use crate::domain::movement::{BodyShape, MovementResolver, SlideOutcome, flat_forward, flat_right};
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Distance from a vehicle's centre within which the player can climb in.
pub const INTERACT_RADIUS: f32 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VehicleKind {
    Jeep,
    Tank,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleSpec {
    pub max_speed: f32,
    pub reverse_speed: f32,
    /// Units per second squared under throttle.
    pub acceleration: f32,
    /// Deceleration when coasting or braking against the current direction.
    pub braking: f32,
    /// Radians per second at full speed.
    pub turn_rate: f32,
    pub radius: f32,
    pub height: f32,
    /// Eye height above the vehicle's ground point while seated.
    pub seat_height: f32,
}

impl VehicleKind {
    pub fn spec(self) -> VehicleSpec {
        match self {
            VehicleKind::Jeep => VehicleSpec {
                max_speed: 22.0,
                reverse_speed: 8.0,
                acceleration: 12.0,
                braking: 18.0,
                turn_rate: 1.8,
                radius: 1.4,
                height: 1.8,
                seat_height: 2.0,
            },
            VehicleKind::Tank => VehicleSpec {
                max_speed: 10.0,
                reverse_speed: 5.0,
                acceleration: 5.0,
                braking: 10.0,
                turn_rate: 1.0,
                radius: 2.2,
                height: 2.6,
                seat_height: 3.0,
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct Vehicle {
    pub id: u64,
    pub kind: VehicleKind,
    pub spec: VehicleSpec,
    /// Ground point under the vehicle's centre.
    pub position: Vec3,
    pub yaw: f32,
    /// Signed speed along the facing direction.
    pub speed: f32,
    pub occupied: bool,
}

impl Vehicle {
    pub fn new(id: u64, kind: VehicleKind, position: Vec3, yaw: f32) -> Self {
        Self {
            id,
            kind,
            spec: kind.spec(),
            position,
            yaw,
            speed: 0.0,
            occupied: false,
        }
    }

    pub fn shape(&self) -> BodyShape {
        BodyShape {
            radius: self.spec.radius,
            height: self.spec.height,
            ground_offset: 0.0,
        }
    }

    pub fn seat_position(&self) -> Vec3 {
        self.position + Vec3::new(0.0, self.spec.seat_height, 0.0)
    }

    pub fn within_reach(&self, point: Vec3) -> bool {
        let d = Vec2::new(point.x - self.position.x, point.z - self.position.z);
        d.length() <= INTERACT_RADIUS
    }

    /// Throttle and steer are in `[-1, 1]`; positive steer turns right.
    pub fn drive(&mut self, throttle: f32, steer: f32, resolver: &MovementResolver<'_>, dt: f32) -> SlideOutcome {
        let throttle = throttle.clamp(-1.0, 1.0);
        let steer = steer.clamp(-1.0, 1.0);
        let spec = self.spec;

        let target = if throttle >= 0.0 {
            throttle * spec.max_speed
        } else {
            throttle * spec.reverse_speed
        };
        // Braking applies when coasting or pushing against the current motion.
        let rate = if throttle == 0.0 || target.signum() != self.speed.signum() && self.speed != 0.0 {
            spec.braking
        } else {
            spec.acceleration
        };
        let delta = target - self.speed;
        self.speed += delta.clamp(-rate * dt, rate * dt);

        // Steering authority scales with speed and flips when reversing.
        let authority = (self.speed / spec.max_speed).clamp(-1.0, 1.0);
        self.yaw -= steer * spec.turn_rate * authority * dt;

        let displacement = flat_forward(self.yaw) * self.speed * dt;
        let (moved, outcome) = resolver.follow_ground(self.shape(), self.position, displacement);
        self.position = moved;
        if outcome == SlideOutcome::Blocked {
            self.speed = 0.0;
        }
        outcome
    }

    /// Where the driver lands on exit: right side first, then left, then on the roof.
    pub fn exit_position(&self, resolver: &MovementResolver<'_>, driver: BodyShape) -> Vec3 {
        let offset = self.spec.radius + driver.radius + 0.5;
        for side in [1.0, -1.0] {
            let beside = Vec2::new(self.position.x, self.position.z) + flat_right(self.yaw) * offset * side;
            let candidate = resolver.clamp_to_world(Vec3::new(
                beside.x,
                resolver.ground_height(beside.x, beside.y) + driver.ground_offset,
                beside.y,
            ));
            if !resolver.is_blocked(driver, candidate) {
                return candidate;
            }
        }
        self.position + Vec3::new(0.0, self.spec.height + driver.ground_offset, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::colliders::{Aabb, ColliderSet};
    use crate::domain::terrain::Heightfield;

    const DRIVER: BodyShape = BodyShape {
        radius: 0.5,
        height: 1.8,
        ground_offset: 1.7,
    };

    fn open_world() -> (Heightfield, ColliderSet) {
        (Heightfield::flat(200.0, 8, 0.0), ColliderSet::new())
    }

    #[test]
    fn throttle_accelerates_up_to_max_speed() {
        let (terrain, colliders) = open_world();
        let resolver = MovementResolver::new(&terrain, &colliders, 20.0, 200.0);
        let mut jeep = Vehicle::new(1, VehicleKind::Jeep, Vec3::ZERO, 0.0);

        jeep.drive(1.0, 0.0, &resolver, 0.5);
        assert!((jeep.speed - 6.0).abs() < 1e-4);
        for _ in 0..20 {
            jeep.drive(1.0, 0.0, &resolver, 0.5);
        }
        assert_eq!(jeep.speed, jeep.spec.max_speed);
        // Yaw 0 drives down -Z.
        assert!(jeep.position.z < -50.0);
        assert!(jeep.position.x.abs() < 1e-3);
    }

    #[test]
    fn steering_needs_speed() {
        let (terrain, colliders) = open_world();
        let resolver = MovementResolver::new(&terrain, &colliders, 20.0, 200.0);
        let mut tank = Vehicle::new(1, VehicleKind::Tank, Vec3::ZERO, 0.0);

        tank.drive(0.0, 1.0, &resolver, 0.5);
        assert_eq!(tank.yaw, 0.0);

        tank.drive(1.0, 1.0, &resolver, 0.5);
        assert!(tank.yaw < 0.0, "right steer should turn clockwise");
    }

    #[test]
    fn coasting_brakes_to_a_stop() {
        let (terrain, colliders) = open_world();
        let resolver = MovementResolver::new(&terrain, &colliders, 20.0, 200.0);
        let mut jeep = Vehicle::new(1, VehicleKind::Jeep, Vec3::ZERO, 0.0);
        jeep.speed = 9.0;
        jeep.drive(0.0, 0.0, &resolver, 0.25);
        assert!((jeep.speed - 4.5).abs() < 1e-4);
        jeep.drive(0.0, 0.0, &resolver, 0.5);
        assert_eq!(jeep.speed, 0.0);
    }

    #[test]
    fn hitting_a_wall_head_on_stops_the_vehicle() {
        let (terrain, mut colliders) = open_world();
        colliders.add(Aabb::new(Vec3::new(-10.0, -1.0, -4.0), Vec3::new(10.0, 5.0, -3.0)));
        let resolver = MovementResolver::new(&terrain, &colliders, 20.0, 200.0);
        let mut jeep = Vehicle::new(1, VehicleKind::Jeep, Vec3::ZERO, 0.0);
        jeep.speed = 20.0;

        let outcome = jeep.drive(1.0, 0.0, &resolver, 0.2);
        assert_eq!(outcome, SlideOutcome::Blocked);
        assert_eq!(jeep.speed, 0.0);
        assert_eq!(jeep.position, Vec3::ZERO);
    }

    #[test]
    fn exit_prefers_the_right_side_and_avoids_walls() {
        let (terrain, mut colliders) = open_world();
        let jeep = Vehicle::new(1, VehicleKind::Jeep, Vec3::ZERO, 0.0);
        {
            let resolver = MovementResolver::new(&terrain, &colliders, 20.0, 200.0);
            let exit = jeep.exit_position(&resolver, DRIVER);
            assert!(exit.x > 0.0);
            assert_eq!(exit.y, DRIVER.ground_offset);
        }

        colliders.add(Aabb::new(Vec3::new(1.5, -1.0, -5.0), Vec3::new(5.0, 5.0, 5.0)));
        let resolver = MovementResolver::new(&terrain, &colliders, 20.0, 200.0);
        let exit = jeep.exit_position(&resolver, DRIVER);
        assert!(exit.x < 0.0);
    }

    #[test]
    fn reach_is_horizontal() {
        let jeep = Vehicle::new(1, VehicleKind::Jeep, Vec3::ZERO, 0.0);
        assert!(jeep.within_reach(Vec3::new(3.0, 10.0, 0.0)));
        assert!(!jeep.within_reach(Vec3::new(3.0, 0.0, 3.0)));
    }
}
