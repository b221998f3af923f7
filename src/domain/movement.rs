// Movement/collision resolution against the heightfield and static colliders.

use crate::domain::colliders::{Aabb, ColliderSet};
use crate::domain::terrain::Heightfield;
use glam::{Vec2, Vec3};

/// Collision footprint of an actor. `ground_offset` is how far the tracked position sits
/// above the feet (eye height for the player, zero for enemies and vehicles).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyShape {
    pub radius: f32,
    pub height: f32,
    pub ground_offset: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveResult {
    pub position: Vec3,
    pub vertical_velocity: f32,
    pub grounded: bool,
}

/// Which retry of the axis slide produced the horizontal result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideOutcome {
    Free,
    SlidX,
    SlidZ,
    Blocked,
}

/// Borrowed view of the static world used by every mover in a frame.
#[derive(Clone, Copy)]
pub struct MovementResolver<'a> {
    terrain: &'a Heightfield,
    colliders: &'a ColliderSet,
    gravity: f32,
    half_extent: f32,
}

impl<'a> MovementResolver<'a> {
    pub fn new(
        terrain: &'a Heightfield,
        colliders: &'a ColliderSet,
        gravity: f32,
        half_extent: f32,
    ) -> Self {
        Self {
            terrain,
            colliders,
            gravity,
            half_extent,
        }
    }

    pub fn ground_height(&self, x: f32, z: f32) -> f32 {
        self.terrain.height_at(x, z)
    }

    pub fn footprint(&self, shape: BodyShape, position: Vec3) -> Aabb {
        let feet = position.y - shape.ground_offset;
        Aabb::new(
            Vec3::new(position.x - shape.radius, feet, position.z - shape.radius),
            Vec3::new(position.x + shape.radius, feet + shape.height, position.z + shape.radius),
        )
    }

    pub fn is_blocked(&self, shape: BodyShape, position: Vec3) -> bool {
        self.colliders.blocks(&self.footprint(shape, position))
    }

    /// Axis slide: full displacement, then X only, then Z only. Both single-axis retries
    /// are tested from the pre-move position.
    pub fn slide(&self, shape: BodyShape, position: Vec3, displacement: Vec2) -> (Vec3, SlideOutcome) {
        if !displacement.is_finite() || displacement == Vec2::ZERO {
            return (position, SlideOutcome::Free);
        }

        let full = position + Vec3::new(displacement.x, 0.0, displacement.y);
        if !self.is_blocked(shape, full) {
            return (full, SlideOutcome::Free);
        }

        if displacement.x != 0.0 {
            let x_only = position + Vec3::new(displacement.x, 0.0, 0.0);
            if !self.is_blocked(shape, x_only) {
                return (x_only, SlideOutcome::SlidX);
            }
        }

        if displacement.y != 0.0 {
            let z_only = position + Vec3::new(0.0, 0.0, displacement.y);
            if !self.is_blocked(shape, z_only) {
                return (z_only, SlideOutcome::SlidZ);
            }
        }

        (position, SlideOutcome::Blocked)
    }

    /// Keeps actors inside the playable square regardless of collider gaps.
    pub fn clamp_to_world(&self, mut position: Vec3) -> Vec3 {
        position.x = position.x.clamp(-self.half_extent, self.half_extent);
        position.z = position.z.clamp(-self.half_extent, self.half_extent);
        position
    }

    /// Horizontal slide, world clamp, then unconditional vertical resolution.
    pub fn resolve(
        &self,
        shape: BodyShape,
        position: Vec3,
        displacement: Vec2,
        vertical_velocity: f32,
        dt: f32,
    ) -> MoveResult {
        let (moved, _) = self.slide(shape, position, displacement);
        let moved = self.clamp_to_world(moved);

        let ground = self.ground_height(moved.x, moved.z) + shape.ground_offset;
        let next_y = moved.y + vertical_velocity * dt;

        if next_y <= ground {
            MoveResult {
                position: Vec3::new(moved.x, ground, moved.z),
                // Upward velocity survives so a jump off a rising slope still lifts off.
                vertical_velocity: vertical_velocity.max(0.0),
                grounded: true,
            }
        } else {
            MoveResult {
                position: Vec3::new(moved.x, next_y, moved.z),
                vertical_velocity: vertical_velocity - self.gravity * dt,
                grounded: false,
            }
        }
    }

    /// Ground-following move for actors without vertical physics (enemies).
    pub fn follow_ground(&self, shape: BodyShape, position: Vec3, displacement: Vec2) -> (Vec3, SlideOutcome) {
        let (moved, outcome) = self.slide(shape, position, displacement);
        let mut moved = self.clamp_to_world(moved);
        moved.y = self.ground_height(moved.x, moved.z) + shape.ground_offset;
        (moved, outcome)
    }
}

/// Camera-forward for a yaw angle, flattened onto the ground plane.
/// Yaw 0 looks down -Z; positive yaw turns left.
pub fn flat_forward(yaw: f32) -> Vec2 {
    Vec2::new(-yaw.sin(), -yaw.cos())
}

pub fn flat_right(yaw: f32) -> Vec2 {
    Vec2::new(yaw.cos(), -yaw.sin())
}

/// Unit ground-plane direction from digital move axes, relative to the camera basis.
pub fn wish_direction(yaw: f32, forward: f32, strafe: f32) -> Vec2 {
    (flat_forward(yaw) * forward + flat_right(yaw) * strafe).normalize_or_zero()
}
