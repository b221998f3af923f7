// Static axis-aligned obstacles built once at world load.

use crate::domain::terrain::Heightfield;
use crate::domain::tuning::WorldTuning;
use glam::Vec3;
use rand::{Rng, SeedableRng, rngs::StdRng};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    pub fn from_center(center: Vec3, half: Vec3) -> Self {
        Self::new(center - half, center + half)
    }

    /// Strict overlap: touching faces do not count, so actors can stand flush with walls.
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }

    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    pub fn expanded(&self, margin: f32) -> Aabb {
        Aabb {
            min: self.min - Vec3::splat(margin),
            max: self.max + Vec3::splat(margin),
        }
    }
}

/// Every static collider in the world. Append-only during construction, read-only after.
#[derive(Debug, Clone, Default)]
pub struct ColliderSet {
    boxes: Vec<Aabb>,
}

impl ColliderSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, collider: Aabb) {
        self.boxes.push(collider);
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Aabb> {
        self.boxes.iter()
    }

    /// True when `candidate` overlaps any collider. An empty set never blocks.
    pub fn blocks(&self, candidate: &Aabb) -> bool {
        self.boxes.iter().any(|b| b.intersects(candidate))
    }

    /// Scatters buildings over the map, keeping the spawn area clear.
    pub fn generate_buildings(tuning: &WorldTuning, terrain: &Heightfield) -> Self {
        let mut rng = StdRng::seed_from_u64(tuning.seed ^ 0xb111_d1b6);
        let mut set = Self::new();
        let limit = tuning.half_extent - 10.0;
        if limit.is_nan() || limit <= 0.0 {
            return set;
        }
        let mut attempts = 0;

        while set.len() < tuning.building_count && attempts < tuning.building_count * 20 {
            attempts += 1;
            let x = rng.random_range(-limit..limit);
            let z = rng.random_range(-limit..limit);
            let half_w = rng.random_range(3.0..8.0);
            let half_d = rng.random_range(3.0..8.0);
            let height = rng.random_range(6.0..20.0);

            // Keep the nearest corner outside the spawn-safe radius.
            let nearest_x = x.abs() - half_w;
            let nearest_z = z.abs() - half_d;
            let clearance = nearest_x.max(0.0).hypot(nearest_z.max(0.0));
            if clearance < tuning.spawn_safe_radius {
                continue;
            }

            let base = terrain.height_at(x, z) - 1.0;
            let candidate = Aabb::new(
                Vec3::new(x - half_w, base, z - half_d),
                Vec3::new(x + half_w, base + height, z + half_d),
            );
            // Leave walkable gaps between buildings.
            if set.blocks(&candidate.expanded(3.0)) {
                continue;
            }
            set.add(candidate);
        }

        set
    }
}
