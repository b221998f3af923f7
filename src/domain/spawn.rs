// Randomised spawn placement and respawn delays.

use crate::domain::movement::{BodyShape, MovementResolver};
use crate::domain::tuning::WorldTuning;
use glam::Vec3;
use rand::Rng;

const SPAWN_ATTEMPTS: usize = 32;
// Keeps spawns off the hard world edge.
const EDGE_MARGIN: f32 = 2.0;

/// Random delay in seconds within the configured respawn window.
pub fn respawn_delay<R: Rng>(rng: &mut R, tuning: &WorldTuning) -> f64 {
    let min = tuning.respawn_min_ms.min(tuning.respawn_max_ms);
    let max = tuning.respawn_min_ms.max(tuning.respawn_max_ms);
    rng.random_range(min..=max) as f64 / 1000.0
}

/// Picks a free position at least `spawn_safe_radius` from the origin, resting on the
/// ground. Falls back to a point on the safe ring when every attempt is blocked.
pub fn pick_spawn_point<R: Rng>(
    rng: &mut R,
    tuning: &WorldTuning,
    resolver: &MovementResolver<'_>,
    shape: BodyShape,
) -> Vec3 {
    let inner = tuning.spawn_safe_radius.max(0.0);
    let outer = (tuning.half_extent - EDGE_MARGIN).max(inner);

    for _ in 0..SPAWN_ATTEMPTS {
        let angle = rng.random_range(0.0..std::f32::consts::TAU);
        let radius = if outer > inner {
            rng.random_range(inner..outer)
        } else {
            inner
        };
        let (x, z) = (angle.cos() * radius, angle.sin() * radius);
        if x.abs() > tuning.half_extent || z.abs() > tuning.half_extent {
            continue;
        }

        let candidate = Vec3::new(x, resolver.ground_height(x, z) + shape.ground_offset, z);
        if !resolver.is_blocked(shape, candidate) {
            return candidate;
        }
    }

    let x = inner.min(tuning.half_extent);
    Vec3::new(x, resolver.ground_height(x, 0.0) + shape.ground_offset, 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::colliders::ColliderSet;
    use crate::domain::terrain::Heightfield;
    use rand::{SeedableRng, rngs::StdRng};

    const SHAPE: BodyShape = BodyShape {
        radius: 0.5,
        height: 1.8,
        ground_offset: 0.0,
    };

    #[test]
    fn spawns_respect_safe_radius_and_bounds() {
        let tuning = WorldTuning::default();
        let terrain = Heightfield::generate(&tuning);
        let colliders = ColliderSet::generate_buildings(&tuning, &terrain);
        let resolver = MovementResolver::new(&terrain, &colliders, tuning.gravity, tuning.half_extent);
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..200 {
            let p = pick_spawn_point(&mut rng, &tuning, &resolver, SHAPE);
            let r = (p.x * p.x + p.z * p.z).sqrt();
            assert!(r >= tuning.spawn_safe_radius - 1e-3, "spawned inside safe radius: {p:?}");
            assert!(p.x.abs() <= tuning.half_extent && p.z.abs() <= tuning.half_extent);
            assert!(!resolver.is_blocked(SHAPE, p));
            assert_eq!(p.y, terrain.height_at(p.x, p.z));
        }
    }

    #[test]
    fn respawn_delay_stays_in_window() {
        let tuning = WorldTuning::default();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..500 {
            let delay = respawn_delay(&mut rng, &tuning);
            assert!((2.0..=4.0).contains(&delay));
        }
    }
}
