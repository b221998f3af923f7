// Projectile integration, culling and hit classification.

use crate::domain::colliders::Aabb;
use crate::domain::terrain::Heightfield;
use crate::domain::tuning::ProjectileTuning;
use crate::domain::weapon::{Shot, WeaponKind};
use glam::Vec3;
use tracing::trace;

// Hit tests sample the path travelled this frame so fast rounds cannot skip thin targets.
const SWEEP_SPACING: f32 = 0.25;
const MAX_SWEEP_SAMPLES: usize = 64;

#[derive(Debug, Clone)]
pub struct Projectile {
    pub id: u64,
    /// Shared by every pellet from one trigger pull.
    pub pellet_group: u64,
    pub kind: WeaponKind,
    pub position: Vec3,
    /// Position at the start of the last advance.
    pub previous: Vec3,
    pub velocity: Vec3,
    pub spawned_at: f64,
    pub age: f32,
    pub damage: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitKind {
    Body,
    Head,
}

impl HitKind {
    pub fn is_headshot(self) -> bool {
        matches!(self, HitKind::Head)
    }

    /// Headshots deal double damage.
    pub fn scale_damage(self, base: i32) -> i32 {
        match self {
            HitKind::Body => base,
            HitKind::Head => base.saturating_mul(2),
        }
    }
}

/// Hittable shape of a target: a body box plus a head anchor point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitVolume {
    pub body: Aabb,
    pub head: Vec3,
}

impl HitVolume {
    /// Upright box standing on `feet`, with the head anchor near its top.
    pub fn upright(feet: Vec3, radius: f32, height: f32, head_height: f32) -> Self {
        Self {
            body: Aabb::new(
                feet - Vec3::new(radius, 0.0, radius),
                feet + Vec3::new(radius, height, radius),
            ),
            head: feet + Vec3::new(0.0, head_height, 0.0),
        }
    }
}

/// Anything projectiles can hit. `None` means currently inert (dying, dead, despawned).
pub trait HitTarget {
    fn hit_volume(&self) -> Option<HitVolume>;
}

/// Head test first, body test second. A point inside the head sphere is a hit even if it
/// pokes out of the body box, so every headshot is also a hit.
pub fn classify_hit(point: Vec3, volume: &HitVolume, margin: f32, head_radius: f32) -> Option<HitKind> {
    if point.distance(volume.head) < head_radius {
        return Some(HitKind::Head);
    }
    if volume.body.expanded(margin).contains(point) {
        return Some(HitKind::Body);
    }
    None
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitReport {
    pub projectile_id: u64,
    pub target: usize,
    pub kind: HitKind,
    /// Damage after the headshot multiplier.
    pub damage: i32,
    pub point: Vec3,
}

/// Exclusive owner of every live projectile.
#[derive(Debug, Default)]
pub struct ProjectilePool {
    live: Vec<Projectile>,
    next_id: u64,
    next_group: u64,
}

impl ProjectilePool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Projectile> {
        self.live.iter()
    }

    pub fn clear(&mut self) {
        self.live.clear();
    }

    /// Spawns one projectile per pellet. Returns the pellet group id.
    pub fn spawn_shot(&mut self, origin: Vec3, shot: &Shot, now: f64) -> u64 {
        let group = self.next_group;
        self.next_group = self.next_group.wrapping_add(1);
        for velocity in &shot.velocities {
            self.live.push(Projectile {
                id: self.next_id,
                pellet_group: group,
                kind: shot.kind,
                position: origin,
                previous: origin,
                velocity: *velocity,
                spawned_at: now,
                age: 0.0,
                damage: shot.damage,
            });
            self.next_id = self.next_id.wrapping_add(1);
        }
        group
    }

    /// Integrates positions and culls projectiles past their lifetime, below the ground,
    /// or outside the world. Returns the number culled.
    pub fn advance(&mut self, dt: f32, terrain: &Heightfield, tuning: &ProjectileTuning) -> usize {
        let before = self.live.len();
        let max_dist_sq = tuning.max_distance * tuning.max_distance;
        self.live.retain_mut(|p| {
            p.previous = p.position;
            p.position += p.velocity * dt;
            p.age += dt;
            let horizontal_sq = p.position.x * p.position.x + p.position.z * p.position.z;
            p.age <= tuning.life_time
                && p.position.y >= terrain.height_at(p.position.x, p.position.z)
                && horizontal_sq <= max_dist_sq
        });
        let culled = before - self.live.len();
        if culled > 0 {
            trace!(culled, remaining = self.live.len(), "projectiles culled");
        }
        culled
    }

    /// Tests every projectile against every target. A projectile hits at most one target and
    /// is destroyed on hit. Targets are not mutated here; callers apply the reports.
    pub fn resolve_hits<T: HitTarget>(&mut self, targets: &[T], tuning: &ProjectileTuning) -> Vec<HitReport> {
        let volumes: Vec<Option<HitVolume>> = targets.iter().map(|t| t.hit_volume()).collect();
        let mut reports = Vec::new();
        if volumes.iter().all(Option::is_none) {
            return reports;
        }

        self.live.retain(|p| match first_hit(p, &volumes, tuning) {
            Some((target, kind, point)) => {
                reports.push(HitReport {
                    projectile_id: p.id,
                    target,
                    kind,
                    damage: kind.scale_damage(p.damage),
                    point,
                });
                false
            }
            None => true,
        });

        reports
    }
}

/// Walks the segment travelled since the last advance. The earliest contact picks the
/// target; reaching its head sphere anywhere later in the same segment makes it a headshot.
fn first_hit(
    projectile: &Projectile,
    volumes: &[Option<HitVolume>],
    tuning: &ProjectileTuning,
) -> Option<(usize, HitKind, Vec3)> {
    let travelled = projectile.previous.distance(projectile.position);
    let samples = ((travelled / SWEEP_SPACING).ceil() as usize).clamp(1, MAX_SWEEP_SAMPLES);
    let points: Vec<Vec3> = (1..=samples)
        .map(|step| {
            projectile
                .previous
                .lerp(projectile.position, step as f32 / samples as f32)
        })
        .collect();

    let (entry, target, volume, kind) = points.iter().enumerate().find_map(|(i, point)| {
        volumes.iter().enumerate().find_map(|(target, volume)| {
            let volume = volume.as_ref()?;
            classify_hit(*point, volume, tuning.hit_margin, tuning.head_radius)
                .map(|kind| (i, target, volume, kind))
        })
    })?;

    if kind.is_headshot() {
        return Some((target, HitKind::Head, points[entry]));
    }
    match points[entry..]
        .iter()
        .find(|p| p.distance(volume.head) < tuning.head_radius)
    {
        Some(head) => Some((target, HitKind::Head, *head)),
        None => Some((target, HitKind::Body, points[entry])),
    }
}
