// Enemy tiers and the per-enemy AI state machine.

use crate::domain::health::Health;
use crate::domain::movement::{BodyShape, MovementResolver};
use crate::domain::projectile::{HitTarget, HitVolume};
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyTier {
    Light,
    Fast,
    Heavy,
    Boss,
}

/// Regular tiers with their relative spawn weights. The boss never comes from this pool.
pub const REGULAR_POOL: [(EnemyTier, u32); 3] = [
    (EnemyTier::Light, 5),
    (EnemyTier::Fast, 3),
    (EnemyTier::Heavy, 2),
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierStats {
    pub max_hp: i32,
    /// World units per second.
    pub speed: f32,
    pub damage: i32,
    /// Attacks per second.
    pub attack_rate: f32,
    /// Distance at which the enemy switches to ATTACK_READY.
    pub attack_range: f32,
    /// Melee reach: the enemy closes to this distance and only strikes within it.
    pub engage_distance: f32,
    pub radius: f32,
    pub height: f32,
    pub head_height: f32,
}

impl EnemyTier {
    pub fn stats(self) -> TierStats {
        match self {
            EnemyTier::Light => TierStats {
                max_hp: 80,
                speed: 2.5,
                damage: 8,
                attack_rate: 1.0,
                attack_range: 12.0,
                engage_distance: 2.0,
                radius: 0.5,
                height: 1.8,
                head_height: 1.6,
            },
            EnemyTier::Fast => TierStats {
                max_hp: 50,
                speed: 5.0,
                damage: 5,
                attack_rate: 2.0,
                attack_range: 8.0,
                engage_distance: 1.8,
                radius: 0.4,
                height: 1.6,
                head_height: 1.45,
            },
            EnemyTier::Heavy => TierStats {
                max_hp: 200,
                speed: 1.5,
                damage: 20,
                attack_rate: 0.5,
                attack_range: 14.0,
                engage_distance: 2.5,
                radius: 0.8,
                height: 2.4,
                head_height: 2.15,
            },
            EnemyTier::Boss => TierStats {
                max_hp: 1000,
                speed: 2.0,
                damage: 35,
                attack_rate: 0.6,
                attack_range: 18.0,
                engage_distance: 3.5,
                radius: 1.5,
                height: 4.0,
                head_height: 3.6,
            },
        }
    }

    pub fn is_boss(self) -> bool {
        matches!(self, EnemyTier::Boss)
    }

    /// Picks a regular tier from a roll in `[0, total_weight)`.
    pub fn from_pool_roll(roll: u32) -> EnemyTier {
        let mut acc = 0;
        for (tier, weight) in REGULAR_POOL {
            acc += weight;
            if roll < acc {
                return tier;
            }
        }
        EnemyTier::Light
    }

    pub fn pool_weight() -> u32 {
        REGULAR_POOL.iter().map(|(_, w)| w).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyState {
    Approach,
    AttackReady,
    Dying,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// Target was already dying.
    Ignored,
    Damaged,
    Killed,
}

/// Damage dealt to the player by one attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnemyAttack {
    pub enemy_id: u64,
    pub damage: i32,
}

/// Per-frame knobs shared by every enemy.
#[derive(Debug, Clone, Copy)]
pub struct AiConfig {
    pub stagger_seconds: f32,
    pub stagger_speed_scale: f32,
    pub death_seconds: f32,
}

#[derive(Debug, Clone)]
pub struct Enemy {
    pub id: u64,
    pub tier: EnemyTier,
    pub stats: TierStats,
    /// Feet position.
    pub position: Vec3,
    pub yaw: f32,
    pub health: Health,
    pub state: EnemyState,
    pub attack_cooldown: f32,
    pub stagger_timer: f32,
    pub death_elapsed: f32,
}

impl Enemy {
    pub fn spawn(id: u64, tier: EnemyTier, position: Vec3) -> Self {
        let stats = tier.stats();
        Self {
            id,
            tier,
            stats,
            position,
            yaw: 0.0,
            health: Health::full(stats.max_hp),
            state: EnemyState::Approach,
            attack_cooldown: 0.0,
            stagger_timer: 0.0,
            death_elapsed: 0.0,
        }
    }

    pub fn shape(&self) -> BodyShape {
        BodyShape {
            radius: self.stats.radius,
            height: self.stats.height,
            ground_offset: 0.0,
        }
    }

    pub fn is_dying(&self) -> bool {
        self.state == EnemyState::Dying
    }

    pub fn is_staggered(&self) -> bool {
        self.stagger_timer > 0.0
    }

    /// Fall animation progress in `[0, 1]`.
    pub fn death_progress(&self, config: &AiConfig) -> f32 {
        (self.death_elapsed / config.death_seconds.max(1e-3)).min(1.0)
    }

    /// Dying enemies are removed once the fall animation completes.
    pub fn ready_for_cleanup(&self, config: &AiConfig) -> bool {
        self.is_dying() && self.death_elapsed >= config.death_seconds
    }

    /// Tilt of the fall animation around the enemy's right axis.
    pub fn fall_tilt(&self, config: &AiConfig) -> f32 {
        self.death_progress(config) * std::f32::consts::FRAC_PI_2
    }

    pub fn horizontal_distance(&self, target: Vec3) -> f32 {
        Vec2::new(target.x - self.position.x, target.z - self.position.z).length()
    }

    /// Applies damage from a hit. Dying enemies are inert.
    pub fn apply_hit(&mut self, damage: i32, config: &AiConfig) -> HitOutcome {
        if self.is_dying() {
            return HitOutcome::Ignored;
        }
        if self.health.apply_damage(damage) {
            self.state = EnemyState::Dying;
            self.death_elapsed = 0.0;
            self.stagger_timer = 0.0;
            return HitOutcome::Killed;
        }
        self.stagger_timer = config.stagger_seconds;
        HitOutcome::Damaged
    }

    /// One AI tick: face the target, pick APPROACH/ATTACK_READY by range, move through the
    /// axis-slide resolver, and strike when close enough.
    pub fn update(
        &mut self,
        target: Vec3,
        resolver: &MovementResolver<'_>,
        config: &AiConfig,
        dt: f32,
    ) -> Option<EnemyAttack> {
        // The cooldown runs in every state.
        self.attack_cooldown = (self.attack_cooldown - dt).max(0.0);

        if self.is_dying() {
            self.death_elapsed += dt;
            return None;
        }

        self.stagger_timer = (self.stagger_timer - dt).max(0.0);

        let delta = Vec2::new(target.x - self.position.x, target.z - self.position.z);
        let distance = delta.length();
        if distance > 0.0 {
            self.yaw = (-delta.x).atan2(-delta.y);
        }

        self.state = if distance <= self.stats.attack_range {
            EnemyState::AttackReady
        } else {
            EnemyState::Approach
        };

        if distance > self.stats.engage_distance {
            let speed_scale = if self.is_staggered() {
                config.stagger_speed_scale
            } else {
                1.0
            };
            let step = self.stats.speed * speed_scale * dt;
            let step = step.min(distance - self.stats.engage_distance);
            let direction = delta / distance;
            let (moved, _) = resolver.follow_ground(self.shape(), self.position, direction * step);
            self.position = moved;
        }

        let can_strike = self.state == EnemyState::AttackReady
            && !self.is_staggered()
            && self.attack_cooldown <= 0.0
            && distance <= self.stats.engage_distance;
        if !can_strike {
            return None;
        }

        self.attack_cooldown = 1.0 / self.stats.attack_rate;
        Some(EnemyAttack {
            enemy_id: self.id,
            damage: self.stats.damage,
        })
    }
}

impl HitTarget for Enemy {
    fn hit_volume(&self) -> Option<HitVolume> {
        if self.is_dying() {
            return None;
        }
        Some(HitVolume::upright(
            self.position,
            self.stats.radius,
            self.stats.height,
            self.stats.head_height,
        ))
    }
}
