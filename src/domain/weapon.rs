// Weapon firing model: cooldown, ammo, reload and spread, driven by a per-kind table.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

// Absorbs float drift when shots are requested exactly on the cooldown boundary.
const FIRE_TIME_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponKind {
    Pistol,
    Rifle,
    Shotgun,
    Sniper,
}

impl WeaponKind {
    pub const ALL: [WeaponKind; 4] = [
        WeaponKind::Pistol,
        WeaponKind::Rifle,
        WeaponKind::Shotgun,
        WeaponKind::Sniper,
    ];

    pub fn spec(self) -> WeaponSpec {
        match self {
            WeaponKind::Pistol => WeaponSpec {
                fire_rate: 4.0,
                magazine: 12,
                reserve: 48,
                reload_seconds: 1.2,
                damage: 25,
                pellets: 1,
                hip_spread: 0.02,
                ads_spread: 0.005,
                muzzle_speed: 120.0,
                recoil_per_shot: 0.08,
                recoil_decay: 1.5,
                ads_recoil_decay: 3.0,
                ads_seconds: 0.15,
            },
            WeaponKind::Rifle => WeaponSpec {
                fire_rate: 10.0,
                magazine: 30,
                reserve: 120,
                reload_seconds: 2.0,
                damage: 25,
                pellets: 1,
                hip_spread: 0.03,
                ads_spread: 0.008,
                muzzle_speed: 150.0,
                recoil_per_shot: 0.05,
                recoil_decay: 2.0,
                ads_recoil_decay: 4.0,
                ads_seconds: 0.2,
            },
            WeaponKind::Shotgun => WeaponSpec {
                fire_rate: 1.2,
                magazine: 6,
                reserve: 30,
                reload_seconds: 2.5,
                damage: 12,
                pellets: 8,
                hip_spread: 0.09,
                ads_spread: 0.06,
                muzzle_speed: 100.0,
                recoil_per_shot: 0.2,
                recoil_decay: 1.2,
                ads_recoil_decay: 2.0,
                ads_seconds: 0.2,
            },
            WeaponKind::Sniper => WeaponSpec {
                fire_rate: 0.8,
                magazine: 5,
                reserve: 20,
                reload_seconds: 3.0,
                damage: 90,
                pellets: 1,
                hip_spread: 0.08,
                ads_spread: 0.0,
                muzzle_speed: 300.0,
                recoil_per_shot: 0.35,
                recoil_decay: 1.0,
                ads_recoil_decay: 1.6,
                ads_seconds: 0.3,
            },
        }
    }
}

/// Fixed per-kind stats. One state machine serves every kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeaponSpec {
    /// Shots per second.
    pub fire_rate: f32,
    pub magazine: u32,
    pub reserve: u32,
    pub reload_seconds: f32,
    /// Damage per projectile.
    pub damage: i32,
    /// Projectiles per shot (shotgun-class > 1).
    pub pellets: u32,
    pub hip_spread: f32,
    pub ads_spread: f32,
    pub muzzle_speed: f32,
    pub recoil_per_shot: f32,
    pub recoil_decay: f32,
    pub ads_recoil_decay: f32,
    /// Time to fully raise the sights.
    pub ads_seconds: f32,
}

/// Output of one accepted trigger pull: one velocity per pellet.
#[derive(Debug, Clone, PartialEq)]
pub struct Shot {
    pub kind: WeaponKind,
    pub damage: i32,
    pub velocities: Vec<Vec3>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireBlock {
    NotPulled,
    Reloading,
    Cooldown,
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReloadFinished {
    pub transferred: u32,
}

#[derive(Debug, Clone)]
pub struct WeaponState {
    kind: WeaponKind,
    spec: WeaponSpec,
    ammo: u32,
    reserve: u32,
    /// Remaining reload time; `Some` while reloading.
    reload_remaining: Option<f32>,
    last_shot_at: Option<f64>,
    ads_blend: f32,
    recoil: f32,
}

impl WeaponState {
    pub fn new(kind: WeaponKind) -> Self {
        Self::with_spec(kind, kind.spec())
    }

    pub fn with_spec(kind: WeaponKind, spec: WeaponSpec) -> Self {
        Self {
            kind,
            spec,
            ammo: spec.magazine,
            reserve: spec.reserve,
            reload_remaining: None,
            last_shot_at: None,
            ads_blend: 0.0,
            recoil: 0.0,
        }
    }

    pub fn kind(&self) -> WeaponKind {
        self.kind
    }

    pub fn spec(&self) -> &WeaponSpec {
        &self.spec
    }

    pub fn ammo(&self) -> u32 {
        self.ammo
    }

    pub fn reserve(&self) -> u32 {
        self.reserve
    }

    pub fn is_reloading(&self) -> bool {
        self.reload_remaining.is_some()
    }

    pub fn reload_remaining(&self) -> Option<f32> {
        self.reload_remaining
    }

    pub fn ads_blend(&self) -> f32 {
        self.ads_blend
    }

    pub fn recoil(&self) -> f32 {
        self.recoil
    }

    /// Advances reload, sight blend and recoil decay by the frame delta.
    pub fn tick(&mut self, dt: f32, aiming: bool) -> Option<ReloadFinished> {
        let ads_rate = 1.0 / self.spec.ads_seconds.max(1e-3);
        let target = if aiming { 1.0 } else { 0.0 };
        if self.ads_blend < target {
            self.ads_blend = (self.ads_blend + ads_rate * dt).min(target);
        } else {
            self.ads_blend = (self.ads_blend - ads_rate * dt).max(target);
        }

        let decay = if aiming {
            self.spec.ads_recoil_decay
        } else {
            self.spec.recoil_decay
        };
        self.recoil = (self.recoil - decay * dt).max(0.0);

        let remaining = self.reload_remaining? - dt;
        if remaining > 0.0 {
            self.reload_remaining = Some(remaining);
            return None;
        }

        self.reload_remaining = None;
        let transferred = (self.spec.magazine - self.ammo).min(self.reserve);
        self.ammo += transferred;
        self.reserve -= transferred;
        Some(ReloadFinished { transferred })
    }

    /// Manual reload. Ignored while reloading, with a full magazine, or with no reserve.
    pub fn request_reload(&mut self) -> bool {
        if self.is_reloading() || self.ammo >= self.spec.magazine || self.reserve == 0 {
            return false;
        }
        self.reload_remaining = Some(self.spec.reload_seconds);
        true
    }

    pub fn cancel_reload(&mut self) {
        self.reload_remaining = None;
    }

    pub fn refill(&mut self) {
        self.ammo = self.spec.magazine;
        self.reserve = self.spec.reserve;
        self.reload_remaining = None;
        self.recoil = 0.0;
    }

    /// Trigger input for this frame. A held trigger fires whenever the weapon is ready.
    pub fn pull_trigger<R: Rng>(
        &mut self,
        held: bool,
        now: f64,
        aim: Vec3,
        aiming: bool,
        rng: &mut R,
    ) -> Result<Shot, FireBlock> {
        if !held {
            return Err(FireBlock::NotPulled);
        }
        self.fire(now, aim, aiming, rng)
    }

    /// One fire request. Rejected requests change nothing.
    pub fn fire<R: Rng>(
        &mut self,
        now: f64,
        aim: Vec3,
        aiming: bool,
        rng: &mut R,
    ) -> Result<Shot, FireBlock> {
        if self.is_reloading() {
            return Err(FireBlock::Reloading);
        }
        if self.ammo == 0 {
            return Err(FireBlock::Empty);
        }
        if let Some(last) = self.last_shot_at {
            let interval = 1.0 / f64::from(self.spec.fire_rate);
            if now - last + FIRE_TIME_EPSILON < interval {
                return Err(FireBlock::Cooldown);
            }
        }

        let aim = aim.normalize_or(Vec3::NEG_Z);
        let spread = if aiming {
            self.spec.ads_spread
        } else {
            self.spec.hip_spread
        };
        let velocities = (0..self.spec.pellets.max(1))
            .map(|_| {
                let jitter = if spread > 0.0 {
                    Vec3::new(
                        rng.random_range(-spread..=spread),
                        rng.random_range(-spread..=spread),
                        rng.random_range(-spread..=spread),
                    )
                } else {
                    Vec3::ZERO
                };
                (aim + jitter).normalize_or(aim) * self.spec.muzzle_speed
            })
            .collect();

        // One round per trigger pull, however many pellets it spawns.
        self.ammo -= 1;
        self.last_shot_at = Some(now);
        self.recoil += self.spec.recoil_per_shot;

        if self.ammo == 0 && self.reserve > 0 {
            self.reload_remaining = Some(self.spec.reload_seconds);
        }

        Ok(Shot {
            kind: self.kind,
            damage: self.spec.damage,
            velocities,
        })
    }
}
