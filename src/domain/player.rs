// Local player: pose, vertical physics state, health and the weapon loadout.

use crate::domain::health::Health;
use crate::domain::movement::BodyShape;
use crate::domain::tuning::PlayerTuning;
use crate::domain::weapon::{WeaponKind, WeaponState};
use glam::Vec3;

#[derive(Debug, Clone)]
pub struct Player {
    /// Eye position; the feet sit `eye_height` below it.
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub vertical_velocity: f32,
    pub grounded: bool,
    pub health: Health,
    pub alive: bool,
    /// Index into the simulation's vehicle list while driving.
    pub driving: Option<usize>,
    pub weapons: Vec<WeaponState>,
    pub active_weapon: usize,
}

impl Player {
    pub fn new(position: Vec3, tuning: &PlayerTuning) -> Self {
        Self {
            position,
            yaw: 0.0,
            pitch: 0.0,
            vertical_velocity: 0.0,
            grounded: true,
            health: Health::full(tuning.max_hp),
            alive: true,
            driving: None,
            weapons: WeaponKind::ALL.iter().map(|k| WeaponState::new(*k)).collect(),
            // Rifle.
            active_weapon: 1,
        }
    }

    pub fn shape(tuning: &PlayerTuning) -> BodyShape {
        BodyShape {
            radius: tuning.radius,
            height: tuning.height,
            ground_offset: tuning.eye_height,
        }
    }

    pub fn feet(&self, tuning: &PlayerTuning) -> Vec3 {
        self.position - Vec3::new(0.0, tuning.eye_height, 0.0)
    }

    pub fn weapon(&self) -> &WeaponState {
        &self.weapons[self.active_weapon]
    }

    pub fn weapon_mut(&mut self) -> &mut WeaponState {
        &mut self.weapons[self.active_weapon]
    }

    /// Switches weapons, abandoning any reload on the holstered one. Returns false when
    /// the kind is already active or not carried.
    pub fn switch_to(&mut self, kind: WeaponKind) -> bool {
        let Some(index) = self.weapons.iter().position(|w| w.kind() == kind) else {
            return false;
        };
        if index == self.active_weapon {
            return false;
        }
        self.weapons[self.active_weapon].cancel_reload();
        self.active_weapon = index;
        true
    }

    /// Applies mouse-look deltas; pitch is clamped short of straight up/down.
    pub fn look(&mut self, yaw_delta: f32, pitch_delta: f32, max_pitch: f32) {
        if yaw_delta.is_finite() {
            self.yaw = (self.yaw + yaw_delta).rem_euclid(std::f32::consts::TAU);
        }
        if pitch_delta.is_finite() {
            self.pitch = (self.pitch + pitch_delta).clamp(-max_pitch, max_pitch);
        }
    }

    /// Full 3D aim direction from yaw and pitch.
    pub fn aim_direction(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        Vec3::new(-sy * cp, sp, -cy * cp)
    }

    pub fn respawn_at(&mut self, position: Vec3) {
        self.position = position;
        self.vertical_velocity = 0.0;
        self.grounded = true;
        self.health.refill();
        self.alive = true;
        self.driving = None;
        for weapon in &mut self.weapons {
            weapon.refill();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aim_follows_yaw_and_pitch() {
        let mut player = Player::new(Vec3::ZERO, &PlayerTuning::default());
        assert!(player.aim_direction().abs_diff_eq(Vec3::NEG_Z, 1e-6));

        player.look(std::f32::consts::FRAC_PI_2, 0.0, 1.45);
        assert!(player.aim_direction().abs_diff_eq(Vec3::NEG_X, 1e-6));

        player.look(0.0, 10.0, 1.45);
        assert_eq!(player.pitch, 1.45);
        assert!(player.aim_direction().y > 0.99);
    }

    #[test]
    fn switching_cancels_reload_on_the_holstered_weapon() {
        let mut player = Player::new(Vec3::ZERO, &PlayerTuning::default());
        let mut rng = <rand::rngs::StdRng as rand::SeedableRng>::seed_from_u64(3);
        player
            .weapon_mut()
            .fire(0.0, Vec3::NEG_Z, false, &mut rng)
            .expect("first shot");
        assert!(player.weapon_mut().request_reload());

        assert!(player.switch_to(WeaponKind::Shotgun));
        assert!(!player.switch_to(WeaponKind::Shotgun));
        assert!(!player.weapons[1].is_reloading());
        assert_eq!(player.weapon().kind(), WeaponKind::Shotgun);
    }

    #[test]
    fn respawn_restores_health_and_ammo() {
        let mut player = Player::new(Vec3::ZERO, &PlayerTuning::default());
        player.health.apply_damage(500);
        player.alive = false;
        let mut rng = <rand::rngs::StdRng as rand::SeedableRng>::seed_from_u64(5);
        player
            .weapon_mut()
            .fire(0.0, Vec3::NEG_Z, false, &mut rng)
            .expect("shot");
        let magazine = player.weapon().spec().magazine;
        assert_eq!(player.weapon().ammo(), magazine - 1);

        player.respawn_at(Vec3::new(40.0, 1.7, 0.0));
        assert!(player.alive);
        assert_eq!(player.health.current(), player.health.max());
        assert_eq!(player.position, Vec3::new(40.0, 1.7, 0.0));
        assert_eq!(player.weapon().ammo(), magazine);
    }
}
