use glam::Vec3;
use skirmish::domain::tuning::ProjectileTuning;
use skirmish::domain::weapon::Shot;
use skirmish::domain::{
    AiConfig, ColliderSet, Enemy, EnemyState, EnemyTier, Health, Heightfield, HitKind, HitOutcome,
    ProjectilePool, Tuning, WeaponKind,
};
use skirmish::use_cases::{FrameEvent, FrameInput, GameMode, Simulation};
use std::time::{Duration, Instant};

const AI: AiConfig = AiConfig {
    stagger_seconds: 0.3,
    stagger_speed_scale: 0.3,
    death_seconds: 1.0,
};

fn round(kind: WeaponKind, damage: i32, velocity: Vec3) -> Shot {
    Shot {
        kind,
        damage,
        velocities: vec![velocity],
    }
}

/// Fires one round from `origin` and returns the first report against `enemy`.
fn fire_at(enemy: &Enemy, origin: Vec3, shot: &Shot) -> Option<(HitKind, i32)> {
    let terrain = Heightfield::flat(100.0, 4, 0.0);
    let tuning = ProjectileTuning::default();
    let mut pool = ProjectilePool::new();
    pool.spawn_shot(origin, shot, 0.0);
    for _ in 0..60 {
        pool.advance(1.0 / 60.0, &terrain, &tuning);
        if let Some(report) = pool.resolve_hits(std::slice::from_ref(enemy), &tuning).first() {
            return Some((report.kind, report.damage));
        }
    }
    None
}

#[test]
fn test_body_hits_wear_an_enemy_down_then_it_dies() {
    let mut enemy = Enemy::spawn(7, EnemyTier::Light, Vec3::new(0.0, 0.0, -10.0));
    let rifle = round(WeaponKind::Rifle, 25, Vec3::new(0.0, 0.0, -150.0));
    let chest = Vec3::new(0.0, 1.0, 0.0);

    let mut seen = vec![enemy.health.current()];
    for _ in 0..3 {
        let (kind, damage) = fire_at(&enemy, chest, &rifle).expect("body hit");
        assert_eq!(kind, HitKind::Body);
        assert_eq!(enemy.apply_hit(damage, &AI), HitOutcome::Damaged);
        seen.push(enemy.health.current());
    }
    assert_eq!(seen, vec![80, 55, 30, 5]);

    let (_, damage) = fire_at(&enemy, chest, &rifle).expect("fourth hit");
    assert_eq!(enemy.apply_hit(damage, &AI), HitOutcome::Killed);
    assert_eq!(enemy.health.current(), 0);
    assert_eq!(enemy.state, EnemyState::Dying);
    assert!(!enemy.ready_for_cleanup(&AI));

    // Dying enemies no longer catch rounds.
    assert_eq!(fire_at(&enemy, chest, &rifle), None);
}

#[test]
fn test_single_headshot_kills_a_weakened_enemy() {
    let mut enemy = Enemy::spawn(3, EnemyTier::Fast, Vec3::new(0.0, 0.0, -10.0));
    enemy.health = Health::full(40);
    let head = Vec3::new(0.0, enemy.stats.head_height, 0.0);
    let pistol = round(WeaponKind::Pistol, 25, Vec3::new(0.0, 0.0, -120.0));

    let (kind, damage) = fire_at(&enemy, head, &pistol).expect("headshot");
    assert_eq!(kind, HitKind::Head);
    assert_eq!(damage, 50);
    assert_eq!(enemy.apply_hit(damage, &AI), HitOutcome::Killed);
    assert_eq!(enemy.health.current(), 0);
    assert!(enemy.is_dying());
}

#[test]
fn test_solo_session_scores_a_kill_end_to_end() {
    let mut tuning = Tuning::default();
    tuning.waves.base_enemies = 0;
    tuning.waves.per_wave = 0;
    // A raised plateau, so eye height and enemy feet both follow the terrain.
    let terrain = Heightfield::flat(tuning.world.half_extent, 16, 2.0);
    let mut sim = Simulation::with_world(tuning, GameMode::Solo, terrain, ColliderSet::new());
    assert_eq!(sim.player().position.y, 2.0 + tuning.player.eye_height);

    let enemy_id = sim
        .spawn_enemy_at(EnemyTier::Light, Vec3::new(0.0, 2.0, -8.0))
        .expect("enemy spawned");

    let start = Instant::now();
    let mut events = Vec::new();
    let mut input = FrameInput {
        switch_weapon: Some(WeaponKind::Sniper),
        fire_held: true,
        aim_held: true,
        ..FrameInput::default()
    };
    for frame in 0..30u32 {
        let now = start + Duration::from_secs_f32(frame as f32 / 60.0);
        events.extend(sim.frame(now, &mut input));
    }

    assert!(events.iter().any(|e| matches!(e, FrameEvent::ShotFired { weapon: WeaponKind::Sniper, .. })));
    assert!(events.iter().any(|e| matches!(e, FrameEvent::EnemyKilled { enemy_id: id, .. } if *id == enemy_id)));
    assert_eq!(sim.score().kills, 1);
    assert!(sim.score().score >= 100);
    assert_eq!(sim.hud().score, sim.score().score);
}
