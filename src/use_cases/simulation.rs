// Frame loop: runs every subsystem once per rendered frame in a fixed order.

use crate::domain::colliders::ColliderSet;
use crate::domain::enemy::{AiConfig, Enemy, EnemyTier, HitOutcome};
use crate::domain::movement::{BodyShape, MovementResolver, wish_direction};
use crate::domain::player::Player;
use crate::domain::ports::{EffectKind, Presenter};
use crate::domain::projectile::{HitReport, ProjectilePool};
use crate::domain::score::ScoreBoard;
use crate::domain::spawn::{pick_spawn_point, respawn_delay};
use crate::domain::state::{ActorKind, ActorSnapshot, HudState, MatchOutcome, RenderSnapshot};
use crate::domain::terrain::Heightfield;
use crate::domain::timers::TimerQueue;
use crate::domain::tuning::Tuning;
use crate::domain::vehicle::{Vehicle, VehicleKind};
use crate::domain::weapon::WeaponKind;
use crate::use_cases::replication::{PeerEvent, PeerState, RemotePuppet, TransportEvent};
use crate::use_cases::session::PeerSession;
use crate::use_cases::types::{ConnectionChoice, FrameEvent, FrameInput, GameMode, SessionStatus};
use glam::Vec3;
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Longest step a single frame may integrate, in seconds.
pub const MAX_FRAME_DELTA: f32 = 0.1;

pub const PLAYER_ACTOR_ID: u64 = 0;
pub const PEER_ACTOR_ID: u64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Timed {
    SpawnEnemy,
    RespawnPlayer,
}

pub struct Simulation {
    tuning: Tuning,
    mode: GameMode,
    terrain: Heightfield,
    colliders: ColliderSet,
    rng: StdRng,
    /// Simulated seconds; stands still while paused.
    clock: f64,
    last_frame: Option<Instant>,
    paused: bool,
    status: SessionStatus,
    outcome: MatchOutcome,
    player: Player,
    projectiles: ProjectilePool,
    enemies: Vec<Enemy>,
    next_enemy_id: u64,
    vehicles: Vec<Vehicle>,
    timers: TimerQueue<Timed>,
    score: ScoreBoard,
    wave: u32,
    boss_alive: bool,
    peer: Option<PeerSession>,
    puppet: RemotePuppet,
    peer_kills: u32,
    // Whether the local player fired this frame; replicated as the shooting flag.
    shooting: bool,
    events: Vec<FrameEvent>,
}

impl Simulation {
    /// Generates the world from the tuning seed and parks one of each vehicle near spawn.
    pub fn new(tuning: Tuning, mode: GameMode) -> Self {
        let terrain = Heightfield::generate(&tuning.world);
        let colliders = ColliderSet::generate_buildings(&tuning.world, &terrain);
        let mut sim = Self::with_world(tuning, mode, terrain, colliders);
        for (kind, x, z) in [(VehicleKind::Jeep, 6.0, 8.0), (VehicleKind::Tank, -8.0, 8.0)] {
            let ground = sim.terrain.height_at(x, z);
            sim.add_vehicle(kind, Vec3::new(x, ground, z), 0.0);
        }
        sim
    }

    pub fn with_world(tuning: Tuning, mode: GameMode, terrain: Heightfield, colliders: ColliderSet) -> Self {
        let eye = terrain.height_at(0.0, 0.0) + tuning.player.eye_height;
        let mut sim = Self {
            rng: StdRng::seed_from_u64(tuning.world.seed),
            player: Player::new(Vec3::new(0.0, eye, 0.0), &tuning.player),
            puppet: RemotePuppet::new(&tuning.player),
            tuning,
            mode,
            terrain,
            colliders,
            clock: 0.0,
            last_frame: None,
            paused: false,
            status: SessionStatus::Running,
            outcome: MatchOutcome::InProgress,
            projectiles: ProjectilePool::new(),
            enemies: Vec::new(),
            next_enemy_id: 1,
            vehicles: Vec::new(),
            timers: TimerQueue::new(),
            score: ScoreBoard::default(),
            wave: 0,
            boss_alive: false,
            peer: None,
            peer_kills: 0,
            shooting: false,
            events: Vec::new(),
        };
        if mode == GameMode::Solo {
            sim.top_up_regulars();
        }
        info!(?mode, enemies = sim.enemies.len(), "simulation ready");
        sim
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn outcome(&self) -> MatchOutcome {
        self.outcome
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn terrain(&self) -> &Heightfield {
        &self.terrain
    }

    pub fn colliders(&self) -> &ColliderSet {
        &self.colliders
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn projectiles(&self) -> &ProjectilePool {
        &self.projectiles
    }

    pub fn score(&self) -> &ScoreBoard {
        &self.score
    }

    pub fn wave(&self) -> u32 {
        self.wave
    }

    pub fn boss_alive(&self) -> bool {
        self.boss_alive
    }

    pub fn puppet(&self) -> &RemotePuppet {
        &self.puppet
    }

    pub fn peer_kills(&self) -> u32 {
        self.peer_kills
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn attach_peer(&mut self, session: PeerSession) {
        self.peer = Some(session);
    }

    pub fn set_paused(&mut self, paused: bool) {
        if self.paused != paused {
            debug!(paused, "pause toggled");
        }
        self.paused = paused;
        // The first frame after resuming integrates nothing.
        self.last_frame = None;
    }

    pub fn add_vehicle(&mut self, kind: VehicleKind, position: Vec3, yaw: f32) -> usize {
        let id = self.vehicles.len() as u64 + 1;
        self.vehicles.push(Vehicle::new(id, kind, position, yaw));
        self.vehicles.len() - 1
    }

    /// Places an enemy at a feet position. Refuses a second live boss.
    pub fn spawn_enemy_at(&mut self, tier: EnemyTier, position: Vec3) -> Option<u64> {
        if tier.is_boss() && self.boss_alive {
            return None;
        }
        let enemy_id = self.next_enemy_id;
        self.next_enemy_id += 1;
        self.enemies.push(Enemy::spawn(enemy_id, tier, position));
        self.events.push(FrameEvent::EnemySpawned {
            enemy_id,
            tier,
            position,
        });
        if tier.is_boss() {
            self.boss_alive = true;
            info!(enemy_id, wave = self.wave, "boss spawned");
            self.events.push(FrameEvent::BossSpawned { enemy_id });
        }
        Some(enemy_id)
    }

    /// Answers a connection loss. Returns false when there was nothing to resolve.
    pub fn resolve_connection_loss(&mut self, choice: ConnectionChoice) -> bool {
        if self.status != SessionStatus::ConnectionLost {
            return false;
        }
        match choice {
            ConnectionChoice::Reconnect(channel) => {
                match self.peer.as_mut() {
                    Some(session) => session.replace_channel(channel),
                    None => self.peer = Some(PeerSession::new(channel)),
                }
                self.status = SessionStatus::Running;
                self.last_frame = None;
                info!("peer reconnected; resuming");
            }
            ConnectionChoice::Abandon => {
                self.peer = None;
                self.outcome = MatchOutcome::Abandoned;
                self.status = SessionStatus::Finished;
                info!("match abandoned after connection loss");
            }
        }
        true
    }

    /// Wall-clock frame entry point. The delta is measured from the previous call.
    pub fn frame(&mut self, now: Instant, input: &mut FrameInput) -> Vec<FrameEvent> {
        let dt = match self.last_frame.replace(now) {
            Some(previous) => now.saturating_duration_since(previous).as_secs_f32(),
            None => 0.0,
        };
        self.step(dt, now, input)
    }

    /// Runs a frame and forwards its events and the HUD to the presenter.
    pub fn frame_with<P: Presenter>(&mut self, now: Instant, input: &mut FrameInput, presenter: &mut P) -> Vec<FrameEvent> {
        let events = self.frame(now, input);
        dispatch_events(presenter, &events, self.player.position);
        presenter.update_hud(&self.hud());
        events
    }

    /// One frame with an explicit delta. `now` only feeds the replication clock.
    pub fn step(&mut self, dt: f32, now: Instant, input: &mut FrameInput) -> Vec<FrameEvent> {
        // Edge-triggered input is consumed even when the frame does not run.
        let reload = std::mem::take(&mut input.reload_requested);
        let interact = std::mem::take(&mut input.interact_requested);
        let switch = input.switch_weapon.take();

        if self.paused || self.status != SessionStatus::Running {
            return std::mem::take(&mut self.events);
        }

        let dt = if dt.is_finite() {
            dt.clamp(0.0, MAX_FRAME_DELTA)
        } else {
            0.0
        };
        self.clock += f64::from(dt);
        self.shooting = false;

        if self.player.alive {
            self.player
                .look(input.look_yaw, input.look_pitch, self.tuning.player.max_pitch);
        }
        if interact {
            self.interact();
        }
        self.move_player(input, dt);
        self.update_weapon(input, reload, switch, dt);
        self.update_projectiles(dt);
        if self.mode == GameMode::Solo {
            self.update_enemies(dt);
        }
        self.run_timers(dt);
        if self.mode == GameMode::Versus {
            self.sync_peer(now, dt);
        }

        std::mem::take(&mut self.events)
    }

    pub fn hud(&self) -> HudState {
        let weapon = self.player.weapon();
        HudState {
            health: self.player.health.current(),
            max_health: self.player.health.max(),
            alive: self.player.alive,
            weapon: weapon.kind(),
            ammo: weapon.ammo(),
            reserve: weapon.reserve(),
            reloading: weapon.is_reloading(),
            ads_blend: weapon.ads_blend(),
            recoil: weapon.recoil(),
            score: self.score.score,
            kills: self.score.kills,
            streak: self.score.streak,
            multiplier: self.score.multiplier(&self.tuning.waves),
            wave: self.wave,
            boss_alive: self.boss_alive,
            driving: self
                .player
                .driving
                .and_then(|i| self.vehicles.get(i))
                .map(|v| v.kind),
            peer_kills: self.peer_kills,
            outcome: self.outcome,
            paused: self.paused,
            connection_lost: self.status == SessionStatus::ConnectionLost,
        }
    }

    pub fn snapshot(&self) -> RenderSnapshot {
        let ai = self.ai_config();
        let mut actors = Vec::with_capacity(self.enemies.len() + self.vehicles.len() + 2);

        actors.push(ActorSnapshot {
            id: PLAYER_ACTOR_ID,
            kind: ActorKind::Player,
            position: self.player.position,
            yaw: self.player.yaw,
            health: self.player.health.current(),
            max_health: self.player.health.max(),
            tilt: 0.0,
        });
        actors.extend(self.enemies.iter().map(|e| ActorSnapshot {
            id: e.id,
            kind: ActorKind::Enemy(e.tier),
            position: e.position,
            yaw: e.yaw,
            health: e.health.current(),
            max_health: e.health.max(),
            tilt: e.fall_tilt(&ai),
        }));
        if self.puppet.is_visible() {
            actors.push(ActorSnapshot {
                id: PEER_ACTOR_ID,
                kind: ActorKind::Peer,
                position: self.puppet.rendered_position(),
                yaw: self.puppet.rendered_yaw(),
                health: self.puppet.health.current(),
                max_health: self.puppet.health.max(),
                tilt: 0.0,
            });
        }
        actors.extend(self.vehicles.iter().map(|v| ActorSnapshot {
            id: v.id,
            kind: ActorKind::Vehicle(v.kind),
            position: v.position,
            yaw: v.yaw,
            health: 0,
            max_health: 0,
            tilt: 0.0,
        }));

        RenderSnapshot {
            camera_position: self.player.position,
            camera_yaw: self.player.yaw,
            camera_pitch: self.player.pitch,
            actors,
            projectiles: self.projectiles.iter().map(|p| p.position).collect(),
            hud: self.hud(),
        }
    }

    fn ai_config(&self) -> AiConfig {
        AiConfig {
            stagger_seconds: self.tuning.waves.stagger_seconds,
            stagger_speed_scale: self.tuning.waves.stagger_speed_scale,
            death_seconds: self.tuning.waves.death_seconds,
        }
    }

    fn interact(&mut self) {
        if !self.player.alive {
            return;
        }
        if let Some(index) = self.player.driving {
            self.exit_vehicle(index);
            return;
        }

        let feet = self.player.feet(&self.tuning.player);
        let nearest = self
            .vehicles
            .iter()
            .enumerate()
            .filter(|(_, v)| !v.occupied && v.within_reach(feet))
            .min_by(|(_, a), (_, b)| {
                a.position
                    .distance_squared(feet)
                    .total_cmp(&b.position.distance_squared(feet))
            })
            .map(|(i, _)| i);

        let Some(index) = nearest else {
            return;
        };
        let vehicle = &mut self.vehicles[index];
        vehicle.occupied = true;
        self.player.driving = Some(index);
        self.player.position = vehicle.seat_position();
        self.player.vertical_velocity = 0.0;
        self.player.weapon_mut().cancel_reload();
        debug!(vehicle_id = vehicle.id, kind = ?vehicle.kind, "entered vehicle");
        self.events.push(FrameEvent::VehicleEntered {
            vehicle_id: vehicle.id,
            kind: vehicle.kind,
        });
    }

    fn exit_vehicle(&mut self, index: usize) {
        self.player.driving = None;
        let Some(vehicle) = self.vehicles.get_mut(index) else {
            return;
        };
        let resolver = MovementResolver::new(
            &self.terrain,
            &self.colliders,
            self.tuning.world.gravity,
            self.tuning.world.half_extent,
        );
        let position = vehicle.exit_position(&resolver, Player::shape(&self.tuning.player));
        vehicle.occupied = false;
        vehicle.speed = 0.0;
        self.player.position = position;
        self.player.vertical_velocity = 0.0;
        self.player.grounded = false;
        debug!(vehicle_id = vehicle.id, "exited vehicle");
        self.events.push(FrameEvent::VehicleExited {
            vehicle_id: vehicle.id,
            kind: vehicle.kind,
            position,
        });
    }

    fn move_player(&mut self, input: &FrameInput, dt: f32) {
        if !self.player.alive {
            return;
        }
        let resolver = MovementResolver::new(
            &self.terrain,
            &self.colliders,
            self.tuning.world.gravity,
            self.tuning.world.half_extent,
        );

        if let Some(index) = self.player.driving {
            let Some(vehicle) = self.vehicles.get_mut(index) else {
                self.player.driving = None;
                return;
            };
            vehicle.drive(input.forward_axis(), input.strafe_axis(), &resolver, dt);
            self.player.position = vehicle.seat_position();
            self.player.vertical_velocity = 0.0;
            self.player.grounded = true;
            return;
        }

        let tuning = &self.tuning.player;
        let speed = if input.aim_held {
            tuning.move_speed * tuning.aim_move_scale
        } else {
            tuning.move_speed
        };
        let wish = wish_direction(self.player.yaw, input.forward_axis(), input.strafe_axis());
        if input.jump && self.player.grounded {
            self.player.vertical_velocity = tuning.jump_speed;
        }

        let result = resolver.resolve(
            Player::shape(tuning),
            self.player.position,
            wish * speed * dt,
            self.player.vertical_velocity,
            dt,
        );
        self.player.position = result.position;
        self.player.vertical_velocity = result.vertical_velocity;
        self.player.grounded = result.grounded;
    }

    fn update_weapon(&mut self, input: &FrameInput, reload: bool, switch: Option<WeaponKind>, dt: f32) {
        let armed = self.player.alive && self.player.driving.is_none();

        if let Some(kind) = switch.filter(|_| armed) {
            if self.player.switch_to(kind) {
                self.events.push(FrameEvent::WeaponSwitched { weapon: kind });
            }
        }

        let aiming = armed && input.aim_held;
        let weapon = self.player.weapon().kind();
        if let Some(done) = self.player.weapon_mut().tick(dt, aiming) {
            debug!(?weapon, transferred = done.transferred, "reload finished");
            self.events.push(FrameEvent::ReloadFinished {
                weapon,
                transferred: done.transferred,
            });
        }
        if !armed {
            return;
        }

        if reload && self.player.weapon_mut().request_reload() {
            debug!(?weapon, "reload started");
            self.events.push(FrameEvent::ReloadStarted { weapon });
        }

        let origin = self.player.position;
        let direction = self.player.aim_direction();
        let fired = self.player.weapon_mut().pull_trigger(
            input.fire_held,
            self.clock,
            direction,
            aiming,
            &mut self.rng,
        );
        if let Ok(shot) = fired {
            self.projectiles.spawn_shot(origin, &shot, self.clock);
            self.shooting = true;
            self.events.push(FrameEvent::ShotFired {
                weapon,
                origin,
                direction,
            });
            if self.player.weapon().is_reloading() {
                debug!(?weapon, "magazine empty; reloading");
                self.events.push(FrameEvent::ReloadStarted { weapon });
            }
        }
    }

    fn update_projectiles(&mut self, dt: f32) {
        self.projectiles
            .advance(dt, &self.terrain, &self.tuning.projectile);

        match self.mode {
            GameMode::Solo => {
                let reports = self
                    .projectiles
                    .resolve_hits(&self.enemies, &self.tuning.projectile);
                for report in reports {
                    self.apply_enemy_hit(report);
                }
            }
            GameMode::Versus => {
                let reports = self
                    .projectiles
                    .resolve_hits(std::slice::from_ref(&self.puppet), &self.tuning.projectile);
                for report in reports {
                    let headshot = report.kind.is_headshot();
                    debug!(damage = report.damage, headshot, "hit remote peer");
                    self.events.push(FrameEvent::PeerHit {
                        damage: report.damage,
                        headshot,
                        point: report.point,
                    });
                    self.send_to_peer(PeerEvent::Hit {
                        damage: report.damage,
                    });
                }
            }
        }
    }

    fn apply_enemy_hit(&mut self, report: HitReport) {
        let ai = self.ai_config();
        let Some(enemy) = self.enemies.get_mut(report.target) else {
            return;
        };
        let outcome = enemy.apply_hit(report.damage, &ai);
        if outcome == HitOutcome::Ignored {
            return;
        }

        let (enemy_id, tier, position) = (enemy.id, enemy.tier, enemy.position);
        let headshot = report.kind.is_headshot();
        self.events.push(FrameEvent::EnemyHit {
            enemy_id,
            damage: report.damage,
            headshot,
            point: report.point,
        });
        if outcome == HitOutcome::Killed {
            self.on_enemy_killed(enemy_id, tier, headshot, position);
        }
    }

    fn on_enemy_killed(&mut self, enemy_id: u64, tier: EnemyTier, headshot: bool, position: Vec3) {
        let points = self.score.award_kill(headshot, &self.tuning.waves);
        info!(enemy_id, ?tier, headshot, points, kills = self.score.kills, "enemy killed");
        self.events.push(FrameEvent::EnemyKilled {
            enemy_id,
            tier,
            headshot,
            points,
            position,
        });

        if tier.is_boss() {
            self.boss_alive = false;
            self.wave += 1;
            info!(wave = self.wave, "wave advanced");
            self.events.push(FrameEvent::WaveAdvanced { wave: self.wave });
            self.top_up_regulars();
        } else {
            let delay = respawn_delay(&mut self.rng, &self.tuning.world);
            self.timers.schedule_in(delay, Timed::SpawnEnemy);
        }

        let every = self.tuning.waves.boss_every_kills;
        if every > 0 && self.score.kills % every == 0 && !self.boss_alive {
            self.spawn_enemy(EnemyTier::Boss);
        }
    }

    fn enemy_shape(tier: EnemyTier) -> BodyShape {
        let stats = tier.stats();
        BodyShape {
            radius: stats.radius,
            height: stats.height,
            ground_offset: 0.0,
        }
    }

    fn spawn_enemy(&mut self, tier: EnemyTier) -> Option<u64> {
        let resolver = MovementResolver::new(
            &self.terrain,
            &self.colliders,
            self.tuning.world.gravity,
            self.tuning.world.half_extent,
        );
        let position = pick_spawn_point(
            &mut self.rng,
            &self.tuning.world,
            &resolver,
            Self::enemy_shape(tier),
        );
        self.spawn_enemy_at(tier, position)
    }

    fn spawn_regular(&mut self) -> Option<u64> {
        let roll = self.rng.random_range(0..EnemyTier::pool_weight());
        self.spawn_enemy(EnemyTier::from_pool_roll(roll))
    }

    /// Keeps live plus pending regular enemies at the current wave's target.
    fn top_up_regulars(&mut self) {
        let waves = &self.tuning.waves;
        let target = (waves.base_enemies + waves.per_wave * self.wave as usize).min(waves.max_enemies);
        let alive = self
            .enemies
            .iter()
            .filter(|e| !e.tier.is_boss() && !e.is_dying())
            .count();
        let pending = self
            .timers
            .iter()
            .filter(|t| t.payload == Timed::SpawnEnemy)
            .count();
        for _ in (alive + pending)..target {
            self.spawn_regular();
        }
    }

    fn update_enemies(&mut self, dt: f32) {
        let ai = self.ai_config();
        let resolver = MovementResolver::new(
            &self.terrain,
            &self.colliders,
            self.tuning.world.gravity,
            self.tuning.world.half_extent,
        );
        let target = self.player.position;

        let mut attacks = Vec::new();
        for enemy in &mut self.enemies {
            if let Some(attack) = enemy.update(target, &resolver, &ai, dt) {
                attacks.push(attack);
            }
        }
        for attack in attacks {
            self.damage_player(attack.damage);
        }

        let mut removed = Vec::new();
        self.enemies.retain(|e| {
            if e.ready_for_cleanup(&ai) {
                removed.push((e.id, e.tier));
                false
            } else {
                true
            }
        });
        for (enemy_id, tier) in removed {
            self.events.push(FrameEvent::EnemyRemoved { enemy_id, tier });
        }
    }

    fn damage_player(&mut self, damage: i32) {
        if !self.player.alive {
            return;
        }
        let died = self.player.health.apply_damage(damage);
        self.score.break_streak();
        self.events.push(FrameEvent::PlayerDamaged {
            damage,
            health: self.player.health.current(),
        });
        if died {
            self.on_player_death();
        }
    }

    fn on_player_death(&mut self) {
        if let Some(index) = self.player.driving {
            self.exit_vehicle(index);
        }
        self.player.alive = false;
        self.player.weapon_mut().cancel_reload();
        let position = self.player.position;
        info!(?position, "player died");
        self.events.push(FrameEvent::PlayerDied { position });

        let delay = respawn_delay(&mut self.rng, &self.tuning.world);
        self.timers.schedule_in(delay, Timed::RespawnPlayer);
        if self.mode == GameMode::Versus {
            self.send_to_peer(PeerEvent::Death);
        }
    }

    fn respawn_player(&mut self) {
        let resolver = MovementResolver::new(
            &self.terrain,
            &self.colliders,
            self.tuning.world.gravity,
            self.tuning.world.half_extent,
        );
        let position = pick_spawn_point(
            &mut self.rng,
            &self.tuning.world,
            &resolver,
            Player::shape(&self.tuning.player),
        );
        self.player.respawn_at(position);
        info!(?position, "player respawned");
        self.events.push(FrameEvent::PlayerRespawned { position });
        if self.mode == GameMode::Versus {
            self.send_to_peer(PeerEvent::Respawn { position });
        }
    }

    fn run_timers(&mut self, dt: f32) {
        for due in self.timers.advance(f64::from(dt)) {
            match due {
                Timed::SpawnEnemy => {
                    if self.mode == GameMode::Solo {
                        self.spawn_regular();
                    }
                }
                Timed::RespawnPlayer => self.respawn_player(),
            }
        }
    }

    fn sync_peer(&mut self, now: Instant, dt: f32) {
        let Some(session) = self.peer.as_mut() else {
            return;
        };

        let state = PeerState {
            position: self.player.position,
            yaw: self.player.yaw,
            health: self.player.health.current(),
            shooting: self.shooting,
        };
        // A failed send flips the session to disconnected; handled below.
        let _ = session.offer_state(state, now, &self.tuning.net);
        let incoming = session.drain();

        for event in incoming {
            if self.status != SessionStatus::Running {
                break;
            }
            self.apply_transport_event(event);
        }

        if self.status == SessionStatus::Running {
            self.puppet.update(now, dt, &self.tuning.net);
            if self.peer.as_ref().is_some_and(|s| !s.is_connected()) {
                self.on_connection_lost();
            }
        }
    }

    fn apply_transport_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Message { event, received_at } => self.apply_peer_event(event, received_at),
            TransportEvent::PeerJoined => {
                info!("peer joined");
                self.events.push(FrameEvent::PeerJoined);
            }
            // The session already marked itself disconnected.
            TransportEvent::PeerLeft | TransportEvent::Disconnected => {}
        }
    }

    /// Peer events are trusted as sent. A desynced or hostile peer can set our health and
    /// the match result directly; there is no authority to appeal to.
    fn apply_peer_event(&mut self, event: PeerEvent, received_at: Instant) {
        match event {
            PeerEvent::State(state) => self.puppet.apply_state(&state, received_at),
            PeerEvent::Hit { damage } => self.damage_player(damage),
            PeerEvent::Death => {
                self.peer_kills += 1;
                info!(kills = self.peer_kills, "remote peer killed");
                self.events.push(FrameEvent::PeerKilled {
                    kills: self.peer_kills,
                });
                if self.peer_kills >= self.tuning.net.kills_to_win {
                    self.send_to_peer(PeerEvent::Win {
                        kills: self.peer_kills,
                    });
                    self.finish(MatchOutcome::Won);
                }
            }
            PeerEvent::Respawn { position } => {
                self.puppet.snap_to(position, received_at);
                self.events.push(FrameEvent::PeerRespawned { position });
            }
            PeerEvent::Win { kills } => {
                info!(peer_kills = kills, "remote peer won");
                self.finish(MatchOutcome::Lost);
            }
        }
    }

    fn send_to_peer(&mut self, event: PeerEvent) {
        let Some(session) = self.peer.as_mut() else {
            return;
        };
        if session.send(event).is_err() && self.status == SessionStatus::Running {
            self.on_connection_lost();
        }
    }

    fn finish(&mut self, outcome: MatchOutcome) {
        self.outcome = outcome;
        self.status = SessionStatus::Finished;
        info!(?outcome, peer_kills = self.peer_kills, "match ended");
        self.events.push(FrameEvent::MatchEnded { outcome });
    }

    fn on_connection_lost(&mut self) {
        self.status = SessionStatus::ConnectionLost;
        warn!("peer connection lost; simulation paused");
        self.events.push(FrameEvent::ConnectionLost);
    }
}

/// Forwards a frame's events to the presenter. Effects without a world position are
/// played at `listener`.
pub fn dispatch_events<P: Presenter + ?Sized>(presenter: &mut P, events: &[FrameEvent], listener: Vec3) {
    for event in events {
        match *event {
            FrameEvent::ShotFired { weapon, origin, .. } => {
                presenter.play_effect(EffectKind::MuzzleFlash(weapon), origin)
            }
            FrameEvent::ReloadStarted { .. } => presenter.play_effect(EffectKind::Reload, listener),
            FrameEvent::EnemySpawned {
                enemy_id,
                tier,
                position,
            } => presenter.spawn_representation(enemy_id, ActorKind::Enemy(tier), position, 0.0),
            FrameEvent::EnemyHit { headshot, point, .. } | FrameEvent::PeerHit { headshot, point, .. } => {
                let effect = if headshot {
                    EffectKind::Headshot
                } else {
                    EffectKind::Impact
                };
                presenter.play_effect(effect, point);
            }
            FrameEvent::EnemyKilled { position, .. } => presenter.play_effect(EffectKind::EnemyDeath, position),
            FrameEvent::EnemyRemoved { enemy_id, tier } => {
                presenter.remove_representation(enemy_id, ActorKind::Enemy(tier))
            }
            FrameEvent::BossSpawned { .. } => presenter.play_effect(EffectKind::BossSpawn, listener),
            FrameEvent::PlayerDamaged { .. } => presenter.play_effect(EffectKind::PlayerHurt, listener),
            FrameEvent::PlayerDied { position } => presenter.play_effect(EffectKind::PlayerDeath, position),
            FrameEvent::PlayerRespawned { position } => {
                presenter.spawn_representation(PLAYER_ACTOR_ID, ActorKind::Player, position, 0.0)
            }
            FrameEvent::VehicleEntered { .. } => presenter.play_effect(EffectKind::VehicleEnter, listener),
            FrameEvent::VehicleExited { position, .. } => {
                presenter.play_effect(EffectKind::VehicleExit, position)
            }
            FrameEvent::PeerRespawned { position } => {
                presenter.spawn_representation(PEER_ACTOR_ID, ActorKind::Peer, position, 0.0)
            }
            FrameEvent::ReloadFinished { .. }
            | FrameEvent::WeaponSwitched { .. }
            | FrameEvent::WaveAdvanced { .. }
            | FrameEvent::PeerJoined
            | FrameEvent::PeerKilled { .. }
            | FrameEvent::MatchEnded { .. }
            | FrameEvent::ConnectionLost => {}
        }
    }
}
