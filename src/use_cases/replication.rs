// Peer replication: snapshot send gating, puppet dead reckoning and the event vocabulary.

use crate::domain::health::Health;
use crate::domain::projectile::{HitTarget, HitVolume};
use crate::domain::tuning::{NetTuning, PlayerTuning};
use glam::Vec3;
use std::f32::consts::{PI, TAU};
use std::time::Instant;

/// Continuous state of one peer's player.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeerState {
    /// Eye position.
    pub position: Vec3,
    pub yaw: f32,
    pub health: i32,
    pub shooting: bool,
}

/// Everything peers tell each other. Discrete events are applied once, unacknowledged,
/// and trusted at face value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PeerEvent {
    State(PeerState),
    Hit { damage: i32 },
    Death,
    Respawn { position: Vec3 },
    Win { kills: u32 },
}

/// What the transport hands back each frame.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    Message { event: PeerEvent, received_at: Instant },
    PeerJoined,
    PeerLeft,
    Disconnected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    Closed,
    Encode(String),
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportError::Closed => write!(f, "peer channel closed"),
            TransportError::Encode(e) => write!(f, "failed to encode peer message: {e}"),
        }
    }
}

impl std::error::Error for TransportError {}

/// Ordered, reliable peer channel. Never blocks the frame.
pub trait PeerChannel: Send {
    fn send(&mut self, event: PeerEvent) -> Result<(), TransportError>;

    /// Next buffered event, if any.
    fn try_recv(&mut self) -> Option<TransportEvent>;
}

/// Signed smallest rotation taking `from` to `to`, in `(-PI, PI]`.
pub fn shortest_angle(from: f32, to: f32) -> f32 {
    let diff = (to - from).rem_euclid(TAU);
    if diff > PI { diff - TAU } else { diff }
}

/// Rate limit plus change threshold for outgoing state snapshots.
#[derive(Debug, Clone, Default)]
pub struct SendGate {
    last_sent: Option<(PeerState, Instant)>,
}

impl SendGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the last sent state so the next offer goes out unconditionally.
    pub fn reset(&mut self) {
        self.last_sent = None;
    }

    pub fn is_significant(previous: &PeerState, next: &PeerState, tuning: &NetTuning) -> bool {
        previous.position.distance(next.position) > tuning.position_epsilon
            || shortest_angle(previous.yaw, next.yaw).abs() > tuning.rotation_epsilon
            || previous.health != next.health
            || previous.shooting != next.shooting
    }

    /// Returns true and records the state when it should be sent now.
    pub fn offer(&mut self, state: PeerState, now: Instant, tuning: &NetTuning) -> bool {
        if let Some((previous, sent_at)) = &self.last_sent {
            let since = now.saturating_duration_since(*sent_at).as_secs_f32();
            if since < tuning.min_send_interval {
                return false;
            }
            if !Self::is_significant(previous, &state, tuning) {
                return false;
            }
        }
        self.last_sent = Some((state, now));
        true
    }
}

/// Locally rendered stand-in for the remote player.
#[derive(Debug, Clone)]
pub struct RemotePuppet {
    /// Last received position.
    target: Option<Vec3>,
    last_receipt: Option<Instant>,
    velocity: Vec3,
    rendered: Vec3,
    target_yaw: f32,
    rendered_yaw: f32,
    pub health: Health,
    pub shooting: bool,
    eye_height: f32,
    radius: f32,
    height: f32,
}

impl RemotePuppet {
    pub fn new(player: &PlayerTuning) -> Self {
        Self {
            target: None,
            last_receipt: None,
            velocity: Vec3::ZERO,
            rendered: Vec3::ZERO,
            target_yaw: 0.0,
            rendered_yaw: 0.0,
            health: Health::full(player.max_hp),
            shooting: false,
            eye_height: player.eye_height,
            radius: player.radius,
            height: player.height,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.target.is_some()
    }

    pub fn is_alive(&self) -> bool {
        !self.health.is_depleted()
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    pub fn rendered_position(&self) -> Vec3 {
        self.rendered
    }

    pub fn rendered_yaw(&self) -> f32 {
        self.rendered_yaw
    }

    /// Applies a received snapshot. The first one snaps; later ones only move the target
    /// and refresh the velocity estimate from the receipt interval.
    pub fn apply_state(&mut self, state: &PeerState, received_at: Instant) {
        match (self.target, self.last_receipt) {
            (Some(previous), Some(previous_at)) => {
                let interval = received_at.saturating_duration_since(previous_at).as_secs_f32();
                // Messages coalesced into the same instant keep the previous estimate.
                if interval > 0.0 {
                    self.velocity = (state.position - previous) / interval;
                }
            }
            _ => {
                self.rendered = state.position;
                self.rendered_yaw = state.yaw;
                self.velocity = Vec3::ZERO;
            }
        }
        self.target = Some(state.position);
        self.last_receipt = Some(received_at);
        self.target_yaw = state.yaw;
        self.health.set(state.health);
        self.shooting = state.shooting;
    }

    /// Teleports the puppet, as after a respawn. Clears the velocity estimate.
    pub fn snap_to(&mut self, position: Vec3, received_at: Instant) {
        self.target = Some(position);
        self.last_receipt = Some(received_at);
        self.rendered = position;
        self.velocity = Vec3::ZERO;
        self.health.refill();
    }

    /// Dead-reckoned position, before blending.
    pub fn predicted_position(&self, now: Instant, tuning: &NetTuning) -> Option<Vec3> {
        let target = self.target?;
        let since = self
            .last_receipt
            .map(|at| now.saturating_duration_since(at).as_secs_f32())
            .unwrap_or(0.0)
            .min(tuning.max_extrapolation);
        Some(target + self.velocity * since)
    }

    /// Blends the rendered pose toward the prediction. The blend rate grows with the
    /// remaining distance, clamped between the configured floor and ceiling.
    pub fn update(&mut self, now: Instant, dt: f32, tuning: &NetTuning) {
        let Some(predicted) = self.predicted_position(now, tuning) else {
            return;
        };

        let distance = self.rendered.distance(predicted);
        let rate = (distance * tuning.lerp_rate_per_unit)
            .max(tuning.min_lerp_rate)
            .min(tuning.max_lerp_rate);
        let alpha = (rate * dt).min(1.0);
        self.rendered = self.rendered.lerp(predicted, alpha);

        let turn = (tuning.rotation_lerp_rate * dt).min(1.0);
        self.rendered_yaw += shortest_angle(self.rendered_yaw, self.target_yaw) * turn;
        self.rendered_yaw = self.rendered_yaw.rem_euclid(TAU);
    }
}

impl HitTarget for RemotePuppet {
    fn hit_volume(&self) -> Option<HitVolume> {
        if !self.is_visible() || !self.is_alive() {
            return None;
        }
        let feet = self.rendered - Vec3::new(0.0, self.eye_height, 0.0);
        Some(HitVolume::upright(feet, self.radius, self.height, self.eye_height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn state(x: f32) -> PeerState {
        PeerState {
            position: Vec3::new(x, 0.0, 0.0),
            yaw: 0.0,
            health: 100,
            shooting: false,
        }
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn velocity_and_prediction_from_receipt_interval() {
        let tuning = NetTuning::default();
        let mut puppet = RemotePuppet::new(&PlayerTuning::default());
        let t0 = Instant::now();

        puppet.apply_state(&state(0.0), t0);
        puppet.apply_state(&state(1.0), t0 + ms(100));

        assert!(puppet.velocity().abs_diff_eq(Vec3::new(10.0, 0.0, 0.0), 1e-3));
        let predicted = puppet
            .predicted_position(t0 + ms(150), &tuning)
            .expect("puppet has a target");
        assert!(predicted.abs_diff_eq(Vec3::new(1.5, 0.0, 0.0), 1e-3), "{predicted:?}");
    }

    #[test]
    fn extrapolation_is_capped() {
        let tuning = NetTuning::default();
        let mut puppet = RemotePuppet::new(&PlayerTuning::default());
        let t0 = Instant::now();
        puppet.apply_state(&state(0.0), t0);
        puppet.apply_state(&state(1.0), t0 + ms(100));

        let far = puppet.predicted_position(t0 + ms(5100), &tuning).expect("target");
        let expected = 1.0 + 10.0 * tuning.max_extrapolation;
        assert!((far.x - expected).abs() < 1e-2);
    }

    #[test]
    fn inverted_lerp_bounds_settle_on_the_ceiling() {
        let tuning = NetTuning {
            min_lerp_rate: 50.0,
            max_lerp_rate: 2.0,
            ..NetTuning::default()
        };
        let mut puppet = RemotePuppet::new(&PlayerTuning::default());
        let t0 = Instant::now();
        puppet.apply_state(&state(0.0), t0);
        puppet.apply_state(&state(10.0), t0 + ms(100));
        puppet.update(t0 + ms(100), 0.1, &tuning);
        // Rate 2/s over 0.1 s covers a fifth of the gap.
        assert!((puppet.rendered_position().x - 2.0).abs() < 1e-3);
    }

    #[test]
    fn identical_state_is_not_resent() {
        let tuning = NetTuning::default();
        let mut gate = SendGate::new();
        let t0 = Instant::now();

        assert!(gate.offer(state(0.0), t0, &tuning));
        assert!(!gate.offer(state(0.0), t0 + ms(100), &tuning));
        assert!(!gate.offer(state(0.0), t0 + ms(200), &tuning));
    }

    #[test]
    fn changes_wait_for_the_send_interval() {
        let tuning = NetTuning::default();
        let mut gate = SendGate::new();
        let t0 = Instant::now();

        assert!(gate.offer(state(0.0), t0, &tuning));
        assert!(!gate.offer(state(5.0), t0 + ms(20), &tuning));
        assert!(gate.offer(state(5.0), t0 + ms(60), &tuning));

        let mut shooting = state(5.0);
        shooting.shooting = true;
        assert!(gate.offer(shooting, t0 + ms(120), &tuning));

        gate.reset();
        assert!(gate.offer(shooting, t0 + ms(121), &tuning));
    }

    #[test]
    fn rotation_threshold_wraps_around() {
        let tuning = NetTuning::default();
        let a = PeerState { yaw: TAU - 0.001, ..state(0.0) };
        let b = PeerState { yaw: 0.001, ..state(0.0) };
        assert!(!SendGate::is_significant(&a, &b, &tuning));
        assert!((shortest_angle(a.yaw, b.yaw) - 0.002).abs() < 1e-4);
    }

    #[test]
    fn blending_does_not_overshoot() {
        let tuning = NetTuning::default();
        let mut puppet = RemotePuppet::new(&PlayerTuning::default());
        let t0 = Instant::now();
        puppet.apply_state(&state(0.0), t0);
        // Large correction with no velocity: the puppet closes in without passing it.
        puppet.snap_to(Vec3::ZERO, t0);
        puppet.apply_state(&state(0.0), t0);
        puppet.apply_state(&state(10.0), t0);

        let mut last = 0.0;
        for frame in 1..=120 {
            puppet.update(t0, 1.0 / 60.0, &tuning);
            let x = puppet.rendered_position().x;
            assert!(x >= last && x <= 10.0 + 1e-4, "frame {frame}: {x}");
            last = x;
        }
        assert!((last - 10.0).abs() < 1e-2);
    }

    #[test]
    fn yaw_blends_along_the_short_way() {
        let tuning = NetTuning::default();
        let mut puppet = RemotePuppet::new(&PlayerTuning::default());
        let t0 = Instant::now();
        puppet.apply_state(&PeerState { yaw: 0.1, ..state(0.0) }, t0);
        puppet.apply_state(&PeerState { yaw: TAU - 0.1, ..state(0.0) }, t0 + ms(50));

        puppet.update(t0 + ms(50), 0.05, &tuning);
        let yaw = puppet.rendered_yaw();
        // Turning the short way goes down through zero, never up through PI.
        assert!(yaw < 0.1 || yaw > TAU - 0.2, "{yaw}");
    }

    #[test]
    fn dead_or_unseen_puppet_cannot_be_hit() {
        let mut puppet = RemotePuppet::new(&PlayerTuning::default());
        assert!(puppet.hit_volume().is_none());

        puppet.apply_state(&state(0.0), Instant::now());
        assert!(puppet.hit_volume().is_some());

        puppet.apply_state(&PeerState { health: 0, ..state(0.0) }, Instant::now());
        assert!(puppet.hit_volume().is_none());
    }
}
