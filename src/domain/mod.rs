// Domain layer: world geometry, combat rules and actor state machines.

pub mod colliders;
pub mod enemy;
pub mod health;
pub mod movement;
pub mod player;
pub mod ports;
pub mod projectile;
pub mod score;
pub mod spawn;
pub mod state;
pub mod terrain;
pub mod timers;
pub mod tuning;
pub mod vehicle;
pub mod weapon;

pub use colliders::{Aabb, ColliderSet};
pub use enemy::{AiConfig, Enemy, EnemyAttack, EnemyState, EnemyTier, HitOutcome};
pub use health::Health;
pub use movement::{BodyShape, MoveResult, MovementResolver, SlideOutcome, wish_direction};
pub use player::Player;
pub use ports::{EffectKind, Presenter, RoomCodeSource};
pub use projectile::{HitKind, HitReport, HitTarget, HitVolume, Projectile, ProjectilePool, classify_hit};
pub use score::ScoreBoard;
pub use state::{ActorKind, ActorSnapshot, HudState, MatchOutcome, RenderSnapshot};
pub use terrain::Heightfield;
pub use timers::TimerQueue;
pub use tuning::Tuning;
pub use vehicle::{Vehicle, VehicleKind};
pub use weapon::{FireBlock, WeaponKind, WeaponSpec, WeaponState};
