// Room registry for the relay: short codes, two seats per room, verbatim forwarding.

use crate::domain::ports::RoomCodeSource;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{RwLock, mpsc};
use tracing::{debug, info, warn};

/// Shared configuration for the room registry.
#[derive(Debug, Clone)]
pub struct RoomSettings {
    /// Fresh codes tried before giving up on a create.
    pub max_code_attempts: usize,
    /// Per-seat buffer of relay events awaiting the socket writer.
    pub seat_channel_capacity: usize,
}

/// Errors returned by room registry operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomError {
    /// Every generated code collided with a live room.
    CodeSpaceExhausted,
    NotFound,
    /// Both seats are taken.
    Full,
}

impl fmt::Display for RoomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoomError::CodeSpaceExhausted => write!(f, "no free room code"),
            RoomError::NotFound => write!(f, "room not found"),
            RoomError::Full => write!(f, "room is full"),
        }
    }
}

impl std::error::Error for RoomError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Host,
    Guest,
}

impl Role {
    fn other(self) -> Role {
        match self {
            Role::Host => Role::Guest,
            Role::Guest => Role::Host,
        }
    }
}

/// What a seated socket receives from the relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayEvent {
    PeerJoined,
    PeerLeft,
    /// Text from the other seat, untouched.
    Forward(String),
}

#[derive(Debug)]
struct Seat {
    token: u64,
    tx: mpsc::Sender<RelayEvent>,
}

#[derive(Debug, Default)]
struct Room {
    host: Option<Seat>,
    guest: Option<Seat>,
}

impl Room {
    fn seat(&self, role: Role) -> Option<&Seat> {
        match role {
            Role::Host => self.host.as_ref(),
            Role::Guest => self.guest.as_ref(),
        }
    }

    fn seat_mut(&mut self, role: Role) -> &mut Option<Seat> {
        match role {
            Role::Host => &mut self.host,
            Role::Guest => &mut self.guest,
        }
    }

    fn is_empty(&self) -> bool {
        self.host.is_none() && self.guest.is_none()
    }
}

/// A socket's seat in a room. Hand it back to `leave` when the socket closes.
#[derive(Debug)]
pub struct Membership {
    pub code: Arc<str>,
    pub role: Role,
    pub token: u64,
    pub rx: mpsc::Receiver<RelayEvent>,
}

/// Thread-safe registry for live rooms.
pub struct RoomRegistry {
    settings: RoomSettings,
    codes: Arc<dyn RoomCodeSource>,
    rooms: RwLock<HashMap<String, Room>>,
    next_token: AtomicU64,
}

impl RoomRegistry {
    pub fn new(settings: RoomSettings, codes: Arc<dyn RoomCodeSource>) -> Self {
        Self {
            settings,
            codes,
            rooms: RwLock::new(HashMap::new()),
            next_token: AtomicU64::new(1),
        }
    }

    /// Creates an empty room under a fresh code. Collisions regenerate and retry.
    pub async fn create_room(&self) -> Result<String, RoomError> {
        let mut rooms = self.rooms.write().await;
        for attempt in 1..=self.settings.max_code_attempts {
            let code = self.codes.next_code();
            if rooms.contains_key(&code) {
                debug!(attempt, %code, "room code collision; regenerating");
                continue;
            }
            rooms.insert(code.clone(), Room::default());
            info!(%code, "room created");
            return Ok(code);
        }
        warn!(attempts = self.settings.max_code_attempts, "room code space exhausted");
        Err(RoomError::CodeSpaceExhausted)
    }

    /// Seats a socket: the first is the host, the second the guest.
    pub async fn join(&self, code: &str) -> Result<Membership, RoomError> {
        let mut rooms = self.rooms.write().await;
        let room = rooms.get_mut(code).ok_or(RoomError::NotFound)?;

        let role = match (&room.host, &room.guest) {
            (None, _) => Role::Host,
            (Some(_), None) => Role::Guest,
            (Some(_), Some(_)) => return Err(RoomError::Full),
        };

        let (tx, rx) = mpsc::channel(self.settings.seat_channel_capacity);
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);

        // Both sides learn about each other once the second seat fills.
        if let Some(other) = room.seat(role.other()) {
            let _ = other.tx.try_send(RelayEvent::PeerJoined);
            let _ = tx.try_send(RelayEvent::PeerJoined);
        }
        *room.seat_mut(role) = Some(Seat { token, tx });

        info!(%code, ?role, "seat taken");
        Ok(Membership {
            code: Arc::from(code),
            role,
            token,
            rx,
        })
    }

    /// Passes text to the other seat. Returns false when nobody is there to receive it.
    ///
    /// A seat whose backlog is full is evicted rather than skipped: the channel is ordered
    /// and reliable, so the sender gets `PeerLeft` and the lagging socket is closed once it
    /// drains what it already has.
    pub async fn forward(&self, code: &str, from: Role, text: String) -> bool {
        let lagging = {
            let rooms = self.rooms.read().await;
            let Some(other) = rooms.get(code).and_then(|room| room.seat(from.other())) else {
                return false;
            };
            match other.tx.try_send(RelayEvent::Forward(text)) {
                Ok(()) => return true,
                Err(mpsc::error::TrySendError::Closed(_)) => return false,
                Err(mpsc::error::TrySendError::Full(_)) => other.token,
            }
        };
        warn!(%code, ?from, "peer seat backlog full; evicting lagging seat");
        self.leave(code, from.other(), lagging).await;
        false
    }

    /// Frees a seat if the token still owns it, tells the other seat, and drops the room
    /// once both seats are empty.
    pub async fn leave(&self, code: &str, role: Role, token: u64) {
        let mut rooms = self.rooms.write().await;
        let Some(room) = rooms.get_mut(code) else {
            return;
        };
        let seat = room.seat_mut(role);
        if seat.as_ref().is_some_and(|s| s.token == token) {
            *seat = None;
            if let Some(other) = room.seat(role.other()) {
                let _ = other.tx.try_send(RelayEvent::PeerLeft);
            }
            info!(%code, ?role, "seat released");
        }
        if room.is_empty() {
            rooms.remove(code);
            info!(%code, "room removed");
        }
    }

    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }

    pub async fn occupancy(&self, code: &str) -> Option<usize> {
        let rooms = self.rooms.read().await;
        rooms
            .get(code)
            .map(|room| usize::from(room.host.is_some()) + usize::from(room.guest.is_some()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Hands out a fixed script of codes, repeating the last one.
    struct ScriptedCodes(Mutex<VecDeque<&'static str>>);

    impl ScriptedCodes {
        fn new(codes: &[&'static str]) -> Arc<Self> {
            Arc::new(Self(Mutex::new(codes.iter().copied().collect())))
        }
    }

    impl RoomCodeSource for ScriptedCodes {
        fn next_code(&self) -> String {
            let mut codes = self.0.lock().expect("codes mutex poisoned");
            if codes.len() > 1 {
                codes.pop_front().unwrap_or_default().to_string()
            } else {
                codes.front().copied().unwrap_or_default().to_string()
            }
        }
    }

    fn registry(codes: &[&'static str]) -> RoomRegistry {
        RoomRegistry::new(
            RoomSettings {
                max_code_attempts: 4,
                seat_channel_capacity: 8,
            },
            ScriptedCodes::new(codes),
        )
    }

    #[tokio::test]
    async fn colliding_codes_are_regenerated() {
        let rooms = registry(&["AAAA", "AAAA", "AAAA", "BBBB"]);
        assert_eq!(rooms.create_room().await, Ok("AAAA".to_string()));
        assert_eq!(rooms.create_room().await, Ok("BBBB".to_string()));
        assert_eq!(rooms.room_count().await, 2);
    }

    #[tokio::test]
    async fn exhausted_code_space_is_an_error() {
        let rooms = registry(&["AAAA"]);
        rooms.create_room().await.expect("first room");
        assert_eq!(rooms.create_room().await, Err(RoomError::CodeSpaceExhausted));
    }

    #[tokio::test]
    async fn seats_fill_host_then_guest_then_refuse() {
        let rooms = registry(&["ROOM"]);
        let code = rooms.create_room().await.expect("room");

        let mut host = rooms.join(&code).await.expect("host seat");
        let mut guest = rooms.join(&code).await.expect("guest seat");
        assert_eq!(host.role, Role::Host);
        assert_eq!(guest.role, Role::Guest);
        assert_eq!(rooms.join(&code).await.err(), Some(RoomError::Full));
        assert_eq!(rooms.join("NOPE").await.err(), Some(RoomError::NotFound));

        assert_eq!(host.rx.recv().await, Some(RelayEvent::PeerJoined));
        assert_eq!(guest.rx.recv().await, Some(RelayEvent::PeerJoined));
    }

    #[tokio::test]
    async fn text_is_forwarded_verbatim_to_the_other_seat() {
        let rooms = registry(&["ROOM"]);
        let code = rooms.create_room().await.expect("room");
        let host = rooms.join(&code).await.expect("host");
        assert!(!rooms.forward(&code, Role::Host, "alone".into()).await);

        let mut guest = rooms.join(&code).await.expect("guest");
        let raw = r#"{"type":"Hit","data":{"damage":9999}}"#.to_string();
        assert!(rooms.forward(&code, Role::Host, raw.clone()).await);

        assert_eq!(guest.rx.recv().await, Some(RelayEvent::PeerJoined));
        assert_eq!(guest.rx.recv().await, Some(RelayEvent::Forward(raw)));
        drop(host);
    }

    #[tokio::test]
    async fn leaving_notifies_and_last_leave_removes_the_room() {
        let rooms = registry(&["ROOM"]);
        let code = rooms.create_room().await.expect("room");
        let host = rooms.join(&code).await.expect("host");
        let mut guest = rooms.join(&code).await.expect("guest");
        assert_eq!(guest.rx.recv().await, Some(RelayEvent::PeerJoined));

        // A stale token does not free the seat.
        rooms.leave(&code, Role::Host, host.token + 100).await;
        assert_eq!(rooms.occupancy(&code).await, Some(2));

        rooms.leave(&code, Role::Host, host.token).await;
        assert_eq!(guest.rx.recv().await, Some(RelayEvent::PeerLeft));
        assert_eq!(rooms.occupancy(&code).await, Some(1));

        // The freed host seat can be retaken.
        let again = rooms.join(&code).await.expect("rejoin");
        assert_eq!(again.role, Role::Host);

        rooms.leave(&code, Role::Host, again.token).await;
        rooms.leave(&code, Role::Guest, guest.token).await;
        assert_eq!(rooms.room_count().await, 0);
    }

    #[tokio::test]
    async fn lagging_seat_is_evicted_instead_of_losing_messages() {
        let rooms = registry(&["ROOM"]);
        let code = rooms.create_room().await.expect("room");
        let mut host = rooms.join(&code).await.expect("host");
        let mut guest = rooms.join(&code).await.expect("guest");
        assert_eq!(host.rx.recv().await, Some(RelayEvent::PeerJoined));

        // The guest never reads: PeerJoined plus seven forwards fill its backlog of eight.
        for i in 0..7 {
            assert!(rooms.forward(&code, Role::Host, format!("{{\"n\":{i}}}")).await);
        }
        assert!(!rooms.forward(&code, Role::Host, r#"{"type":"Death"}"#.into()).await);

        assert_eq!(host.rx.recv().await, Some(RelayEvent::PeerLeft));
        assert_eq!(rooms.occupancy(&code).await, Some(1));

        // Whatever was queued still arrives, then the guest's channel ends.
        assert_eq!(guest.rx.recv().await, Some(RelayEvent::PeerJoined));
        for i in 0..7 {
            assert_eq!(guest.rx.recv().await, Some(RelayEvent::Forward(format!("{{\"n\":{i}}}"))));
        }
        assert_eq!(guest.rx.recv().await, None);

        // The evicted socket's own leave is a no-op; the seat is already free.
        rooms.leave(&code, Role::Guest, guest.token).await;
        assert_eq!(rooms.occupancy(&code).await, Some(1));
    }
}
