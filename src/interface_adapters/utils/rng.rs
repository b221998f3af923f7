use crate::domain::RoomCodeSource;
use rand::Rng;
use std::{
    sync::{
        OnceLock,
        atomic::{AtomicU64, Ordering},
    },
    time::{SystemTime, UNIX_EPOCH},
};

fn now_nanos() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64
}

/// Returns a process-unique, monotonically increasing identifier for log correlation.
pub fn rand_id() -> u64 {
    static COUNTER: OnceLock<AtomicU64> = OnceLock::new();
    let counter = COUNTER.get_or_init(|| AtomicU64::new(now_nanos()));
    counter.fetch_add(1, Ordering::Relaxed)
}

// No 0/O or 1/I, so codes survive being read aloud.
const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Random uppercase room codes of a fixed length.
#[derive(Debug, Clone)]
pub struct RandomRoomCodes {
    len: usize,
}

impl RandomRoomCodes {
    pub fn new(len: usize) -> Self {
        Self { len }
    }
}

impl RoomCodeSource for RandomRoomCodes {
    fn next_code(&self) -> String {
        let mut rng = rand::rng();
        (0..self.len)
            .map(|_| char::from(ROOM_CODE_ALPHABET[rng.random_range(0..ROOM_CODE_ALPHABET.len())]))
            .collect()
    }
}
