// Per-match peer connection: outbound gating and inbound draining over a PeerChannel.

use crate::domain::tuning::NetTuning;
use crate::use_cases::replication::{PeerChannel, PeerEvent, PeerState, SendGate, TransportError, TransportEvent};
use std::time::Instant;
use tracing::{debug, warn};

// Bounds the work one frame spends on a flooded channel.
const MAX_EVENTS_PER_FRAME: usize = 256;

pub struct PeerSession {
    channel: Box<dyn PeerChannel>,
    gate: SendGate,
    connected: bool,
    sent: u64,
    received: u64,
}

impl PeerSession {
    pub fn new(channel: Box<dyn PeerChannel>) -> Self {
        Self {
            channel,
            gate: SendGate::new(),
            connected: true,
            sent: 0,
            received: 0,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn messages_sent(&self) -> u64 {
        self.sent
    }

    pub fn messages_received(&self) -> u64 {
        self.received
    }

    /// Swaps in a freshly dialled channel after a connection loss.
    pub fn replace_channel(&mut self, channel: Box<dyn PeerChannel>) {
        self.channel = channel;
        self.gate.reset();
        self.connected = true;
    }

    /// Sends the state snapshot if the gate allows it. Returns whether it went out.
    pub fn offer_state(&mut self, state: PeerState, now: Instant, tuning: &NetTuning) -> Result<bool, TransportError> {
        if !self.connected || !self.gate.offer(state, now, tuning) {
            return Ok(false);
        }
        self.send(PeerEvent::State(state))?;
        Ok(true)
    }

    /// One-shot event, no acknowledgement.
    pub fn send(&mut self, event: PeerEvent) -> Result<(), TransportError> {
        if !self.connected {
            return Err(TransportError::Closed);
        }
        self.channel.send(event).inspect_err(|e| {
            warn!(error = %e, "peer send failed");
            self.connected = false;
        })?;
        self.sent += 1;
        Ok(())
    }

    /// Everything that arrived since the last frame, in order.
    pub fn drain(&mut self) -> Vec<TransportEvent> {
        let mut events = Vec::new();
        while events.len() < MAX_EVENTS_PER_FRAME {
            let Some(event) = self.channel.try_recv() else {
                break;
            };
            match &event {
                TransportEvent::Message { .. } => self.received += 1,
                TransportEvent::PeerJoined => {
                    // A new peer needs our current state even if nothing changed.
                    debug!("peer joined; resending state");
                    self.gate.reset();
                }
                TransportEvent::PeerLeft | TransportEvent::Disconnected => {
                    self.connected = false;
                }
            }
            events.push(event);
        }
        events
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// In-memory channel whose both ends are inspectable from tests.
    #[derive(Clone, Default)]
    pub(crate) struct LoopbackChannel {
        pub(crate) outbox: Arc<Mutex<Vec<PeerEvent>>>,
        pub(crate) inbox: Arc<Mutex<VecDeque<TransportEvent>>>,
        pub(crate) closed: Arc<Mutex<bool>>,
    }

    impl LoopbackChannel {
        pub(crate) fn deliver(&self, event: PeerEvent, received_at: Instant) {
            self.inbox
                .lock()
                .expect("inbox mutex poisoned")
                .push_back(TransportEvent::Message { event, received_at });
        }

        pub(crate) fn push(&self, event: TransportEvent) {
            self.inbox.lock().expect("inbox mutex poisoned").push_back(event);
        }

        pub(crate) fn sent(&self) -> Vec<PeerEvent> {
            self.outbox.lock().expect("outbox mutex poisoned").clone()
        }

        pub(crate) fn close(&self) {
            *self.closed.lock().expect("closed mutex poisoned") = true;
        }
    }

    impl PeerChannel for LoopbackChannel {
        fn send(&mut self, event: PeerEvent) -> Result<(), TransportError> {
            if *self.closed.lock().expect("closed mutex poisoned") {
                return Err(TransportError::Closed);
            }
            self.outbox.lock().expect("outbox mutex poisoned").push(event);
            Ok(())
        }

        fn try_recv(&mut self) -> Option<TransportEvent> {
            self.inbox.lock().expect("inbox mutex poisoned").pop_front()
        }
    }
}
