use crate::interface_adapters::protocol::{ChannelMessage, RoomCreatedDto};
use crate::use_cases::{PeerChannel, PeerEvent, TransportError, TransportEvent};

use futures_util::{SinkExt, StreamExt};
use reqwest::StatusCode;
use std::fmt;
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{Error as WsError, Message},
};
use tracing::{debug, info, warn};

#[derive(Debug)]
pub enum ConnectError {
    Http(reqwest::Error),
    Status(StatusCode),
}

impl fmt::Display for ConnectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectError::Http(e) => write!(f, "relay unreachable: {e}"),
            ConnectError::Status(status) => write!(f, "relay answered {status}"),
        }
    }
}

impl std::error::Error for ConnectError {}

impl From<reqwest::Error> for ConnectError {
    fn from(e: reqwest::Error) -> Self {
        ConnectError::Http(e)
    }
}

/// Why joining a room failed. None of these are retried automatically.
#[derive(Debug)]
pub enum JoinError {
    Timeout,
    NotFound,
    Full,
    Connect(String),
}

impl fmt::Display for JoinError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinError::Timeout => write!(f, "timed out joining room"),
            JoinError::NotFound => write!(f, "room not found"),
            JoinError::Full => write!(f, "room is full"),
            JoinError::Connect(e) => write!(f, "failed to connect to relay: {e}"),
        }
    }
}

impl std::error::Error for JoinError {}

impl From<WsError> for JoinError {
    fn from(e: WsError) -> Self {
        match e {
            WsError::Http(response) => {
                let status = response.status();
                if status == StatusCode::NOT_FOUND {
                    JoinError::NotFound
                } else if status == StatusCode::CONFLICT {
                    JoinError::Full
                } else {
                    JoinError::Connect(format!("unexpected status {status}"))
                }
            }
            other => JoinError::Connect(other.to_string()),
        }
    }
}

// Thin client for the relay: HTTP for room creation, websocket for the match channel.
#[derive(Clone)]
pub struct RelayClient {
    http: reqwest::Client,
    base_url: String,
    join_timeout: Duration,
}

impl RelayClient {
    pub fn new(base_url: impl Into<String>, join_timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(join_timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            join_timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn join_timeout(&self) -> Duration {
        self.join_timeout
    }

    pub async fn create_room(&self) -> Result<String, ConnectError> {
        let url = format!("{}/rooms", self.base_url);
        let response = self.http.post(url).send().await?;
        if response.status() != StatusCode::CREATED {
            return Err(ConnectError::Status(response.status()));
        }
        let created = response.json::<RoomCreatedDto>().await?;
        info!(room_code = %created.room_code, "room created");
        Ok(created.room_code)
    }

    pub async fn join_room(&self, code: &str) -> Result<PeerLink, JoinError> {
        let url = format!("{}/ws?room={}", websocket_base(&self.base_url), code.trim());
        let (socket, _response) = tokio::time::timeout(self.join_timeout, connect_async(url))
            .await
            .map_err(|_| JoinError::Timeout)??;
        info!(room_code = %code, "joined room");
        Ok(PeerLink::spawn(socket))
    }
}

fn websocket_base(base_url: &str) -> String {
    if let Some(rest) = base_url.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = base_url.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        base_url.to_string()
    }
}

type RelaySocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// A joined room seen as a peer channel. A background task owns the socket; the
/// simulation only touches the two queues, so neither direction blocks a frame.
pub struct PeerLink {
    outbound: mpsc::UnboundedSender<String>,
    inbound: mpsc::UnboundedReceiver<TransportEvent>,
}

impl PeerLink {
    fn spawn(socket: RelaySocket) -> Self {
        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        let (inbound_tx, inbound) = mpsc::unbounded_channel();
        tokio::spawn(pump(socket, outbound_rx, inbound_tx));
        Self { outbound, inbound }
    }
}

impl PeerChannel for PeerLink {
    fn send(&mut self, event: PeerEvent) -> Result<(), TransportError> {
        let text = serde_json::to_string(&ChannelMessage::from(event))
            .map_err(|e| TransportError::Encode(e.to_string()))?;
        self.outbound.send(text).map_err(|_| TransportError::Closed)
    }

    fn try_recv(&mut self) -> Option<TransportEvent> {
        self.inbound.try_recv().ok()
    }
}

async fn pump(
    socket: RelaySocket,
    mut outbound_rx: mpsc::UnboundedReceiver<String>,
    inbound_tx: mpsc::UnboundedSender<TransportEvent>,
) {
    let (mut sink, mut stream) = socket.split();
    let mut invalid = 0u32;

    loop {
        tokio::select! {
            out = outbound_rx.recv() => {
                let Some(text) = out else {
                    // The link was dropped locally.
                    let _ = sink.close().await;
                    return;
                };
                if let Err(e) = sink.send(Message::text(text)).await {
                    warn!(error = %e, "relay send failed");
                    break;
                }
            }

            incoming = stream.next() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        // Stamped on arrival so coalesced messages keep their real spacing.
                        let received_at = Instant::now();
                        match serde_json::from_str::<ChannelMessage>(text.as_str()) {
                            Ok(msg) => {
                                let Some(event) = msg.into_transport_event(received_at) else {
                                    continue;
                                };
                                if inbound_tx.send(event).is_err() {
                                    return;
                                }
                            }
                            Err(e) => {
                                invalid += 1;
                                debug!(invalid, error = %e, "ignoring unreadable peer message");
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!(error = %e, "relay receive failed");
                        break;
                    }
                }
            }
        }
    }

    info!("relay connection lost");
    let _ = inbound_tx.send(TransportEvent::Disconnected);
}
