use crate::interface_adapters::http::ErrorResponse;
use crate::interface_adapters::protocol::ChannelMessage;
use crate::interface_adapters::state::AppState;
use crate::interface_adapters::utils::rng::rand_id;
use crate::use_cases::{Membership, RelayEvent, Role, RoomError, RoomRegistry};

use axum::{
    Error, Json,
    extract::{
        Query, State,
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade, close_code},
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures::SinkExt;
use serde::de::IgnoredAny;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tracing::{debug, info, info_span, warn};

#[derive(Debug)]
enum NetError {
    #[allow(dead_code)]
    Ws(axum::Error),
    #[allow(dead_code)]
    Serialization(serde_json::Error),
    SeatClosed,
}

impl From<axum::Error> for NetError {
    fn from(e: axum::Error) -> Self {
        NetError::Ws(e)
    }
}

#[derive(Debug, serde::Deserialize)]
pub struct RoomQuery {
    // Code returned by `POST /rooms`.
    #[serde(default)]
    room: Option<String>,
}

const LOG_THROTTLE: Duration = Duration::from_secs(2);
const MAX_INVALID_JSON: u32 = 10;

fn error_response(status: StatusCode, error: &str) -> axum::response::Response {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
        .into_response()
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<RoomQuery>,
) -> impl IntoResponse {
    let Some(code) = query
        .room
        .map(|c| c.trim().to_ascii_uppercase())
        .filter(|c| !c.is_empty())
    else {
        return error_response(StatusCode::BAD_REQUEST, "room is required");
    };

    // Seat before upgrading so a full or unknown room is refused with a plain status.
    let membership = match state.rooms.join(&code).await {
        Ok(membership) => membership,
        Err(RoomError::NotFound) => return error_response(StatusCode::NOT_FOUND, "room not found"),
        Err(RoomError::Full) => return error_response(StatusCode::CONFLICT, "room is full"),
        Err(e) => return error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()),
    };

    let Membership { code, role, token, rx } = membership;
    let seat = SeatGuard {
        rooms: state.rooms.clone(),
        code,
        role,
        token,
        armed: true,
    };
    ws.on_upgrade(move |socket| handle_socket(socket, seat, rx))
}

/// Frees the seat when the connection ends, including upgrades that never complete.
struct SeatGuard {
    rooms: Arc<RoomRegistry>,
    code: Arc<str>,
    role: Role,
    token: u64,
    armed: bool,
}

impl SeatGuard {
    async fn release(mut self) {
        self.armed = false;
        self.rooms.leave(&self.code, self.role, self.token).await;
    }
}

impl Drop for SeatGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let rooms = self.rooms.clone();
        let code = self.code.clone();
        let (role, token) = (self.role, self.token);
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move { rooms.leave(&code, role, token).await });
        }
    }
}

#[derive(Default)]
struct ConnStats {
    msgs_in: u64,
    msgs_out: u64,
    bytes_in: u64,
    bytes_out: u64,
    invalid_json: u32,
}

enum LoopControl {
    Continue,
    Disconnect,
}

async fn handle_socket(
    mut socket: WebSocket,
    seat: SeatGuard,
    mut rx: tokio::sync::mpsc::Receiver<RelayEvent>,
) {
    let conn_id = rand_id();
    let span = info_span!("conn", conn_id, room = %seat.code, role = ?seat.role);
    let _enter = span.enter();
    info!("peer connected");

    let mut stats = ConnStats::default();
    let mut close_frame: Option<CloseFrame> = None;
    let mut last_invalid_log = Instant::now() - LOG_THROTTLE;

    loop {
        let control = tokio::select! {
            incoming = socket.recv() => {
                handle_incoming_ws(
                    incoming,
                    &seat,
                    &mut stats,
                    &mut last_invalid_log,
                    &mut close_frame,
                ).await
            }

            event = rx.recv() => {
                match forward_relay_event(&mut socket, event, &mut stats).await {
                    Ok(()) => LoopControl::Continue,
                    Err(e) => {
                        debug!(error = ?e, "stopped forwarding to peer");
                        LoopControl::Disconnect
                    }
                }
            }
        };

        if let LoopControl::Disconnect = control {
            if let Some(frame) = close_frame.take() {
                let _ = socket.send(Message::Close(Some(frame))).await;
            }
            if let Err(err) = socket.close().await {
                debug!(error = ?err, "socket close error");
            }
            break;
        }
    }

    seat.release().await;
    debug!(
        msgs_in = stats.msgs_in,
        msgs_out = stats.msgs_out,
        bytes_in = stats.bytes_in,
        bytes_out = stats.bytes_out,
        invalid_json = stats.invalid_json,
        "connection stats"
    );
    info!("peer disconnected");
}

async fn handle_incoming_ws(
    incoming: Option<Result<Message, Error>>,
    seat: &SeatGuard,
    stats: &mut ConnStats,
    last_invalid_log: &mut Instant,
    close_frame: &mut Option<CloseFrame>,
) -> LoopControl {
    match incoming {
        Some(Ok(Message::Text(text))) => {
            stats.msgs_in += 1;
            stats.bytes_in += text.len() as u64;

            // Only well-formedness is checked; the payload is the peers' business.
            if let Err(e) = serde_json::from_str::<IgnoredAny>(&text) {
                stats.invalid_json += 1;
                if should_log(last_invalid_log) {
                    warn!(bytes = text.len(), error = %e, "dropping malformed peer message");
                }
                if stats.invalid_json > MAX_INVALID_JSON {
                    *close_frame = Some(CloseFrame {
                        code: close_code::POLICY,
                        reason: "too many invalid messages".into(),
                    });
                    return LoopControl::Disconnect;
                }
                return LoopControl::Continue;
            }

            if !seat.rooms.forward(&seat.code, seat.role, text.to_string()).await {
                debug!("message not delivered; no peer seated");
            }
            LoopControl::Continue
        }
        Some(Ok(Message::Binary(_))) => {
            *close_frame = Some(CloseFrame {
                code: close_code::UNSUPPORTED,
                reason: "binary messages not supported".into(),
            });
            LoopControl::Disconnect
        }
        Some(Ok(Message::Ping(_) | Message::Pong(_))) => LoopControl::Continue,
        Some(Ok(Message::Close(_))) => LoopControl::Disconnect,
        Some(Err(e)) => {
            warn!(error = %e, "websocket recv error");
            LoopControl::Disconnect
        }
        None => {
            info!("websocket closed");
            LoopControl::Disconnect
        }
    }
}

async fn forward_relay_event(
    socket: &mut WebSocket,
    event: Option<RelayEvent>,
    stats: &mut ConnStats,
) -> Result<(), NetError> {
    let text = match event.ok_or(NetError::SeatClosed)? {
        RelayEvent::Forward(text) => text,
        RelayEvent::PeerJoined => {
            serde_json::to_string(&ChannelMessage::PeerJoined).map_err(NetError::Serialization)?
        }
        RelayEvent::PeerLeft => {
            serde_json::to_string(&ChannelMessage::PeerLeft).map_err(NetError::Serialization)?
        }
    };
    let bytes = text.len() as u64;
    socket.send(Message::Text(text.into())).await?;
    stats.msgs_out += 1;
    stats.bytes_out += bytes;
    Ok(())
}

fn should_log(last: &mut Instant) -> bool {
    if last.elapsed() >= LOG_THROTTLE {
        *last = Instant::now();
        true
    } else {
        false
    }
}
