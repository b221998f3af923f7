// Framework bootstrap for the relay runtime.

use crate::frameworks::config;
use crate::interface_adapters::clients::relay::RelayClient;
use crate::interface_adapters::net::{create_room_handler, ws_handler};
use crate::interface_adapters::state::AppState;
use crate::interface_adapters::utils::rng::RandomRoomCodes;
use crate::use_cases::{RoomRegistry, RoomSettings};

use axum::{
    Router,
    routing::{get, post},
};
use std::net::SocketAddr;
use std::{io::Result, sync::Arc};

fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

pub async fn run(listener: tokio::net::TcpListener) -> Result<()> {
    let address = listener.local_addr()?;
    let state = build_state();
    let app = Router::new()
        .route("/ws", get(ws_handler))
        .route("/rooms", post(create_room_handler))
        .with_state(state);

    tracing::info!(%address, "relay listening");

    // Serve app and report errors rather than panicking
    axum::serve(listener, app).await.inspect_err(|e| {
        tracing::error!(error = %e, "server error");
    })
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let address = SocketAddr::from(([127, 0, 0, 1], config::relay_port()));

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .inspect_err(|e| {
            tracing::error!(%address, error = %e, "failed to bind");
        })?;

    run(listener).await
}

fn build_state() -> Arc<AppState> {
    let rooms = Arc::new(RoomRegistry::new(
        RoomSettings {
            max_code_attempts: config::MAX_ROOM_CODE_ATTEMPTS,
            seat_channel_capacity: config::SEAT_CHANNEL_CAPACITY,
        },
        Arc::new(RandomRoomCodes::new(config::ROOM_CODE_LEN)),
    ));
    tracing::debug!(code_len = config::ROOM_CODE_LEN, "room registry configured");

    Arc::new(AppState { rooms })
}

/// Relay client for the match channel, pointed at `RELAY_URL` with the configured join timeout.
pub fn relay_client() -> std::result::Result<RelayClient, reqwest::Error> {
    let base_url = config::relay_url();
    let join_timeout = config::join_timeout();
    tracing::debug!(%base_url, join_timeout_ms = join_timeout.as_millis() as u64, "relay client configured");
    RelayClient::new(base_url, join_timeout)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relay_client_uses_environment_config() {
        let client = relay_client().expect("client builds");
        assert_eq!(client.base_url(), config::relay_url().trim_end_matches('/'));
        assert_eq!(client.join_timeout(), config::join_timeout());
    }
}
