// Shared primitives for booting one relay per test binary and polling peer links.
#![allow(dead_code)]

use skirmish::use_cases::{PeerChannel, TransportEvent};
use std::{
    // `Arc` shares the published address with the server thread; `OnceLock` writes it once.
    sync::{Arc, OnceLock},
    time::Duration,
};

// Base URL every test targets once the relay has published its bound address.
static RELAY_URL: OnceLock<String> = OnceLock::new();
// Guards the bootstrap so it runs once even when tests race.
static RELAY_READY: OnceLock<()> = OnceLock::new();

// Ensure the relay is running and return its base URL.
pub fn ensure_relay() -> &'static str {
    RELAY_READY.get_or_init(|| {
        let published_url = Arc::new(OnceLock::<String>::new());
        let published_url_thread = Arc::clone(&published_url);
        // A dedicated OS thread keeps the relay alive across individual `#[tokio::test]` runtimes.
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("test runtime");
            runtime.block_on(async move {
                // Ephemeral port so parallel test binaries never collide.
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind ephemeral test port");
                let addr = listener.local_addr().expect("get local addr");
                let _ = published_url_thread.set(format!("http://{}", addr));
                skirmish::run(listener).await.expect("relay failed");
            });
        });
        wait_for_url_and_readiness(published_url);
    });

    RELAY_URL
        .get()
        .expect("relay url should be initialized")
        .as_str()
}

// Wait for the URL to be published, then for the socket to accept TCP connections.
fn wait_for_url_and_readiness(published_url: Arc<OnceLock<String>>) {
    let base_url = loop {
        if let Some(url) = published_url.get() {
            break url.clone();
        }
        std::thread::sleep(Duration::from_millis(10));
    };

    let _ = RELAY_URL.set(base_url.clone());

    let addr = base_url
        .strip_prefix("http://")
        .expect("base url should use http://");

    // Retry briefly to avoid racing bind/accept.
    for _ in 0..100 {
        if std::net::TcpStream::connect(addr).is_ok() {
            return;
        }
        std::thread::sleep(Duration::from_millis(20));
    }

    panic!("relay did not become ready in time");
}

// Poll a peer channel until it yields an event or the deadline passes.
pub async fn next_event(channel: &mut dyn PeerChannel) -> TransportEvent {
    for _ in 0..200 {
        if let Some(event) = channel.try_recv() {
            return event;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("no transport event within two seconds");
}
