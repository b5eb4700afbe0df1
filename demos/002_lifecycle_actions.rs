//! Observing connection lifecycle actions.
//!
//! Demonstrates:
//! - SOCKET_CONNECTED dispatched after a successful open
//! - The token transmitted as the first payload
//! - SOCKET_DISCONNECTED dispatched when the peer closes the connection
//!
//! Usage:
//!   cargo run --example 002_lifecycle_actions

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use futures_util::StreamExt;
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;

use socket_relay::{
    Action, Criteria, Pipeline, RelayConfig, Result, SOCKET_CONNECTED, SOCKET_DISCONNECTED,
    relay_pair,
};

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "socket_relay=debug".into()),
        )
        .init();

    if let Err(e) = run().await {
        eprintln!("\n[ERROR] {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    println!("=== 002: Lifecycle Actions ===\n");

    // Peer accepts one connection, echoes the first frame, then hangs up
    println!("[1] Starting short-lived peer...");
    let endpoint = spawn_short_lived_peer().await;
    println!("    ✓ Listening at {endpoint}\n");

    println!("[2] Building pipeline...");
    let config = RelayConfig::new().with_endpoint(&endpoint)?;
    let (lifecycle, relay) = relay_pair(&config, Criteria::default());

    let pipeline = Pipeline::builder()
        .with(lifecycle)
        .with(relay)
        .sink(|action| match action.kind() {
            SOCKET_CONNECTED => println!(
                "    [store] connected: {} ({})",
                action.get_string("endpoint"),
                action.get_string("connectionId"),
            ),
            SOCKET_DISCONNECTED => println!("    [store] disconnected"),
            kind => println!("    [store] {kind}"),
        })
        .build();
    println!("    ✓ Pipeline ready\n");

    println!("[3] Connecting...");
    pipeline.dispatch(Action::connect_socket("demo-token"));

    // The peer hangs up shortly after the handshake; wait for both
    // lifecycle actions to land in the store
    tokio::time::sleep(Duration::from_secs(1)).await;

    println!("\n=== Both lifecycle transitions surfaced as actions ===");
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

/// Starts a peer that reports the first frame, then closes the connection.
async fn spawn_short_lived_peer() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let endpoint = format!("ws://{}", listener.local_addr().expect("local addr"));

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("accept");
        let mut ws = tokio_tungstenite::accept_async(stream)
            .await
            .expect("upgrade");

        if let Some(Ok(Message::Text(text))) = ws.next().await {
            println!("    [peer]  first payload: {}", text.as_str());
        }

        tokio::time::sleep(Duration::from_millis(300)).await;
        let _ = ws.close(None).await;
    });

    endpoint
}
