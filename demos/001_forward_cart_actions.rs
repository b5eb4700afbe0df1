//! Forwarding matching actions over a live connection.
//!
//! Demonstrates:
//! - Wiring the lifecycle handler and the relay into a pipeline
//! - Opening the connection via a CONNECT_SOCKET trigger
//! - Prefix-based forwarding of CART_* actions
//!
//! A loopback WebSocket server is started in-process so the demo runs
//! without any external peer.
//!
//! Usage:
//!   cargo run --example 001_forward_cart_actions

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use futures_util::StreamExt;
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;

use socket_relay::{Action, Criteria, Pipeline, RelayConfig, Result, relay_pair};

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
    println!("=== 001: Forward Cart Actions ===\n");

    // ========================================================================
    // Loopback Peer
    // ========================================================================

    println!("[1] Starting loopback peer...");

    let endpoint = spawn_loopback_peer().await;
    println!("    ✓ Listening at {endpoint}\n");

    // ========================================================================
    // Build Pipeline
    // ========================================================================

    println!("[2] Building pipeline...");

    let config = RelayConfig::new().with_endpoint(&endpoint)?;
    let (lifecycle, relay) = relay_pair(&config, Criteria::prefix("CART_"));

    let pipeline = Pipeline::builder()
        .with(lifecycle)
        .with(relay)
        .sink(|action| println!("    [store] {}", action.kind()))
        .build();

    println!("    ✓ Pipeline ready\n");

    // ========================================================================
    // Connect and Dispatch
    // ========================================================================

    println!("[3] Connecting...");
    pipeline.dispatch(Action::connect_socket("demo-token"));
    tokio::time::sleep(Duration::from_millis(300)).await;

    println!("\n[4] Dispatching actions...");
    pipeline.dispatch(Action::new("CART_ADD").with_field("sku", "A-1"));
    pipeline.dispatch(Action::new("USER_LOGIN").with_field("name", "demo"));
    pipeline.dispatch(Action::new("CART_REMOVE").with_field("sku", "A-1"));
    tokio::time::sleep(Duration::from_millis(300)).await;

    println!("\n[5] Disconnecting...");
    pipeline.dispatch(Action::disconnect_socket());
    tokio::time::sleep(Duration::from_millis(300)).await;

    println!("\n=== Only the CART_* actions reached the peer ===");
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

/// Starts a WebSocket peer that prints everything it receives.
async fn spawn_loopback_peer() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let endpoint = format!("ws://{}", listener.local_addr().expect("local addr"));

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("accept");
        let mut ws = tokio_tungstenite::accept_async(stream)
            .await
            .expect("upgrade");

        while let Some(Ok(message)) = ws.next().await {
            if let Message::Text(text) = message {
                println!("    [peer]  received: {}", text.as_str());
            }
        }
    });

    endpoint
}
