use std::net::SocketAddr;

use axum::{Router, routing::get};

/// Minimal liveness endpoint so deployment platforms see the bot as up.
pub async fn serve(port: u16) {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new().route("/", get(|| async { "Bot is running!" }));

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            log::warn!("Health endpoint failed to bind {addr}: {err}");
            return;
        }
    };
    log::info!("Health endpoint listening on http://{addr}");
    if let Err(err) = axum::serve(listener, app).await {
        log::warn!("Health endpoint terminated: {err}");
    }
}
