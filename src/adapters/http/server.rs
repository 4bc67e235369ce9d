/// Read API server
///
/// Binds the listener, serves the routes, and shuts down on Ctrl+C
use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use super::routes::{self, AppState};

/// Build the application with all routes and middleware
pub fn build_app(state: AppState) -> Router {
    routes::create_router(state).layer(TraceLayer::new_for_http())
}

/// Serve the read API on `bind` until Ctrl+C
pub async fn serve(state: AppState, bind: &str) -> Result<(), String> {
    let addr: SocketAddr = bind
        .parse()
        .map_err(|e| format!("Invalid bind address '{}': {}", bind, e))?;

    let listener = TcpListener::bind(&addr).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::AddrInUse => {
            format!("Failed to bind to {}: Address already in use", addr)
        }
        std::io::ErrorKind::PermissionDenied => format!(
            "Failed to bind to {}: Permission denied\n\
             Consider using a port above 1024.",
            addr
        ),
        _ => format!("Failed to bind to {}: {}", addr, e),
    })?;

    tracing::info!("Read API listening on http://{}", addr);

    let shutdown_signal = async {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("Received shutdown signal, stopping read API...");
    };

    axum::serve(listener, build_app(state))
        .with_graceful_shutdown(shutdown_signal)
        .await
        .map_err(|e| format!("Server error: {}", e))?;

    tracing::info!("Read API stopped");
    Ok(())
}
