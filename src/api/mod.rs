// API module - HTTP endpoints

pub mod login;
pub mod state;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use self::state::AppState;

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(login::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds the listening socket. `host` may be an IP address or a hostname.
pub async fn bind(host: &str, port: u16) -> std::io::Result<TcpListener> {
    TcpListener::bind((host, port)).await
}
