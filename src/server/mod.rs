pub mod routes;

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use axum::Router;
use axum::routing::{get, post};
use rusqlite::Connection;

use crate::config::AppConfig;
use crate::prayer_times::AladhanClient;

/// Shared state for the cron endpoints. The single SQLite connection sits
/// behind a mutex; handlers hold the lock only between awaits.
#[derive(Clone)]
pub struct AppState {
    pub conn: Arc<Mutex<Connection>>,
    pub config: Arc<AppConfig>,
    pub prayers: AladhanClient,
    /// Expected value of the `secret` query parameter, from CRON_SECRET.
    pub cron_secret: Option<String>,
}

impl AppState {
    pub fn new(conn: Connection, config: AppConfig) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
            config: Arc::new(config),
            prayers: AladhanClient::new(),
            cron_secret: std::env::var("CRON_SECRET").ok().filter(|s| !s.is_empty()),
        }
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/api/prayer-times", get(routes::prayer_times))
        .route("/api/cron/prayer-check", get(routes::prayer_check))
        .route("/api/cron/morning-summary", get(routes::morning_summary))
        .route(
            "/api/cron/evening-check",
            get(routes::evening_check).post(routes::evening_check_post),
        )
        .route("/api/send", post(routes::send_message))
        .with_state(state)
}

pub async fn serve(state: AppState, port: u16) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("Listening on http://{}", addr);
    axum::serve(listener, app(state)).await?;
    Ok(())
}
