use crate::listing::{self, ListingError};
use axum::{
    extract::{Query, State},
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use tavern_proto::protocol::{Track, MUSIC_PREFIX, TRACKS_PATH};
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

/// Immutable server configuration shared by every handler.
#[derive(Debug)]
pub struct ServerState {
    pub music_dir: PathBuf,
    pub public_dir: PathBuf,
}

#[derive(Debug, Default, Deserialize)]
struct TracksQuery {
    subdir: Option<String>,
}

/// Build the full router: listing API, audio files and front-end assets.
pub fn router(state: Arc<ServerState>) -> Router {
    let music = ServeDir::new(&state.music_dir);
    let public = ServeDir::new(&state.public_dir);

    Router::new()
        .route(TRACKS_PATH, get(get_tracks))
        .nest_service(MUSIC_PREFIX, music)
        .fallback_service(public)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(bind_address: &str, port: u16, state: Arc<ServerState>) -> anyhow::Result<()> {
    let app = router(state);

    let addr = format!("{}:{}", bind_address, port);
    let listener = match TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            error!("Failed to bind HTTP server to {}: {}", addr, e);
            return Err(e.into());
        }
    };

    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}

async fn get_tracks(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<TracksQuery>,
) -> Result<Json<Vec<Track>>, ListingError> {
    let tracks = listing::list_tracks(&state.music_dir, query.subdir.as_deref()).await?;
    debug!(
        "Listed {} tracks (subdir={:?})",
        tracks.len(),
        query.subdir.as_deref().unwrap_or("")
    );
    Ok(Json(tracks))
}
