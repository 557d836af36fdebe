//! Directory listing behind `GET /tracks`.
//!
//! The audio root may contain `themes/` and `effects/` folders (any casing).
//! A named folder is matched case-insensitively against the real child
//! directories and the returned URLs keep the on-disk casing, so
//! `?subdir=effects` finds `Effects/` and yields `/music/Effects/door.wav`.

use std::path::Path;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use tavern_proto::protocol::{is_audio_file, ErrorBody, Track};
use tracing::{error, warn};

#[derive(Debug, thiserror::Error)]
pub enum ListingError {
    #[error("music directory not found on server")]
    RootMissing,
    #[error("subdirectory not found")]
    SubdirNotFound,
    #[error("failed to list tracks")]
    Io(#[from] std::io::Error),
}

impl ListingError {
    pub fn status(&self) -> StatusCode {
        match self {
            ListingError::SubdirNotFound => StatusCode::NOT_FOUND,
            ListingError::RootMissing | ListingError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ListingError {
    fn into_response(self) -> Response {
        match &self {
            ListingError::Io(e) => error!("Error reading music dir: {}", e),
            ListingError::RootMissing => warn!("Music directory is missing"),
            ListingError::SubdirNotFound => {}
        }
        (self.status(), Json(ErrorBody::new(self.to_string()))).into_response()
    }
}

/// List the audio files of `root`, or of its child folder named `subdir`.
///
/// An empty `subdir` is treated like no subdir at all.  Only regular files
/// with a known audio extension are returned, sorted by name.
pub async fn list_tracks(root: &Path, subdir: Option<&str>) -> Result<Vec<Track>, ListingError> {
    if !tokio::fs::try_exists(root).await.unwrap_or(false) {
        return Err(ListingError::RootMissing);
    }

    let folder = match subdir.filter(|s| !s.is_empty()) {
        Some(requested) => Some(find_child_dir(root, requested).await?),
        None => None,
    };

    let target = match &folder {
        Some(name) => root.join(name),
        None => root.to_path_buf(),
    };

    let mut tracks = Vec::new();
    let mut entries = tokio::fs::read_dir(&target).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if !is_audio_file(&path) {
            continue;
        }
        // Follow symlinks; skip anything that vanished between readdir and stat.
        let is_file = match tokio::fs::metadata(&path).await {
            Ok(meta) => meta.is_file(),
            Err(_) => false,
        };
        if !is_file {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            warn!("Skipping non-UTF-8 filename in {:?}", target);
            continue;
        };
        tracks.push(Track::new(folder.as_deref().unwrap_or(""), &name));
    }

    tracks.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(tracks)
}

/// Resolve `requested` to the real name of a child directory of `root`.
async fn find_child_dir(root: &Path, requested: &str) -> Result<String, ListingError> {
    let wanted = requested.to_lowercase();
    let mut entries = tokio::fs::read_dir(root).await?;
    while let Some(entry) = entries.next_entry().await? {
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        if name.to_lowercase() != wanted {
            continue;
        }
        if tokio::fs::metadata(entry.path())
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
        {
            return Ok(name);
        }
    }
    Err(ListingError::SubdirNotFound)
}
