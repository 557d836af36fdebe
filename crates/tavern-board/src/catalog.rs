//! Client for the daemon's listing endpoint and monster dataset.

use futures_util::future::join_all;
use reqwest::{Client, StatusCode};
use tavern_proto::protocol::{ErrorBody, Track, TRACKS_PATH};
use tracing::{debug, warn};

use crate::manual::dataset::{self, MonsterRecord};

/// Shown in place of buttons when a folder has no audio files.
pub const EMPTY_FOLDER_MESSAGE: &str =
    "No audio files found in this folder — drop mp3s into the music folder.";

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Non-404 error status; `message` is the server's `error` text.
    #[error("{message}")]
    Server { status: u16, message: String },
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("unreadable response: {0}")]
    Decode(#[source] reqwest::Error),
}

/// What one soundboard column shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing {
    Tracks(Vec<Track>),
    Empty,
    Error(String),
}

impl Listing {
    fn from_tracks(tracks: Vec<Track>) -> Self {
        if tracks.is_empty() {
            Listing::Empty
        } else {
            Listing::Tracks(tracks)
        }
    }

    pub fn tracks(&self) -> &[Track] {
        match self {
            Listing::Tracks(tracks) => tracks,
            _ => &[],
        }
    }

    /// Inline text for empty and failed columns.
    pub fn message(&self) -> Option<&str> {
        match self {
            Listing::Tracks(_) => None,
            Listing::Empty => Some(EMPTY_FOLDER_MESSAGE),
            Listing::Error(msg) => Some(msg),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CatalogClient {
    base_url: String,
    client: Client,
}

impl CatalogClient {
    /// `base_url` is the daemon origin, e.g. `http://127.0.0.1:3000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, client }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// One listing request.  `Ok(None)` means the folder does not exist.
    pub async fn fetch_tracks(
        &self,
        folder: Option<&str>,
    ) -> Result<Option<Vec<Track>>, CatalogError> {
        let folder = folder.filter(|f| !f.is_empty());
        let mut request = self.client.get(self.url(TRACKS_PATH));
        if let Some(name) = folder {
            request = request.query(&[("subdir", name)]);
        }

        let response = request.send().await.map_err(CatalogError::Transport)?;
        let status = response.status();
        if status.is_success() {
            let tracks: Vec<Track> = response.json().await.map_err(CatalogError::Decode)?;
            debug!("Fetched {} tracks for {:?}", tracks.len(), folder);
            return Ok(Some(tracks));
        }
        if status == StatusCode::NOT_FOUND {
            debug!("Folder {:?} not found", folder);
            return Ok(None);
        }

        let message = match response.json::<ErrorBody>().await {
            Ok(body) if !body.error.is_empty() => body.error,
            _ => format!("Failed to fetch {}", folder.unwrap_or("tracks")),
        };
        warn!("Listing {:?} failed with {}: {}", folder, status, message);
        Err(CatalogError::Server {
            status: status.as_u16(),
            message,
        })
    }

    /// Like [`fetch_tracks`](Self::fetch_tracks), but a missing folder falls
    /// back to the root listing (and a missing root to nothing).
    pub async fn list_tracks(&self, folder: Option<&str>) -> Result<Vec<Track>, CatalogError> {
        if let Some(tracks) = self.fetch_tracks(folder).await? {
            return Ok(tracks);
        }
        if folder.map(|f| f.is_empty()).unwrap_or(true) {
            return Ok(Vec::new());
        }
        Ok(self.fetch_tracks(None).await?.unwrap_or_default())
    }

    /// Fetch the root and every named folder at once and decide what each
    /// column shows.  Any failure puts the same error in every column.
    pub async fn load_board(&self, folders: &[&str]) -> Vec<(String, Listing)> {
        let requests = std::iter::once(None)
            .chain(folders.iter().map(|f| Some(*f)))
            .map(|folder| self.fetch_tracks(folder));
        let mut results = join_all(requests).await.into_iter();

        let root = results.next().unwrap_or(Ok(None));
        let named: Vec<_> = results.collect();

        if let Some(err) = std::iter::once(&root)
            .chain(named.iter())
            .find_map(|r| r.as_ref().err())
        {
            let message = err.to_string();
            return folders
                .iter()
                .map(|f| (f.to_string(), Listing::Error(message.clone())))
                .collect();
        }

        let fallback = root.ok().flatten().unwrap_or_default();
        folders
            .iter()
            .zip(named)
            .map(|(folder, result)| {
                let tracks = result
                    .ok()
                    .flatten()
                    .unwrap_or_else(|| fallback.clone());
                (folder.to_string(), Listing::from_tracks(tracks))
            })
            .collect()
    }

    /// Load the monster reference served at `path`.  Blank names are dropped.
    pub async fn fetch_monsters(&self, path: &str) -> Result<Vec<MonsterRecord>, CatalogError> {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .map_err(CatalogError::Transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Server {
                status: status.as_u16(),
                message: format!("Failed to fetch {}", path.trim_start_matches('/')),
            });
        }
        let records: Vec<MonsterRecord> = response.json().await.map_err(CatalogError::Decode)?;
        Ok(dataset::without_blank_names(records))
    }
}
