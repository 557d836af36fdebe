use serde::{Deserialize, Serialize};
use std::path::Path;

/// Listing endpoint.  Accepts an optional `?subdir=<name>` query.
pub const TRACKS_PATH: &str = "/tracks";

/// URL prefix the audio root is served under.
pub const MUSIC_PREFIX: &str = "/music";

/// Lowercase extensions (without the dot) that `/tracks` reports.
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "m4a", "ogg", "flac", "aac"];

/// Folder names the soundboard asks for.
pub const THEMES_FOLDER: &str = "themes";
pub const EFFECTS_FOLDER: &str = "effects";

/// One playable file as reported by `GET /tracks`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Track {
    /// Filename as found on disk.
    pub name: String,
    /// Path under [`MUSIC_PREFIX`], keeping the on-disk folder casing.
    pub url: String,
}

impl Track {
    /// Build a track for `file` inside `folder` (empty = audio root).
    pub fn new(folder: &str, file: &str) -> Self {
        let url = if folder.is_empty() {
            format!("{}/{}", MUSIC_PREFIX, file)
        } else {
            format!("{}/{}/{}", MUSIC_PREFIX, folder, file)
        };
        Self {
            name: file.to_string(),
            url,
        }
    }
}

/// Body of every non-200 response from the listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// True when the extension is one of [`AUDIO_EXTENSIONS`], ignoring case.
pub fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            AUDIO_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_urls() {
        let root = Track::new("", "tavern.mp3");
        assert_eq!(root.url, "/music/tavern.mp3");
        assert_eq!(root.name, "tavern.mp3");

        let nested = Track::new("Effects", "door.wav");
        assert_eq!(nested.url, "/music/Effects/door.wav");
    }

    #[test]
    fn test_audio_extensions() {
        assert!(is_audio_file(Path::new("battle.MP3")));
        assert!(is_audio_file(Path::new("rain.flac")));
        assert!(is_audio_file(Path::new("dir/wind.aac")));
        assert!(!is_audio_file(Path::new("notes.txt")));
        assert!(!is_audio_file(Path::new("mp3")));
    }

    #[test]
    fn test_wire_format() {
        let json = serde_json::to_string(&Track::new("themes", "a.ogg")).unwrap();
        assert_eq!(json, r#"{"name":"a.ogg","url":"/music/themes/a.ogg"}"#);

        let err: ErrorBody = serde_json::from_str(r#"{"error":"subdirectory not found"}"#).unwrap();
        assert_eq!(err.error, "subdirectory not found");
    }
}
