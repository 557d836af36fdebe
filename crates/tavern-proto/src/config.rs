use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::platform;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub mixer: MixerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Folders served by the daemon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Audio root listed by `/tracks` and served under `/music`.
    /// Defaults to `music/` beside the executable, else `<data_dir>/music`.
    #[serde(default = "default_music_dir")]
    pub music_dir: PathBuf,
    /// Front-end assets (and the monster dataset) served at `/`.
    #[serde(default = "default_public_dir")]
    pub public_dir: PathBuf,
}

/// Crossfade timings and the initial soundboard volume.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MixerConfig {
    #[serde(default = "default_fade_out_ms")]
    pub fade_out_ms: u64,
    #[serde(default = "default_fade_in_ms")]
    pub fade_in_ms: u64,
    /// How often the host should call `tick` while a fade is running.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    #[serde(default = "default_volume")]
    pub default_volume: f32,
}

impl MixerConfig {
    pub fn fade_out(&self) -> Duration {
        Duration::from_millis(self.fade_out_ms)
    }

    pub fn fade_in(&self) -> Duration {
        Duration::from_millis(self.fade_in_ms)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            music_dir: default_music_dir(),
            public_dir: default_public_dir(),
        }
    }
}

impl Default for MixerConfig {
    fn default() -> Self {
        Self {
            fade_out_ms: default_fade_out_ms(),
            fade_in_ms: default_fade_in_ms(),
            tick_ms: default_tick_ms(),
            default_volume: default_volume(),
        }
    }
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    platform::DEFAULT_HTTP_PORT
}

fn default_music_dir() -> PathBuf {
    platform::beside_exe_or("music", platform::data_dir().join("music"))
}

fn default_public_dir() -> PathBuf {
    platform::beside_exe_or("public", platform::data_dir().join("public"))
}

fn default_fade_out_ms() -> u64 {
    500
}

fn default_fade_in_ms() -> u64 {
    700
}

fn default_tick_ms() -> u64 {
    30
}

fn default_volume() -> f32 {
    1.0
}

impl Config {
    /// Load from the default location, writing a default file on first run.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(config_path: &Path) -> anyhow::Result<Self> {
        if !config_path.exists() {
            let config = Self::default();
            config.save_to(config_path)?;
            tracing::info!("Wrote default config to {:?}", config_path);
            return Ok(config);
        }

        let content = std::fs::read_to_string(config_path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to(&self, config_path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }
}
