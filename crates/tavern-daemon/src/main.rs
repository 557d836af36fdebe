mod http;
mod listing;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tavern_proto::config::Config;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Soundboard server: lists audio files and serves them with the front-end.
#[derive(Debug, Parser)]
#[command(name = "tavern", version, about)]
struct Args {
    /// Config file (defaults to ~/.config/tavern/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Address to bind
    #[arg(long)]
    bind: Option<String>,

    /// Port to listen on (the PORT environment variable also works)
    #[arg(long)]
    port: Option<u16>,

    /// Audio root listed by /tracks and served under /music
    #[arg(long)]
    music_dir: Option<PathBuf>,

    /// Front-end assets served at /
    #[arg(long)]
    public_dir: Option<PathBuf>,
}

impl Args {
    /// Command-line flags win over `PORT`, which wins over the config file.
    fn apply(self, config: &mut Config) {
        if let Some(bind) = self.bind {
            config.http.bind_address = bind;
        }
        if let Some(port) = self.port.or_else(tavern_proto::platform::port_from_env) {
            config.http.port = port;
        }
        if let Some(dir) = self.music_dir {
            config.paths.music_dir = dir;
        }
        if let Some(dir) = self.public_dir {
            config.paths.public_dir = dir;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let data_dir = tavern_proto::platform::data_dir();
    std::fs::create_dir_all(&data_dir)?;
    let log_path = data_dir.join("daemon.log");

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    // File keeps everything; stderr is for whoever launched the server.
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(log_file)
        .with_ansi(false);
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tavern_daemon=debug")),
        )
        .init();

    info!("Log file: {:?}", log_path);

    let config_path = args.config.clone().unwrap_or_else(Config::config_path);
    let mut config = Config::load_from(&config_path)?;
    info!("Config loaded from: {:?}", config_path);
    args.apply(&mut config);

    if !config.paths.music_dir.exists() {
        warn!(
            "Music directory {:?} does not exist; /tracks will report an error until it is created",
            config.paths.music_dir
        );
    }
    info!("Serving music from {:?}", config.paths.music_dir);
    info!("Serving assets from {:?}", config.paths.public_dir);

    let state = Arc::new(http::ServerState {
        music_dir: config.paths.music_dir.clone(),
        public_dir: config.paths.public_dir.clone(),
    });

    http::serve(&config.http.bind_address, config.http.port, state).await
}
