use anyhow::Context;
use serde::Deserialize;
use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
};
use tracing::info;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub game: GameConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

#[derive(Debug, Deserialize)]
pub struct GameConfig {
    #[serde(default = "default_max_rounds")]
    pub max_rounds: u32,
    /// Newline-separated vocabulary file; the built-in list is used when
    /// absent.
    #[serde(default)]
    pub words_file: Option<PathBuf>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            max_rounds: default_max_rounds(),
            words_file: None,
        }
    }
}

fn default_bind() -> SocketAddr {
    "0.0.0.0:8079".parse().unwrap()
}

fn default_max_rounds() -> u32 {
    3
}

impl Config {
    /// Load the JSON config file, falling back to defaults when it does not
    /// exist.
    pub async fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No config file at {}, using defaults.", path.display());
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("failed to read config file: {}", path.display()));
            }
        };
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config: {}", path.display()))
    }
}
