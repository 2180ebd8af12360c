//! Server configuration loaded from an optional TOML file.
//!
//! The file path comes from `--config` or the `QUESTLINE_CONFIG` environment
//! variable. Missing file or parse errors fall back to defaults; explicit
//! command-line flags always win over file values.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{error, info};

pub const CONFIG_PATH_VAR: &str = "QUESTLINE_CONFIG";

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: default_port(), db_path: default_db_path() }
    }
}

fn default_port() -> u16 {
    8900
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./var/questline.db")
}

impl ServerConfig {
    pub fn load(explicit_path: Option<&Path>) -> Self {
        let path = match explicit_path {
            Some(path) => Some(path.to_path_buf()),
            None => std::env::var(CONFIG_PATH_VAR).ok().map(PathBuf::from),
        };

        let Some(path) = path else {
            return Self::default();
        };

        match std::fs::read_to_string(&path) {
            Ok(raw) => match toml::from_str::<ServerConfig>(&raw) {
                Ok(config) => {
                    info!(path = %path.display(), "loaded server config");
                    config
                }
                Err(err) => {
                    error!(path = %path.display(), error = %err, "failed to parse config, using defaults");
                    Self::default()
                }
            },
            Err(err) => {
                error!(path = %path.display(), error = %err, "failed to read config, using defaults");
                Self::default()
            }
        }
    }
}
