use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_u16(key: &str, default: u16) -> u16 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub data: DataConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig::from_env(),
            data: DataConfig::from_env(),
        }
    }
}

// ── Server ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    fn from_env() -> Self {
        Self {
            host: env_or("SERVER_HOST", "127.0.0.1"),
            port: env_u16("SERVER_PORT", 8000),
        }
    }
}

// ── Data snapshot ─────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Pipe-delimited FEC individual-contributions file to load at startup.
    pub fec_file: PathBuf,
    /// Directory of YAML compliance-rule files.
    pub rules_dir: PathBuf,
}

impl DataConfig {
    fn from_env() -> Self {
        Self {
            fec_file: PathBuf::from(env_or("DONORWATCH_DATA_FILE", "data/fec_indiv.txt")),
            rules_dir: PathBuf::from(env_or("DONORWATCH_RULES_DIR", "data/rules")),
        }
    }
}
