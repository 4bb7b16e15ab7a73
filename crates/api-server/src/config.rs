//! Server configuration from environment variables

use std::path::PathBuf;

const DEFAULT_DATA_DIR: &str = ".todo-data";
const DEFAULT_PORT: u16 = 8081;
const DEFAULT_MAX_IMPORT_BYTES: usize = 64 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the storage slot and exported backups
    pub data_dir: PathBuf,
    pub port: u16,
    /// Start from sample tasks when nothing was saved yet
    pub seed_sample: bool,
    /// Largest accepted import upload
    pub max_import_bytes: usize,
}

impl Config {
    /// Read `TODO_DATA_DIR`, `TODO_PORT`, `TODO_SEED_SAMPLE` and
    /// `TODO_MAX_IMPORT_BYTES`
    pub fn from_env() -> Self {
        let data_dir = std::env::var("TODO_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_DIR));

        Self {
            data_dir,
            port: env_number("TODO_PORT", DEFAULT_PORT),
            seed_sample: env_flag("TODO_SEED_SAMPLE", true),
            max_import_bytes: env_number("TODO_MAX_IMPORT_BYTES", DEFAULT_MAX_IMPORT_BYTES),
        }
    }
}

fn env_number<T>(name: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display + Copy,
{
    match std::env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring invalid {} {:?}, using {}", name, raw, default);
            default
        }),
        Err(_) => default,
    }
}

fn env_flag(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(raw) => parse_flag(&raw, default),
        Err(_) => default,
    }
}

fn parse_flag(raw: &str, default: bool) -> bool {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}
