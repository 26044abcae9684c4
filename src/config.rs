use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

const DEFAULT_PORT: u16 = 4320;
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

/// Daemon configuration, layered highest-priority first:
///   1. CLI / env — passed as `Some(value)` from clap
///   2. TOML file at `{data_dir}/config.toml`
///   3. Built-in defaults
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub port: u16,
    pub data_dir: PathBuf,
    pub log: String,
    /// Bind address for the REST server (default: "127.0.0.1").
    pub bind_address: String,
    /// Origin allowed by the CORS layer — the planning frontend
    /// (STUDIOD_CORS_ORIGIN env var, default: http://localhost:3000).
    pub cors_origin: String,
    /// Slow-query log threshold in milliseconds (0 = disabled).
    pub slow_query_ms: u64,
}

/// On-disk shape of `{data_dir}/config.toml`. Every field optional — the
/// file is an override layer, not a requirement.
#[derive(Debug, Default, Deserialize)]
struct TomlConfig {
    port: Option<u16>,
    log: Option<String>,
    bind_address: Option<String>,
    cors_origin: Option<String>,
    slow_query_ms: Option<u64>,
}

fn load_toml(data_dir: &Path) -> Option<TomlConfig> {
    let path = data_dir.join("config.toml");
    let contents = std::fs::read_to_string(&path).ok()?;
    match toml::from_str::<TomlConfig>(&contents) {
        Ok(config) => Some(config),
        Err(e) => {
            warn!("ignoring malformed {}: {e}", path.display());
            None
        }
    }
}

impl DaemonConfig {
    pub fn new(
        port: Option<u16>,
        data_dir: Option<PathBuf>,
        log: Option<String>,
        bind_address: Option<String>,
    ) -> Self {
        let data_dir = data_dir.unwrap_or_else(default_data_dir);

        // Load TOML as the lowest-priority override layer
        let toml = load_toml(&data_dir).unwrap_or_default();

        let port = port.or(toml.port).unwrap_or(DEFAULT_PORT);
        let log = log.or(toml.log).unwrap_or_else(|| "info".to_string());

        let bind_address = bind_address
            .or(std::env::var("STUDIOD_BIND").ok().filter(|s| !s.is_empty()))
            .or(toml.bind_address)
            .unwrap_or_else(default_bind_address);

        let cors_origin = std::env::var("STUDIOD_CORS_ORIGIN")
            .ok()
            .filter(|s| !s.is_empty())
            .or(toml.cors_origin)
            .unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string());

        let slow_query_ms = toml.slow_query_ms.unwrap_or(0);

        Self {
            port,
            data_dir,
            log,
            bind_address,
            cors_origin,
            slow_query_ms,
        }
    }
}

fn default_data_dir() -> PathBuf {
    #[cfg(target_os = "macos")]
    {
        // ~/Library/Application Support/studiod
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("studiod");
        }
    }
    #[cfg(target_os = "linux")]
    {
        // $XDG_DATA_HOME/studiod or ~/.local/share/studiod
        if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
            return PathBuf::from(xdg).join("studiod");
        }
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home)
                .join(".local")
                .join("share")
                .join("studiod");
        }
    }
    #[cfg(target_os = "windows")]
    {
        // %APPDATA%\studiod
        if let Ok(appdata) = std::env::var("APPDATA") {
            return PathBuf::from(appdata).join("studiod");
        }
    }
    // Fallback
    PathBuf::from(".studiod")
}
