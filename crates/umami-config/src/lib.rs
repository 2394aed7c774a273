//! Configuration for Umami clients.
//!
//! TOML config file + environment overrides, durable credential
//! storage backends (keyring or a plaintext file), and translation to
//! `umami_api` connection settings.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use umami_api::TransportConfig;
use umami_core::CredentialStorage;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config struct ──────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// API base URL, including the `/api/` prefix.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Credential storage backend: "keyring" or "file".
    #[serde(default = "default_credential_store")]
    pub credential_store: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            timeout: default_timeout(),
            credential_store: default_credential_store(),
        }
    }
}

fn default_api_base_url() -> String {
    "https://umami.app/api/".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_credential_store() -> String {
    "keyring".into()
}

impl Config {
    /// Parse and validate the configured base URL.
    pub fn base_url(&self) -> Result<url::Url, ConfigError> {
        self.api_base_url
            .parse()
            .map_err(|_| ConfigError::Validation {
                field: "api_base_url".into(),
                reason: format!("invalid URL: {}", self.api_base_url),
            })
    }

    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            timeout: Duration::from_secs(self.timeout),
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("app", "umami", "umami").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("umami");
    p
}

// ── Config loading / saving ─────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(config_path()))
        .merge(Env::prefixed("UMAMI_"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(&path, toml_str)?;
    Ok(())
}

// ── Credential storage backends ─────────────────────────────────────

/// Session token in the system keyring.
///
/// Best-effort like every [`CredentialStorage`]: a keyring that cannot
/// be reached reads as "no stored credential" and drops writes with a
/// warning rather than failing the session flow.
pub struct KeyringStorage {
    service: String,
    account: String,
}

impl KeyringStorage {
    pub fn new() -> Self {
        Self {
            service: "umami".into(),
            account: "api-token".into(),
        }
    }

    fn entry(&self) -> Option<keyring::Entry> {
        match keyring::Entry::new(&self.service, &self.account) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(error = %e, "keyring unavailable");
                None
            }
        }
    }
}

impl Default for KeyringStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStorage for KeyringStorage {
    fn load(&self) -> Option<String> {
        self.entry()?.get_password().ok()
    }

    fn store(&self, value: &str) {
        if let Some(entry) = self.entry() {
            if let Err(e) = entry.set_password(value) {
                warn!(error = %e, "failed to store credential in keyring");
            }
        }
    }

    fn clear(&self) {
        if let Some(entry) = self.entry() {
            match entry.delete_credential() {
                Ok(()) | Err(keyring::Error::NoEntry) => {}
                Err(e) => warn!(error = %e, "failed to clear credential from keyring"),
            }
        }
    }
}

/// Session token in a plaintext file, for hosts without a keyring.
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Store under the platform data dir (e.g. `~/.local/share/umami`).
    pub fn new() -> Self {
        let path = ProjectDirs::from("app", "umami", "umami").map_or_else(
            || {
                let mut p = dirs_fallback();
                p.push("credential");
                p
            },
            |dirs| dirs.data_dir().join("credential"),
        );
        Self { path }
    }

    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }
}

impl Default for FileStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStorage for FileStorage {
    fn load(&self) -> Option<String> {
        let raw = std::fs::read_to_string(&self.path).ok()?;
        let token = raw.trim();
        if token.is_empty() {
            None
        } else {
            Some(token.to_owned())
        }
    }

    fn store(&self, value: &str) {
        let write = || -> std::io::Result<()> {
            if let Some(parent) = self.path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&self.path, value)
        };
        if let Err(e) = write() {
            warn!(error = %e, path = %self.path.display(), "failed to store credential file");
        }
    }

    fn clear(&self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                warn!(error = %e, path = %self.path.display(), "failed to clear credential file");
            }
        }
    }
}

/// Pick the storage backend named by the config.
pub fn credential_storage(cfg: &Config) -> Result<Arc<dyn CredentialStorage>, ConfigError> {
    match cfg.credential_store.as_str() {
        "keyring" => Ok(Arc::new(KeyringStorage::new())),
        "file" => Ok(Arc::new(FileStorage::new())),
        other => Err(ConfigError::Validation {
            field: "credential_store".into(),
            reason: format!("expected 'keyring' or 'file', got '{other}'"),
        }),
    }
}
