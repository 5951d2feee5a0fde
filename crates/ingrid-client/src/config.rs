//! # Client Configuration
//!
//! Configuration for the scanner: where the backend lives, how long to wait
//! for it, which capture mode opens first, and where local state is kept.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     INGRID_API_URL=https://api.example.com/api                         │
//! │     INGRID_MANUAL_ENTRY=false                                          │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/ingrid-scanner/ingrid.toml (Linux)                       │
//! │     ~/Library/Application Support/app.ingrid.ingrid-scanner/ingrid.toml│
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     http://localhost:8001/api, barcode mode, manual entry on           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # ingrid.toml
//! [api]
//! base_url = "http://localhost:8001/api"
//! request_timeout_secs = 30
//! list_max_retries = 3
//! initial_backoff_ms = 250
//! max_backoff_secs = 5
//!
//! [capture]
//! default_mode = "barcode"   # camera | barcode | manual | photo
//! manual_entry_enabled = true
//! device_timeout_secs = 15
//!
//! [storage]
//! persist = true
//! # data_dir = "/custom/path"
//! ```

use std::path::PathBuf;
use std::time::Duration;

use ingrid_core::ScanMode;
use ingrid_store::StoreConfig;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{ClientError, ClientResult};

// =============================================================================
// API Settings
// =============================================================================

/// Where and how to reach the scan backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    /// API root; endpoint paths are appended to it.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Upper bound on any single request (seconds).
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Retries for history/favorites loads. Submissions are never retried.
    #[serde(default = "default_list_max_retries")]
    pub list_max_retries: u32,

    /// Initial backoff between list retries (milliseconds).
    #[serde(default = "default_initial_backoff")]
    pub initial_backoff_ms: u64,

    /// Maximum backoff between list retries (seconds).
    #[serde(default = "default_max_backoff")]
    pub max_backoff_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8001/api".to_string()
}
fn default_request_timeout() -> u64 {
    30
}
fn default_list_max_retries() -> u32 {
    3
}
fn default_initial_backoff() -> u64 {
    250
}
fn default_max_backoff() -> u64 {
    5
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
            list_max_retries: default_list_max_retries(),
            initial_backoff_ms: default_initial_backoff(),
            max_backoff_secs: default_max_backoff(),
        }
    }
}

impl ApiSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Parses `base_url`.
    pub fn parsed_base_url(&self) -> ClientResult<Url> {
        let url = Url::parse(self.base_url.trim())?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ClientError::InvalidUrl(format!(
                "API URL must start with http:// or https://, got: {}",
                self.base_url
            )));
        }
        if url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(self.base_url.clone()));
        }
        Ok(url)
    }
}

// =============================================================================
// Capture Settings
// =============================================================================

/// Capture mode defaults and device limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureSettings {
    /// Mode selected when the scanner opens.
    #[serde(default)]
    pub default_mode: ScanMode,

    /// Whether typed barcode entry is offered.
    #[serde(default = "default_true")]
    pub manual_entry_enabled: bool,

    /// Upper bound on opening the camera (seconds).
    #[serde(default = "default_device_timeout")]
    pub device_timeout_secs: u64,
}

fn default_true() -> bool {
    true
}
fn default_device_timeout() -> u64 {
    15
}

impl Default for CaptureSettings {
    fn default() -> Self {
        CaptureSettings {
            default_mode: ScanMode::default(),
            manual_entry_enabled: true,
            device_timeout_secs: default_device_timeout(),
        }
    }
}

impl CaptureSettings {
    pub fn device_timeout(&self) -> Duration {
        Duration::from_secs(self.device_timeout_secs)
    }

    /// Returns true if `mode` may be selected.
    pub fn is_mode_enabled(&self, mode: ScanMode) -> bool {
        mode != ScanMode::Manual || self.manual_entry_enabled
    }
}

// =============================================================================
// Storage Settings
// =============================================================================

/// Client-local persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Keep identity and last result between runs.
    #[serde(default = "default_true")]
    pub persist: bool,

    /// Override for the platform data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

impl Default for StorageSettings {
    fn default() -> Self {
        StorageSettings {
            persist: true,
            data_dir: None,
        }
    }
}

// =============================================================================
// Main Client Configuration
// =============================================================================

/// Complete scanner configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub capture: CaptureSettings,

    #[serde(default)]
    pub storage: StorageSettings,
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (ingrid.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ClientResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|name| std::env::var(name).ok());
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file, returning the path written.
    pub fn save(&self, config_path: Option<PathBuf>) -> ClientResult<PathBuf> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ClientError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ClientError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| ClientError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Config saved");
        Ok(path)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ClientResult<()> {
        self.api.parsed_base_url()?;

        if self.api.request_timeout_secs == 0 {
            return Err(ClientError::InvalidConfig(
                "request_timeout_secs must be greater than 0".into(),
            ));
        }

        if self.capture.device_timeout_secs == 0 {
            return Err(ClientError::InvalidConfig(
                "device_timeout_secs must be greater than 0".into(),
            ));
        }

        if !self.capture.is_mode_enabled(self.capture.default_mode) {
            return Err(ClientError::InvalidConfig(
                "default_mode is manual but manual entry is disabled".into(),
            ));
        }

        Ok(())
    }

    /// Applies overrides from a variable lookup (the process environment in
    /// [`ClientConfig::load`]).
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("INGRID_API_URL") {
            debug!(url = %url, "Overriding API URL from environment");
            self.api.base_url = url;
        }

        if let Some(timeout) = lookup("INGRID_REQUEST_TIMEOUT") {
            match timeout.parse::<u64>() {
                Ok(secs) => self.api.request_timeout_secs = secs,
                Err(_) => warn!(value = %timeout, "Ignoring non-numeric INGRID_REQUEST_TIMEOUT"),
            }
        }

        if let Some(mode) = lookup("INGRID_DEFAULT_MODE") {
            match mode.parse::<ScanMode>() {
                Ok(parsed) => {
                    debug!(mode = %parsed, "Overriding default mode from environment");
                    self.capture.default_mode = parsed;
                }
                Err(_) => warn!(mode = %mode, "Unknown scan mode in environment"),
            }
        }

        if let Some(flag) = lookup("INGRID_MANUAL_ENTRY") {
            match parse_flag(&flag) {
                Some(enabled) => self.capture.manual_entry_enabled = enabled,
                None => warn!(value = %flag, "Ignoring invalid INGRID_MANUAL_ENTRY"),
            }
        }

        if let Some(dir) = lookup("INGRID_DATA_DIR") {
            self.storage.data_dir = Some(PathBuf::from(dir));
        }

        if let Some(flag) = lookup("INGRID_PERSIST") {
            match parse_flag(&flag) {
                Some(persist) => self.storage.persist = persist,
                None => warn!(value = %flag, "Ignoring invalid INGRID_PERSIST"),
            }
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("app", "ingrid", "ingrid-scanner")
            .map(|dirs| dirs.config_dir().join("ingrid.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    pub fn base_url(&self) -> &str {
        &self.api.base_url
    }

    pub fn request_timeout(&self) -> Duration {
        self.api.request_timeout()
    }

    pub fn device_timeout(&self) -> Duration {
        self.capture.device_timeout()
    }

    /// Storage settings in the form the store crate takes.
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            data_dir: self.storage.data_dir.clone(),
            persist: self.storage.persist,
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url(), "http://localhost:8001/api");
        assert_eq!(config.api.request_timeout_secs, 30);
        assert_eq!(config.capture.default_mode, ScanMode::Barcode);
        assert!(config.capture.manual_entry_enabled);
        assert!(config.storage.persist);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = ClientConfig::default();

        config.api.base_url = "ws://localhost:8001/api".into();
        assert!(matches!(config.validate(), Err(ClientError::InvalidUrl(_))));

        config.api.base_url = "not a url".into();
        assert!(config.validate().is_err());

        config.api.base_url = "https://scan.example.com/api".into();
        assert!(config.validate().is_ok());

        config.api.request_timeout_secs = 0;
        assert!(config.validate().is_err());
        config.api.request_timeout_secs = 30;

        config.capture.default_mode = ScanMode::Manual;
        config.capture.manual_entry_enabled = false;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overrides() {
        let mut config = ClientConfig::default();
        config.apply_overrides(lookup(&[
            ("INGRID_API_URL", "https://scan.example.com/api"),
            ("INGRID_REQUEST_TIMEOUT", "5"),
            ("INGRID_DEFAULT_MODE", "upload"),
            ("INGRID_MANUAL_ENTRY", "off"),
            ("INGRID_PERSIST", "0"),
            ("INGRID_DATA_DIR", "/tmp/ingrid"),
        ]));

        assert_eq!(config.base_url(), "https://scan.example.com/api");
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.capture.default_mode, ScanMode::Photo);
        assert!(!config.capture.manual_entry_enabled);
        assert!(!config.store_config().persist);
        assert_eq!(config.storage.data_dir, Some(PathBuf::from("/tmp/ingrid")));
    }

    #[test]
    fn test_invalid_overrides_are_ignored() {
        let mut config = ClientConfig::default();
        config.apply_overrides(lookup(&[
            ("INGRID_REQUEST_TIMEOUT", "soon"),
            ("INGRID_DEFAULT_MODE", "video"),
            ("INGRID_MANUAL_ENTRY", "maybe"),
        ]));
        assert_eq!(config.api.request_timeout_secs, 30);
        assert_eq!(config.capture.default_mode, ScanMode::Barcode);
        assert!(config.capture.manual_entry_enabled);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: ClientConfig = toml::from_str(
            r#"
            [capture]
            default_mode = "camera"
            "#,
        )
        .unwrap();
        assert_eq!(config.capture.default_mode, ScanMode::Camera);
        assert_eq!(config.capture.device_timeout_secs, 15);
        assert_eq!(config.api.list_max_retries, 3);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("ingrid.toml");

        let mut config = ClientConfig::default();
        config.api.base_url = "http://127.0.0.1:9000/api".into();
        config.capture.manual_entry_enabled = false;
        config.save(Some(path.clone())).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("[api]"));
        assert!(contents.contains("[capture]"));

        let loaded: ClientConfig = toml::from_str(&contents).unwrap();
        assert_eq!(loaded.base_url(), "http://127.0.0.1:9000/api");
        assert!(!loaded.capture.manual_entry_enabled);
    }
}
