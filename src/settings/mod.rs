//! Settings for the configuration subsystem
//!
//! Settings are read from a TOML document. A process-wide snapshot is kept
//! behind [`Settings::current`], but every operation that depends on settings
//! also accepts them explicitly.

use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock, RwLock};

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

fn default_true() -> bool {
    true
}

fn default_user_agent_count() -> usize {
    24
}

fn default_trojan_alpn() -> String {
    "h2,http/1.1".to_string()
}

/// Defaults substituted for options a Trojan share link leaves out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrojanDefaults {
    pub sni: String,
    pub udp: bool,
    #[serde(default = "default_trojan_alpn")]
    pub alpn: String,
    pub allow_insecure: bool,
}

impl Default for TrojanDefaults {
    fn default() -> Self {
        TrojanDefaults {
            sni: String::new(),
            udp: false,
            alpn: default_trojan_alpn(),
            allow_insecure: false,
        }
    }
}

/// Settings structure to hold the subsystem configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Accept bare single-label host names (e.g. `localhost`) as domain names.
    #[serde(default = "default_true")]
    pub allow_single_label_hosts: bool,
    /// Number of User-Agent strings synthesized for HTTP-obfuscated VMess.
    #[serde(default = "default_user_agent_count")]
    pub user_agent_count: usize,
    /// Active locale, informational for the UI collaborator.
    #[serde(default)]
    pub locale: Option<String>,
    /// JSON translation catalog for diagnostics.
    #[serde(default)]
    pub catalog: Option<PathBuf>,
    #[serde(default)]
    pub trojan: TrojanDefaults,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            allow_single_label_hosts: true,
            user_agent_count: default_user_agent_count(),
            locale: None,
            catalog: None,
            trojan: TrojanDefaults::default(),
        }
    }
}

// Global settings instance
static GLOBAL: LazyLock<RwLock<Arc<Settings>>> =
    LazyLock::new(|| RwLock::new(Arc::new(Settings::default())));

impl Settings {
    /// Create a new settings instance with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_toml_str(content: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(content)?)
    }

    /// Load settings from a TOML file.
    ///
    /// A relative `catalog` path is resolved against the settings file's directory.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let mut settings = Settings::from_toml_str(&content)?;
        if let (Some(catalog), Some(dir)) = (settings.catalog.as_ref(), path.parent()) {
            if catalog.is_relative() {
                settings.catalog = Some(dir.join(catalog));
            }
        }
        Ok(settings)
    }

    /// Snapshot of the process-wide settings.
    pub fn current() -> Arc<Settings> {
        match GLOBAL.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Replace the process-wide settings.
    pub fn set_current(settings: Settings) {
        let mut guard = match GLOBAL.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Arc::new(settings);
    }
}
