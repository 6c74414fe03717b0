//! Plugin settings.
//!
//! Settings arrive either as a JSON document or as the flat key/value map a
//! search host hands to its plugins. Both the short keys (`server`,
//! `enableCws`) and the host-style dotted keys (`mynlp.server`,
//! `mynlp.cws.enabled`) are accepted; anything else is ignored.
//!
//! ```
//! use hanlex::config::PluginSettings;
//!
//! let settings = PluginSettings::from_json_str(
//!     r#"{"mynlp.server": "http://nlp.local:8080", "mynlp.cws.enabled": true}"#,
//! )
//! .unwrap();
//! assert!(settings.enable_cws);
//! assert_eq!(settings.server.as_deref(), Some("http://nlp.local:8080"));
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{HanlexError, Result};

/// Default polling interval of the resource sync job.
pub const DEFAULT_SYNC_INTERVAL_SECS: u64 = 60;

/// Default timeout of one resource download.
pub const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 5;

/// Default number of sync records kept in memory.
pub const DEFAULT_HISTORY_SIZE: usize = 32;

/// Settings of the analysis plugin.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PluginSettings {
    /// Base URL of the resource server. No sync job runs without it; an
    /// empty string counts as absent.
    #[serde(alias = "mynlp.server", deserialize_with = "deserialize_server")]
    pub server: Option<String>,

    /// Register the CWS segmentation schemes.
    #[serde(alias = "mynlp.cws.enabled")]
    pub enable_cws: bool,

    /// Seconds between two sync cycles.
    #[serde(alias = "mynlp.sync.interval")]
    pub sync_interval_secs: u64,

    /// Seconds before a resource download is abandoned.
    #[serde(alias = "mynlp.sync.timeout")]
    pub download_timeout_secs: u64,

    /// Identifier of this node in sync records; generated when absent.
    #[serde(alias = "node.name")]
    pub node_id: Option<String>,

    /// Number of sync records kept in memory.
    pub history_size: usize,
}

impl Default for PluginSettings {
    fn default() -> Self {
        PluginSettings {
            server: None,
            enable_cws: false,
            sync_interval_secs: DEFAULT_SYNC_INTERVAL_SECS,
            download_timeout_secs: DEFAULT_DOWNLOAD_TIMEOUT_SECS,
            node_id: None,
            history_size: DEFAULT_HISTORY_SIZE,
        }
    }
}

impl PluginSettings {
    /// Parse settings from a JSON object.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let settings: PluginSettings = serde_json::from_str(json)?;
        Ok(settings)
    }

    /// Load settings from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Build settings from flat string pairs, as handed over by a host.
    pub fn from_map(map: &HashMap<String, String>) -> Result<Self> {
        let mut settings = PluginSettings::default();
        for (key, value) in map {
            let value = value.trim();
            match key.as_str() {
                "server" | "mynlp.server" => {
                    settings.server = (!value.is_empty()).then(|| value.to_string());
                }
                "enableCws" | "mynlp.cws.enabled" => {
                    settings.enable_cws = parse_value(key, value)?;
                }
                "syncIntervalSecs" | "mynlp.sync.interval" => {
                    settings.sync_interval_secs = parse_value(key, value)?;
                }
                "downloadTimeoutSecs" | "mynlp.sync.timeout" => {
                    settings.download_timeout_secs = parse_value(key, value)?;
                }
                "nodeId" | "node.name" => settings.node_id = Some(value.to_string()),
                "historySize" => settings.history_size = parse_value(key, value)?,
                _ => {}
            }
        }
        Ok(settings)
    }

    /// Check the settings; called once at startup.
    pub fn validate(&self) -> Result<()> {
        if self.sync_interval_secs == 0 {
            return Err(HanlexError::invalid_config(
                "syncIntervalSecs must be greater than 0",
            ));
        }
        if self.download_timeout_secs == 0 {
            return Err(HanlexError::invalid_config(
                "downloadTimeoutSecs must be greater than 0",
            ));
        }
        if let Some(server) = &self.server {
            if !(server.starts_with("http://") || server.starts_with("https://")) {
                return Err(HanlexError::invalid_config(format!(
                    "server must be an http(s) URL, got '{server}'"
                )));
            }
        }
        Ok(())
    }

    /// Polling interval as a duration.
    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval_secs)
    }

    /// Download timeout as a duration.
    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }
}

fn deserialize_server<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let server: Option<String> = Option::deserialize(deserializer)?;
    Ok(server
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}

fn parse_value<T>(key: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| HanlexError::invalid_config(format!("invalid value for {key}: {e}")))
}
