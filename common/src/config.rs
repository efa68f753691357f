use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::herald_err;
use crate::normalize::DEFAULT_LARGE_ICON_MIN_VERSION;
use crate::protocol::SocketData;
use crate::utils::errors::{HeraldError, HeraldErrorKind};
use crate::utils::paths::get_config_dir;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct HeraldConfig {
    #[serde(default = "default_socket_path")]
    pub socket_path: PathBuf,

    /// Capacity of the broadcast channel feeding socket subscribers.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,

    #[serde(default)]
    pub reply_cache: ReplyCacheConfig,

    #[serde(default = "default_large_icon_min_version")]
    pub large_icon_min_version: u32,

    /// Extra directories scanned for application icons. `~` is expanded.
    #[serde(default)]
    pub icon_paths: Vec<String>,

    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}
impl Default for HeraldConfig {
    fn default() -> Self {
        Self {
            socket_path: default_socket_path(),
            event_capacity: default_event_capacity(),
            reply_cache: ReplyCacheConfig::default(),
            large_icon_min_version: default_large_icon_min_version(),
            icon_paths: Vec::new(),
            log_filter: default_log_filter(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ReplyCacheConfig {
    #[serde(default = "default_reply_capacity")]
    pub capacity: usize,
    /// Seconds after which a cached reply action is dropped.
    #[serde(default)]
    pub ttl_secs: Option<u64>,
}
impl Default for ReplyCacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_reply_capacity(),
            ttl_secs: None,
        }
    }
}
impl ReplyCacheConfig {
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_secs.map(Duration::from_secs)
    }
}

/// Loads `$XDG_CONFIG_HOME/herald/config.json`, falling back to defaults
/// when the file does not exist.
pub fn load_config() -> Result<HeraldConfig, HeraldError> {
    let loc = get_config_dir()?.join("config.json");
    load_config_from(&loc)
}

pub fn load_config_from(loc: &Path) -> Result<HeraldConfig, HeraldError> {
    let file = match File::open(loc) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!(path = %loc.display(), "no config file, using defaults");
            return Ok(HeraldConfig::default());
        }
        Err(e) => return Err(herald_err!(HeraldErrorKind::FileOpen, e.to_string())),
    };

    let reader = BufReader::new(file);

    serde_json::from_reader::<_, HeraldConfig>(reader).map_err(|e| {
        herald_err!(
            HeraldErrorKind::Config,
            "{}: {}",
            loc.display(),
            e.to_string()
        )
    })
}

fn default_socket_path() -> PathBuf {
    PathBuf::from(SocketData::SOCKET_ADDR)
}
fn default_event_capacity() -> usize {
    64
}
fn default_reply_capacity() -> usize {
    crate::cache::DEFAULT_CAPACITY
}
fn default_large_icon_min_version() -> u32 {
    DEFAULT_LARGE_ICON_MIN_VERSION
}
fn default_log_filter() -> String {
    "info".into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_use_defaults() {
        let config: HeraldConfig =
            serde_json::from_str(r#"{ "reply_cache": { "ttl_secs": 600 } }"#).unwrap();

        assert_eq!(config.socket_path, PathBuf::from("/tmp/herald.sock"));
        assert_eq!(config.event_capacity, 64);
        assert_eq!(config.reply_cache.capacity, 256);
        assert_eq!(config.reply_cache.ttl(), Some(Duration::from_secs(600)));
        assert_eq!(config.large_icon_min_version, 12);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, HeraldConfig::default());
    }

    #[test]
    fn malformed_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = load_config_from(&path).unwrap_err();
        assert_eq!(err.kind, HeraldErrorKind::Config);
    }

    #[test]
    fn reads_file_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{ "socket_path": "/run/user/1000/herald.sock", "icon_paths": ["~/icons"] }"#,
        )
        .unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(
            config.socket_path,
            PathBuf::from("/run/user/1000/herald.sock")
        );
        assert_eq!(config.icon_paths, ["~/icons"]);
        assert_eq!(config.reply_cache, ReplyCacheConfig::default());
    }
}
