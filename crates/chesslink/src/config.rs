//! Application configuration: the session settings plus logging and the
//! polling cadence of the client loop.
//!
//! ```toml
//! [server]
//! host = "127.0.0.1"
//! port = 4578
//! room_id = "Room1"
//!
//! [profile]
//! user_name = "Bob 99"
//!
//! [logging]
//! level = "info"
//! ```

use std::path::Path;
use std::time::Duration;

use chesslink_session::ClientConfig;
use serde::{Deserialize, Serialize};

/// Top-level configuration for the `chesslink` binary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Relay address, identity and handshake deadlines.
    #[serde(flatten)]
    pub client: ClientConfig,
    /// Logging.
    pub logging: LoggingConfig,
    /// Client loop settings.
    pub runner: RunnerConfig,
}

/// Logging.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is not set.
    pub level: String,
}

/// Client loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// How often the loop checks for inbound messages.
    pub poll_interval_ms: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 50,
        }
    }
}

impl RunnerConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Where a loaded [`AppConfig`] came from.
///
/// Config is read before the tracing subscriber exists, so nothing is
/// logged here; call [`log`](Self::log) once the subscriber is up.
#[derive(Debug)]
pub enum ConfigSource {
    /// Parsed from the file.
    File,
    /// The file could not be read; defaults are in use.
    Missing(std::io::Error),
    /// The file is not valid config; defaults are in use.
    Invalid(toml::de::Error),
}

impl ConfigSource {
    pub fn is_default(&self) -> bool {
        !matches!(self, ConfigSource::File)
    }

    /// Reports the outcome for `path`.
    pub fn log(&self, path: &Path) {
        match self {
            ConfigSource::File => {
                tracing::info!("loaded config from {}", path.display());
            }
            ConfigSource::Missing(e) => {
                tracing::info!("no config at {} ({e}); using defaults", path.display());
            }
            ConfigSource::Invalid(e) => {
                tracing::warn!("invalid config {}: {e}; using defaults", path.display());
            }
        }
    }
}

impl AppConfig {
    /// Loads config from a TOML file, falling back to defaults if the file
    /// is missing or invalid. The [`ConfigSource`] says which happened.
    pub fn load(path: &Path) -> (Self, ConfigSource) {
        match std::fs::read_to_string(path) {
            Ok(contents) => match Self::parse(&contents) {
                Ok(cfg) => (cfg, ConfigSource::File),
                Err(e) => (Self::default(), ConfigSource::Invalid(e)),
            },
            Err(e) => (Self::default(), ConfigSource::Missing(e)),
        }
    }

    /// Parses config from TOML text.
    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Renders the defaults as TOML, for `--gen-config`.
    pub fn default_toml() -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(&Self::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_toml_parses_back() {
        let text = AppConfig::default_toml().unwrap();
        assert!(text.contains("[server]"));
        assert!(text.contains("[logging]"));

        let cfg = AppConfig::parse(&text).unwrap();
        assert_eq!(cfg.client.server.port, 4578);
        assert_eq!(cfg.client.server.room_id, "Room1");
        assert_eq!(cfg.logging.level, "info");
        assert_eq!(cfg.runner.poll_interval(), Duration::from_millis(50));
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let cfg = AppConfig::parse(
            r#"
            [server]
            host = "relay.local"

            [profile]
            user_name = "Mallory"

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.client.server.host, "relay.local");
        assert_eq!(cfg.client.server.port, 4578);
        assert_eq!(cfg.client.profile.user_name, "Mallory");
        assert_eq!(cfg.client.timeouts.handshake_ms, 10_000);
        assert_eq!(cfg.logging.level, "debug");
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(AppConfig::parse("[server\nport = ").is_err());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let (cfg, source) = AppConfig::load(Path::new("/nonexistent/chesslink.toml"));
        assert_eq!(cfg.client.server.port, 4578);
        assert!(matches!(source, ConfigSource::Missing(_)));
        assert!(source.is_default());
    }

    #[test]
    fn test_invalid_file_reports_the_parse_error() {
        let path = std::env::temp_dir().join(format!(
            "chesslink-invalid-{}.toml",
            std::process::id()
        ));
        std::fs::write(&path, "[server]\nport = \"not a port\"\n").unwrap();

        let (cfg, source) = AppConfig::load(&path);
        std::fs::remove_file(&path).unwrap();

        assert_eq!(cfg.client.server.host, "127.0.0.1");
        match source {
            ConfigSource::Invalid(e) => assert!(e.to_string().contains("port")),
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_file_is_used() {
        let path = std::env::temp_dir().join(format!(
            "chesslink-valid-{}.toml",
            std::process::id()
        ));
        std::fs::write(&path, "[server]\nroom_id = \"Room7\"\n").unwrap();

        let (cfg, source) = AppConfig::load(&path);
        std::fs::remove_file(&path).unwrap();

        assert_eq!(cfg.client.server.room_id, "Room7");
        assert!(!source.is_default());
    }
}
