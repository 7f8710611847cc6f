//! Server configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use algoscope_steps::input;

use crate::error::Result;
use crate::playback::PlaybackSpeed;

/// Environment variable naming an optional JSON config file.
pub const CONFIG_ENV: &str = "ALGOSCOPE_CONFIG";

/// Configuration for the visualization server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisConfig {
    /// Port to listen on
    pub port: u16,
    /// Seed for array generation; random when absent
    pub seed: Option<u64>,
    /// Length of generated sort arrays
    pub array_size: usize,
    /// Initial autoplay speed (1-100)
    pub speed: u8,
}

impl Default for VisConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            seed: None,
            array_size: input::DEFAULT_ARRAY_SIZE,
            speed: PlaybackSpeed::DEFAULT.value(),
        }
    }
}

impl VisConfig {
    /// Read a JSON config file. Missing fields fall back to defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        Ok(config.sanitized())
    }

    /// Defaults, then `ALGOSCOPE_CONFIG` if set, then positional `[port] [seed]`.
    pub fn from_env_and_args(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let base = match std::env::var(CONFIG_ENV) {
            Ok(path) if !path.is_empty() => Self::load(path)?,
            _ => Self::default(),
        };
        Ok(base.with_args(args))
    }

    /// Apply positional `[port] [seed]` overrides; unparsable values are ignored.
    pub fn with_args(mut self, args: impl IntoIterator<Item = String>) -> Self {
        let mut args = args.into_iter();
        if let Some(port) = args.next().and_then(|p| p.parse().ok()) {
            self.port = port;
        }
        if let Some(seed) = args.next().and_then(|s| s.parse().ok()) {
            self.seed = Some(seed);
        }
        self
    }

    fn sanitized(mut self) -> Self {
        if input::check_array_size(self.array_size).is_err() {
            tracing::warn!(
                "array_size {} out of range, using {}",
                self.array_size,
                input::DEFAULT_ARRAY_SIZE
            );
            self.array_size = input::DEFAULT_ARRAY_SIZE;
        }
        self.speed = PlaybackSpeed::new(self.speed).value();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = VisConfig::default();
        assert_eq!(config.port, 3000);
        assert_eq!(config.array_size, 12);
        assert!(config.seed.is_none());
    }

    #[test]
    fn positional_args_override() {
        let config = VisConfig::default().with_args(["8080".to_string(), "42".to_string()]);
        assert_eq!(config.port, 8080);
        assert_eq!(config.seed, Some(42));

        let config = VisConfig::default().with_args(["nope".to_string()]);
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn partial_file_uses_defaults() {
        let path = std::env::temp_dir().join(format!("algoscope-config-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "seed": 7, "array_size": 99 }"#).unwrap();
        let config = VisConfig::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.seed, Some(7));
        assert_eq!(config.port, 3000);
        // out of range falls back
        assert_eq!(config.array_size, 12);
    }
}
