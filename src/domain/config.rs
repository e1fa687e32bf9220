use std::{io, path::Path};

use serde::{Deserialize, Serialize};

/// Configuration for parsing descriptor record files.
///
/// Controls how the background record parser hands records to its consumer
/// and how often it reports progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// The number of finished records that may wait in the queue between the
    /// parser worker and the consumer.
    ///
    /// The worker blocks once the queue is full. A capacity of zero makes
    /// every hand-off a rendezvous.
    channel_capacity: usize,

    /// Log a progress message every this many input lines.
    ///
    /// Zero disables progress messages.
    pub progress_interval: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
            progress_interval: default_progress_interval(),
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Read)?;
        toml::from_str(&content).map_err(ConfigError::Parse)
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        std::fs::write(path, content).map_err(ConfigError::Write)
    }

    /// Returns the capacity of the record queue.
    #[must_use]
    pub const fn channel_capacity(&self) -> usize {
        self.channel_capacity
    }

    /// Sets the capacity of the record queue.
    #[must_use]
    pub const fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }
}

/// Errors that can occur when loading or saving a [`Config`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Failed to read config file: {0}")]
    Read(#[source] io::Error),

    /// The config file is not valid TOML or does not match the schema.
    #[error("Failed to parse config file: {0}")]
    Parse(#[source] toml::de::Error),

    /// The configuration could not be serialized.
    #[error("Failed to serialize config: {0}")]
    Serialize(#[source] toml::ser::Error),

    /// The config file could not be written.
    #[error("Failed to write config file: {0}")]
    Write(#[source] io::Error),
}

const fn default_channel_capacity() -> usize {
    1000
}

const fn default_progress_interval() -> u64 {
    1_000_000
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_channel_capacity")]
        channel_capacity: usize,

        #[serde(default = "default_progress_interval")]
        progress_interval: u64,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                channel_capacity,
                progress_interval,
            } => Self {
                channel_capacity,
                progress_interval,
            },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            channel_capacity: config.channel_capacity,
            progress_interval: config.progress_interval,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn load_reads_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"_version = \"1\"\nchannel_capacity = 16\nprogress_interval = 0\n")
            .unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.channel_capacity(), 16);
        assert_eq!(config.progress_interval, 0);
    }

    #[test]
    fn load_missing_file_returns_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing.toml");

        let error = Config::load(&missing).unwrap_err();
        assert!(matches!(error, ConfigError::Read(_)));
        assert!(error.to_string().starts_with("Failed to read config file:"));
    }

    #[test]
    fn load_invalid_toml_returns_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"_version = \"1\"\nchannel_capacity = \"lots\"\n")
            .unwrap();

        let error = Config::load(file.path()).unwrap_err();
        assert!(matches!(error, ConfigError::Parse(_)));
    }

    #[test]
    fn empty_file_returns_default() {
        let expected = Config::default();
        let actual: Config = toml::from_str(r#"_version = "1""#).unwrap();
        assert_eq!(actual, expected);
        assert_eq!(actual.channel_capacity(), 1000);
    }

    #[test]
    fn save_then_load() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("mesh.toml");
        let config = Config::default().with_channel_capacity(8);

        config.save(&path).unwrap();

        assert_eq!(Config::load(&path).unwrap(), config);
    }
}
