#![forbid(unsafe_code)]

//! Card configuration, loaded from JSON.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use fohm_decompose::{ChannelIndex, LayoutError};
use fohm_runtime::RuntimeMode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_DEVICE: &str = "PXI1Slot7";
pub const DEFAULT_TOPOLOGY: &str = "2722/Independent";
pub const DEFAULT_LEDGER_CAPACITY: usize = 64;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config read failed for {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("config parse failed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("config serialize failed: {0}")]
    Serialize(serde_json::Error),
    #[error(transparent)]
    Channel(#[from] LayoutError),
    #[error("channel {channel} listed more than once")]
    DuplicateChannel { channel: u8 },
    #[error("no channels configured")]
    NoChannels,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CardConfig {
    /// Resource name of the switch module.
    pub device: String,
    pub topology: String,
    pub channels: Vec<u8>,
    pub mode: RuntimeMode,
    pub ledger_capacity: usize,
    pub clear_on_drop: bool,
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            device: DEFAULT_DEVICE.to_string(),
            topology: DEFAULT_TOPOLOGY.to_string(),
            channels: vec![0],
            mode: RuntimeMode::Strict,
            ledger_capacity: DEFAULT_LEDGER_CAPACITY,
            clear_on_drop: true,
        }
    }
}

impl CardConfig {
    /// Parse and validate. Missing fields take their defaults.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.channel_indices().map(|_| ())
    }

    /// Managed channels in configured order.
    pub fn channel_indices(&self) -> Result<Vec<ChannelIndex>, ConfigError> {
        if self.channels.is_empty() {
            return Err(ConfigError::NoChannels);
        }
        let mut seen = HashSet::with_capacity(self.channels.len());
        self.channels
            .iter()
            .map(|&channel| {
                if !seen.insert(channel) {
                    return Err(ConfigError::DuplicateChannel { channel });
                }
                Ok(ChannelIndex::new(channel)?)
            })
            .collect()
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_manage_channel_zero() {
        let config = CardConfig::default();
        assert_eq!(config.device, "PXI1Slot7");
        assert_eq!(config.topology, "2722/Independent");
        assert_eq!(
            config.channel_indices().expect("valid"),
            vec![ChannelIndex::new(0).expect("valid channel")]
        );
        assert!(config.clear_on_drop);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let config = CardConfig::from_json_str(r#"{"channels": [3, 1], "mode": "Hardened"}"#)
            .expect("valid config");
        assert_eq!(config.channels, vec![3, 1]);
        assert_eq!(config.mode, RuntimeMode::Hardened);
        assert_eq!(config.ledger_capacity, DEFAULT_LEDGER_CAPACITY);
        assert_eq!(config.device, DEFAULT_DEVICE);
    }

    #[test]
    fn rejects_duplicate_channels() {
        let err = CardConfig::from_json_str(r#"{"channels": [2, 5, 2]}"#).expect_err("duplicate");
        assert!(matches!(err, ConfigError::DuplicateChannel { channel: 2 }));
    }

    #[test]
    fn rejects_out_of_range_channel() {
        let err = CardConfig::from_json_str(r#"{"channels": [16]}"#).expect_err("out of range");
        assert!(matches!(
            err,
            ConfigError::Channel(LayoutError::ChannelOutOfRange { channel: 16 })
        ));
    }

    #[test]
    fn rejects_empty_channel_list_and_unknown_fields() {
        assert!(matches!(
            CardConfig::from_json_str(r#"{"channels": []}"#),
            Err(ConfigError::NoChannels)
        ));
        assert!(matches!(
            CardConfig::from_json_str(r#"{"slot": 7}"#),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn load_reads_file_and_reports_missing_path() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{"device": "PXI1Slot3", "channels": [0, 15]}}"#).expect("write");
        let config = CardConfig::load(file.path()).expect("load");
        assert_eq!(config.device, "PXI1Slot3");
        assert_eq!(config.channels, vec![0, 15]);

        let dir = tempfile::tempdir().expect("temp dir");
        let missing = dir.path().join("absent.json");
        let err = CardConfig::load(&missing).expect_err("missing file");
        assert!(matches!(err, ConfigError::Io { ref path, .. } if *path == missing));
    }

    #[test]
    fn pretty_json_roundtrips() {
        let config = CardConfig {
            channels: vec![4, 9],
            ledger_capacity: 8,
            ..CardConfig::default()
        };
        let pretty = config.to_json_pretty().expect("serialize");
        assert!(pretty.contains("\n  \"ledger_capacity\": 8"));
        let back = CardConfig::from_json_str(&pretty).expect("roundtrip");
        assert_eq!(back, config);
    }
}
