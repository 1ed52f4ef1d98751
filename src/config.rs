//! Synchronizer configuration
//!
//! Defaults match what the emulator-side script writes: two channels polled
//! every 80 ms. A YAML file can override any field:
//!
//! ```yaml
//! poll_interval_ms: 50
//! stale_after_polls: 200
//! party_info:
//!   name: bizhawk_party_info
//!   capacity: 8192
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::types::{
    GAME_INFO_CAPACITY, GAME_INFO_CHANNEL, PARTY_INFO_CAPACITY, PARTY_INFO_CHANNEL, SharedChannel,
};
use crate::{Result, SyncError};

/// Default delay between two polls of the same channel
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 80;
/// Default number of consecutive misses before a channel is reported stale (~10s)
pub const DEFAULT_STALE_AFTER_POLLS: u32 = 125;
/// Directory file-backed channels are read from on non-Windows hosts
pub const DEFAULT_SHM_DIR: &str = "/dev/shm";

/// Name and size of one channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelConfig {
    pub name: String,
    pub capacity: usize,
}

impl ChannelConfig {
    /// Descriptor for this channel
    pub fn channel(&self) -> SharedChannel {
        SharedChannel::new(self.name.clone(), self.capacity)
    }
}

/// Configuration for both synchronizers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Sleep between polls, in milliseconds
    pub poll_interval_ms: u64,
    /// Consecutive polls without a usable document before a warning is logged
    pub stale_after_polls: u32,
    /// Game, trainer and opponent channel
    pub game_info: ChannelConfig,
    /// Party channel
    pub party_info: ChannelConfig,
    /// Directory holding file-backed channels
    pub shm_dir: PathBuf,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            stale_after_polls: DEFAULT_STALE_AFTER_POLLS,
            game_info: ChannelConfig {
                name: GAME_INFO_CHANNEL.to_string(),
                capacity: GAME_INFO_CAPACITY,
            },
            party_info: ChannelConfig {
                name: PARTY_INFO_CHANNEL.to_string(),
                capacity: PARTY_INFO_CAPACITY,
            },
            shm_dir: PathBuf::from(DEFAULT_SHM_DIR),
        }
    }
}

impl SyncConfig {
    /// Parse and validate a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml).map_err(|e| {
            SyncError::config_with_source("Failed to parse configuration YAML", Box::new(e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading configuration from {}", path.display());

        let yaml = std::fs::read_to_string(path).map_err(|e| {
            SyncError::config_with_source(format!("Cannot read {}", path.display()), Box::new(e))
        })?;
        Self::from_yaml_str(&yaml)
    }

    /// Check the configuration for values the loops cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            return Err(SyncError::config("poll_interval_ms must be greater than zero"));
        }
        if self.stale_after_polls == 0 {
            return Err(SyncError::config("stale_after_polls must be greater than zero"));
        }
        for channel in [&self.game_info, &self.party_info] {
            if channel.name.is_empty() {
                return Err(SyncError::config("channel names must not be empty"));
            }
            if channel.capacity == 0 {
                return Err(SyncError::config(format!(
                    "channel '{}' must have a non-zero capacity",
                    channel.name
                )));
            }
        }
        if self.game_info.name == self.party_info.name {
            return Err(SyncError::config(format!(
                "game and party channels share the name '{}'",
                self.game_info.name
            )));
        }
        Ok(())
    }

    /// Delay between polls
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_producer() {
        let config = SyncConfig::default();
        assert_eq!(config.poll_interval(), Duration::from_millis(80));
        assert_eq!(config.game_info.channel(), SharedChannel::game_info());
        assert_eq!(config.party_info.channel(), SharedChannel::party_info());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = SyncConfig::from_yaml_str("poll_interval_ms: 25\n").unwrap();
        assert_eq!(config.poll_interval_ms, 25);
        assert_eq!(config.stale_after_polls, DEFAULT_STALE_AFTER_POLLS);
        assert_eq!(config.party_info.capacity, PARTY_INFO_CAPACITY);
    }

    #[test]
    fn channel_overrides_parse() {
        let yaml = "game_info:\n  name: custom_game\n  capacity: 2048\nshm_dir: /tmp/emu\n";
        let config = SyncConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.game_info.channel(), SharedChannel::new("custom_game", 2048));
        assert_eq!(config.shm_dir, PathBuf::from("/tmp/emu"));
    }

    #[test]
    fn rejects_unusable_values() {
        assert!(SyncConfig::from_yaml_str("poll_interval_ms: 0\n").is_err());
        assert!(SyncConfig::from_yaml_str("stale_after_polls: 0\n").is_err());

        let zero_capacity = "party_info:\n  name: p\n  capacity: 0\n";
        assert!(SyncConfig::from_yaml_str(zero_capacity).is_err());

        let shared_name = "party_info:\n  name: bizhawk_game_info\n  capacity: 8192\n";
        let err = SyncConfig::from_yaml_str(shared_name).unwrap_err();
        assert!(err.to_string().contains("Invalid configuration"));
    }

    #[test]
    fn malformed_yaml_is_a_config_error() {
        let err = SyncConfig::from_yaml_str("poll_interval_ms: [").unwrap_err();
        assert!(matches!(err, SyncError::Config { source: Some(_), .. }));
        assert!(!err.is_retryable());
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err = SyncConfig::load("/definitely/not/here/emusync.yaml").unwrap_err();
        assert!(matches!(err, SyncError::Config { .. }));
    }
}
