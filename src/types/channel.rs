//! Shared memory channel descriptors

use serde::{Deserialize, Serialize};

/// Channel the emulator script writes game, trainer and opponent info to
pub const GAME_INFO_CHANNEL: &str = "bizhawk_game_info";
/// Declared size of the game info region
pub const GAME_INFO_CAPACITY: usize = 4096;
/// Channel the emulator script writes the party to
pub const PARTY_INFO_CHANNEL: &str = "bizhawk_party_info";
/// Declared size of the party info region
pub const PARTY_INFO_CAPACITY: usize = 8192;

/// A named, fixed-size memory-mapped region owned by the emulator.
///
/// This is only a descriptor. Sources attach to the region for the duration
/// of one read and never keep a handle between polls, so the writer is free
/// to recreate or resize it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SharedChannel {
    /// OS-level name of the mapping
    pub name: String,
    /// Number of bytes copied out per read
    pub capacity: usize,
}

impl SharedChannel {
    /// Create a channel descriptor
    pub fn new(name: impl Into<String>, capacity: usize) -> Self {
        Self { name: name.into(), capacity }
    }

    /// The default game info channel
    pub fn game_info() -> Self {
        Self::new(GAME_INFO_CHANNEL, GAME_INFO_CAPACITY)
    }

    /// The default party info channel
    pub fn party_info() -> Self {
        Self::new(PARTY_INFO_CHANNEL, PARTY_INFO_CAPACITY)
    }

    /// Get the mapping name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the byte capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
