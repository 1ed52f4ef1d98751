//! Source trait for shared channel bytes

use crate::Result;
use crate::types::SharedChannel;

/// Trait for places channel bytes can be read from
///
/// Sources abstract over how a named region is reached (Windows file
/// mappings, files, in-process buffers). They hold no per-channel state
/// between calls: every read attaches, copies and detaches.
#[async_trait::async_trait]
pub trait ChannelSource: Send + Sync + 'static {
    /// Copy the current content of `channel`
    ///
    /// Returns:
    /// - `Ok(bytes)` - exactly `channel.capacity` bytes
    /// - `Err(SyncError::ChannelUnavailable { .. })` - region missing or unreadable
    ///
    /// Implementations must never write to the region.
    async fn read(&self, channel: &SharedChannel) -> Result<Vec<u8>>;
}

