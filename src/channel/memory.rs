//! In-process channel source

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::trace;

use crate::source::ChannelSource;
use crate::types::SharedChannel;
use crate::{Result, SyncError};

/// Channel regions held in process memory.
///
/// Writes follow the emulator's convention: text first, NUL padding up to the
/// region size, anything past the region size cut off. Useful for replaying
/// captured payloads and for tests that need a writer they control.
#[derive(Debug, Default)]
pub struct MemorySource {
    regions: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemorySource {
    /// Create a source with no regions
    pub fn new() -> Self {
        Self::default()
    }

    fn regions(&self) -> MutexGuard<'_, HashMap<String, Vec<u8>>> {
        self.regions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create (or reset) a zero-filled region for `channel`
    pub fn create(&self, channel: &SharedChannel) {
        self.regions().insert(channel.name.clone(), vec![0; channel.capacity]);
    }

    /// Overwrite the region with `text`, creating it if needed
    pub fn write(&self, channel: &SharedChannel, text: &str) {
        self.write_bytes(channel, text.as_bytes());
    }

    /// Overwrite the region with raw bytes, creating it if needed
    pub fn write_bytes(&self, channel: &SharedChannel, bytes: &[u8]) {
        let mut region = vec![0; channel.capacity];
        let len = bytes.len().min(channel.capacity);
        region[..len].copy_from_slice(&bytes[..len]);

        if len < bytes.len() {
            trace!(channel = channel.name(), dropped = bytes.len() - len, "Write truncated");
        }
        self.regions().insert(channel.name.clone(), region);
    }

    /// Tear the region down, as an exiting emulator would
    pub fn remove(&self, name: &str) -> bool {
        self.regions().remove(name).is_some()
    }
}

#[async_trait::async_trait]
impl ChannelSource for MemorySource {
    async fn read(&self, channel: &SharedChannel) -> Result<Vec<u8>> {
        let regions = self.regions();
        let region = regions
            .get(channel.name())
            .ok_or_else(|| SyncError::channel_unavailable(channel.name(), "region not found"))?;

        let mut bytes = vec![0; channel.capacity];
        let len = region.len().min(channel.capacity);
        bytes[..len].copy_from_slice(&region[..len]);
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[tokio::test]
    async fn write_pads_and_truncates() {
        let source = MemorySource::new();
        let channel = SharedChannel::new("mem", 8);

        source.write(&channel, "abc");
        assert_eq!(source.read(&channel).await.unwrap(), b"abc\0\0\0\0\0".to_vec());

        source.write(&channel, "0123456789");
        assert_eq!(source.read(&channel).await.unwrap(), b"01234567".to_vec());
    }

    #[tokio::test]
    async fn removed_region_is_unavailable() {
        let source = MemorySource::new();
        let channel = SharedChannel::new("mem", 8);
        source.create(&channel);

        assert!(source.remove("mem"));
        let err = source.read(&channel).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unavailable);
    }

    #[tokio::test]
    async fn oversized_capacity_reads_zeroes_past_region() {
        let source = MemorySource::new();
        source.write(&SharedChannel::new("mem", 4), "abcd");

        let bytes = source.read(&SharedChannel::new("mem", 6)).await.unwrap();
        assert_eq!(bytes, b"abcd\0\0".to_vec());
    }
}
