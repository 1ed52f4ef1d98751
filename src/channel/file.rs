//! File-backed channel source

use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;
use tracing::trace;

use crate::source::ChannelSource;
use crate::types::SharedChannel;
use crate::{Result, SyncError};

/// Reads each channel from the file `<dir>/<name>`.
///
/// On Linux, `/dev/shm` makes this a POSIX shared memory reader; any other
/// directory works for captured payloads. Files shorter than the channel
/// capacity read as if zero-padded.
#[derive(Debug, Clone)]
pub struct FileSource {
    dir: PathBuf,
}

impl FileSource {
    /// Create a source rooted at `dir`
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self { dir: dir.as_ref().to_path_buf() }
    }

    /// Path a channel is read from
    pub fn path_for(&self, channel: &SharedChannel) -> PathBuf {
        self.dir.join(channel.name())
    }
}

#[async_trait::async_trait]
impl ChannelSource for FileSource {
    async fn read(&self, channel: &SharedChannel) -> Result<Vec<u8>> {
        let path = self.path_for(channel);
        let unavailable = |e: std::io::Error| {
            SyncError::channel_unavailable_with_source(
                channel.name(),
                format!("cannot read {}", path.display()),
                Box::new(e),
            )
        };

        let file = tokio::fs::File::open(&path).await.map_err(unavailable)?;

        let mut bytes = Vec::with_capacity(channel.capacity);
        file.take(channel.capacity as u64).read_to_end(&mut bytes).await.map_err(unavailable)?;

        trace!(path = %path.display(), read = bytes.len(), "Read file channel");
        bytes.resize(channel.capacity, 0);
        Ok(bytes)
    }
}
