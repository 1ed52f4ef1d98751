//! Named file mapping reader
//!
//! BizHawk's `comm.mmfWrite` backs each channel with a named, pagefile-backed
//! file mapping. This module opens the mapping read-only for the duration of
//! one copy and releases it straight after.

use std::ptr::NonNull;
use tracing::trace;
use windows::Win32::Foundation::{CloseHandle, HANDLE};
use windows::Win32::System::Memory::{
    FILE_MAP_READ, MEMORY_MAPPED_VIEW_ADDRESS, MapViewOfFile, OpenFileMappingW, UnmapViewOfFile,
};
use windows::core::PCWSTR;

use crate::source::ChannelSource;
use crate::types::SharedChannel;
use crate::{Result, SyncError};

/// Reads channels from named Windows file mappings
#[derive(Debug, Default, Clone, Copy)]
pub struct MappedChannelSource;

impl MappedChannelSource {
    /// Create a mapping source
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl ChannelSource for MappedChannelSource {
    async fn read(&self, channel: &SharedChannel) -> Result<Vec<u8>> {
        let view = MappedView::open(channel)?;
        Ok(view.as_bytes().to_vec())
    }
}

/// Read-only view of a mapping, unmapped and closed on drop
struct MappedView {
    mapping: HANDLE,
    base: NonNull<u8>,
    len: usize,
}

impl MappedView {
    fn open(channel: &SharedChannel) -> Result<Self> {
        trace!(channel = channel.name(), "Opening file mapping");

        let mapping = unsafe {
            let wide_name = wide_string(channel.name());
            OpenFileMappingW(FILE_MAP_READ.0, false, PCWSTR::from_raw(wide_name.as_ptr()))
                .map_err(|e| {
                    SyncError::channel_unavailable_with_source(
                        channel.name(),
                        "OpenFileMappingW failed",
                        Box::new(e),
                    )
                })?
        };

        // A view larger than the mapping fails here, so a region that shrank
        // shows up as unavailable rather than as a short read.
        let view = unsafe { MapViewOfFile(mapping, FILE_MAP_READ, 0, 0, channel.capacity()) };
        let Some(base) = NonNull::new(view.Value as *mut u8) else {
            let win_err = windows::core::Error::from_thread();
            unsafe {
                let _ = CloseHandle(mapping);
            }
            return Err(SyncError::channel_unavailable_with_source(
                channel.name(),
                "MapViewOfFile failed",
                Box::new(win_err),
            ));
        };

        Ok(Self { mapping, base, len: channel.capacity() })
    }

    fn as_bytes(&self) -> &[u8] {
        // SAFETY: the view is mapped for `len` bytes and lives as long as `self`
        unsafe { std::slice::from_raw_parts(self.base.as_ptr(), self.len) }
    }
}

impl Drop for MappedView {
    fn drop(&mut self) {
        unsafe {
            let addr = MEMORY_MAPPED_VIEW_ADDRESS { Value: self.base.as_ptr() as *mut _ };
            let _ = UnmapViewOfFile(addr);
            let _ = CloseHandle(self.mapping);
        }
    }
}

/// Convert string to null-terminated wide string for Windows APIs
fn wide_string(s: &str) -> Vec<u16> {
    use std::ffi::OsStr;
    use std::os::windows::ffi::OsStrExt;
    OsStr::new(s).encode_wide().chain(std::iter::once(0)).collect()
}

#[cfg(all(test, windows))]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn wide_string_is_null_terminated() {
        let wide = wide_string("bizhawk_game_info");
        assert_eq!(wide.len(), "bizhawk_game_info".len() + 1);
        assert_eq!(wide.last(), Some(&0));
    }

    #[tokio::test]
    async fn missing_mapping_is_unavailable() {
        let source = MappedChannelSource::new();
        let channel = SharedChannel::new("emusync_test_mapping_that_does_not_exist", 64);

        let err = source.read(&channel).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unavailable);
    }

    #[tokio::test]
    #[ignore = "emulator_required"]
    async fn reads_live_game_info() {
        let source = MappedChannelSource::new();
        let bytes = source.read(&SharedChannel::game_info()).await.expect("BizHawk not running");
        assert_eq!(bytes.len(), crate::types::GAME_INFO_CAPACITY);
    }
}
