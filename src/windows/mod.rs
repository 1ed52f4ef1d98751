//! BizHawk shared memory access
//!
//! Each channel is a named file mapping created by the emulator. Reads follow
//! a strict attach-copy-detach pattern:
//!
//! - **Read-only**: mappings are opened with `FILE_MAP_READ`, never written
//! - **No retained handles**: the emulator may recreate or resize a mapping
//!   between polls, so nothing is kept open across reads
//! - **Missing mapping is routine**: an emulator that is not running yet
//!   surfaces as `SyncError::ChannelUnavailable`, which the loops treat as
//!   "no data"
//!
//! # Usage
//!
//! ```rust,ignore
//! use emusync::ChannelSource;
//! use emusync::types::SharedChannel;
//! use emusync::windows::MappedChannelSource;
//!
//! let bytes = MappedChannelSource::new().read(&SharedChannel::game_info()).await?;
//! ```

mod mapping;

pub use mapping::MappedChannelSource;
