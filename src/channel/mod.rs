//! Reading and decoding shared channels
//!
//! The emulator writes UTF-8 document text into a fixed-size region and pads
//! the rest with NUL bytes. There is no lock between writer and reader, so a
//! read can land mid-update: the text may be truncated, garbled or empty.
//! [`ChannelReader::poll`] turns each read into a [`PollOutcome`] so callers
//! can skip a bad poll without losing the state they already hold.

mod file;
mod memory;

pub use file::FileSource;
pub use memory::MemorySource;

use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::trace;

use crate::source::ChannelSource;
use crate::types::SharedChannel;
use crate::{Result, SyncError};

/// Result of one poll of one channel
#[derive(Debug)]
pub enum PollOutcome<T> {
    /// A complete document was decoded
    Success(T),
    /// The channel holds no text; keep prior state
    Empty,
    /// The channel could not be read or decoded
    Error(SyncError),
}

impl<T> PollOutcome<T> {
    /// Get the decoded document, if any
    pub fn into_document(self) -> Option<T> {
        match self {
            PollOutcome::Success(doc) => Some(doc),
            PollOutcome::Empty | PollOutcome::Error(_) => None,
        }
    }
}

/// Decode a channel buffer.
///
/// Everything from the first NUL byte on is discarded. Returns `Ok(None)` when
/// no text precedes the terminator.
pub fn decode_payload<T: DeserializeOwned>(channel: &str, bytes: &[u8]) -> Result<Option<T>> {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    let text_bytes = &bytes[..end];

    if text_bytes.is_empty() {
        return Ok(None);
    }

    let text = std::str::from_utf8(text_bytes).map_err(|e| SyncError::InvalidUtf8 {
        channel: channel.to_string(),
        raw: String::from_utf8_lossy(text_bytes).into_owned(),
        source: e,
    })?;

    serde_json::from_str(text).map(Some).map_err(|e| SyncError::MalformedDocument {
        channel: channel.to_string(),
        raw: text.to_string(),
        source: e,
    })
}

/// Reads channels through a [`ChannelSource`] and decodes their documents
pub struct ChannelReader<S> {
    source: Arc<S>,
}

impl<S> Clone for ChannelReader<S> {
    fn clone(&self) -> Self {
        Self { source: Arc::clone(&self.source) }
    }
}

impl<S: ChannelSource> ChannelReader<S> {
    /// Create a reader over a shared source
    pub fn new(source: Arc<S>) -> Self {
        Self { source }
    }

    /// Read `channel` once and decode its document
    pub async fn poll<T: DeserializeOwned>(&self, channel: &SharedChannel) -> PollOutcome<T> {
        let bytes = match self.source.read(channel).await {
            Ok(bytes) => bytes,
            Err(e) => return PollOutcome::Error(e),
        };

        // Sources promise `capacity` bytes; never look past it regardless.
        let len = bytes.len().min(channel.capacity());
        trace!(channel = channel.name(), bytes = len, "Read channel");

        match decode_payload(channel.name(), &bytes[..len]) {
            Ok(Some(doc)) => PollOutcome::Success(doc),
            Ok(None) => PollOutcome::Empty,
            Err(e) => PollOutcome::Error(e),
        }
    }
}
