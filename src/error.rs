//! Error types for channel polling and state synchronization.
//!
//! Every failure a synchronizer can hit is a [`SyncError`]. None of them ever
//! terminate a polling loop; the loop logs them and polls again. What differs
//! is how loudly they are logged, which is decided by [`SyncError::kind`]:
//!
//! - **Unavailable**: the emulator has not created the region yet, or tore it
//!   down. Handled exactly like an empty channel.
//! - **Decode**: the bytes before the terminator were not valid UTF-8 or not a
//!   well-formed document, usually because the writer was mid-update. The raw
//!   text is kept for diagnosis.
//! - **Unexpected**: anything else (inconsistent documents, enrichment
//!   failures, bad configuration).
//!
//! ```rust
//! use emusync::{ErrorKind, SyncError};
//!
//! let error = SyncError::channel_unavailable("bizhawk_game_info", "region not found");
//! assert_eq!(error.kind(), ErrorKind::Unavailable);
//! if error.is_retryable() {
//!     for suggestion in error.recovery_suggestions() {
//!         println!("  - {}", suggestion);
//!     }
//! }
//! ```

use thiserror::Error;

/// Result type alias for synchronization operations.
pub type Result<T, E = SyncError> = std::result::Result<T, E>;

/// Boxed error returned by enrichment functions.
pub type EnrichError = Box<dyn std::error::Error + Send + Sync>;

/// Coarse classification of a [`SyncError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The shared region could not be attached or read this poll.
    Unavailable,
    /// The region held text that is not a valid document.
    Decode,
    /// Any other failure while parsing, diffing, enriching or publishing.
    Unexpected,
}

/// Main error type for synchronization operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SyncError {
    #[error("Shared channel '{channel}' is unavailable: {reason}")]
    ChannelUnavailable {
        channel: String,
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Channel '{channel}' holds invalid UTF-8")]
    InvalidUtf8 {
        channel: String,
        raw: String,
        #[source]
        source: std::str::Utf8Error,
    },

    #[error("Channel '{channel}' holds a malformed document: {source}")]
    MalformedDocument {
        channel: String,
        raw: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Inconsistent document on channel '{channel}': {details}")]
    InconsistentDocument { channel: String, details: String },

    #[error("Enrichment failed for record with checksum {checksum}")]
    Enrichment {
        checksum: String,
        #[source]
        source: crate::EnrichError,
    },

    #[error("Invalid configuration: {reason}")]
    Config {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl SyncError {
    /// Classify this error for logging and handling.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SyncError::ChannelUnavailable { .. } => ErrorKind::Unavailable,
            SyncError::InvalidUtf8 { .. } | SyncError::MalformedDocument { .. } => {
                ErrorKind::Decode
            }
            SyncError::InconsistentDocument { .. }
            | SyncError::Enrichment { .. }
            | SyncError::Config { .. } => ErrorKind::Unexpected,
        }
    }

    /// Returns whether the next poll may succeed without outside intervention.
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::ChannelUnavailable { .. } => true,
            SyncError::InvalidUtf8 { .. } => true,
            SyncError::MalformedDocument { .. } => true,
            SyncError::InconsistentDocument { .. } => true,
            SyncError::Enrichment { .. } => false,
            SyncError::Config { .. } => false,
        }
    }

    /// The text read from the channel, when the error came from decoding it.
    pub fn raw_text(&self) -> Option<&str> {
        match self {
            SyncError::InvalidUtf8 { raw, .. } | SyncError::MalformedDocument { raw, .. } => {
                Some(raw)
            }
            _ => None,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            SyncError::ChannelUnavailable { .. } => vec![
                "Ensure the emulator is running with the bot script loaded",
                "Check that the channel names match the script's mmfWrite targets",
                "Verify the channel capacity does not exceed the region size",
            ],
            SyncError::InvalidUtf8 { .. } | SyncError::MalformedDocument { .. } => vec![
                "Usually transient: the writer was mid-update, wait for the next poll",
                "Check that the payload fits inside the channel capacity",
                "Inspect the logged raw text for producer-side bugs",
            ],
            SyncError::InconsistentDocument { .. } => vec![
                "Check the producer script for count/list mismatches",
                "Wait for the next poll",
            ],
            SyncError::Enrichment { .. } => vec![
                "Check the enrichment data tables for the reported record",
                "Verify the record fields the enricher depends on",
            ],
            SyncError::Config { .. } => vec![
                "Check the configuration file syntax",
                "Use non-zero capacities and poll intervals",
                "Give each channel a distinct name",
            ],
        }
    }

    /// Helper constructor for unavailable channels.
    pub fn channel_unavailable(channel: impl Into<String>, reason: impl Into<String>) -> Self {
        SyncError::ChannelUnavailable { channel: channel.into(), reason: reason.into(), source: None }
    }

    /// Helper constructor for unavailable channels with source.
    pub fn channel_unavailable_with_source(
        channel: impl Into<String>,
        reason: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        SyncError::ChannelUnavailable {
            channel: channel.into(),
            reason: reason.into(),
            source: Some(source),
        }
    }

    /// Helper constructor for documents that parse but contradict themselves.
    pub fn inconsistent_document(channel: impl Into<String>, details: impl Into<String>) -> Self {
        SyncError::InconsistentDocument { channel: channel.into(), details: details.into() }
    }

    /// Helper constructor for configuration errors.
    pub fn config(reason: impl Into<String>) -> Self {
        SyncError::Config { reason: reason.into(), source: None }
    }

    /// Helper constructor for configuration errors with source.
    pub fn config_with_source(
        reason: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        SyncError::Config { reason: reason.into(), source: Some(source) }
    }
}
