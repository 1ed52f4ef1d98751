//! Emulator state synchronization for BizHawk companion tools.
//!
//! A script running inside the emulator serializes the game it is playing into
//! two named shared-memory regions. EmuSync polls those regions, decodes the
//! documents they hold and keeps an in-process picture of the game current:
//! trainer, game state, emulation speed, opponents and party.
//!
//! # Features
//!
//! - **Tolerant polling**: empty, torn or missing channels never stop a loop;
//!   the last good state stays published
//! - **Enrichment cache**: monsters are re-enriched only when their checksum
//!   changes
//! - **Watch-based state**: every field is an atomically swapped snapshot with
//!   change notification
//! - **Pluggable sources**: Windows file mappings, files under `/dev/shm`, or an
//!   in-memory source for tests
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use emusync::{EmuSync, IdentityEnricher, SyncConfig};
//! use futures::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let sync = EmuSync::start(SyncConfig::default(), IdentityEnricher)?;
//!     let mut party = Box::pin(sync.state().party_updates());
//!
//!     while let Some(roster) = party.next().await {
//!         println!("Party of {}", roster.filled());
//!     }
//!     Ok(())
//! }
//! ```

// Core types and error handling
pub mod config;
mod error;
#[cfg_attr(any(test, feature = "benchmark"), path = "test_utils.rs")]
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod types;

// Reading channels
pub mod channel;
pub mod source;

// Synchronization
pub mod cache;
pub mod driver;
pub mod enrich;
pub mod state;
pub mod sync;

// Platform-specific modules
#[cfg(windows)]
pub mod windows;

// Core exports
pub use config::SyncConfig;
pub use error::*;
pub use types::*;

// Runtime exports
pub use channel::{ChannelReader, FileSource, MemorySource, PollOutcome};
pub use driver::{Driver, ShutdownReport, SyncHandle};
pub use enrich::{Enricher, FnEnricher, IdentityEnricher, enrich_fn};
pub use source::ChannelSource;
pub use state::{StateHandle, StateSnapshot};

#[cfg(windows)]
pub use windows::MappedChannelSource;

use std::sync::Arc;
use tracing::info;

/// Entry point for running the synchronizers
pub struct EmuSync;

impl EmuSync {
    /// Start both synchronizers against the platform's shared memory.
    ///
    /// On Windows channels are read from named file mappings; elsewhere from
    /// files in [`SyncConfig::shm_dir`]. Must be called from within a Tokio
    /// runtime.
    pub fn start<N: Enricher>(config: SyncConfig, enricher: N) -> Result<SyncHandle<N::Output>> {
        config.validate()?;

        #[cfg(windows)]
        let source = {
            info!("Reading channels from named file mappings");
            Arc::new(MappedChannelSource::new())
        };

        #[cfg(not(windows))]
        let source = {
            info!(dir = %config.shm_dir.display(), "Reading channels from files");
            Arc::new(FileSource::new(&config.shm_dir))
        };

        Ok(Driver::spawn(source, enricher, &config))
    }

    /// Start both synchronizers against a caller-supplied source
    pub fn start_with_source<S, N>(
        source: Arc<S>,
        config: SyncConfig,
        enricher: N,
    ) -> Result<SyncHandle<N::Output>>
    where
        S: ChannelSource,
        N: Enricher,
    {
        config.validate()?;
        Ok(Driver::spawn(source, enricher, &config))
    }
}
