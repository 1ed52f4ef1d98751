//! Polling loops that keep published state in sync with the emulator
//!
//! Each synchronizer owns one channel and one slice of the published state.
//! [`run_loop`] drives a synchronizer until cancelled: poll, log the outcome,
//! sleep, repeat. No outcome ever ends the loop.

mod game;
mod party;

pub use game::GameSynchronizer;
pub use party::PartySynchronizer;

use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::{ErrorKind, SyncError};

/// Typed outcome of one poll
#[derive(Debug)]
pub enum Iteration {
    /// A document was read and applied to published state
    Applied {
        /// Enrichment calls made while applying it
        enriched: usize,
    },
    /// The channel held no data; published state untouched
    Empty,
    /// The poll failed; published state left as it was before the failure
    Failed(SyncError),
}

/// One polling loop's worth of behaviour
#[async_trait::async_trait]
pub trait Synchronizer: Send + 'static {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Read the channel once and apply what was read
    async fn poll_once(&mut self) -> Iteration;
}

/// Counters reported when a loop stops
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    pub polls: u64,
    pub applied: u64,
    pub empty: u64,
    pub failed: u64,
}

/// Tracks consecutive polls without usable data
#[derive(Debug)]
struct StalenessGuard {
    threshold: u32,
    misses: u32,
}

impl StalenessGuard {
    fn new(threshold: u32) -> Self {
        Self { threshold: threshold.max(1), misses: 0 }
    }

    /// Record a miss; returns the miss count when a warning is due
    fn miss(&mut self) -> Option<u32> {
        self.misses = self.misses.saturating_add(1);
        (self.misses % self.threshold == 0).then_some(self.misses)
    }

    /// Record a miss and warn when the threshold is crossed
    fn miss_logged(&mut self, name: &str, interval: Duration) {
        if let Some(misses) = self.miss() {
            warn!(
                synchronizer = name,
                misses,
                "No usable data for {:?}, published state is stale",
                interval * misses
            );
        }
    }

    /// Record a hit; returns the preceding miss count if it had gone stale
    fn hit(&mut self) -> Option<u32> {
        let misses = std::mem::take(&mut self.misses);
        (misses >= self.threshold).then_some(misses)
    }
}

fn log_failure(name: &str, error: &SyncError) {
    match error.kind() {
        ErrorKind::Unavailable => debug!(synchronizer = name, "Channel unavailable: {}", error),
        ErrorKind::Decode => warn!(
            synchronizer = name,
            raw = error.raw_text().unwrap_or_default(),
            "Failed to decode channel: {:?}",
            error
        ),
        ErrorKind::Unexpected => error!(synchronizer = name, "Poll failed: {:?}", error),
    }
}

/// Drive `sync` until `cancel` fires.
///
/// The token is checked before every poll and raced against the sleep, so a
/// cancelled loop stops within one poll. Every other outcome is logged and
/// followed by another poll.
pub async fn run_loop<S: Synchronizer>(
    mut sync: S,
    interval: Duration,
    stale_after: u32,
    cancel: CancellationToken,
) -> LoopStats {
    let name = sync.name();
    let mut stats = LoopStats::default();
    let mut staleness = StalenessGuard::new(stale_after);

    info!(synchronizer = name, interval_ms = interval.as_millis() as u64, "Synchronizer started");

    loop {
        if cancel.is_cancelled() {
            break;
        }

        stats.polls += 1;
        match sync.poll_once().await {
            Iteration::Applied { enriched } => {
                stats.applied += 1;
                if let Some(misses) = staleness.hit() {
                    info!(synchronizer = name, misses, "Channel data resumed");
                }
                if enriched > 0 {
                    debug!(synchronizer = name, enriched, "Applied document");
                } else {
                    trace!(synchronizer = name, "Applied document");
                }
            }
            Iteration::Empty => {
                stats.empty += 1;
                trace!(synchronizer = name, "Channel empty");
                staleness.miss_logged(name, interval);
            }
            Iteration::Failed(e) => {
                stats.failed += 1;
                log_failure(name, &e);
                staleness.miss_logged(name, interval);
            }
        }

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }

    info!(
        synchronizer = name,
        polls = stats.polls,
        applied = stats.applied,
        failed = stats.failed,
        "Synchronizer stopped"
    );
    stats
}
