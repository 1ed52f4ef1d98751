//! Driver spawns and manages the synchronizer tasks

use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::channel::ChannelReader;
use crate::config::SyncConfig;
use crate::enrich::Enricher;
use crate::source::ChannelSource;
use crate::state::{SharedState, StateHandle};
use crate::sync::{GameSynchronizer, LoopStats, PartySynchronizer, run_loop};

/// Final counters of both loops
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShutdownReport {
    pub game: LoopStats,
    pub party: LoopStats,
}

/// Handle to a running pair of synchronizers.
///
/// Dropping the handle cancels both loops without waiting for them.
pub struct SyncHandle<E> {
    state: StateHandle<E>,
    cancel: CancellationToken,
    game: Option<JoinHandle<LoopStats>>,
    party: Option<JoinHandle<LoopStats>>,
}

impl<E: Send + Sync + 'static> SyncHandle<E> {
    /// Read-only view of the published state
    pub fn state(&self) -> StateHandle<E> {
        self.state.clone()
    }

    /// Token shared by both loops
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Ask both loops to stop. Returns immediately.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Stop both loops and wait for them to finish
    pub async fn shutdown(mut self) -> ShutdownReport {
        self.cancel.cancel();
        let game = Self::join("game", self.game.take()).await;
        let party = Self::join("party", self.party.take()).await;
        ShutdownReport { game, party }
    }

    async fn join(name: &str, task: Option<JoinHandle<LoopStats>>) -> LoopStats {
        let Some(task) = task else {
            return LoopStats::default();
        };
        match task.await {
            Ok(stats) => stats,
            Err(e) => {
                warn!(synchronizer = name, "Synchronizer task did not finish cleanly: {}", e);
                LoopStats::default()
            }
        }
    }
}

impl<E> Drop for SyncHandle<E> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Driver spawns the game and party synchronizers on the current runtime
pub struct Driver;

impl Driver {
    /// Spawn both loops reading from `source`.
    ///
    /// The loops share one enricher and one published state, and stop together
    /// when the returned handle is cancelled, shut down or dropped.
    pub fn spawn<S, N>(source: Arc<S>, enricher: N, config: &SyncConfig) -> SyncHandle<N::Output>
    where
        S: ChannelSource,
        N: Enricher,
    {
        let state = Arc::new(SharedState::new());
        let handle = state.handle();
        let enricher = Arc::new(enricher);
        let cancel = CancellationToken::new();
        let interval = config.poll_interval();

        let game_sync = GameSynchronizer::new(
            ChannelReader::new(Arc::clone(&source)),
            config.game_info.channel(),
            Arc::clone(&enricher),
            Arc::clone(&state),
        );
        let party_sync = PartySynchronizer::new(
            ChannelReader::new(source),
            config.party_info.channel(),
            enricher,
            state,
        );

        let game = tokio::spawn(run_loop(
            game_sync,
            interval,
            config.stale_after_polls,
            cancel.child_token(),
        ));
        let party = tokio::spawn(run_loop(
            party_sync,
            interval,
            config.stale_after_polls,
            cancel.child_token(),
        ));

        info!(
            game_channel = %config.game_info.name,
            party_channel = %config.party_info.name,
            "Synchronizers spawned"
        );

        SyncHandle { state: handle, cancel, game: Some(game), party: Some(party) }
    }
}
