//! Game, trainer and opponent synchronizer

use std::sync::Arc;
use tracing::debug;

use super::{Iteration, Synchronizer};
use crate::Result;
use crate::cache::reconcile_opponents;
use crate::channel::{ChannelReader, PollOutcome};
use crate::enrich::Enricher;
use crate::source::ChannelSource;
use crate::state::SharedState;
use crate::types::{EmulationSpeed, GameInfoDocument, SharedChannel};

/// Polls the game info channel.
///
/// Trainer, game state and emulation speed are overwritten on every document.
/// The opponent roster is reconciled by checksum and cleared when the
/// document carries no opponent list.
pub struct GameSynchronizer<S, N: Enricher> {
    reader: ChannelReader<S>,
    channel: SharedChannel,
    enricher: Arc<N>,
    state: Arc<SharedState<N::Output>>,
}

impl<S: ChannelSource, N: Enricher> GameSynchronizer<S, N> {
    /// Create a synchronizer for `channel`
    pub fn new(
        reader: ChannelReader<S>,
        channel: SharedChannel,
        enricher: Arc<N>,
        state: Arc<SharedState<N::Output>>,
    ) -> Self {
        Self { reader, channel, enricher, state }
    }

    /// Apply one decoded document; returns the number of enrichment calls
    fn apply(&self, doc: GameInfoDocument) -> Result<usize> {
        self.state.publish_trainer(doc.trainer);
        self.state.publish_game_state(doc.game_state);
        self.state.publish_emu_speed(EmulationSpeed::from_fps(doc.emu_fps));

        let Some(opponents) = doc.opponent else {
            if self.state.clear_opponents() {
                debug!("Opponents cleared");
            }
            return Ok(0);
        };

        let current = self.state.opponents();
        let reconciled = reconcile_opponents(current.as_deref(), &opponents, &*self.enricher)?;
        let enriched = reconciled.enriched;

        if reconciled.is_dirty() {
            if reconciled.resized {
                debug!(count = reconciled.roster.len(), "Opponent roster resized");
            }
            self.state.publish_opponents(reconciled.roster);
        }

        Ok(enriched)
    }
}

#[async_trait::async_trait]
impl<S: ChannelSource, N: Enricher> Synchronizer for GameSynchronizer<S, N> {
    fn name(&self) -> &'static str {
        "game"
    }

    async fn poll_once(&mut self) -> Iteration {
        match self.reader.poll::<GameInfoDocument>(&self.channel).await {
            PollOutcome::Success(doc) => match self.apply(doc) {
                Ok(enriched) => Iteration::Applied { enriched },
                Err(e) => Iteration::Failed(e),
            },
            PollOutcome::Empty => Iteration::Empty,
            PollOutcome::Error(e) => Iteration::Failed(e),
        }
    }
}
