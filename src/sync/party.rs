//! Party synchronizer

use std::sync::Arc;
use tracing::debug;

use super::{Iteration, Synchronizer};
use crate::Result;
use crate::cache::reconcile_party;
use crate::channel::{ChannelReader, PollOutcome};
use crate::enrich::Enricher;
use crate::source::ChannelSource;
use crate::state::SharedState;
use crate::types::{PartyInfoDocument, SharedChannel};

/// Polls the party info channel.
///
/// The published party roster is replaced only when a slot actually changed
/// or the party size moved, so consumers are not woken by identical reports.
pub struct PartySynchronizer<S, N: Enricher> {
    reader: ChannelReader<S>,
    channel: SharedChannel,
    enricher: Arc<N>,
    state: Arc<SharedState<N::Output>>,
}

impl<S: ChannelSource, N: Enricher> PartySynchronizer<S, N> {
    /// Create a synchronizer for `channel`
    pub fn new(
        reader: ChannelReader<S>,
        channel: SharedChannel,
        enricher: Arc<N>,
        state: Arc<SharedState<N::Output>>,
    ) -> Self {
        Self { reader, channel, enricher, state }
    }

    fn apply(&self, doc: PartyInfoDocument) -> Result<usize> {
        let current = self.state.party();
        let reconciled = reconcile_party(
            self.channel.name(),
            &current,
            doc.party_count,
            &doc.party,
            &*self.enricher,
        )?;
        let enriched = reconciled.enriched;

        if reconciled.is_dirty() {
            debug!(
                size = reconciled.roster.len(),
                enriched,
                resized = reconciled.resized,
                "Party roster replaced"
            );
            self.state.publish_party(reconciled.roster);
        }

        Ok(enriched)
    }
}

#[async_trait::async_trait]
impl<S: ChannelSource, N: Enricher> Synchronizer for PartySynchronizer<S, N> {
    fn name(&self) -> &'static str {
        "party"
    }

    async fn poll_once(&mut self) -> Iteration {
        match self.reader.poll::<PartyInfoDocument>(&self.channel).await {
            PollOutcome::Success(doc) => match self.apply(doc) {
                Ok(enriched) => Iteration::Applied { enriched },
                Err(e) => Iteration::Failed(e),
            },
            PollOutcome::Empty => Iteration::Empty,
            PollOutcome::Error(e) => Iteration::Failed(e),
        }
    }
}
