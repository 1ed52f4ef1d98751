//! Process-wide published state
//!
//! Five independently updated fields, each behind its own `watch` channel so
//! every publish is an atomic swap of the whole value. Readers see each field
//! consistently but fields are not coupled to each other: a snapshot taken
//! between two publishes may mix old and new fields.

use futures::{Stream, StreamExt};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::types::{EmulationSpeed, Roster};

/// Published opponent roster, absent outside battle
pub type OpponentRoster<E> = Option<Arc<Roster<E>>>;
/// Published party roster
pub type PartyRoster<E> = Arc<Roster<E>>;

/// Writer side of the published state, shared by the synchronizers
pub struct SharedState<E> {
    trainer: watch::Sender<Option<Arc<Value>>>,
    game_state: watch::Sender<Option<Arc<Value>>>,
    emu_speed: watch::Sender<EmulationSpeed>,
    opponents: watch::Sender<OpponentRoster<E>>,
    party: watch::Sender<PartyRoster<E>>,
}

impl<E> SharedState<E> {
    /// Create state with nothing published yet
    pub fn new() -> Self {
        Self {
            trainer: watch::Sender::new(None),
            game_state: watch::Sender::new(None),
            emu_speed: watch::Sender::new(EmulationSpeed::NORMAL),
            opponents: watch::Sender::new(None),
            party: watch::Sender::new(Arc::new(Roster::empty())),
        }
    }

    /// Create a read-only handle for consumers
    pub fn handle(&self) -> StateHandle<E> {
        StateHandle {
            trainer: self.trainer.subscribe(),
            game_state: self.game_state.subscribe(),
            emu_speed: self.emu_speed.subscribe(),
            opponents: self.opponents.subscribe(),
            party: self.party.subscribe(),
        }
    }

    pub(crate) fn publish_trainer(&self, trainer: Value) {
        self.trainer.send_replace(Some(Arc::new(trainer)));
    }

    pub(crate) fn publish_game_state(&self, game_state: Value) {
        self.game_state.send_replace(Some(Arc::new(game_state)));
    }

    pub(crate) fn publish_emu_speed(&self, speed: EmulationSpeed) {
        self.emu_speed.send_replace(speed);
    }

    pub(crate) fn opponents(&self) -> OpponentRoster<E> {
        self.opponents.borrow().clone()
    }

    pub(crate) fn publish_opponents(&self, roster: Roster<E>) {
        self.opponents.send_replace(Some(Arc::new(roster)));
    }

    /// Returns whether a roster was present
    pub(crate) fn clear_opponents(&self) -> bool {
        self.opponents.send_if_modified(|current| current.take().is_some())
    }

    pub(crate) fn party(&self) -> PartyRoster<E> {
        self.party.borrow().clone()
    }

    pub(crate) fn publish_party(&self, roster: Roster<E>) {
        self.party.send_replace(Arc::new(roster));
    }
}

impl<E> Default for SharedState<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of every published field
#[derive(Debug)]
pub struct StateSnapshot<E> {
    pub trainer: Option<Arc<Value>>,
    pub game_state: Option<Arc<Value>>,
    pub emu_speed: EmulationSpeed,
    pub opponents: OpponentRoster<E>,
    pub party: PartyRoster<E>,
}

/// Read-only view of the published state
pub struct StateHandle<E> {
    trainer: watch::Receiver<Option<Arc<Value>>>,
    game_state: watch::Receiver<Option<Arc<Value>>>,
    emu_speed: watch::Receiver<EmulationSpeed>,
    opponents: watch::Receiver<OpponentRoster<E>>,
    party: watch::Receiver<PartyRoster<E>>,
}

impl<E> Clone for StateHandle<E> {
    fn clone(&self) -> Self {
        Self {
            trainer: self.trainer.clone(),
            game_state: self.game_state.clone(),
            emu_speed: self.emu_speed.clone(),
            opponents: self.opponents.clone(),
            party: self.party.clone(),
        }
    }
}

impl<E: Send + Sync + 'static> StateHandle<E> {
    /// Latest trainer sub-document
    pub fn trainer(&self) -> Option<Arc<Value>> {
        self.trainer.borrow().clone()
    }

    /// Latest game state sub-document
    pub fn game_state(&self) -> Option<Arc<Value>> {
        self.game_state.borrow().clone()
    }

    /// Latest emulation speed factor
    pub fn emu_speed(&self) -> EmulationSpeed {
        *self.emu_speed.borrow()
    }

    /// Latest opponent roster
    pub fn opponents(&self) -> OpponentRoster<E> {
        self.opponents.borrow().clone()
    }

    /// Latest party roster
    pub fn party(&self) -> PartyRoster<E> {
        self.party.borrow().clone()
    }

    /// Copy every field. Fields are read one after another, not atomically.
    pub fn snapshot(&self) -> StateSnapshot<E> {
        StateSnapshot {
            trainer: self.trainer(),
            game_state: self.game_state(),
            emu_speed: self.emu_speed(),
            opponents: self.opponents(),
            party: self.party(),
        }
    }

    /// Stream of party rosters: the current one, then every replacement
    pub fn party_updates(&self) -> impl Stream<Item = PartyRoster<E>> + 'static {
        WatchStream::new(self.party.clone())
    }

    /// Stream of opponent rosters: the current one, then every change
    pub fn opponent_updates(&self) -> impl Stream<Item = OpponentRoster<E>> + 'static {
        WatchStream::new(self.opponents.clone())
    }

    /// Stream of trainer documents, skipping the initial empty value
    pub fn trainer_updates(&self) -> impl Stream<Item = Arc<Value>> + 'static {
        WatchStream::new(self.trainer.clone()).filter_map(|opt| async move { opt })
    }
}
