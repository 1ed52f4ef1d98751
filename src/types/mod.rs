//! Core types for channel content and published state.
//!
//! ## Architecture
//!
//! - [`SharedChannel`] names a fixed-size region the emulator writes to
//! - [`GameInfoDocument`] and [`PartyInfoDocument`] are the typed payloads
//! - [`RawMonster`] is one producer record, fingerprinted by its [`Checksum`]
//! - [`Roster`] holds enriched records slot by slot, each tagged with the
//!   checksum it was enriched from
//! - [`EmulationSpeed`] is the clamped frame-rate ratio
//!
//! ## Usage Example
//!
//! ```rust
//! use emusync::types::{GameInfoDocument, EmulationSpeed};
//!
//! let doc: GameInfoDocument = serde_json::from_str(
//!     r#"{"trainer": {"name": "Red"}, "game_state": {"map": 1}, "emu_fps": 120}"#,
//! ).unwrap();
//!
//! assert!(doc.opponent.is_none());
//! assert_eq!(EmulationSpeed::from_fps(doc.emu_fps).factor(), 2.0);
//! ```

mod channel;
mod document;
mod roster;
mod speed;

pub use channel::{
    GAME_INFO_CAPACITY, GAME_INFO_CHANNEL, PARTY_INFO_CAPACITY, PARTY_INFO_CHANNEL, SharedChannel,
};
pub use document::{Checksum, GameInfoDocument, PartyInfoDocument, RawMonster};
pub use roster::{Roster, RosterSlot};
pub use speed::{BASELINE_FPS, EmulationSpeed};
