//! Documents the emulator script writes into each channel

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Producer-defined fingerprint of a monster record.
///
/// Two records with equal checksums are assumed to enrich to the same value,
/// which makes the checksum a valid cache key. Numbers and strings both occur
/// in practice, so the value is kept opaque.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Checksum(pub Value);

impl std::fmt::Display for Checksum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.0 {
            Value::String(s) => f.write_str(s),
            other => write!(f, "{}", other),
        }
    }
}

/// One creature as reported by the emulator.
///
/// Only `checksum` is interpreted here. Every other field is preserved as-is
/// for the enricher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMonster {
    pub checksum: Checksum,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl RawMonster {
    /// Create a record with only a checksum
    pub fn new(checksum: impl Into<Value>) -> Self {
        Self { checksum: Checksum(checksum.into()), fields: Map::new() }
    }

    /// Builder-style field setter
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Look up a producer field
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

/// Content of the game info channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameInfoDocument {
    /// Opaque trainer sub-document
    pub trainer: Value,
    /// Opaque game state sub-document
    pub game_state: Value,
    /// Frame rate the emulator currently renders at
    pub emu_fps: f64,
    /// Opponents in the current battle; absent or null outside battle
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opponent: Option<Vec<RawMonster>>,
}

/// Content of the party info channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartyInfoDocument {
    /// Number of party slots
    pub party_count: usize,
    /// Records for the occupied slots, at most `party_count` of them
    pub party: Vec<RawMonster>,
}
