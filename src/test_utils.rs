//! Test utilities shared by unit tests and benchmarks
//!
//! Enrichers that count or fail on demand, plus builders for the JSON text
//! the emulator script writes into each channel.

#![cfg(any(test, feature = "benchmark"))]

use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::EnrichError;
use crate::enrich::Enricher;
use crate::types::RawMonster;

/// Enriched record produced by [`CountingEnricher`]
#[derive(Debug, Clone, PartialEq)]
pub struct Tagged {
    /// The record that was enriched
    pub raw: RawMonster,
    /// Which call produced this value (1-based)
    pub call: usize,
}

/// Enricher that counts its calls and tags each output with the call number
#[derive(Debug, Clone, Default)]
pub struct CountingEnricher {
    calls: Arc<AtomicUsize>,
}

impl CountingEnricher {
    /// Create an enricher with a zeroed counter
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of enrichment calls so far, across clones
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Enricher for CountingEnricher {
    type Output = Tagged;

    fn enrich(&self, raw: &RawMonster) -> Result<Tagged, EnrichError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(Tagged { raw: raw.clone(), call })
    }
}

/// Enricher that fails for one checksum and tags everything else
#[derive(Debug, Clone)]
pub struct FailingEnricher {
    poison: String,
    inner: CountingEnricher,
}

impl FailingEnricher {
    /// Fail whenever the record's checksum displays as `checksum`
    pub fn on(checksum: &str) -> Self {
        Self { poison: checksum.to_string(), inner: CountingEnricher::new() }
    }
}

impl Enricher for FailingEnricher {
    type Output = Tagged;

    fn enrich(&self, raw: &RawMonster) -> Result<Tagged, EnrichError> {
        if raw.checksum.to_string() == self.poison {
            return Err(format!("no data for record {}", self.poison).into());
        }
        self.inner.enrich(raw)
    }
}

/// Raw records with the given string checksums
pub fn monsters(checksums: &[&str]) -> Vec<RawMonster> {
    checksums.iter().map(|c| RawMonster::new(*c)).collect()
}

/// JSON objects for the given checksums
fn monster_values(checksums: &[&str]) -> Vec<Value> {
    checksums.iter().map(|c| json!({ "checksum": c, "level": 5 })).collect()
}

/// Game info text as the emulator writes it
pub fn game_info_json(trainer: &str, fps: f64, opponents: Option<&[&str]>) -> String {
    let mut doc = json!({
        "trainer": { "name": trainer },
        "game_state": { "map": 1 },
        "emu_fps": fps,
    });
    if let Some(opponents) = opponents {
        doc["opponent"] = Value::Array(monster_values(opponents));
    }
    doc.to_string()
}

/// Party info text as the emulator writes it
pub fn party_info_json(party_count: usize, party: &[&str]) -> String {
    json!({ "party_count": party_count, "party": monster_values(party) }).to_string()
}
