//! Enrichment of raw monster records
//!
//! Enrichment expands a [`RawMonster`] into whatever display-ready form the
//! embedding application wants (species names, stat totals, sprites). It is
//! expected to be deterministic, so the record's checksum is a valid cache
//! key and unchanged records are never enriched twice.

use std::marker::PhantomData;

use crate::EnrichError;
use crate::types::RawMonster;

/// Expands raw records into enriched ones
pub trait Enricher: Send + Sync + 'static {
    /// The enriched record type
    type Output: Send + Sync + 'static;

    /// Enrich one record
    ///
    /// Must be a pure function of `raw`. Errors abandon the current poll.
    fn enrich(&self, raw: &RawMonster) -> Result<Self::Output, EnrichError>;
}

/// Enricher built from a closure, see [`enrich_fn`]
pub struct FnEnricher<F, T> {
    f: F,
    _output: PhantomData<fn() -> T>,
}

/// Wrap a closure as an [`Enricher`]
///
/// ```rust
/// use emusync::{Enricher, enrich_fn};
/// use emusync::types::RawMonster;
///
/// let enricher = enrich_fn(|raw: &RawMonster| {
///     let level = raw.field("level").and_then(|v| v.as_u64()).ok_or("missing level")?;
///     Ok(format!("Lv. {}", level))
/// });
///
/// let label = enricher.enrich(&RawMonster::new(1).with_field("level", 12)).unwrap();
/// assert_eq!(label, "Lv. 12");
/// ```
pub fn enrich_fn<F, T>(f: F) -> FnEnricher<F, T>
where
    F: Fn(&RawMonster) -> Result<T, EnrichError> + Send + Sync + 'static,
    T: Send + Sync + 'static,
{
    FnEnricher { f, _output: PhantomData }
}

impl<F, T> Enricher for FnEnricher<F, T>
where
    F: Fn(&RawMonster) -> Result<T, EnrichError> + Send + Sync + 'static,
    T: Send + Sync + 'static,
{
    type Output = T;

    fn enrich(&self, raw: &RawMonster) -> Result<T, EnrichError> {
        (self.f)(raw)
    }
}

/// Enricher that publishes raw records unchanged
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityEnricher;

impl Enricher for IdentityEnricher {
    type Output = RawMonster;

    fn enrich(&self, raw: &RawMonster) -> Result<RawMonster, EnrichError> {
        Ok(raw.clone())
    }
}
