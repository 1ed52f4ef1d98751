//! Checksum-keyed reconciliation of rosters
//!
//! Each roster slot remembers the checksum of the raw record it was enriched
//! from. Reconciling a roster against a fresh list of raw records re-runs
//! enrichment only for slots that are new, empty, or whose checksum moved;
//! every other slot keeps its enriched record (the same `Arc`).
//!
//! Opponent and party rosters use slightly different rules, mirroring how the
//! emulator reports them:
//!
//! - [`reconcile_opponents`] resizes to all-empty slots whenever the opponent
//!   count changes, then fills slot by slot.
//! - [`reconcile_party`] builds a candidate of `party_count` slots, carrying
//!   matching slots over from the published roster by index.

use tracing::trace;

use crate::enrich::Enricher;
use crate::types::{RawMonster, Roster, RosterSlot};
use crate::{Result, SyncError};

/// Outcome of reconciling a roster with incoming raw records
#[derive(Debug)]
pub struct Reconciled<E> {
    /// The reconciled roster
    pub roster: Roster<E>,
    /// Number of enrichment calls made
    pub enriched: usize,
    /// Whether the roster length changed
    pub resized: bool,
}

impl<E> Reconciled<E> {
    /// Whether the reconciled roster differs from the one it started from
    pub fn is_dirty(&self) -> bool {
        self.resized || self.enriched > 0
    }
}

fn enrich_slot<N: Enricher>(enricher: &N, raw: &RawMonster) -> Result<RosterSlot<N::Output>> {
    let record = enricher.enrich(raw).map_err(|source| SyncError::Enrichment {
        checksum: raw.checksum.to_string(),
        source,
    })?;
    Ok(RosterSlot::new(raw.checksum.clone(), record))
}

/// Reconcile the opponent roster with the reported opponent list.
///
/// A missing `current` roster, or one whose length differs from `incoming`,
/// is replaced by an all-empty roster first. Enriched slots from before a
/// resize are dropped even when the same opponent is still present.
pub fn reconcile_opponents<N: Enricher>(
    current: Option<&Roster<N::Output>>,
    incoming: &[RawMonster],
    enricher: &N,
) -> Result<Reconciled<N::Output>> {
    let (mut roster, resized) = match current {
        Some(roster) if roster.len() == incoming.len() => (roster.clone(), false),
        _ => (Roster::with_len(incoming.len()), true),
    };

    let mut enriched = 0;
    for (index, raw) in incoming.iter().enumerate() {
        let fresh = match roster.get(index) {
            Some(slot) => !slot.matches(&raw.checksum),
            None => true,
        };

        if fresh {
            trace!(index, checksum = %raw.checksum, "Enriching opponent");
            roster.set(index, enrich_slot(enricher, raw)?);
            enriched += 1;
        }
    }

    Ok(Reconciled { roster, enriched, resized })
}

/// Reconcile the party roster with a party report.
///
/// The result always has `party_count` slots. Slots past the end of
/// `incoming` are empty. Slots whose checksum matches the published slot at
/// the same index are carried over; the rest are enriched.
///
/// More members than `party_count` is an inconsistent report from `channel`
/// and fails before anything is enriched.
pub fn reconcile_party<N: Enricher>(
    channel: &str,
    current: &Roster<N::Output>,
    party_count: usize,
    incoming: &[RawMonster],
    enricher: &N,
) -> Result<Reconciled<N::Output>> {
    if incoming.len() > party_count {
        return Err(SyncError::inconsistent_document(
            channel,
            format!("party lists {} members but party_count is {}", incoming.len(), party_count),
        ));
    }

    let mut roster = Roster::with_len(party_count);
    let resized = party_count != current.len();

    let mut enriched = 0;
    for (index, raw) in incoming.iter().enumerate() {
        match current.get(index) {
            Some(slot) if slot.matches(&raw.checksum) => roster.set(index, slot.clone()),
            _ => {
                trace!(index, checksum = %raw.checksum, "Enriching party member");
                roster.set(index, enrich_slot(enricher, raw)?);
                enriched += 1;
            }
        }
    }

    Ok(Reconciled { roster, enriched, resized })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{CountingEnricher, FailingEnricher, monsters};
    use proptest::prelude::*;
    use std::sync::Arc;

    const PARTY: &str = "party_test";

    #[test]
    fn opponents_fill_a_new_roster() {
        let enricher = CountingEnricher::new();
        let result = reconcile_opponents(None, &monsters(&["A", "B"]), &enricher).unwrap();

        assert!(result.resized);
        assert_eq!(result.enriched, 2);
        assert_eq!(result.roster.len(), 2);
        assert_eq!(result.roster.record(1).unwrap().raw.checksum.to_string(), "B");
    }

    #[test]
    fn opponents_keep_matching_slots() {
        let enricher = CountingEnricher::new();
        let first = reconcile_opponents(None, &monsters(&["A", "B"]), &enricher).unwrap().roster;

        let second =
            reconcile_opponents(Some(&first), &monsters(&["A", "C"]), &enricher).unwrap();

        assert!(!second.resized);
        assert_eq!(second.enriched, 1);
        assert!(Arc::ptr_eq(first.get(0).unwrap().shared(), second.roster.get(0).unwrap().shared()));
        assert_eq!(second.roster.get(1).unwrap().checksum().to_string(), "C");
        assert_eq!(enricher.calls(), 3);
    }

    #[test]
    fn opponent_resize_discards_every_slot() {
        let enricher = CountingEnricher::new();
        let first = reconcile_opponents(None, &monsters(&["A", "B"]), &enricher).unwrap().roster;

        // "A" survives but at a new length, so it is enriched again
        let second =
            reconcile_opponents(Some(&first), &monsters(&["A", "B", "C"]), &enricher).unwrap();

        assert!(second.resized);
        assert_eq!(second.enriched, 3);
        assert!(!Arc::ptr_eq(
            first.get(0).unwrap().shared(),
            second.roster.get(0).unwrap().shared()
        ));
    }

    #[test]
    fn unchanged_opponents_are_clean() {
        let enricher = CountingEnricher::new();
        let first = reconcile_opponents(None, &monsters(&["A"]), &enricher).unwrap().roster;
        let second = reconcile_opponents(Some(&first), &monsters(&["A"]), &enricher).unwrap();

        assert!(!second.is_dirty());
        assert_eq!(enricher.calls(), 1);
    }

    #[test]
    fn party_short_list_leaves_trailing_slots_empty() {
        let enricher = CountingEnricher::new();
        let result =
            reconcile_party(PARTY, &Roster::empty(), 3, &monsters(&["A"]), &enricher).unwrap();

        assert_eq!(result.roster.len(), 3);
        assert_eq!(result.roster.filled(), 1);
        assert!(result.roster.get(2).is_none());
        assert!(result.is_dirty());
    }

    #[test]
    fn party_growth_enriches_only_new_members() {
        let enricher = CountingEnricher::new();
        let first =
            reconcile_party(PARTY, &Roster::empty(), 2, &monsters(&["A", "B"]), &enricher)
                .unwrap()
                .roster;

        let second =
            reconcile_party(PARTY, &first, 3, &monsters(&["A", "B", "C"]), &enricher).unwrap();

        assert!(second.resized);
        assert_eq!(second.enriched, 1);
        assert!(Arc::ptr_eq(first.get(1).unwrap().shared(), second.roster.get(1).unwrap().shared()));
    }

    #[test]
    fn party_shrink_to_zero_is_dirty() {
        let enricher = CountingEnricher::new();
        let first =
            reconcile_party(PARTY, &Roster::empty(), 1, &monsters(&["A"]), &enricher)
                .unwrap()
                .roster;

        let second = reconcile_party(PARTY, &first, 0, &[], &enricher).unwrap();
        assert!(second.is_dirty());
        assert!(second.roster.is_empty());
    }

    #[test]
    fn enrichment_failure_names_the_checksum() {
        let enricher = FailingEnricher::on("B");
        let err =
            reconcile_party(PARTY, &Roster::empty(), 2, &monsters(&["A", "B"]), &enricher)
                .unwrap_err();

        match err {
            SyncError::Enrichment { checksum, .. } => assert_eq!(checksum, "B"),
            other => panic!("expected enrichment error, got {:?}", other),
        }
    }

    #[test]
    fn overfull_party_is_an_error() {
        let enricher = CountingEnricher::new();
        let err =
            reconcile_party(PARTY, &Roster::empty(), 1, &monsters(&["A", "B"]), &enricher)
                .unwrap_err();

        match err {
            SyncError::InconsistentDocument { channel, .. } => assert_eq!(channel, PARTY),
            other => panic!("expected inconsistent document, got {:?}", other),
        }
        assert_eq!(enricher.calls(), 0);
    }

    fn checksum_list() -> impl Strategy<Value = Vec<u8>> {
        prop::collection::vec(0u8..6, 0..6)
    }

    fn labels(ids: &[u8]) -> Vec<String> {
        ids.iter().map(|id| format!("mon-{}", id)).collect()
    }

    proptest! {
        #[test]
        fn prop_party_is_idempotent(ids in checksum_list(), extra in 0usize..3) {
            let enricher = CountingEnricher::new();
            let names = labels(&ids);
            let names: Vec<&str> = names.iter().map(String::as_str).collect();
            let party = monsters(&names);
            let count = party.len() + extra;

            let first = reconcile_party(PARTY, &Roster::empty(), count, &party, &enricher)
                .unwrap()
                .roster;
            let calls = enricher.calls();
            let second = reconcile_party(PARTY, &first, count, &party, &enricher).unwrap();

            prop_assert!(!second.is_dirty());
            prop_assert_eq!(enricher.calls(), calls);
            for index in 0..party.len() {
                prop_assert!(Arc::ptr_eq(
                    first.get(index).unwrap().shared(),
                    second.roster.get(index).unwrap().shared()
                ));
            }
        }

        #[test]
        fn prop_one_changed_member_costs_one_enrichment(
            ids in prop::collection::vec(0u8..6, 1..6),
            pick in any::<prop::sample::Index>()
        ) {
            let enricher = CountingEnricher::new();
            let names = labels(&ids);
            let names: Vec<&str> = names.iter().map(String::as_str).collect();
            let party = monsters(&names);
            let first = reconcile_party(PARTY, &Roster::empty(), party.len(), &party, &enricher)
                .unwrap()
                .roster;

            let changed = pick.index(party.len());
            let mut next = party.clone();
            next[changed] = RawMonster::new("mon-changed");

            let calls = enricher.calls();
            let second = reconcile_party(PARTY, &first, party.len(), &next, &enricher).unwrap();

            prop_assert_eq!(enricher.calls(), calls + 1);
            prop_assert_eq!(second.enriched, 1);
            for index in 0..party.len() {
                let same = Arc::ptr_eq(
                    first.get(index).unwrap().shared(),
                    second.roster.get(index).unwrap().shared(),
                );
                prop_assert_eq!(same, index != changed);
            }
        }

        #[test]
        fn prop_opponent_length_follows_report(
            before in checksum_list(),
            after in checksum_list()
        ) {
            let enricher = CountingEnricher::new();
            let before = labels(&before);
            let before: Vec<&str> = before.iter().map(String::as_str).collect();
            let after = labels(&after);
            let after: Vec<&str> = after.iter().map(String::as_str).collect();

            let first = reconcile_opponents(None, &monsters(&before), &enricher).unwrap().roster;
            let second = reconcile_opponents(Some(&first), &monsters(&after), &enricher).unwrap();

            prop_assert_eq!(second.roster.len(), after.len());
            for (index, name) in after.iter().enumerate() {
                prop_assert_eq!(second.roster.get(index).unwrap().checksum().to_string(), *name);
            }
        }
    }
}
