//! End-to-end tests: a fake emulator writes channels, the loops publish state

use emusync::types::{RawMonster, SharedChannel};
use emusync::{
    EmuSync, EnrichError, Enricher, FileSource, IdentityEnricher, MemorySource, SyncConfig, enrich_fn,
};
use futures::StreamExt;
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

const TICK: Duration = Duration::from_millis(80);

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn game_text(trainer: &str, fps: u32, opponents: Option<&[u32]>) -> String {
    let mut doc = json!({
        "trainer": { "name": trainer },
        "game_state": { "map": 7, "in_battle": opponents.is_some() },
        "emu_fps": fps,
    });
    if let Some(opponents) = opponents {
        doc["opponent"] = opponents
            .iter()
            .map(|c| json!({ "checksum": c, "species": c % 151 }))
            .collect();
    }
    doc.to_string()
}

fn party_text(count: usize, members: &[u32]) -> String {
    let party: Vec<_> = members.iter().map(|c| json!({ "checksum": c, "species": c % 151 })).collect();
    json!({ "party_count": count, "party": party }).to_string()
}

/// Species number lookup that counts how often it runs
fn species_enricher(calls: Arc<AtomicUsize>) -> impl Enricher<Output = u64> {
    enrich_fn(move |raw: &RawMonster| -> Result<u64, EnrichError> {
        calls.fetch_add(1, Ordering::SeqCst);
        raw.field("species").and_then(|v| v.as_u64()).ok_or_else(|| "missing species".into())
    })
}

#[tokio::test(start_paused = true)]
async fn battle_lifecycle() {
    init_tracing();
    let source = Arc::new(MemorySource::new());
    let game = SharedChannel::game_info();
    let party = SharedChannel::party_info();
    let calls = Arc::new(AtomicUsize::new(0));

    let sync = EmuSync::start_with_source(
        Arc::clone(&source),
        SyncConfig::default(),
        species_enricher(Arc::clone(&calls)),
    )
    .unwrap();
    let state = sync.state();

    // Emulator not running yet
    tokio::time::sleep(TICK * 3).await;
    assert!(state.trainer().is_none());
    assert!(state.party().is_empty());

    // Overworld
    source.write(&game, &game_text("Red", 60, None));
    source.write(&party, &party_text(2, &[25, 1]));
    tokio::time::sleep(TICK * 3).await;
    assert_eq!(state.trainer().unwrap()["name"], "Red");
    assert!(state.opponents().is_none());
    assert_eq!(state.party().record(0), Some(&25));
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    // Battle starts at double speed
    source.write(&game, &game_text("Red", 120, Some(&[16])));
    tokio::time::sleep(TICK * 3).await;
    assert_eq!(state.emu_speed().factor(), 2.0);
    assert_eq!(state.opponents().unwrap().record(0), Some(&16));
    assert_eq!(calls.load(Ordering::SeqCst), 3);

    // A torn write mid-battle keeps what was published
    source.write(&game, r#"{"trainer": {"name": "Red"}, "game_st"#);
    tokio::time::sleep(TICK * 3).await;
    assert_eq!(state.opponents().unwrap().len(), 1);

    // Battle ends
    source.write(&game, &game_text("Red", 60, None));
    tokio::time::sleep(TICK * 3).await;
    assert!(state.opponents().is_none());
    assert_eq!(state.emu_speed().factor(), 1.0);

    // Many polls later nothing was enriched twice
    assert_eq!(calls.load(Ordering::SeqCst), 3);

    let report = sync.shutdown().await;
    assert!(report.game.failed >= 3);
    assert!(report.party.applied > 0);
}

#[tokio::test(start_paused = true)]
async fn party_stream_only_wakes_on_change() {
    init_tracing();
    let source = Arc::new(MemorySource::new());
    let party = SharedChannel::party_info();
    source.write(&party, &party_text(1, &[4]));

    let sync =
        EmuSync::start_with_source(Arc::clone(&source), SyncConfig::default(), IdentityEnricher)
            .unwrap();
    let mut updates = Box::pin(sync.state().party_updates());

    // Skip the initial empty roster
    let first = loop {
        let roster = updates.next().await.unwrap();
        if !roster.is_empty() {
            break roster;
        }
    };
    assert_eq!(first.len(), 1);

    // Identical reports must not produce updates
    let quiet = tokio::time::timeout(TICK * 10, updates.next()).await;
    assert!(quiet.is_err());

    source.write(&party, &party_text(2, &[4, 7]));
    let grown = updates.next().await.unwrap();
    assert_eq!(grown.len(), 2);
    assert_eq!(grown.record(1).unwrap().checksum.to_string(), "7");

    sync.shutdown().await;
}

#[tokio::test]
async fn reads_file_backed_channels() {
    init_tracing();
    let dir = std::env::temp_dir().join(format!("emusync-it-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();

    let config = SyncConfig { poll_interval_ms: 10, shm_dir: dir.clone(), ..SyncConfig::default() };
    std::fs::write(dir.join(&config.party_info.name), party_text(1, &[150])).unwrap();

    let source = Arc::new(FileSource::new(&config.shm_dir));
    let sync = EmuSync::start_with_source(source, config, IdentityEnricher).unwrap();
    let mut updates = Box::pin(sync.state().party_updates());

    let roster = tokio::time::timeout(Duration::from_secs(5), async {
        while let Some(roster) = updates.next().await {
            if !roster.is_empty() {
                return roster;
            }
        }
        panic!("party stream ended");
    })
    .await
    .expect("party should be read from file");

    assert_eq!(roster.record(0).unwrap().field("species"), Some(&json!(150)));

    sync.shutdown().await;
    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn invalid_config_is_rejected() {
    let config = SyncConfig { poll_interval_ms: 0, ..SyncConfig::default() };
    let result =
        EmuSync::start_with_source(Arc::new(MemorySource::new()), config, IdentityEnricher);
    assert!(result.is_err());
}
