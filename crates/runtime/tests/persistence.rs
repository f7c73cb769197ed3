mod support;

use std::fs;
use std::sync::Arc;

use essence_core::AbilityId;
use essence_runtime::{Event, FilePlayerRepository, PersistenceEvent, PlayerRepository, Topic};
use support::{ALEX, Fixture, SAM, quiet_config, wait_for};
use tempfile::TempDir;

fn file_repo(dir: &TempDir) -> Arc<FilePlayerRepository> {
    Arc::new(FilePlayerRepository::new(dir.path().join("players")).unwrap())
}

#[tokio::test]
async fn disconnect_writes_record_and_reconnect_restores_it() {
    let dir = TempDir::new().unwrap();
    let repo = file_repo(&dir);
    let fx = Fixture::with_repository(quiet_config(), repo.clone()).await;
    fx.player_at_level(ALEX, 15).await;
    fx.handle
        .toggle_passive(ALEX, AbilityId::StormResistance)
        .await
        .unwrap();

    assert!(fx.handle.disconnect(ALEX).await.unwrap());
    assert!(!fx.handle.disconnect(SAM).await.unwrap());

    let path = dir.path().join("players").join(format!("{ALEX}.json"));
    let json = fs::read_to_string(path).unwrap();
    assert!(json.contains("\"totalStormEssence\": 2250.0"));
    assert!(json.contains("STORM_RESISTANCE"));

    let status = fx.handle.connect(ALEX).await.unwrap();
    assert_eq!(status.level, 15);
    assert_eq!(status.lifetime_total, 2_250.0);
    assert_eq!(status.active_passives, vec![AbilityId::StormResistance]);
    fx.runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn unknown_passive_names_are_skipped() {
    let dir = TempDir::new().unwrap();
    let repo = file_repo(&dir);
    fs::write(
        repo.base_dir().join(format!("{ALEX}.json")),
        r#"{"totalStormEssence": 4000.0, "activePassives": ["STORM_RESISTANCE", "WEATHER_VANE", "STORMCLEAR"]}"#,
    )
    .unwrap();

    let fx = Fixture::with_repository(quiet_config(), repo).await;
    let status = fx.handle.connect(ALEX).await.unwrap();

    assert_eq!(status.level, 20);
    assert_eq!(status.active_passives, vec![AbilityId::StormResistance]);
    fx.runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn corrupted_record_degrades_to_default() {
    let dir = TempDir::new().unwrap();
    let repo = file_repo(&dir);
    fs::write(repo.base_dir().join(format!("{ALEX}.json")), "{ not json").unwrap();

    let fx = Fixture::with_repository(quiet_config(), repo).await;
    let mut persistence = fx.handle.subscribe(Topic::Persistence);
    let status = fx.handle.connect(ALEX).await.unwrap();

    assert_eq!(status.level, 0);
    assert_eq!(status.lifetime_total, 0.0);
    let event = wait_for(&mut persistence, |e| {
        matches!(e, Event::Persistence(PersistenceEvent::LoadFailed { .. }))
    })
    .await;
    assert!(matches!(
        event,
        Event::Persistence(PersistenceEvent::LoadFailed { player, .. }) if player == ALEX
    ));
    fx.runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn shutdown_flushes_every_loaded_record() {
    let dir = TempDir::new().unwrap();
    let fx = Fixture::with_repository(quiet_config(), file_repo(&dir)).await;
    fx.player_at_level(ALEX, 10).await;
    fx.player_at_level(SAM, 30).await;

    fx.runtime.shutdown().await.unwrap();

    let reopened = FilePlayerRepository::new(dir.path().join("players")).unwrap();
    let mut expected = vec![ALEX, SAM];
    expected.sort();
    assert_eq!(reopened.list_players().unwrap(), expected);
    assert_eq!(
        reopened.load(SAM).unwrap().unwrap().total_storm_essence,
        9_000.0
    );
    assert_eq!(
        reopened.load(ALEX).unwrap().unwrap().total_storm_essence,
        1_000.0
    );
}
