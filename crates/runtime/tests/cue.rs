mod support;

use std::time::Duration;

use essence_core::{AbilityId, AbilityOutcome, EffectCommand, EssenceConfig, Position};
use support::{ALEX, Fixture, eventually, quiet_config};

fn cue_config(duration_ms: u64) -> EssenceConfig {
    let mut config = quiet_config();
    config.abilities.storm_sense.cue_interval_ms = 10;
    config.abilities.storm_sense.cue_duration_ms = duration_ms;
    config
}

async fn sensing(duration_ms: u64) -> Fixture {
    let fx = Fixture::start(cue_config(duration_ms)).await;
    fx.hazards.add(1, Position::new(100.0, 64.0, 0.0), 50.0);
    fx.player_at_level(ALEX, 10).await;
    let activation = fx
        .handle
        .use_ability(ALEX, AbilityId::StormSense)
        .await
        .unwrap();
    assert!(matches!(
        activation.outcome,
        AbilityOutcome::HazardTracked { distance_to_edge, .. } if distance_to_edge == 50.0
    ));
    fx
}

async fn settled_cue_count(fx: &Fixture) -> usize {
    tokio::time::sleep(Duration::from_millis(60)).await;
    let count = fx.world.guide_cues();
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(fx.world.guide_cues(), count, "cue task still running");
    count
}

#[tokio::test]
async fn cue_runs_for_its_duration() {
    let fx = sensing(100).await;

    eventually(|| fx.world.guide_cues() == 10).await;
    assert_eq!(settled_cue_count(&fx).await, 10);

    let cue = fx
        .world
        .commands()
        .into_iter()
        .find_map(|c| match c {
            EffectCommand::GuideCue(cue) => Some(cue),
            _ => None,
        })
        .unwrap();
    assert_eq!(cue.player, ALEX);
    assert_eq!(cue.direction, Position::new(-1.0, 0.0, 0.0));
    fx.runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn cue_stops_when_player_goes_offline() {
    let fx = sensing(60_000).await;
    eventually(|| fx.world.guide_cues() >= 2).await;

    fx.world.remove(ALEX);
    let count = settled_cue_count(&fx).await;
    assert!(count < 100);
    fx.runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn cue_reports_when_hazards_disappear() {
    let fx = sensing(60_000).await;
    eventually(|| fx.world.guide_cues() >= 1).await;

    fx.hazards.clear();
    eventually(|| {
        fx.world.commands().iter().any(|c| {
            matches!(c, EffectCommand::Notify { message, .. } if message == "No storms nearby")
        })
    })
    .await;
    settled_cue_count(&fx).await;
    fx.runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn disconnect_cancels_running_cue() {
    let fx = sensing(60_000).await;
    eventually(|| fx.world.guide_cues() >= 2).await;

    fx.handle.disconnect(ALEX).await.unwrap();
    settled_cue_count(&fx).await;
    assert!(fx.world.locations.lock().unwrap().contains_key(&ALEX));
    fx.runtime.shutdown().await.unwrap();
}
