mod support;

use std::sync::Arc;
use std::time::Duration;

use essence_core::{
    AbilityError, AbilityId, BalanceStore, BlockPos, Item, Location, PedestalError, Position,
    ZoneId,
};
use essence_runtime::{
    AbilityEvent, Event, InMemoryPlayerRepo, PlayerRepository, Runtime, RuntimeError, Topic,
};
use support::{ALEX, Fixture, SAM, quiet_config, wait_for};

#[tokio::test]
async fn grants_raise_level_and_balance() {
    let fx = Fixture::start(quiet_config()).await;
    fx.world.place(ALEX, 0.0, 0.0);
    let status = fx.handle.connect(ALEX).await.unwrap();
    assert_eq!(status.level, 0);

    let award = fx.handle.award_essence(ALEX, 1_000.0).await.unwrap();
    assert!(award.leveled_up());

    let status = fx.handle.status(ALEX).await.unwrap();
    assert_eq!(status.level, 10);
    assert_eq!(status.lifetime_total, 1_000.0);
    assert_eq!(status.balance, 1_000.0);
    assert_eq!(fx.ledger.balance(ALEX), 1_000.0);

    assert!(matches!(
        fx.handle.award_essence(ALEX, -3.0).await,
        Err(RuntimeError::Balance(_))
    ));
    fx.runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn passive_toggle_is_saved_and_pauses_accrual() {
    let repo = Arc::new(InMemoryPlayerRepo::new());
    let fx = Fixture::with_repository(quiet_config(), repo.clone()).await;
    fx.player_at_level(ALEX, 10).await;

    let toggle = fx
        .handle
        .toggle_passive(ALEX, AbilityId::StormResistance)
        .await
        .unwrap();
    assert!(toggle.enabled);
    assert_eq!(
        repo.load(ALEX).unwrap().unwrap().active_passives,
        vec!["STORM_RESISTANCE".to_string()]
    );

    let award = fx.handle.award_essence(ALEX, 500.0).await.unwrap();
    assert!(!award.accrued);
    let status = fx.handle.status(ALEX).await.unwrap();
    assert_eq!(status.lifetime_total, 1_000.0);
    assert_eq!(status.active_passives, vec![AbilityId::StormResistance]);
    assert!(status.drain_rate > 0.0);
    assert_eq!(fx.handle.drain_rate(ALEX).await.unwrap(), status.drain_rate);

    let err = fx
        .handle
        .toggle_passive(ALEX, AbilityId::Stormborn)
        .await
        .unwrap_err();
    assert!(matches!(err, RuntimeError::Passive(_)));

    assert!(
        fx.handle
            .disable_passive(ALEX, AbilityId::StormResistance)
            .await
            .unwrap()
    );
    assert!(
        !fx.handle
            .disable_passive(ALEX, AbilityId::StormResistance)
            .await
            .unwrap()
    );
    assert!(
        repo.load(ALEX)
            .unwrap()
            .unwrap()
            .active_passives
            .is_empty()
    );
    fx.runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn cooldown_rejects_until_clock_passes_expiry() {
    let fx = Fixture::start(quiet_config()).await;
    fx.player_at_level(ALEX, 40).await;
    *fx.world.aim.lock().unwrap() = Some(Location::new(ZoneId(0), Position::new(8.0, 64.0, 8.0)));
    let mut abilities = fx.handle.subscribe(Topic::Ability);

    fx.handle
        .use_ability(ALEX, AbilityId::Stormcaller)
        .await
        .unwrap();
    wait_for(&mut abilities, |e| {
        matches!(e, Event::Ability(AbilityEvent::Activated { .. }))
    })
    .await;

    fx.clock.advance(Duration::from_secs(12));
    let err = fx
        .handle
        .use_ability(ALEX, AbilityId::Stormcaller)
        .await
        .unwrap_err();
    let RuntimeError::Ability(AbilityError::OnCooldown { remaining, .. }) = err else {
        panic!("expected cooldown, got {err:?}");
    };
    assert_eq!(remaining, Duration::from_secs(18));
    wait_for(&mut abilities, |e| {
        matches!(e, Event::Ability(AbilityEvent::Rejected { .. }))
    })
    .await;

    fx.clock.advance(Duration::from_secs(18));
    fx.handle
        .use_ability(ALEX, AbilityId::Stormcaller)
        .await
        .unwrap();
    assert_eq!(fx.ledger.balance(ALEX), 16_000.0 - 200.0);
    fx.runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn insufficient_balance_charges_nothing() {
    let fx = Fixture::start(quiet_config()).await;
    fx.player_at_level(ALEX, 25).await;
    fx.ledger.set_balance(ALEX, 120.0);

    let err = fx
        .handle
        .use_ability(ALEX, AbilityId::EyeOfTheStorm)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        RuntimeError::Ability(AbilityError::InsufficientEssence { .. })
    ));
    assert_eq!(fx.ledger.balance(ALEX), 120.0);
    assert!(!fx.handle.has_immunity(ALEX).await.unwrap());
    fx.runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn selected_ability_cycles_and_triggers() {
    let fx = Fixture::start(quiet_config()).await;
    fx.player_at_level(ALEX, 100).await;

    assert_eq!(
        fx.handle.cycle_active(ALEX).await.unwrap(),
        AbilityId::StormSense
    );
    fx.handle
        .select_active(ALEX, AbilityId::Stormrider)
        .await
        .unwrap();

    let activation = fx.handle.use_selected(ALEX).await.unwrap();
    assert_eq!(activation.ability, AbilityId::Stormrider);
    assert!(fx.handle.is_traversal_enabled(ALEX).await.unwrap());
    assert!(fx.handle.fall_damage_cancelled(ALEX).await.unwrap());

    fx.handle.use_selected(ALEX).await.unwrap();
    assert!(!fx.handle.is_traversal_enabled(ALEX).await.unwrap());
    fx.runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn immunity_cancels_damage_until_it_expires() {
    let fx = Fixture::start(quiet_config()).await;
    fx.player_at_level(ALEX, 25).await;

    fx.handle
        .use_ability(ALEX, AbilityId::EyeOfTheStorm)
        .await
        .unwrap();
    assert_eq!(fx.handle.damage_check(ALEX, 6.0).await.unwrap(), 0.0);

    fx.clock.advance(Duration::from_secs(600));
    assert!(!fx.handle.has_immunity(ALEX).await.unwrap());
    assert_eq!(fx.handle.damage_check(ALEX, 6.0).await.unwrap(), 6.0);
    fx.runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn pedestal_lifecycle() {
    let fx = Fixture::start(quiet_config()).await;
    fx.player_at_level(ALEX, 50).await;
    fx.player_at_level(SAM, 10).await;
    let block = BlockPos::new(ZoneId(0), 12, 64, -4);

    let info = fx.handle.place_pedestal(ALEX, block).await.unwrap();
    assert_eq!(info.cap, 0.60);
    assert!(matches!(
        fx.handle.place_pedestal(SAM, block).await,
        Err(RuntimeError::Pedestal(PedestalError::AlreadyExists { .. }))
    ));
    assert!(matches!(
        fx.handle
            .add_pedestal_item(SAM, block, Item::new("IRON_HELMET", 1))
            .await,
        Err(RuntimeError::Pedestal(PedestalError::NotOwner { .. }))
    ));
    assert_eq!(
        fx.handle
            .add_pedestal_item(ALEX, block, Item::new("DIAMOND_BOOTS", 1))
            .await
            .unwrap(),
        1
    );
    assert!(fx.handle.block_break(block).await.unwrap());

    assert!(matches!(
        fx.handle.retrieve_pedestal_items(ALEX, block).await,
        Err(RuntimeError::Pedestal(PedestalError::NotReady { .. }))
    ));

    fx.clock.advance(Duration::from_secs(2 * 86_400));
    let retrieval = fx
        .handle
        .retrieve_pedestal_items(ALEX, block)
        .await
        .unwrap();
    assert_eq!(retrieval.tier, 3);
    assert_eq!(retrieval.items.len(), 1);

    assert!(!fx.handle.block_break(block).await.unwrap());
    assert_eq!(fx.handle.pedestal_info(block).await.unwrap(), None);
    assert!(matches!(
        fx.handle.retrieve_pedestal_items(ALEX, block).await,
        Err(RuntimeError::Pedestal(PedestalError::NotFound { .. }))
    ));
    fx.runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn shutdown_flushes_and_closes_handles() {
    let repo = Arc::new(InMemoryPlayerRepo::new());
    let fx = Fixture::with_repository(quiet_config(), repo.clone()).await;
    fx.player_at_level(ALEX, 12).await;
    let handle = fx.handle.clone();

    fx.runtime.shutdown().await.unwrap();

    assert_eq!(
        repo.load(ALEX).unwrap().unwrap().total_storm_essence,
        1_440.0
    );
    assert!(matches!(
        handle.status(ALEX).await,
        Err(RuntimeError::CommandChannelClosed)
    ));
}

#[tokio::test]
async fn builder_requires_collaborators() {
    let err = Runtime::builder().build().await.err().unwrap();
    assert!(matches!(
        err,
        RuntimeError::MissingCollaborator("balance store")
    ));
}
