//! Cloneable façade for issuing commands to the runtime.
//!
//! [`RuntimeHandle`] hides channel plumbing and offers async helpers for every
//! engine operation, plus event subscription by topic.
use std::collections::HashMap;

use tokio::sync::{broadcast, mpsc, oneshot};

use essence_core::{
    AbilityActivation, AbilityId, BlockPos, EssenceAward, Item, MovementDirective, MovementSample,
    PassiveToggle, PedestalInfo, PlayerId, PlayerStatus, Retrieval,
};

use super::errors::{Result, RuntimeError};
use crate::events::{Event, EventBus, Topic};
use crate::workers::Command;

/// Client-facing handle to interact with the runtime
#[derive(Clone)]
pub struct RuntimeHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
}

impl RuntimeHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>, event_bus: EventBus) -> Self {
        Self {
            command_tx,
            event_bus,
        }
    }

    async fn request<T>(&self, command: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(command(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Load the player's record and start charging their passives.
    pub async fn connect(&self, player: PlayerId) -> Result<PlayerStatus> {
        self.request(|reply| Command::Connect { player, reply })
            .await
    }

    /// Flush and evict the player. Returns false if nothing was loaded.
    pub async fn disconnect(&self, player: PlayerId) -> Result<bool> {
        self.request(|reply| Command::Disconnect { player, reply })
            .await
    }

    // ========================================================================
    // Host events
    // ========================================================================

    /// Resource-grant event. The store is credited before the total accrues.
    pub async fn award_essence(&self, player: PlayerId, amount: f64) -> Result<EssenceAward> {
        self.request(|reply| Command::AwardEssence {
            player,
            amount,
            reply,
        })
        .await?
    }

    /// Damage-check event. Returns the damage to apply.
    pub async fn damage_check(&self, player: PlayerId, damage: f64) -> Result<f64> {
        self.request(|reply| Command::DamageCheck {
            player,
            damage,
            reply,
        })
        .await
    }

    /// Returns true when the fall damage must be cancelled.
    pub async fn fall_damage_cancelled(&self, player: PlayerId) -> Result<bool> {
        self.request(|reply| Command::FallDamage { player, reply })
            .await
    }

    /// Per-tick exposure event for every player currently inside a hazard.
    pub async fn exposure_tick(&self, players: Vec<PlayerId>) -> Result<()> {
        self.request(|reply| Command::ExposureTick { players, reply })
            .await
    }

    pub async fn movement(
        &self,
        player: PlayerId,
        sample: MovementSample,
    ) -> Result<Option<MovementDirective>> {
        self.request(|reply| Command::Movement {
            player,
            sample,
            reply,
        })
        .await
    }

    /// Returns true when a block break must be cancelled.
    pub async fn block_break(&self, block: BlockPos) -> Result<bool> {
        self.request(|reply| Command::BlockBreak { block, reply })
            .await
    }

    // ========================================================================
    // Abilities
    // ========================================================================

    pub async fn toggle_passive(&self, player: PlayerId, ability: AbilityId) -> Result<PassiveToggle> {
        self.request(|reply| Command::TogglePassive {
            player,
            ability,
            reply,
        })
        .await?
    }

    /// Turn a passive off without unlock checks. Returns false if it was not on.
    pub async fn disable_passive(&self, player: PlayerId, ability: AbilityId) -> Result<bool> {
        self.request(|reply| Command::DisablePassive {
            player,
            ability,
            reply,
        })
        .await
    }

    pub async fn use_ability(
        &self,
        player: PlayerId,
        ability: AbilityId,
    ) -> Result<AbilityActivation> {
        self.request(|reply| Command::UseAbility {
            player,
            ability: Some(ability),
            reply,
        })
        .await?
    }

    /// Use the selected active ability, selecting the first unlocked one if needed.
    pub async fn use_selected(&self, player: PlayerId) -> Result<AbilityActivation> {
        self.request(|reply| Command::UseAbility {
            player,
            ability: None,
            reply,
        })
        .await?
    }

    pub async fn select_active(&self, player: PlayerId, ability: AbilityId) -> Result<()> {
        self.request(|reply| Command::SelectActive {
            player,
            ability,
            reply,
        })
        .await?
    }

    pub async fn cycle_active(&self, player: PlayerId) -> Result<AbilityId> {
        self.request(|reply| Command::CycleActive { player, reply })
            .await?
    }

    pub async fn has_immunity(&self, player: PlayerId) -> Result<bool> {
        self.request(|reply| Command::HasImmunity { player, reply })
            .await
    }

    pub async fn is_traversal_enabled(&self, player: PlayerId) -> Result<bool> {
        self.request(|reply| Command::TraversalEnabled { player, reply })
            .await
    }

    pub async fn drain_rate(&self, player: PlayerId) -> Result<f64> {
        self.request(|reply| Command::DrainRate { player, reply })
            .await
    }

    pub async fn status(&self, player: PlayerId) -> Result<PlayerStatus> {
        self.request(|reply| Command::Status { player, reply })
            .await
    }

    /// Run one drain tick now instead of waiting for the periodic loop.
    pub async fn run_drain_tick(&self) -> Result<()> {
        self.request(|reply| Command::RunDrainTick { reply }).await
    }

    // ========================================================================
    // Pedestals
    // ========================================================================

    pub async fn place_pedestal(&self, owner: PlayerId, block: BlockPos) -> Result<PedestalInfo> {
        self.request(|reply| Command::PlacePedestal {
            owner,
            block,
            reply,
        })
        .await?
    }

    /// Returns the number of items now on the pedestal.
    pub async fn add_pedestal_item(
        &self,
        owner: PlayerId,
        block: BlockPos,
        item: Item,
    ) -> Result<usize> {
        self.request(|reply| Command::AddPedestalItem {
            owner,
            block,
            item,
            reply,
        })
        .await?
    }

    pub async fn retrieve_pedestal_items(
        &self,
        owner: PlayerId,
        block: BlockPos,
    ) -> Result<Retrieval> {
        self.request(|reply| Command::RetrievePedestalItems {
            owner,
            block,
            reply,
        })
        .await?
    }

    pub async fn remove_pedestal(&self, block: BlockPos) -> Result<bool> {
        self.request(|reply| Command::RemovePedestal { block, reply })
            .await
    }

    pub async fn pedestal_info(&self, block: BlockPos) -> Result<Option<PedestalInfo>> {
        self.request(|reply| Command::PedestalInfo { block, reply })
            .await
    }

    // ========================================================================
    // Events
    // ========================================================================

    /// Subscribe to events from a specific topic
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use essence_runtime::Topic;
    ///
    /// let mut economy_rx = handle.subscribe(Topic::Economy);
    /// while let Ok(event) = economy_rx.recv().await {
    ///     // Handle grants, toggles and drain charges
    /// }
    /// ```
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    /// Subscribe to multiple topics at once
    pub fn subscribe_multiple(&self, topics: &[Topic]) -> HashMap<Topic, broadcast::Receiver<Event>> {
        self.event_bus.subscribe_multiple(topics)
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }
}
