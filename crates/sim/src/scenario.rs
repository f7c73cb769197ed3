//! Scripted session that drives the runtime like a game server would.
//!
//! Every step advances the simulated clock, grants essence, reports storm
//! exposure and damage, and periodically toggles passives and fires the
//! selected active ability. One player runs an infusion pedestal for the
//! whole session.
use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info, warn};

use essence_core::{
    AbilityId, BlockPos, EssenceError, HazardRegistry, Item, Location, PedestalError, PlayerId,
    PlayerStatus, Position, WorldHost, ZoneId,
};
use essence_runtime::{ManualClock, RuntimeError, RuntimeHandle};

use crate::config::SimConfig;
use crate::host::{SimHazards, SimWorld};

const ZONE: ZoneId = ZoneId(0);
const PEDESTAL_BLOCK: BlockPos = BlockPos {
    zone: ZONE,
    x: 4,
    y: 64,
    z: 4,
};
const PASSIVE_PERIOD: u32 = 20;
const ABILITY_PERIOD: u32 = 7;
const STORM_DAMAGE: f64 = 4.0;

/// Spawn point of the `index`-th player, spread along the x axis.
pub fn spawn_point(index: usize) -> Location {
    Location::new(ZONE, Position::new(index as f64 * 45.0, 64.0, 0.0))
}

pub struct Scenario {
    handle: RuntimeHandle,
    world: Arc<SimWorld>,
    hazards: Arc<SimHazards>,
    clock: ManualClock,
    config: SimConfig,
    players: Vec<PlayerId>,
}

impl Scenario {
    pub fn new(
        handle: RuntimeHandle,
        world: Arc<SimWorld>,
        hazards: Arc<SimHazards>,
        clock: ManualClock,
        config: SimConfig,
    ) -> Self {
        let players = (1..=config.players as u128).map(PlayerId).collect();
        Self {
            handle,
            world,
            hazards,
            clock,
            config,
            players,
        }
    }

    pub fn players(&self) -> &[PlayerId] {
        &self.players
    }

    /// Runs every step and returns the final status of each player.
    pub async fn run(&self) -> Result<Vec<PlayerStatus>> {
        for (index, player) in self.players.iter().enumerate() {
            self.world.spawn(*player, spawn_point(index));
            let status = self.handle.connect(*player).await?;
            info!(target: "sim", %player, level = status.level, "Player joined");
        }

        for step in 0..self.config.steps {
            self.clock.advance(self.config.step_time);
            self.step(step).await?;
            tokio::time::sleep(self.config.step_delay).await;
        }

        self.collect_pedestal().await?;

        let mut statuses = Vec::with_capacity(self.players.len());
        for player in &self.players {
            statuses.push(self.handle.status(*player).await?);
        }
        Ok(statuses)
    }

    async fn step(&self, step: u32) -> Result<()> {
        for (index, player) in self.players.iter().enumerate() {
            let grant = self.config.grant_per_step * (index + 1) as f64;
            let award = self.handle.award_essence(*player, grant).await?;
            if award.leveled_up() {
                info!(target: "sim", %player, level = award.level_after, "Level up");
            }
        }

        let exposed: Vec<PlayerId> = self
            .players
            .iter()
            .copied()
            .filter(|p| {
                self.world
                    .location(*p)
                    .is_some_and(|loc| self.hazards.contains(&loc))
            })
            .collect();
        for player in &exposed {
            let damage = self.handle.damage_check(*player, STORM_DAMAGE).await?;
            debug!(target: "sim", %player, damage, "Storm damage");
        }
        self.handle.exposure_tick(exposed).await?;

        if step % PASSIVE_PERIOD == 0 {
            for player in &self.players {
                self.flip_resistance(*player).await?;
            }
        }
        if step % ABILITY_PERIOD == ABILITY_PERIOD - 1 {
            for player in &self.players {
                self.fire_selected(*player).await?;
            }
        }
        if step == 1 {
            self.start_pedestal().await?;
        }
        Ok(())
    }

    async fn flip_resistance(&self, player: PlayerId) -> Result<()> {
        match self
            .handle
            .toggle_passive(player, AbilityId::StormResistance)
            .await
        {
            Ok(toggle) => {
                info!(target: "sim", %player, enabled = toggle.enabled, rate = toggle.drain_rate, "Storm resistance toggled");
                Ok(())
            }
            Err(RuntimeError::Passive(e)) => {
                debug!(target: "sim", %player, error = %e, "Passive unavailable");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn fire_selected(&self, player: PlayerId) -> Result<()> {
        if let Err(e) = self.handle.cycle_active(player).await {
            debug!(target: "sim", %player, error = %e, "Nothing to select");
            return Ok(());
        }
        match self.handle.use_selected(player).await {
            Ok(activation) => {
                info!(target: "sim", %player, ability = %activation.ability, outcome = ?activation.outcome, "Ability used");
                Ok(())
            }
            Err(RuntimeError::Ability(e)) if e.severity().is_player_facing() => {
                debug!(target: "sim", %player, error = %e, "Ability rejected");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn start_pedestal(&self) -> Result<()> {
        let Some(owner) = self.players.last().copied() else {
            return Ok(());
        };
        match self.handle.place_pedestal(owner, PEDESTAL_BLOCK).await {
            Ok(info) => {
                info!(target: "sim", %owner, cap = info.cap, "Pedestal placed");
                self.handle
                    .add_pedestal_item(owner, PEDESTAL_BLOCK, Item::new("DIAMOND_CHESTPLATE", 1))
                    .await?;
            }
            Err(e) => warn!(target: "sim", %owner, error = %e, "Pedestal not placed"),
        }
        Ok(())
    }

    async fn collect_pedestal(&self) -> Result<()> {
        let Some(info) = self.handle.pedestal_info(PEDESTAL_BLOCK).await? else {
            return Ok(());
        };
        match self
            .handle
            .retrieve_pedestal_items(info.owner, PEDESTAL_BLOCK)
            .await
        {
            Ok(retrieval) => {
                info!(target: "sim", owner = %info.owner, tier = retrieval.tier, "Pedestal items retrieved");
            }
            Err(RuntimeError::Pedestal(PedestalError::NotReady { .. })) => {
                warn!(target: "sim", owner = %info.owner, "Pedestal not ready, removing it");
                self.handle.remove_pedestal(PEDESTAL_BLOCK).await?;
            }
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_points_do_not_overlap() {
        let a = spawn_point(0);
        let b = spawn_point(1);
        assert_eq!(a.zone, b.zone);
        assert!(a.position.distance(&b.position) > 40.0);
    }
}
