//! In-memory world and storm system standing in for a game server.
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use essence_core::{
    BlockPos, EffectCommand, Hazard, HazardId, HazardRegistry, Location, PlayerId, Position,
    Timestamp, WorldHost,
};
use tracing::{debug, info, trace};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Counts of dispatched effect commands, for the end-of-run summary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub strikes: usize,
    pub speed_effects: usize,
    pub heals: usize,
    pub guide_cues: usize,
    pub movement: usize,
    pub pedestal_displays: usize,
    pub items_returned: usize,
    pub notices: usize,
}

/// Players, blocks and worn armor of the simulated world.
#[derive(Default)]
pub struct SimWorld {
    players: Mutex<HashMap<PlayerId, Location>>,
    /// Blocks a pedestal currently stands on.
    occupied: Mutex<HashSet<BlockPos>>,
    /// Infusion tiers of the armor each player wears.
    armor: Mutex<HashMap<PlayerId, Vec<u8>>>,
    stats: Mutex<DispatchStats>,
}

impl SimWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&self, player: PlayerId, location: Location) {
        lock(&self.players).insert(player, location);
    }

    pub fn stats(&self) -> DispatchStats {
        *lock(&self.stats)
    }

    pub fn armor_tiers(&self, player: PlayerId) -> Vec<u8> {
        lock(&self.armor).get(&player).cloned().unwrap_or_default()
    }
}

impl WorldHost for SimWorld {
    fn is_online(&self, player: PlayerId) -> bool {
        lock(&self.players).contains_key(&player)
    }

    fn location(&self, player: PlayerId) -> Option<Location> {
        lock(&self.players).get(&player).copied()
    }

    /// Aims at the ground a few blocks in front of the player.
    fn aim_target(&self, player: PlayerId, max_range: f64) -> Option<Location> {
        let origin = self.location(player)?;
        let reach = max_range.min(12.0);
        Some(Location::new(
            origin.zone,
            origin.position.translated(&Position::new(reach, 0.0, 0.0)),
        ))
    }

    fn is_block_empty(&self, block: &BlockPos) -> bool {
        !lock(&self.occupied).contains(block)
    }

    fn equipped_infusion_tiers(&self, player: PlayerId) -> Vec<u8> {
        self.armor_tiers(player)
    }

    fn dispatch(&self, command: EffectCommand) {
        let mut stats = lock(&self.stats);
        match command {
            EffectCommand::Strike { location, damage } => {
                stats.strikes += 1;
                info!(target: "sim::world", x = location.position.x, z = location.position.z, damage, "Lightning strike");
            }
            EffectCommand::Speed {
                player, amplifier, ..
            } => {
                stats.speed_effects += 1;
                trace!(target: "sim::world", %player, amplifier, "Speed effect");
            }
            EffectCommand::Heal { player, amount } => {
                stats.heals += 1;
                trace!(target: "sim::world", %player, amount, "Heal");
            }
            EffectCommand::GuideCue(cue) => {
                stats.guide_cues += 1;
                trace!(target: "sim::world", player = %cue.player, distance = cue.distance_to_edge, "Guide cue");
            }
            EffectCommand::Movement { player, directive } => {
                stats.movement += 1;
                debug!(target: "sim::world", %player, ?directive, "Movement directive");
            }
            EffectCommand::PlacePedestal { block } => {
                lock(&self.occupied).insert(block);
                debug!(target: "sim::world", %block, "Pedestal block placed");
            }
            EffectCommand::ClearPedestal { block } => {
                lock(&self.occupied).remove(&block);
                debug!(target: "sim::world", %block, "Pedestal block cleared");
            }
            EffectCommand::PedestalDisplay {
                block,
                progress_percent,
                tier,
            } => {
                stats.pedestal_displays += 1;
                debug!(target: "sim::world", %block, progress_percent, tier, "Pedestal display");
            }
            EffectCommand::ReturnItems { player, items } => {
                stats.items_returned += items.len();
                // Returned armor is worn straight away.
                let tiers = items.iter().filter_map(|item| item.infusion.map(|i| i.tier));
                lock(&self.armor).entry(player).or_default().extend(tiers);
                info!(target: "sim::world", %player, count = items.len(), "Items returned");
            }
            EffectCommand::Notify { player, message } => {
                stats.notices += 1;
                info!(target: "sim::world", %player, "{message}");
            }
        }
    }
}

/// Storms that stay where they are put.
///
/// Retargeting teleports the storm to its new target since nothing here
/// simulates travel.
#[derive(Default)]
pub struct SimHazards {
    hazards: Mutex<Vec<Hazard>>,
}

impl SimHazards {
    pub fn with_hazards(hazards: Vec<Hazard>) -> Self {
        Self {
            hazards: Mutex::new(hazards),
        }
    }
}

impl HazardRegistry for SimHazards {
    fn active_hazards(&self) -> Vec<Hazard> {
        lock(&self.hazards).clone()
    }

    fn retarget(&self, hazard: HazardId, target: Position) {
        if let Some(h) = lock(&self.hazards).iter_mut().find(|h| h.id == hazard) {
            h.center = target;
            info!(target: "sim::storm", hazard = hazard.0, x = target.x, z = target.z, "Storm pushed away");
        }
    }

    fn boost_speed(&self, hazard: HazardId, multiplier: f64, until: Timestamp) {
        debug!(target: "sim::storm", hazard = hazard.0, multiplier, until = until.as_millis(), "Storm speed boosted");
    }
}
