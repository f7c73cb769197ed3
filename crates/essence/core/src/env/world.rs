use crate::effect::EffectCommand;
use crate::types::{BlockPos, Location, PlayerId};

/// The host game world.
///
/// The engine reads player and block state through this trait and sends every
/// world mutation as an [`EffectCommand`].
pub trait WorldHost: Send + Sync {
    fn is_online(&self, player: PlayerId) -> bool;

    fn location(&self, player: PlayerId) -> Option<Location>;

    /// Block the player is looking at, within `max_range`.
    fn aim_target(&self, player: PlayerId, max_range: f64) -> Option<Location>;

    fn is_block_empty(&self, block: &BlockPos) -> bool;

    /// Infusion tiers of the armor pieces the player is wearing (0 = not infused).
    fn equipped_infusion_tiers(&self, player: PlayerId) -> Vec<u8>;

    fn dispatch(&self, command: EffectCommand);
}
