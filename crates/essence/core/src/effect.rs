//! Commands sent to the host world.
//!
//! The engine never mutates the world directly. Every visible consequence of
//! an ability, a passive, or a pedestal is one of these commands, delivered
//! through [`crate::env::WorldHost::dispatch`].
use std::time::Duration;

use arrayvec::ArrayVec;

use crate::env::Hazard;
use crate::pedestal::Item;
use crate::types::{BlockPos, HazardId, Location, PlayerId, Position};

/// Points per guidance cue.
pub const CUE_POINTS: usize = 5;

#[derive(Clone, Debug, PartialEq)]
pub enum EffectCommand {
    /// Lightning strike at a location.
    Strike { location: Location, damage: f64 },
    /// Movement speed effect.
    Speed {
        player: PlayerId,
        amplifier: u32,
        duration: Duration,
    },
    /// Restore health. Hosts skip this when the player is already at full health.
    Heal { player: PlayerId, amount: f64 },
    GuideCue(GuideCue),
    Movement {
        player: PlayerId,
        directive: MovementDirective,
    },
    PlacePedestal { block: BlockPos },
    ClearPedestal { block: BlockPos },
    PedestalDisplay {
        block: BlockPos,
        progress_percent: u8,
        tier: u8,
    },
    ReturnItems { player: PlayerId, items: Vec<Item> },
    Notify { player: PlayerId, message: String },
}

/// One emission of the locate-hazard cue.
#[derive(Clone, Debug, PartialEq)]
pub struct GuideCue {
    pub player: PlayerId,
    pub hazard: HazardId,
    /// Unit vector pointing away from the hazard centre.
    pub direction: Position,
    pub distance_to_edge: f64,
    pub points: ArrayVec<Position, CUE_POINTS>,
}

/// Computes the cue for a player standing at `location`.
///
/// Returns `None` when no hazard exists in the player's zone. Points start at
/// eye level and step `spacing` blocks along the escape direction.
pub fn guide_cue(
    player: PlayerId,
    location: &Location,
    hazards: &[Hazard],
    spacing: f64,
) -> Option<GuideCue> {
    let hazard = crate::env::nearest_in_zone(hazards, location)?;
    let away = hazard.center.offset_to(&location.position);
    let direction = away
        .normalized()
        .unwrap_or(Position::new(1.0, 0.0, 0.0));

    let eye = location.position.translated(&Position::new(0.0, 1.0, 0.0));
    let points = (0..CUE_POINTS)
        .map(|i| eye.translated(&direction.scaled(i as f64 * spacing)))
        .collect();

    Some(GuideCue {
        player,
        hazard: hazard.id,
        direction,
        distance_to_edge: hazard.distance_to_edge(&location.position),
        points,
    })
}

/// Flight and glide state requested while traversal mode is on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MovementDirective {
    pub allow_flight: bool,
    /// `Some(false)` forces the player out of flight; `None` leaves it alone.
    pub flying: Option<bool>,
    pub gliding: bool,
}

impl MovementDirective {
    /// Grounded, no flight, no glide.
    pub const RELEASED: Self = Self {
        allow_flight: false,
        flying: Some(false),
        gliding: false,
    };
}

/// Movement state reported by the host.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MovementSample {
    pub location: Location,
    pub on_ground: bool,
    pub falling: bool,
    pub flying: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ZoneId;

    fn hazard(id: u64, zone: u32, x: f64, radius: f64) -> Hazard {
        Hazard {
            id: HazardId(id),
            zone: ZoneId(zone),
            center: Position::new(x, 64.0, 0.0),
            radius,
        }
    }

    #[test]
    fn cue_points_step_away_from_nearest_hazard() {
        let player = Location::new(ZoneId(0), Position::new(10.0, 64.0, 0.0));
        let hazards = [hazard(1, 0, 0.0, 50.0), hazard(2, 0, 500.0, 50.0)];

        let cue = guide_cue(PlayerId(7), &player, &hazards, 2.0).unwrap();

        assert_eq!(cue.hazard, HazardId(1));
        assert_eq!(cue.direction, Position::new(1.0, 0.0, 0.0));
        assert_eq!(cue.distance_to_edge, 0.0);
        assert_eq!(cue.points.len(), CUE_POINTS);
        assert_eq!(cue.points[0], Position::new(10.0, 65.0, 0.0));
        assert_eq!(cue.points[4], Position::new(18.0, 65.0, 0.0));
    }

    #[test]
    fn hazards_in_other_zones_are_ignored() {
        let player = Location::new(ZoneId(0), Position::new(0.0, 64.0, 0.0));
        let hazards = [hazard(1, 3, 0.0, 50.0)];
        assert!(guide_cue(PlayerId(7), &player, &hazards, 2.0).is_none());
    }

    #[test]
    fn distance_to_edge_outside_hazard() {
        let player = Location::new(ZoneId(0), Position::new(80.0, 64.0, 0.0));
        let cue = guide_cue(PlayerId(7), &player, &[hazard(1, 0, 0.0, 50.0)], 2.0).unwrap();
        assert!((cue.distance_to_edge - 30.0).abs() < 1e-9);
    }
}
