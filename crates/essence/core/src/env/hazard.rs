use crate::timer::Timestamp;
use crate::types::{HazardId, Location, Position, ZoneId};

/// Snapshot of an active storm.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hazard {
    pub id: HazardId,
    pub zone: ZoneId,
    pub center: Position,
    pub radius: f64,
}

impl Hazard {
    pub fn contains(&self, location: &Location) -> bool {
        self.zone == location.zone && self.center.distance(&location.position) <= self.radius
    }

    /// Distance from `position` to the hazard boundary, zero when inside.
    pub fn distance_to_edge(&self, position: &Position) -> f64 {
        (self.center.distance(position) - self.radius).max(0.0)
    }
}

/// Registry of active hazards, owned by the storm system.
pub trait HazardRegistry: Send + Sync {
    fn active_hazards(&self) -> Vec<Hazard>;

    /// Sets a new travel target for a hazard.
    fn retarget(&self, hazard: HazardId, target: Position);

    /// Applies a temporary movement speed multiplier until `until`.
    fn boost_speed(&self, hazard: HazardId, multiplier: f64, until: Timestamp);

    fn contains(&self, location: &Location) -> bool {
        self.active_hazards().iter().any(|h| h.contains(location))
    }

    /// Nearest hazard in the same zone, measured centre to position.
    fn nearest(&self, location: &Location) -> Option<Hazard> {
        nearest_in_zone(&self.active_hazards(), location)
    }
}

pub(crate) fn nearest_in_zone(hazards: &[Hazard], location: &Location) -> Option<Hazard> {
    hazards
        .iter()
        .filter(|h| h.zone == location.zone)
        .min_by(|a, b| {
            let da = a.center.distance(&location.position);
            let db = b.center.distance(&location.position);
            da.total_cmp(&db)
        })
        .copied()
}
