//! Identifiers and world geometry shared by every module.
use core::fmt;
use core::str::FromStr;

/// Stable player identifier issued by the host (a 128-bit UUID).
///
/// Rendered as 32 lowercase hex digits, which is also the storage key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlayerId(pub u128);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid player id `{0}`")]
pub struct ParsePlayerIdError(pub String);

impl FromStr for PlayerId {
    type Err = ParsePlayerIdError;

    /// Accepts both the compact form and the hyphenated UUID form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s.chars().filter(|c| *c != '-').collect();
        if compact.len() != 32 {
            return Err(ParsePlayerIdError(s.to_string()));
        }
        u128::from_str_radix(&compact, 16)
            .map(PlayerId)
            .map_err(|_| ParsePlayerIdError(s.to_string()))
    }
}

/// World (dimension) identifier. Hazards and players only interact within one zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ZoneId(pub u32);

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "zone{}", self.0)
    }
}

/// Identifier of a storm hazard owned by the hazard registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HazardId(pub u64);

/// Continuous position in world space.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub const ORIGIN: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn distance(&self, other: &Position) -> f64 {
        self.offset_to(other).length()
    }

    /// Horizontal distance, ignoring height.
    pub fn planar_distance(&self, other: &Position) -> f64 {
        let dx = other.x - self.x;
        let dz = other.z - self.z;
        (dx * dx + dz * dz).sqrt()
    }

    /// Vector pointing from `self` to `other`.
    pub fn offset_to(&self, other: &Position) -> Position {
        Position::new(other.x - self.x, other.y - self.y, other.z - self.z)
    }

    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Unit vector in the same direction, or `None` for the zero vector.
    pub fn normalized(&self) -> Option<Position> {
        let len = self.length();
        if len <= f64::EPSILON || !len.is_finite() {
            return None;
        }
        Some(self.scaled(1.0 / len))
    }

    pub fn scaled(&self, factor: f64) -> Position {
        Position::new(self.x * factor, self.y * factor, self.z * factor)
    }

    pub fn translated(&self, delta: &Position) -> Position {
        Position::new(self.x + delta.x, self.y + delta.y, self.z + delta.z)
    }
}

/// A position inside a specific zone.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Location {
    pub zone: ZoneId,
    pub position: Position,
}

impl Location {
    pub const fn new(zone: ZoneId, position: Position) -> Self {
        Self { zone, position }
    }

    /// Block containing this location.
    pub fn block(&self) -> BlockPos {
        BlockPos::new(
            self.zone,
            self.position.x.floor() as i32,
            self.position.y.floor() as i32,
            self.position.z.floor() as i32,
        )
    }
}

/// Integer block coordinates, used to anchor pedestals.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockPos {
    pub zone: ZoneId,
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub const fn new(zone: ZoneId, x: i32, y: i32, z: i32) -> Self {
        Self { zone, x, y, z }
    }

    /// Centre of the block face above, where pedestal displays float.
    pub fn display_anchor(&self) -> Location {
        Location::new(
            self.zone,
            Position::new(self.x as f64 + 0.5, self.y as f64 + 1.5, self.z as f64 + 0.5),
        )
    }
}

/// `zone_x_y_z`, unique per block.
impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}_{}", self.zone.0, self.x, self.y, self.z)
    }
}
