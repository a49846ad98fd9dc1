use std::fmt;

use serde::Serialize;

use crate::error::CoreError;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// In-game player name, assigned by a human operator.
pub type PlayerName = String;

/// Opaque messaging address (e.g. `@alice` or a numeric chat id).
pub type Identity = String;

/// Number of fixed buildings.
pub const BUILDING_COUNT: usize = 8;

/// Default cooldown after which a building-0 entry is restored: 2 hours.
pub const DEFAULT_COOLDOWN_SECS: i64 = 2 * 60 * 60;

/// One of the eight fixed buildings, indexed 0-7.
///
/// Building 0 is the timed (consumable) one; its entries carry an expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Building(u8);

impl Building {
    /// The timed building.
    pub const TIMED: Building = Building(0);

    /// Build from an index, returning `None` outside 0-7.
    pub fn new(index: u8) -> Option<Self> {
        ((index as usize) < BUILDING_COUNT).then_some(Self(index))
    }

    /// Build from a single character `'0'..='7'`.
    pub fn from_digit(c: char) -> Option<Self> {
        c.to_digit(10).and_then(|d| Self::new(d as u8))
    }

    /// Iterate all buildings in index order.
    pub fn all() -> impl Iterator<Item = Building> {
        (0..BUILDING_COUNT as u8).map(Building)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Whether entries in this building carry an expiry timestamp.
    pub fn is_timed(self) -> bool {
        self == Self::TIMED
    }
}

impl TryFrom<u8> for Building {
    type Error = CoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(CoreError::InvalidBuilding(value))
    }
}

impl fmt::Display for Building {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A building-0 expiry that must be handed to the restore scheduler.
///
/// Produced by every operation that sets or updates an entry's expiry.
/// Intentionally not linked to the entry it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingRestore {
    pub owner: PlayerName,
    pub expires_at: Timestamp,
}
