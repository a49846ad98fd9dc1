//! Occupancy store: the eight building slot lists.
//!
//! Each building holds an ordered list of [`Entry`] records in insertion
//! order. Entries in the timed building carry an expiry; expiry never removes
//! an entry, it only drives a restore notification.

use chrono::Duration;
use serde::Serialize;

use crate::types::{Building, PlayerName, Timestamp, BUILDING_COUNT};

/// A player may hold at most this many entries in the same building.
pub const MAX_ENTRIES_PER_PLAYER: usize = 2;

/// One occupancy record of one player in one building.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub owner: PlayerName,
    /// Present if and only if the entry lives in the timed building.
    pub expires_at: Option<Timestamp>,
}

impl Entry {
    /// Time left until expiry, clamped at zero. `None` for untimed entries.
    pub fn remaining(&self, now: Timestamp) -> Option<Duration> {
        self.expires_at
            .map(|expires_at| (expires_at - now).max(Duration::zero()))
    }
}

/// Result of [`Occupancy::add_entry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added { expires_at: Option<Timestamp> },
    /// The player already holds [`MAX_ENTRIES_PER_PLAYER`] entries there.
    Throttled,
}

/// Entries of one owner within a building, grouped for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwnerGroup {
    pub owner: PlayerName,
    pub count: usize,
    /// Remaining time per timed entry, in entry-list order.
    pub remaining: Vec<Duration>,
}

#[derive(Debug, Default, Clone)]
pub struct Occupancy {
    slots: [Vec<Entry>; BUILDING_COUNT],
}

impl Occupancy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry for `owner`, subject to the duplicate-assignment throttle.
    ///
    /// Timed-building entries expire at `now + cooldown`.
    pub fn add_entry(
        &mut self,
        building: Building,
        owner: &str,
        now: Timestamp,
        cooldown: Duration,
    ) -> AddOutcome {
        if self.count_for(building, owner) >= MAX_ENTRIES_PER_PLAYER {
            return AddOutcome::Throttled;
        }

        let expires_at = building.is_timed().then(|| now + cooldown);
        self.slots[building.index()].push(Entry {
            owner: owner.to_string(),
            expires_at,
        });
        AddOutcome::Added { expires_at }
    }

    /// Delete every entry owned by `owner` across all buildings.
    pub fn remove_all_for(&mut self, owner: &str) -> usize {
        self.slots
            .iter_mut()
            .map(|slot| retain_counting(slot, |e| e.owner != owner))
            .sum()
    }

    /// Clear every building. Returns the number of entries removed.
    pub fn reset_all(&mut self) -> usize {
        self.slots
            .iter_mut()
            .map(|slot| {
                let n = slot.len();
                slot.clear();
                n
            })
            .sum()
    }

    /// Delete only the timed-building entries owned by `owner`.
    pub fn reset_timed_for(&mut self, owner: &str) -> usize {
        retain_counting(&mut self.slots[Building::TIMED.index()], |e| {
            e.owner != owner
        })
    }

    pub fn entries(&self, building: Building) -> &[Entry] {
        &self.slots[building.index()]
    }

    pub fn count_for(&self, building: Building, owner: &str) -> usize {
        self.entries(building)
            .iter()
            .filter(|e| e.owner == owner)
            .count()
    }

    /// Mutable access to `owner`'s timed entries, in store order.
    pub fn timed_entries_mut(&mut self, owner: &str) -> impl Iterator<Item = &mut Entry> + '_ {
        let owner = owner.to_string();
        self.slots[Building::TIMED.index()]
            .iter_mut()
            .filter(move |e| e.owner == owner)
    }

    /// Group a building's entries by owner, in order of first appearance.
    pub fn list_grouped(&self, building: Building, now: Timestamp) -> Vec<OwnerGroup> {
        let mut groups: Vec<OwnerGroup> = Vec::new();

        for entry in self.entries(building) {
            let idx = match groups.iter().position(|g| g.owner == entry.owner) {
                Some(idx) => idx,
                None => {
                    groups.push(OwnerGroup {
                        owner: entry.owner.clone(),
                        count: 0,
                        remaining: Vec::new(),
                    });
                    groups.len() - 1
                }
            };

            let group = &mut groups[idx];
            group.count += 1;
            if let Some(left) = entry.remaining(now) {
                group.remaining.push(left);
            }
        }

        groups
    }

    pub fn total(&self) -> usize {
        self.slots.iter().map(Vec::len).sum()
    }
}

fn retain_counting(slot: &mut Vec<Entry>, keep: impl Fn(&Entry) -> bool) -> usize {
    let before = slot.len();
    slot.retain(|e| keep(e));
    before - slot.len()
}
