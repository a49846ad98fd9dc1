//! The single owner of all shared bot state.
//!
//! [`Roster`] bundles the player registry, each player's last resolved
//! position sequence, and the occupancy store. It is not synchronised
//! itself: callers keep exactly one instance behind one lock and perform
//! every operation under it.
//!
//! Operations that set an expiry in the timed building return
//! [`PendingRestore`]s. Hand those to the restore scheduler after the lock
//! is released.

use std::collections::HashMap;

use chrono::Duration;

use crate::adjust::{self, TimerAdjustment};
use crate::error::CoreError;
use crate::format;
use crate::occupancy::{AddOutcome, Occupancy, OwnerGroup};
use crate::positions::PositionPattern;
use crate::registry::PlayerRegistry;
use crate::types::{
    Building, Identity, PendingRestore, PlayerName, Timestamp, DEFAULT_COOLDOWN_SECS,
};

/// Outcome of [`Roster::remove`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Removal {
    pub was_registered: bool,
    pub entries_removed: usize,
}

/// Outcome of [`Roster::submit_pattern`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternReport {
    /// The resolved sequence, now stored as the player's last positions.
    pub resolved: Vec<Building>,
    /// Buildings where the throttle rejected the assignment.
    pub throttled: Vec<Building>,
    pub pending: Vec<PendingRestore>,
}

/// Outcome of [`Roster::assign_to_building`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignReport {
    pub assigned: Vec<PlayerName>,
    pub throttled: Vec<PlayerName>,
    pub unknown: Vec<String>,
    pub pending: Vec<PendingRestore>,
}

/// Outcome of [`Roster::adjust_timers`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdjustOutcome {
    Reset { removed: usize },
    Adjusted { pending: Vec<PendingRestore> },
}

#[derive(Debug, Clone)]
pub struct Roster {
    registry: PlayerRegistry,
    last_positions: HashMap<PlayerName, Vec<Building>>,
    occupancy: Occupancy,
    cooldown: Duration,
}

impl Default for Roster {
    fn default() -> Self {
        Self::new(Duration::seconds(DEFAULT_COOLDOWN_SECS))
    }
}

impl Roster {
    /// Create an empty roster whose timed entries expire after `cooldown`.
    pub fn new(cooldown: Duration) -> Self {
        Self {
            registry: PlayerRegistry::new(),
            last_positions: HashMap::new(),
            occupancy: Occupancy::new(),
            cooldown,
        }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    pub fn registry(&self) -> &PlayerRegistry {
        &self.registry
    }

    pub fn occupancy(&self) -> &Occupancy {
        &self.occupancy
    }

    // -----------------------------------------------------------------------
    // Player registry
    // -----------------------------------------------------------------------

    /// Register or re-register `name`. Always clears the stored positions.
    pub fn register(&mut self, name: &str, identity: &str) {
        let previous = self.registry.register(name, identity);
        self.last_positions.insert(name.to_string(), Vec::new());

        match previous {
            Some(old) => tracing::info!(player = name, old = %old, new = identity, "Player re-registered"),
            None => tracing::info!(player = name, identity, "Player registered"),
        }
    }

    /// Remove `name` with its positions and every entry it owns.
    ///
    /// Removing an unknown name is a no-op.
    pub fn remove(&mut self, name: &str) -> Removal {
        let was_registered = self.registry.remove(name);
        self.last_positions.remove(name);
        let entries_removed = self.occupancy.remove_all_for(name);

        if was_registered {
            tracing::info!(player = name, entries_removed, "Player removed");
        }

        Removal {
            was_registered,
            entries_removed,
        }
    }

    pub fn resolve_by_identity(&self, identity: &str) -> Option<&str> {
        self.registry.resolve_by_identity(identity)
    }

    pub fn identity_of(&self, name: &str) -> Option<&str> {
        self.registry.identity_of(name)
    }

    /// Like [`resolve_by_identity`](Self::resolve_by_identity) but owned and fallible.
    pub fn require_player(&self, identity: &str) -> Result<PlayerName, CoreError> {
        self.resolve_by_identity(identity)
            .map(str::to_string)
            .ok_or_else(|| CoreError::UnknownIdentity(identity.to_string()))
    }

    /// Every registered identity, in registration order.
    pub fn identities(&self) -> Vec<Identity> {
        self.registry.iter().map(|(_, identity)| identity.to_string()).collect()
    }

    /// Every registered player name, in registration order.
    pub fn players(&self) -> Vec<PlayerName> {
        self.registry.iter().map(|(name, _)| name.to_string()).collect()
    }

    /// The player's last resolved position sequence (empty if none).
    pub fn last_positions(&self, name: &str) -> &[Building] {
        self.last_positions
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    // -----------------------------------------------------------------------
    // Occupancy
    // -----------------------------------------------------------------------

    /// Assign `player` to `building`, subject to the throttle.
    pub fn add_entry(
        &mut self,
        building: Building,
        player: &str,
        now: Timestamp,
    ) -> Result<AddOutcome, CoreError> {
        if !self.registry.contains(player) {
            return Err(CoreError::UnknownPlayer(player.to_string()));
        }

        let outcome = self.occupancy.add_entry(building, player, now, self.cooldown);
        match outcome {
            AddOutcome::Added { expires_at } => {
                tracing::debug!(player, %building, ?expires_at, "Entry added");
            }
            AddOutcome::Throttled => {
                tracing::debug!(player, %building, "Entry rejected by duplicate throttle");
            }
        }
        Ok(outcome)
    }

    /// Resolve `pattern` for `player`, store it, and assign every building.
    pub fn submit_pattern(
        &mut self,
        player: &str,
        pattern: &PositionPattern,
        now: Timestamp,
    ) -> Result<PatternReport, CoreError> {
        if !self.registry.contains(player) {
            return Err(CoreError::UnknownPlayer(player.to_string()));
        }

        let resolved = pattern.resolve(self.last_positions(player));
        self.last_positions
            .insert(player.to_string(), resolved.clone());

        let mut report = PatternReport::default();
        for &building in &resolved {
            match self.add_entry(building, player, now)? {
                AddOutcome::Added {
                    expires_at: Some(expires_at),
                } => report.pending.push(PendingRestore {
                    owner: player.to_string(),
                    expires_at,
                }),
                AddOutcome::Added { expires_at: None } => {}
                AddOutcome::Throttled => report.throttled.push(building),
            }
        }
        report.resolved = resolved;

        tracing::info!(
            player,
            pattern = pattern.as_str(),
            resolved = report.resolved.len(),
            throttled = report.throttled.len(),
            "Positional pattern applied"
        );
        Ok(report)
    }

    /// Assign each named player to `building`. Unknown names are skipped.
    pub fn assign_to_building<S: AsRef<str>>(
        &mut self,
        building: Building,
        names: &[S],
        now: Timestamp,
    ) -> AssignReport {
        let mut report = AssignReport::default();

        for name in names.iter().map(AsRef::as_ref) {
            match self.add_entry(building, name, now) {
                Ok(AddOutcome::Added { expires_at }) => {
                    if let Some(expires_at) = expires_at {
                        report.pending.push(PendingRestore {
                            owner: name.to_string(),
                            expires_at,
                        });
                    }
                    report.assigned.push(name.to_string());
                }
                Ok(AddOutcome::Throttled) => report.throttled.push(name.to_string()),
                Err(_) => {
                    tracing::debug!(player = name, %building, "Skipping unknown player");
                    report.unknown.push(name.to_string());
                }
            }
        }

        report
    }

    /// Clear all buildings. Players and positions are kept.
    pub fn reset_all(&mut self) -> usize {
        let removed = self.occupancy.reset_all();
        tracing::info!(removed, "All buildings reset");
        removed
    }

    /// Delete `player`'s timed-building entries.
    ///
    /// Restore tasks already scheduled for them still fire.
    pub fn reset_timed_for(&mut self, player: &str) -> usize {
        let removed = self.occupancy.reset_timed_for(player);
        tracing::info!(player, removed, "Timed entries reset");
        removed
    }

    /// Adjust or reset `player`'s timed-building entries.
    pub fn adjust_timers(
        &mut self,
        player: &str,
        adjustment: &TimerAdjustment,
        now: Timestamp,
    ) -> Result<AdjustOutcome, CoreError> {
        if !self.registry.contains(player) {
            return Err(CoreError::UnknownPlayer(player.to_string()));
        }

        Ok(match adjustment {
            TimerAdjustment::Reset => AdjustOutcome::Reset {
                removed: self.reset_timed_for(player),
            },
            TimerAdjustment::Tokens(tokens) => {
                let pending = adjust::apply_tokens(&mut self.occupancy, player, tokens, now);
                tracing::info!(player, tokens = tokens.len(), rescheduled = pending.len(), "Timers adjusted");
                AdjustOutcome::Adjusted { pending }
            }
        })
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn list_grouped(&self, building: Building, now: Timestamp) -> Vec<OwnerGroup> {
        self.occupancy.list_grouped(building, now)
    }

    pub fn render_building(&self, building: Building, now: Timestamp) -> String {
        format::render_building(building, &self.list_grouped(building, now), &self.registry)
    }

    /// Render all eight buildings, separated by blank lines.
    pub fn render_all(&self, now: Timestamp) -> String {
        Building::all()
            .map(|b| self.render_building(b, now))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}
