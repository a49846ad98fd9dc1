//! Player registry: in-game name to messaging identity.
//!
//! Iteration order is registration order. Re-registering a name moves it to
//! the end, so the reverse scan in [`PlayerRegistry::resolve_by_identity`]
//! makes the most recent registration win when identities are shared.

use indexmap::IndexMap;

use crate::types::{Identity, PlayerName};

#[derive(Debug, Default, Clone)]
pub struct PlayerRegistry {
    players: IndexMap<PlayerName, Identity>,
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert `name`, overwriting any previous identity.
    ///
    /// Returns the previous identity, if the name was already registered.
    pub fn register(&mut self, name: &str, identity: &str) -> Option<Identity> {
        let previous = self.players.shift_remove(name);
        self.players.insert(name.to_string(), identity.to_string());
        previous
    }

    /// Remove `name`. Returns `false` if it was not registered.
    pub fn remove(&mut self, name: &str) -> bool {
        self.players.shift_remove(name).is_some()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.players.contains_key(name)
    }

    pub fn identity_of(&self, name: &str) -> Option<&str> {
        self.players.get(name).map(String::as_str)
    }

    /// Find the player registered under `identity`, latest registration first.
    pub fn resolve_by_identity(&self, identity: &str) -> Option<&str> {
        self.players
            .iter()
            .rev()
            .find(|(_, id)| id.as_str() == identity)
            .map(|(name, _)| name.as_str())
    }

    /// `(name, identity)` pairs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.players.iter().map(|(n, i)| (n.as_str(), i.as_str()))
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}
