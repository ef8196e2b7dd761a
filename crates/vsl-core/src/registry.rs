//! Registry of mounted players, owned by the embedder

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for a mounted player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstanceId(pub Uuid);

impl InstanceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for InstanceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for InstanceId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|e| Error::Internal(format!("invalid instance id {:?}: {}", s, e)))
    }
}

/// Players in mount order
#[derive(Debug)]
pub struct Registry<T> {
    entries: Vec<(InstanceId, T)>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<T> Registry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a player under a fresh id
    pub fn register(&mut self, player: T) -> InstanceId {
        let id = InstanceId::new();
        self.insert(id, player);
        id
    }

    /// Add a player under an id it already carries, replacing any previous
    /// entry with that id
    pub fn insert(&mut self, id: InstanceId, player: T) -> Option<T> {
        let previous = self.remove(id);
        self.entries.push((id, player));
        tracing::debug!(%id, count = self.entries.len(), "Player registered");
        previous
    }

    pub fn get(&self, id: InstanceId) -> Option<&T> {
        self.entries.iter().find(|(k, _)| *k == id).map(|(_, p)| p)
    }

    /// Take a player out of the registry
    pub fn remove(&mut self, id: InstanceId) -> Option<T> {
        let pos = self.entries.iter().position(|(k, _)| *k == id)?;
        Some(self.entries.remove(pos).1)
    }

    /// Keep only players matching `keep`, returning the ones dropped
    pub fn prune(&mut self, mut keep: impl FnMut(&T) -> bool) -> Vec<T> {
        let (kept, dropped): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.entries).into_iter().partition(|(_, p)| keep(p));
        self.entries = kept;
        dropped.into_iter().map(|(_, p)| p).collect()
    }

    pub fn ids(&self) -> impl Iterator<Item = InstanceId> + '_ {
        self.entries.iter().map(|(id, _)| *id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every player, in mount order
    pub fn drain(&mut self) -> Vec<T> {
        std::mem::take(&mut self.entries)
            .into_iter()
            .map(|(_, p)| p)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_remove() {
        let mut registry = Registry::new();
        let a = registry.register("a");
        let b = registry.register("b");
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(b), Some(&"b"));

        assert_eq!(registry.remove(a), Some("a"));
        assert_eq!(registry.remove(a), None);
        assert_eq!(registry.ids().collect::<Vec<_>>(), vec![b]);
    }

    #[test]
    fn test_insert_replaces_same_id() {
        let mut registry = Registry::new();
        let id = InstanceId::new();
        assert_eq!(registry.insert(id, "first"), None);
        assert_eq!(registry.insert(id, "second"), Some("first"));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(id), Some(&"second"));
    }

    #[test]
    fn test_drain_in_mount_order() {
        let mut registry = Registry::new();
        registry.register(1);
        registry.register(2);
        registry.register(3);
        assert_eq!(registry.drain(), vec![1, 2, 3]);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_prune() {
        let mut registry = Registry::new();
        for n in 1..=5 {
            registry.register(n);
        }
        let dropped = registry.prune(|n| n % 2 == 1);
        assert_eq!(dropped, vec![2, 4]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_instance_id_parse() {
        let id = InstanceId::new();
        assert_eq!(id.to_string().parse::<InstanceId>().unwrap(), id);
        assert!("not-a-uuid".parse::<InstanceId>().is_err());
    }
}
