use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Namespace → set of keys, kept sorted so every serialization is byte-stable.
///
/// Merging is a plain set union per namespace, so the result of combining
/// several maps never depends on the order they were combined in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyMap(BTreeMap<String, BTreeSet<String>>);

impl KeyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `key` under `namespace`. Empty keys and namespaces are rejected.
    pub fn insert(&mut self, namespace: impl Into<String>, key: impl Into<String>) -> bool {
        let namespace = namespace.into();
        let key = key.into();
        if namespace.is_empty() || key.is_empty() {
            return false;
        }
        self.0.entry(namespace).or_default().insert(key)
    }

    pub fn merge(&mut self, other: &KeyMap) {
        for (namespace, keys) in &other.0 {
            self.0
                .entry(namespace.clone())
                .or_default()
                .extend(keys.iter().cloned());
        }
    }

    /// Remove every key also present in `other`, dropping namespaces left empty.
    pub fn subtract(&mut self, other: &KeyMap) {
        for (namespace, keys) in &other.0 {
            if let Some(own) = self.0.get_mut(namespace) {
                own.retain(|key| !keys.contains(key));
            }
        }
        self.0.retain(|_, keys| !keys.is_empty());
    }

    pub fn contains(&self, namespace: &str, key: &str) -> bool {
        self.0.get(namespace).is_some_and(|keys| keys.contains(key))
    }

    pub fn keys(&self, namespace: &str) -> Option<&BTreeSet<String>> {
        self.0.get(namespace)
    }

    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &BTreeSet<String>)> {
        self.0.iter()
    }

    /// Total number of keys across all namespaces.
    pub fn len(&self) -> usize {
        self.0.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<N: Into<String>, K: Into<String>> FromIterator<(N, K)> for KeyMap {
    fn from_iter<I: IntoIterator<Item = (N, K)>>(iter: I) -> Self {
        let mut map = KeyMap::new();
        for (namespace, key) in iter {
            map.insert(namespace, key);
        }
        map
    }
}
