//! Concurrency-safe entry set used for exclusion lookups.
//!
//! An [`EntrySet`] maps keys to a counter. Within this crate the counter is
//! only a presence marker, but it is kept so rendered sets stay comparable
//! with previously generated output. Exclusion sets built by
//! [`Tree::excludes`](crate::Tree::excludes) store every key with `0`.

use std::collections::HashMap;
use std::fmt;

use parking_lot::RwLock;

/// A set of string keys guarded by a read/write lock.
///
/// Any number of readers may query the set concurrently; writers take the
/// lock exclusively so a reader never observes a half-applied update.
///
/// # Example
///
/// ```
/// use edgeos_blacklist::EntrySet;
///
/// let set = EntrySet::new();
/// set.add(["example.com"]);
/// assert!(set.contains_suffix("ads.example.com"));
/// assert!(!set.contains("ads.example.com"));
/// ```
#[derive(Debug, Default)]
pub struct EntrySet {
    entries: RwLock<HashMap<String, u32>>,
}

impl EntrySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add keys, incrementing the counter of keys already present.
    pub fn add<I, S>(&self, keys: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut entries = self.entries.write();
        for key in keys {
            *entries.entry(key.into()).or_insert(0) += 1;
        }
    }

    /// Set the counter of a single key.
    pub fn set(&self, key: impl Into<String>, count: u32) {
        self.entries.write().insert(key.into(), count);
    }

    /// Exact key lookup.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.read().contains_key(key)
    }

    /// Returns `true` if `key` or any of its parent domains is present.
    ///
    /// Parent domains are the dot-separated suffixes that still contain a dot,
    /// so `mail.ads.example.com` is checked against itself, `ads.example.com`
    /// and `example.com`, but never against the bare `com` label.
    pub fn contains_suffix(&self, key: &str) -> bool {
        let entries = self.entries.read();
        if entries.contains_key(key) {
            return true;
        }

        let mut rest = key;
        while let Some((_, parent)) = rest.split_once('.') {
            if !parent.contains('.') {
                break;
            }
            if entries.contains_key(parent) {
                return true;
            }
            rest = parent;
        }

        false
    }

    /// Union `other` into this set. Counters from `other` win on conflict.
    pub fn merge(&self, other: &EntrySet) {
        if std::ptr::eq(self, other) {
            return;
        }

        // Snapshot first so the two locks are never held together.
        let incoming: Vec<(String, u32)> = other
            .entries
            .read()
            .iter()
            .map(|(key, count)| (key.clone(), *count))
            .collect();

        self.entries.write().extend(incoming);
    }

    /// Keys in lexicographic order.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.read().keys().cloned().collect();
        keys.sort_unstable();
        keys
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Render as sorted `"key":count,` lines.
    pub fn render(&self) -> String {
        let mut lines: Vec<String> = self
            .entries
            .read()
            .iter()
            .map(|(key, count)| format!("{key:?}:{count},\n"))
            .collect();
        lines.sort_unstable();
        lines.concat()
    }
}

impl fmt::Display for EntrySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl<S: Into<String>> FromIterator<S> for EntrySet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let set = Self::new();
        set.add(iter);
        set
    }
}
