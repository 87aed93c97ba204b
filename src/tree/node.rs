//! A single configuration node.

use super::source::{SourceObject, SourceType};

/// A named configuration block such as `domains`, `hosts` or the `blacklist` root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Node {
    pub(crate) disabled: bool,
    pub(crate) ip: String,
    pub(crate) description: String,
    pub(crate) prefix: String,
    pub(crate) includes: Vec<String>,
    pub(crate) excludes: Vec<String>,
    pub(crate) sources: Vec<SourceObject>,
}

impl Node {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Blackhole IP declared on this node. Empty means inherit from the root.
    pub fn ip(&self) -> &str {
        &self.ip
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Entries blacklisted inline, in declaration order.
    pub fn includes(&self) -> &[String] {
        &self.includes
    }

    /// Entries exempted from blacklisting, in declaration order.
    pub fn excludes(&self) -> &[String] {
        &self.excludes
    }

    /// Declared file/url sources, in declaration order.
    pub fn sources(&self) -> &[SourceObject] {
        &self.sources
    }

    /// Sources of one type, preserving declaration order.
    pub fn sources_of(&self, source_type: SourceType) -> impl Iterator<Item = &SourceObject> {
        self.sources
            .iter()
            .filter(move |source| source.source_type() == source_type)
    }
}
