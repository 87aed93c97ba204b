//! Object model for the parsed blacklist configuration.
//!
//! A [`Tree`] maps node names to [`Node`] records. It is rebuilt wholesale on
//! every parse and owns every node and source object it contains.
//!
//! # Example
//!
//! ```
//! use edgeos_blacklist::Tree;
//!
//! let text = "blacklist {\n dns-redirect-ip 0.0.0.0\n domains {\n include ads.example.com\n }\n}";
//! let tree: Tree = text.parse().unwrap();
//! assert_eq!(tree.nodes(), vec!["blacklist", "domains"]);
//! assert_eq!(tree.resolve_ip("domains"), "0.0.0.0");
//! ```

mod node;
mod render;
mod source;

use std::collections::BTreeMap;
use std::str::FromStr;

pub use node::Node;
pub use source::{SourceObject, SourceType};

use crate::entry::EntrySet;
use crate::error::Error;
use crate::parser::ConfigParser;

/// Name of the synthetic root node.
pub const ROOT_NODE: &str = "blacklist";

/// Parsed configuration: node name to node record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    nodes: BTreeMap<String, Node>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Node names in lexicographic order.
    pub fn nodes(&self) -> Vec<&str> {
        self.nodes.keys().map(String::as_str).collect()
    }

    pub fn get(&self, name: &str) -> Option<&Node> {
        self.nodes.get(name)
    }

    /// Nodes with their names, in lexicographic order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.nodes.iter().map(|(name, node)| (name.as_str(), node))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Blackhole IP for `name`, falling back to the root node's IP.
    ///
    /// Returns an empty string when neither the node nor the root declare one,
    /// meaning no redirect override applies.
    pub fn resolve_ip(&self, name: &str) -> &str {
        match self.nodes.get(name) {
            Some(node) if !node.ip.is_empty() => &node.ip,
            _ => self.nodes.get(ROOT_NODE).map_or("", |root| root.ip.as_str()),
        }
    }

    /// Like [`resolve_ip`](Self::resolve_ip) but substitutes `fallback` when
    /// the inheritance chain ends empty.
    pub fn resolve_ip_or<'a>(&'a self, name: &str, fallback: &'a str) -> &'a str {
        match self.resolve_ip(name) {
            "" => fallback,
            ip => ip,
        }
    }

    /// Declared sources of `name`, in declaration order.
    pub fn sources(&self, name: &str) -> &[SourceObject] {
        self.nodes.get(name).map(Node::sources).unwrap_or_default()
    }

    /// Build an [`EntrySet`] from the exclude lists of `scope`.
    ///
    /// An empty scope gathers the excludes of every node. Unknown node names
    /// contribute nothing.
    /// Every key is stored with a zero counter.
    pub fn excludes(&self, scope: &[&str]) -> EntrySet {
        let set = EntrySet::new();
        let nodes: Vec<&Node> = if scope.is_empty() {
            self.nodes.values().collect()
        } else {
            scope.iter().filter_map(|name| self.nodes.get(*name)).collect()
        };
        for node in nodes {
            for entry in &node.excludes {
                set.set(entry.as_str(), 0);
            }
        }
        set
    }

    /// Fill every source's empty IP from its owning node.
    ///
    /// Source-level IPs are never overwritten. Returns the number of sources
    /// that were updated.
    pub fn resolve_source_ips(&mut self) -> usize {
        let resolved: Vec<(String, String)> = self
            .nodes
            .keys()
            .map(|name| (name.clone(), self.resolve_ip(name).to_string()))
            .collect();

        let mut updated = 0;
        for (name, ip) in resolved {
            if let Some(node) = self.nodes.get_mut(&name) {
                for source in &mut node.sources {
                    if source.inherit_ip(&ip) {
                        updated += 1;
                    }
                }
            }
        }
        updated
    }

    /// Get the node for `name`, creating an empty one if absent.
    pub(crate) fn node_mut(&mut self, name: &str) -> &mut Node {
        self.nodes.entry(name.to_string()).or_default()
    }
}

impl FromStr for Tree {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConfigParser::new().parse_str(s)
    }
}
