//! Typed views over a parsed [`Tree`].
//!
//! A [`View`] is an ordered sequence of [`SourceObject`]s answering one
//! request kind: exclusions, inline inclusions or declared sources. Views own
//! copies of the objects they return, so building one never changes the tree;
//! source IPs are resolved on the copies.
//!
//! # Example
//!
//! ```
//! use edgeos_blacklist::{Settings, Tree, ViewFactory, ViewKind};
//!
//! let text = "blacklist {\n dns-redirect-ip 0.0.0.0\n domains {\n  source mysrc {\n   url https://x/list\n  }\n }\n}";
//! let tree: Tree = text.parse().unwrap();
//! let settings = Settings::default();
//!
//! let view = ViewFactory::new(&tree, &settings).build(ViewKind::UrlDomains);
//! assert_eq!(view.len(), 1);
//! assert_eq!(view.objects()[0].ip(), "0.0.0.0");
//! ```

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::tree::{ROOT_NODE, SourceObject, SourceType, Tree};

/// Node holding domain entries.
pub const DOMAINS_NODE: &str = "domains";

/// Node holding host entries.
pub const HOSTS_NODE: &str = "hosts";

/// Closed set of view requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewKind {
    ExcludedDomains,
    ExcludedHosts,
    ExcludedRoots,
    UrlDomains,
    UrlHosts,
    PreconfiguredDomains,
    PreconfiguredHosts,
    FileSources,
    AllSources,
}

impl ViewKind {
    pub const ALL: [ViewKind; 9] = [
        Self::ExcludedDomains,
        Self::ExcludedHosts,
        Self::ExcludedRoots,
        Self::UrlDomains,
        Self::UrlHosts,
        Self::PreconfiguredDomains,
        Self::PreconfiguredHosts,
        Self::FileSources,
        Self::AllSources,
    ];

    /// Request tag of this kind.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ExcludedDomains => "domn-excludes",
            Self::ExcludedHosts => "host-excludes",
            Self::ExcludedRoots => "root-excludes",
            Self::UrlDomains => "url-domains",
            Self::UrlHosts => "url-hosts",
            Self::PreconfiguredDomains => "pre-configured-domain",
            Self::PreconfiguredHosts => "pre-configured-host",
            Self::FileSources => "file",
            Self::AllSources => "all",
        }
    }

    /// Descriptive name of this kind.
    pub const fn name(self) -> &'static str {
        match self {
            Self::ExcludedDomains => "exclusion-domains",
            Self::ExcludedHosts => "exclusion-hosts",
            Self::ExcludedRoots => "exclusion-root",
            Self::UrlDomains => "url-domains",
            Self::UrlHosts => "url-hosts",
            Self::PreconfiguredDomains => "preconfigured-domain-includes",
            Self::PreconfiguredHosts => "preconfigured-host-includes",
            Self::FileSources => "file-sources",
            Self::AllSources => "all-sources",
        }
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewKind {
    type Err = Error;

    /// Accepts both the short request tags and the descriptive kind names,
    /// e.g. `"domn-excludes"` and `"exclusion-domains"`.
    fn from_str(tag: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == tag || kind.name() == tag)
            .ok_or_else(|| Error::UnknownViewKind {
                tag: tag.to_string(),
            })
    }
}

/// Objects answering one [`ViewKind`] request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    kind: ViewKind,
    objects: Vec<SourceObject>,
}

impl View {
    pub fn kind(&self) -> ViewKind {
        self.kind
    }

    pub fn objects(&self) -> &[SourceObject] {
        &self.objects
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SourceObject> {
        self.objects.iter()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Keep only objects of `source_type`, preserving order.
    #[must_use]
    pub fn filter(&self, source_type: SourceType) -> View {
        View {
            kind: self.kind,
            objects: self
                .objects
                .iter()
                .filter(|object| object.source_type() == source_type)
                .cloned()
                .collect(),
        }
    }

    /// Object names, in view order.
    pub fn names(&self) -> Vec<&str> {
        self.objects.iter().map(SourceObject::name).collect()
    }
}

impl<'a> IntoIterator for &'a View {
    type Item = &'a SourceObject;
    type IntoIter = std::slice::Iter<'a, SourceObject>;

    fn into_iter(self) -> Self::IntoIter {
        self.objects.iter()
    }
}

impl IntoIterator for View {
    type Item = SourceObject;
    type IntoIter = std::vec::IntoIter<SourceObject>;

    fn into_iter(self) -> Self::IntoIter {
        self.objects.into_iter()
    }
}

/// Builds [`View`]s from a tree and the settings that scope it.
#[derive(Debug, Clone, Copy)]
pub struct ViewFactory<'a> {
    tree: &'a Tree,
    settings: &'a Settings,
}

impl<'a> ViewFactory<'a> {
    pub fn new(tree: &'a Tree, settings: &'a Settings) -> Self {
        Self { tree, settings }
    }

    /// Build the view for a request tag such as `"url-domains"`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownViewKind`] if no [`ViewKind`] has that tag. The
    /// tree is unaffected and another request may be made.
    pub fn build_tag(&self, tag: &str) -> Result<View> {
        let kind = tag.parse()?;
        Ok(self.build(kind))
    }

    pub fn build(&self, kind: ViewKind) -> View {
        let objects = match kind {
            ViewKind::ExcludedDomains => vec![self.exclusions(Some(DOMAINS_NODE), SourceType::ExcludedDomains)],
            ViewKind::ExcludedHosts => vec![self.exclusions(Some(HOSTS_NODE), SourceType::ExcludedHosts)],
            ViewKind::ExcludedRoots => vec![self.exclusions(None, SourceType::ExcludedRoots)],
            ViewKind::UrlDomains => self.sources(&[DOMAINS_NODE], SourceType::Url),
            ViewKind::UrlHosts => self.sources(&[HOSTS_NODE], SourceType::Url),
            ViewKind::PreconfiguredDomains => {
                self.inclusions(DOMAINS_NODE, SourceType::PreconfiguredDomain).into_iter().collect()
            }
            ViewKind::PreconfiguredHosts => {
                self.inclusions(HOSTS_NODE, SourceType::PreconfiguredHost).into_iter().collect()
            }
            ViewKind::FileSources => self.sources(&self.node_names(), SourceType::File),
            ViewKind::AllSources => self.all_sources(),
        };

        tracing::debug!(kind = %kind, objects = objects.len(), "built view");
        View { kind, objects }
    }

    /// Configured category nodes, in settings order.
    fn node_names(&self) -> Vec<&'a str> {
        self.settings.nodes.iter().map(String::as_str).collect()
    }

    /// One aggregate object holding the excludes of `node`, or of every node
    /// when `node` is `None`.
    fn exclusions(&self, node: Option<&str>, source_type: SourceType) -> SourceObject {
        let (owner, excludes) = match node {
            Some(name) => (
                name,
                self.tree
                    .get(name)
                    .map(|node| node.excludes().to_vec())
                    .unwrap_or_default(),
            ),
            None => {
                let mut seen = HashSet::new();
                let union = self
                    .tree
                    .iter()
                    .flat_map(|(_, node)| node.excludes())
                    .filter(|entry| seen.insert(entry.as_str()))
                    .cloned()
                    .collect();
                (ROOT_NODE, union)
            }
        };

        let label = source_type.as_str();
        SourceObject::new(source_type, owner, label)
            .with_description(format!("{label} exclusions"))
            .with_ip(self.tree.resolve_ip(owner))
            .with_excludes(excludes)
    }

    /// One aggregate object holding the inline includes of `node`, if any.
    fn inclusions(&self, node: &str, source_type: SourceType) -> Option<SourceObject> {
        let includes = self.tree.get(node)?.includes();
        if includes.is_empty() {
            return None;
        }

        let label = source_type.as_str();
        Some(
            SourceObject::new(source_type, node, format!("includes.[{}]", includes.len()))
                .with_description(format!("{label} blacklist content"))
                .with_ip(self.tree.resolve_ip(node))
                .with_includes(includes.to_vec()),
        )
    }

    /// Declared sources of `nodes` with type `source_type`, with IPs resolved.
    fn sources(&self, nodes: &[&str], source_type: SourceType) -> Vec<SourceObject> {
        nodes
            .iter()
            .filter_map(|name| Some((*name, self.tree.get(name)?)))
            .flat_map(|(name, node)| {
                let ip = self.tree.resolve_ip(name);
                node.sources_of(source_type).map(move |source| resolved(source, ip))
            })
            .collect()
    }

    /// Every configured node's inclusions and sources whose type is listed in
    /// the settings' leaf types.
    fn all_sources(&self) -> Vec<SourceObject> {
        let leaf_types = &self.settings.leaf_types;
        let mut objects = Vec::new();

        for node in self.node_names() {
            let inclusion = match node {
                DOMAINS_NODE => self.inclusions(node, SourceType::PreconfiguredDomain),
                HOSTS_NODE => self.inclusions(node, SourceType::PreconfiguredHost),
                _ => None,
            };
            objects.extend(inclusion.filter(|object| leaf_types.contains(&object.source_type())));
            let ip = self.tree.resolve_ip(node);
            objects.extend(
                self.tree
                    .sources(node)
                    .iter()
                    .filter(|source| leaf_types.contains(&source.source_type()))
                    .map(|source| resolved(source, ip)),
            );
        }
        objects
    }
}

/// Copy of `source` with an empty IP filled from `ip`.
fn resolved(source: &SourceObject, ip: &str) -> SourceObject {
    let mut source = source.clone();
    source.inherit_ip(ip);
    source
}
