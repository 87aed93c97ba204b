//! Source objects attached to blacklist nodes.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Kind of a [`SourceObject`].
///
/// Determines how downstream writers treat the object's content. A source's
/// type is chosen when it is created and cannot change afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceType {
    /// A local file holding blacklist entries.
    File,
    /// A remote URL serving blacklist entries.
    Url,
    /// Domains declared inline with `include` lines under the domains node.
    #[serde(rename = "pre-configured-domain")]
    PreconfiguredDomain,
    /// Hosts declared inline with `include` lines under the hosts node.
    #[serde(rename = "pre-configured-host")]
    PreconfiguredHost,
    /// Aggregate of the domains node's `exclude` lines.
    #[serde(rename = "domn-excludes")]
    ExcludedDomains,
    /// Aggregate of the hosts node's `exclude` lines.
    #[serde(rename = "host-excludes")]
    ExcludedHosts,
    /// Aggregate of every node's `exclude` lines.
    #[serde(rename = "root-excludes")]
    ExcludedRoots,
}

impl SourceType {
    /// Label used in rendered output and settings files.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Url => "url",
            Self::PreconfiguredDomain => "pre-configured-domain",
            Self::PreconfiguredHost => "pre-configured-host",
            Self::ExcludedDomains => "domn-excludes",
            Self::ExcludedHosts => "host-excludes",
            Self::ExcludedRoots => "root-excludes",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "file" => Ok(Self::File),
            "url" => Ok(Self::Url),
            "pre-configured-domain" => Ok(Self::PreconfiguredDomain),
            "pre-configured-host" => Ok(Self::PreconfiguredHost),
            "domn-excludes" => Ok(Self::ExcludedDomains),
            "host-excludes" => Ok(Self::ExcludedHosts),
            "root-excludes" => Ok(Self::ExcludedRoots),
            other => Err(format!("unknown source type: {other}")),
        }
    }
}

/// A blacklist source, or an aggregate object synthesized by a view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceObject {
    source_type: SourceType,
    node: String,
    name: String,
    location: String,
    description: String,
    ip: String,
    prefix: String,
    excludes: Vec<String>,
    includes: Vec<String>,
}

impl SourceObject {
    /// Create an object of the given type owned by `node`.
    pub fn new(source_type: SourceType, node: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            source_type,
            node: node.into(),
            name: name.into(),
            location: String::new(),
            description: String::new(),
            ip: String::new(),
            prefix: String::new(),
            excludes: Vec::new(),
            includes: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
        self.ip = ip.into();
        self
    }

    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn with_excludes(mut self, excludes: Vec<String>) -> Self {
        self.excludes = excludes;
        self
    }

    #[must_use]
    pub fn with_includes(mut self, includes: Vec<String>) -> Self {
        self.includes = includes;
        self
    }

    pub fn source_type(&self) -> SourceType {
        self.source_type
    }

    /// Name of the node this object belongs to.
    pub fn node(&self) -> &str {
        &self.node
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// File path or URL of the source; empty for aggregate objects.
    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Blackhole IP; empty until set in configuration or resolved from the node.
    pub fn ip(&self) -> &str {
        &self.ip
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn excludes(&self) -> &[String] {
        &self.excludes
    }

    pub fn includes(&self) -> &[String] {
        &self.includes
    }

    pub(crate) fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub(crate) fn set_ip(&mut self, ip: impl Into<String>) {
        self.ip = ip.into();
    }

    pub(crate) fn set_prefix(&mut self, prefix: impl Into<String>) {
        self.prefix = prefix.into();
    }

    /// Fill in the IP if none was set. Returns `true` when a value was written.
    pub(crate) fn inherit_ip(&mut self, ip: &str) -> bool {
        if self.ip.is_empty() && !ip.is_empty() {
            self.ip = ip.to_string();
            return true;
        }
        false
    }
}
