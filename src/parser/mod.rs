//! EdgeOS/VyOS configuration parser.
//!
//! Turns the brace-delimited `service dns forwarding blacklist` dump into a
//! [`Tree`]. The scanner tracks block nesting with a context stack and
//! dispatches each line on the variant returned by [`line::classify`].
//!
//! The recognizer is deliberately permissive: unknown attribute keys, stray
//! closing braces and attribute lines outside any node are absorbed rather
//! than reported, so minor firmware format drift does not break a reload.
//! Only a dump without a single node fails.
//!
//! # Example
//!
//! ```
//! use edgeos_blacklist::parser::ConfigParser;
//! use edgeos_blacklist::SourceType;
//!
//! let text = r#"
//! blacklist {
//!     dns-redirect-ip 0.0.0.0
//!     domains {
//!         exclude example.org
//!         source mysrc {
//!             url https://x/list
//!         }
//!     }
//! }
//! "#;
//!
//! let tree = ConfigParser::new().parse_str(text).unwrap();
//! let domains = tree.get("domains").unwrap();
//! assert_eq!(domains.excludes(), ["example.org"]);
//! assert_eq!(domains.sources()[0].source_type(), SourceType::Url);
//! ```

pub mod line;

use std::io::{BufRead, BufReader};

use self::line::{AttributeKey, LeafKind, Line, ListKind, classify};
use crate::error::{Error, Result};
use crate::tree::{SourceObject, SourceType, Tree};

/// Parser for the configuration dump.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigParser;

impl ConfigParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse configuration text from a buffered reader.
    ///
    ///
    /// Lines are decoded lossily, so bytes that are not valid UTF-8 only
    /// affect the line they appear on.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if reading fails and [`Error::EmptyConfiguration`]
    /// if no node was opened.
    pub fn parse(&self, reader: &mut dyn BufRead) -> Result<Tree> {
        let mut state = ParseState::default();
        let mut buf = Vec::new();
        let mut line_number = 0usize;

        loop {
            buf.clear();
            let bytes_read = reader.read_until(b'\n', &mut buf)?;
            if bytes_read == 0 {
                break;
            }
            line_number += 1;
            state.apply(line_number, &String::from_utf8_lossy(&buf));
        }

        state.finish()
    }

    /// Parse configuration text held in memory.
    pub fn parse_str(&self, content: &str) -> Result<Tree> {
        self.parse(&mut BufReader::new(content.as_bytes()))
    }
}

/// One entry of the nesting stack.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Context {
    Node(String),
    Leaf(LeafKind),
}

/// A source block that has been opened but not yet given a location.
#[derive(Debug, Default)]
struct PendingSource {
    node: String,
    name: String,
    description: String,
    ip: String,
    prefix: String,
}

impl PendingSource {
    fn finalize(self, source_type: SourceType, location: &str) -> SourceObject {
        SourceObject::new(source_type, self.node, self.name)
            .with_location(location)
            .with_description(self.description)
            .with_ip(self.ip)
            .with_prefix(self.prefix)
    }
}

/// State of the innermost `source` block.
#[derive(Debug, Default)]
enum Pending {
    #[default]
    None,
    /// Attributes are collected until a `file` or `url` line arrives.
    Open(PendingSource),
    /// The source was appended to `node`; later attributes update it in place.
    Committed { node: String },
}

/// Scalar attribute routed to either the open source or the current node.
#[derive(Debug, Clone, Copy)]
enum Scalar {
    Description,
    Ip,
    Prefix,
}

#[derive(Debug, Default)]
struct ParseState {
    tree: Tree,
    stack: Vec<Context>,
    pending: Pending,
}

impl ParseState {
    fn apply(&mut self, line_number: usize, raw: &str) {
        match classify(raw) {
            Line::MultiValue { list, value } => self.push_value(line_number, list, value),
            Line::NodeOpen { name } => self.open_node(name),
            Line::LeafOpen { kind, name } => self.open_leaf(kind, name),
            Line::Disabled(disabled) => match self.current_node() {
                Some(node) => self.tree.node_mut(&node).disabled = disabled,
                None => tracing::trace!(line = line_number, "disabled flag outside any node"),
            },
            Line::BlackholeIp(ip) => self.set_scalar(line_number, Scalar::Ip, ip),
            Line::Attribute { key, value } => match key {
                AttributeKey::Description => self.set_scalar(line_number, Scalar::Description, value),
                AttributeKey::DnsRedirectIp => self.set_scalar(line_number, Scalar::Ip, value),
                AttributeKey::Prefix => self.set_scalar(line_number, Scalar::Prefix, value),
                AttributeKey::File => self.commit_source(line_number, SourceType::File, value),
                AttributeKey::Url => self.commit_source(line_number, SourceType::Url, value),
            },
            Line::Ignored => {}
            Line::Close => self.close(line_number),
            Line::Unrecognized => {
                tracing::trace!(line = line_number, content = raw.trim(), "ignoring unrecognized line");
            }
        }
    }

    fn finish(self) -> Result<Tree> {
        if self.tree.is_empty() {
            return Err(Error::EmptyConfiguration);
        }

        let sources: usize = self.tree.iter().map(|(_, node)| node.sources().len()).sum();
        tracing::info!(
            nodes = self.tree.len(),
            sources,
            unclosed = self.stack.len().saturating_sub(1),
            "parsed blacklist configuration"
        );
        Ok(self.tree)
    }

    /// Innermost node context.
    fn current_node(&self) -> Option<String> {
        self.stack.iter().rev().find_map(|context| match context {
            Context::Node(name) => Some(name.clone()),
            Context::Leaf(_) => None,
        })
    }

    /// Whether the most recently pushed context is a `source` block.
    fn in_source(&self) -> bool {
        matches!(self.stack.last(), Some(Context::Leaf(LeafKind::Source)))
    }

    fn push_value(&mut self, line_number: usize, list: ListKind, value: &str) {
        let Some(name) = self.current_node() else {
            tracing::trace!(line = line_number, value, "list entry outside any node");
            return;
        };

        let node = self.tree.node_mut(&name);
        match list {
            ListKind::Include => node.includes.push(value.to_string()),
            ListKind::Exclude => node.excludes.push(value.to_string()),
        }
    }

    fn open_node(&mut self, name: &str) {
        tracing::debug!(node = name, depth = self.stack.len(), "opening node");
        self.tree.node_mut(name);
        self.stack.push(Context::Node(name.to_string()));
    }

    fn open_leaf(&mut self, kind: LeafKind, name: &str) {
        if kind == LeafKind::Source {
            let node = self.current_node().unwrap_or_default();
            tracing::debug!(node = %node, source = name, "opening source");
            self.pending = Pending::Open(PendingSource {
                node,
                name: name.to_string(),
                ..PendingSource::default()
            });
        }
        self.stack.push(Context::Leaf(kind));
    }

    fn set_scalar(&mut self, line_number: usize, scalar: Scalar, value: &str) {
        if self.in_source() {
            match &mut self.pending {
                Pending::Open(source) => {
                    let field = match scalar {
                        Scalar::Description => &mut source.description,
                        Scalar::Ip => &mut source.ip,
                        Scalar::Prefix => &mut source.prefix,
                    };
                    *field = value.to_string();
                }
                Pending::Committed { node } => {
                    let node = node.clone();
                    if let Some(source) = self.tree.node_mut(&node).sources.last_mut() {
                        match scalar {
                            Scalar::Description => source.set_description(value),
                            Scalar::Ip => source.set_ip(value),
                            Scalar::Prefix => source.set_prefix(value),
                        }
                    }
                }
                Pending::None => {
                    tracing::trace!(line = line_number, "source attribute without open source");
                }
            }
            return;
        }

        let Some(name) = self.current_node() else {
            tracing::trace!(line = line_number, value, "attribute outside any node");
            return;
        };

        let node = self.tree.node_mut(&name);
        let field = match scalar {
            Scalar::Description => &mut node.description,
            Scalar::Ip => &mut node.ip,
            Scalar::Prefix => &mut node.prefix,
        };
        *field = value.to_string();
    }

    fn commit_source(&mut self, line_number: usize, source_type: SourceType, location: &str) {
        if !self.in_source() {
            tracing::trace!(line = line_number, location, "source location outside a source block");
            return;
        }

        match std::mem::take(&mut self.pending) {
            Pending::Open(source) if !source.node.is_empty() => {
                let node = source.node.clone();
                tracing::debug!(node = %node, source = %source.name, kind = %source_type, "adding source");
                let object = source.finalize(source_type, location);
                self.tree.node_mut(&node).sources.push(object);
                self.pending = Pending::Committed { node };
            }
            Pending::Open(source) => {
                tracing::trace!(line = line_number, source = %source.name, "source outside any node");
            }
            committed @ Pending::Committed { .. } => {
                tracing::trace!(line = line_number, location, "source already has a location");
                self.pending = committed;
            }
            Pending::None => {
                tracing::trace!(line = line_number, location, "source location without open source");
            }
        }
    }

    fn close(&mut self, line_number: usize) {
        if self.stack.len() <= 1 {
            tracing::trace!(line = line_number, depth = self.stack.len(), "ignoring unbalanced close brace");
            return;
        }

        if let Some(Context::Leaf(LeafKind::Source)) = self.stack.pop() {
            if let Pending::Open(source) = std::mem::take(&mut self.pending) {
                tracing::debug!(source = %source.name, "dropping source without file or url");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Result<Tree> {
        ConfigParser::new().parse_str(content)
    }

    const SAMPLE: &str = r#"
blacklist {
    disabled false
    dns-redirect-ip 0.0.0.0
    domains {
        include adsrvr.org
        include adtechus.net
        exclude example.org
        source malc0de {
            description "List of zones serving malicious executables observed by malc0de.com/database/"
            prefix "zone "
            url http://malc0de.com/bl/ZONES
        }
    }
    exclude 122.2o7.net
    exclude 1e100.net
    hosts {
        exclude appleglobal.112.2o7.net
        include beap.gemini.yahoo.com
        source openphish {
            description "OpenPhish automatic phishing detection"
            prefix http
            url https://openphish.com/feed.txt
        }
        source tasty {
            description "File source"
            dns-redirect-ip 10.10.10.10
            file /config/user-data/blist.hosts.src
        }
    }
}
"#;

    #[test]
    fn should_parse_nodes() {
        let tree = parse(SAMPLE).unwrap();
        assert_eq!(tree.nodes(), vec!["blacklist", "domains", "hosts"]);
    }

    #[test]
    fn should_parse_root_attributes() {
        let tree = parse(SAMPLE).unwrap();
        let root = tree.get("blacklist").unwrap();

        assert!(!root.is_disabled());
        assert_eq!(root.ip(), "0.0.0.0");
        assert_eq!(root.excludes(), ["122.2o7.net", "1e100.net"]);
    }

    #[test]
    fn should_collect_multi_value_lines_in_order() {
        let tree = parse(SAMPLE).unwrap();
        let domains = tree.get("domains").unwrap();

        assert_eq!(domains.includes(), ["adsrvr.org", "adtechus.net"]);
        assert_eq!(domains.excludes(), ["example.org"]);
    }

    #[test]
    fn should_build_url_source() {
        let tree = parse(SAMPLE).unwrap();
        let source = &tree.sources("domains")[0];

        assert_eq!(source.source_type(), SourceType::Url);
        assert_eq!(source.node(), "domains");
        assert_eq!(source.name(), "malc0de");
        assert_eq!(source.location(), "http://malc0de.com/bl/ZONES");
        assert_eq!(source.prefix(), "zone ");
        assert_eq!(
            source.description(),
            "List of zones serving malicious executables observed by malc0de.com/database/"
        );
        assert_eq!(source.ip(), "");
    }

    #[test]
    fn should_keep_source_ip_on_source() {
        let tree = parse(SAMPLE).unwrap();
        let hosts = tree.get("hosts").unwrap();

        assert_eq!(hosts.ip(), "");
        assert_eq!(hosts.sources()[1].source_type(), SourceType::File);
        assert_eq!(hosts.sources()[1].ip(), "10.10.10.10");
        assert_eq!(hosts.sources()[1].location(), "/config/user-data/blist.hosts.src");
    }

    #[test]
    fn should_preserve_source_declaration_order() {
        let tree = parse(SAMPLE).unwrap();
        let names: Vec<_> = tree.sources("hosts").iter().map(SourceObject::name).collect();
        assert_eq!(names, vec!["openphish", "tasty"]);
    }

    #[test]
    fn should_return_to_parent_node_after_close() {
        let tree = parse(SAMPLE).unwrap();
        // The root excludes appear after the domains block closes.
        assert!(tree.get("domains").unwrap().excludes().iter().all(|e| e != "122.2o7.net"));
    }

    #[test]
    fn should_fail_on_empty_input() {
        assert!(matches!(parse(""), Err(Error::EmptyConfiguration)));
    }

    #[test]
    fn should_fail_without_node_open_lines() {
        let content = "exclude example.com\ndns-redirect-ip 0.0.0.0\n}\n/* comment */\n";
        assert!(matches!(parse(content), Err(Error::EmptyConfiguration)));
    }

    #[test]
    fn should_tolerate_stray_close_braces() {
        let content = "}\n}\nblacklist {\n    dns-redirect-ip 0.0.0.0\n}\n}\n}\nexclude late.com\n";
        let tree = parse(content).unwrap();
        let root = tree.get("blacklist").unwrap();

        assert_eq!(root.ip(), "0.0.0.0");
        // The root is never popped, so later lines still land on it.
        assert_eq!(root.excludes(), ["late.com"]);
    }

    #[test]
    fn should_ignore_unknown_attribute_keys() {
        let content = "blacklist {\n    update-interval 86400\n    frobnicate yes please\n    dns-redirect-ip 0.0.0.0\n}\n";
        let tree = parse(content).unwrap();
        assert_eq!(tree.get("blacklist").unwrap().ip(), "0.0.0.0");
    }

    #[test]
    fn should_augment_repeated_node() {
        let content = r"
blacklist {
    domains {
        exclude a.com
    }
    domains {
        exclude b.com
        disabled true
    }
}
";
        let tree = parse(content).unwrap();
        let domains = tree.get("domains").unwrap();

        assert_eq!(domains.excludes(), ["a.com", "b.com"]);
        assert!(domains.is_disabled());
    }

    #[test]
    fn should_apply_attributes_after_location_to_committed_source() {
        let content = r#"
blacklist {
    hosts {
        source late {
            url https://example.com/hosts
            description "set after url"
            prefix "0.0.0.0 "
        }
    }
}
"#;
        let tree = parse(content).unwrap();
        let source = &tree.sources("hosts")[0];

        assert_eq!(source.description(), "set after url");
        assert_eq!(source.prefix(), "0.0.0.0 ");
    }

    #[test]
    fn should_keep_first_location_of_source() {
        let content = "blacklist {\n hosts {\n  source twice {\n   url https://a\n   file /tmp/b\n  }\n }\n}\n";
        let tree = parse(content).unwrap();
        let sources = tree.sources("hosts");

        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].source_type(), SourceType::Url);
        assert_eq!(sources[0].location(), "https://a");
    }

    #[test]
    fn should_drop_source_without_location() {
        let content = "blacklist {\n hosts {\n  source empty {\n   description nothing\n  }\n }\n}\n";
        let tree = parse(content).unwrap();
        assert!(tree.sources("hosts").is_empty());
        assert_eq!(tree.get("hosts").unwrap().description(), "");
    }

    #[test]
    fn should_set_node_level_description_and_prefix() {
        let content = "blacklist {\n domains {\n  description \"Domain blacklist\"\n  prefix address=\n }\n}\n";
        let tree = parse(content).unwrap();
        let domains = tree.get("domains").unwrap();

        assert_eq!(domains.description(), "Domain blacklist");
        assert_eq!(domains.prefix(), "address=");
    }

    #[test]
    fn should_attribute_bare_ip_to_node() {
        let content = "blacklist {\n  192.168.168.1\n  hosts {\n    10.0.0.1\n  }\n}\n";
        let tree = parse(content).unwrap();

        assert_eq!(tree.get("blacklist").unwrap().ip(), "192.168.168.1");
        assert_eq!(tree.get("hosts").unwrap().ip(), "10.0.0.1");
    }

    #[test]
    fn should_track_zone_blocks_without_creating_sources() {
        let content = "blacklist {\n domains {\n  zone tracking {\n   url https://ignored\n  }\n  exclude kept.com\n }\n}\n";
        let tree = parse(content).unwrap();
        let domains = tree.get("domains").unwrap();

        assert!(domains.sources().is_empty());
        assert_eq!(domains.excludes(), ["kept.com"]);
    }

    #[test]
    fn should_open_source_with_quoted_name() {
        let content = r#"
blacklist {
    domains {
        source "my list" {
            url https://a
        }
        exclude after.com
    }
}
"#;
        let tree = parse(content).unwrap();
        let domains = tree.get("domains").unwrap();

        assert_eq!(domains.sources().len(), 1);
        assert_eq!(domains.sources()[0].name(), "my list");
        assert_eq!(domains.excludes(), ["after.com"]);
        assert!(tree.get("blacklist").unwrap().excludes().is_empty());
    }

    #[test]
    fn should_keep_nesting_for_unrecognized_openers() {
        let content = "blacklist {\n domains {\n  some odd opener {\n   exclude inner.com\n  }\n  exclude after.com\n }\n}\n";
        let tree = parse(content).unwrap();

        assert_eq!(tree.get("domains").unwrap().excludes(), ["inner.com", "after.com"]);
        assert!(tree.get("blacklist").unwrap().excludes().is_empty());
    }

    #[test]
    fn should_accept_windows_line_endings() {
        let content = "blacklist {\r\n    dns-redirect-ip 0.0.0.0\r\n    exclude a.com\r\n}\r\n";
        let tree = parse(content).unwrap();
        let root = tree.get("blacklist").unwrap();

        assert_eq!(root.ip(), "0.0.0.0");
        assert_eq!(root.excludes(), ["a.com"]);
    }

    #[test]
    fn should_parse_around_invalid_utf8() {
        let mut content = b"blacklist {\n    dns-redirect-ip 0.0.0.0\n    domains {\n".to_vec();
        content.extend_from_slice(b"        source latin {\n            description \"caf\xe9 list\"\n");
        content.extend_from_slice(b"            url https://example.com/list\n        }\n");
        content.extend_from_slice(b"        exclude \xff\xfe.com\n        exclude after.com\n    }\n}\n");

        let tree = ConfigParser::new().parse(&mut BufReader::new(&content[..])).unwrap();
        let domains = tree.get("domains").unwrap();

        assert_eq!(tree.get("blacklist").unwrap().ip(), "0.0.0.0");
        assert_eq!(domains.sources().len(), 1);
        assert_eq!(domains.sources()[0].description(), "caf\u{fffd} list");
        assert_eq!(domains.sources()[0].location(), "https://example.com/list");
        assert_eq!(domains.excludes().len(), 2);
        assert_eq!(domains.excludes()[1], "after.com");
    }

    struct FailingReader;

    impl std::io::Read for FailingReader {
        fn read(&mut self, _: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("disk went away"))
        }
    }

    #[test]
    fn should_report_io_errors() {
        let mut reader = BufReader::new(FailingReader);
        assert!(matches!(ConfigParser::new().parse(&mut reader), Err(Error::Io(_))));
    }
}
