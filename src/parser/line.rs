//! Line classification for the configuration dump.
//!
//! Each recognizer inspects a single trimmed line and returns a structured
//! [`Line`] when the line has its shape. [`classify`] tries them in a fixed
//! priority order and the first match wins, so every line maps to exactly
//! one variant.

use std::net::IpAddr;

/// Which list a multi-value line appends to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Include,
    Exclude,
}

/// Kind of a leaf block opener such as `source malc0de {`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafKind {
    /// Declares a blacklist source; its block holds file/url attributes.
    Source,
    /// A dnsmasq zone block; tracked for nesting only.
    Zone,
    /// Any other block opener, tracked for nesting only.
    Other,
}

/// Keys accepted by the named-attribute recognizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKey {
    Description,
    DnsRedirectIp,
    File,
    Prefix,
    Url,
}

impl AttributeKey {
    fn from_key(key: &str) -> Option<Self> {
        match key {
            "description" => Some(Self::Description),
            "dns-redirect-ip" => Some(Self::DnsRedirectIp),
            "file" => Some(Self::File),
            "prefix" => Some(Self::Prefix),
            "url" => Some(Self::Url),
            _ => None,
        }
    }
}

/// A classified configuration line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line<'a> {
    /// `include <value>` or `exclude <value>`.
    MultiValue { list: ListKind, value: &'a str },
    /// `<name> {`
    NodeOpen { name: &'a str },
    /// `<kind> <name> {`, or any other line ending in `{`.
    LeafOpen { kind: LeafKind, name: &'a str },
    /// `disabled`, `disabled <bool>` and the `disable` spellings.
    Disabled(bool),
    /// `dns-redirect-ip <ip>` or a bare IP literal.
    BlackholeIp(&'a str),
    /// `<key> <value>` for a known key.
    Attribute { key: AttributeKey, value: &'a str },
    /// Blank lines, comments and bare keywords.
    Ignored,
    /// `}`
    Close,
    /// Anything else, including attributes with unknown keys.
    Unrecognized,
}

/// Classify a line. Surrounding whitespace is trimmed first.
pub fn classify(line: &str) -> Line<'_> {
    let line = line.trim();

    multi_value(line)
        .or_else(|| node_open(line))
        .or_else(|| leaf_open(line))
        .or_else(|| opaque_open(line))
        .or_else(|| disabled_flag(line))
        .or_else(|| blackhole_ip(line))
        .or_else(|| named_attribute(line))
        .or_else(|| ignorable(line))
        .or_else(|| close_brace(line))
        .unwrap_or(Line::Unrecognized)
}

pub fn multi_value(line: &str) -> Option<Line<'_>> {
    let (key, value) = split_key(line)?;
    let list = match key {
        "include" => ListKind::Include,
        "exclude" => ListKind::Exclude,
        _ => return None,
    };
    let value = unquote(value);
    if value.is_empty() {
        return None;
    }
    Some(Line::MultiValue { list, value })
}

pub fn node_open(line: &str) -> Option<Line<'_>> {
    let name = block_head(line)?;
    is_word(name).then_some(Line::NodeOpen { name })
}

pub fn leaf_open(line: &str) -> Option<Line<'_>> {
    let head = block_head(line)?;
    let (kind, name) = split_key(head)?;
    let unquoted = unquote(name);
    let quoted = unquoted.len() != name.len();
    if !is_word(kind) || (!quoted && name.split_whitespace().count() != 1) {
        return None;
    }

    let kind = match kind {
        "source" => LeafKind::Source,
        "zone" => LeafKind::Zone,
        _ => LeafKind::Other,
    };
    Some(Line::LeafOpen { kind, name: unquoted })
}

/// Any remaining line that opens a block, so its `}` has a context to pop.
pub fn opaque_open(line: &str) -> Option<Line<'_>> {
    if is_comment(line) {
        return None;
    }
    let name = line.strip_suffix('{')?.trim_end();
    Some(Line::LeafOpen {
        kind: LeafKind::Other,
        name,
    })
}

pub fn disabled_flag(line: &str) -> Option<Line<'_>> {
    let (key, value) = split_key(line).unwrap_or((line, ""));
    if key != "disabled" && key != "disable" {
        return None;
    }

    let value = unquote(value);
    let disabled = value.is_empty() || value.eq_ignore_ascii_case("true");
    Some(Line::Disabled(disabled))
}

pub fn blackhole_ip(line: &str) -> Option<Line<'_>> {
    if let Some(("dns-redirect-ip", value)) = split_key(line) {
        return Some(Line::BlackholeIp(unquote(value)));
    }
    line.parse::<IpAddr>().is_ok().then_some(Line::BlackholeIp(line))
}

pub fn named_attribute(line: &str) -> Option<Line<'_>> {
    let (key, value) = split_key(line)?;
    let key = AttributeKey::from_key(key)?;
    Some(Line::Attribute {
        key,
        value: unquote(value),
    })
}

pub fn ignorable(line: &str) -> Option<Line<'_>> {
    (line.is_empty() || is_comment(line) || is_word(line)).then_some(Line::Ignored)
}

pub fn close_brace(line: &str) -> Option<Line<'_>> {
    (line == "}").then_some(Line::Close)
}

fn is_comment(line: &str) -> bool {
    line.starts_with("/*")
        || line.starts_with("//")
        || line.starts_with('*')
        || line.starts_with('#')
        || line.ends_with("*/")
}

/// The part of a block opener before its trailing `{`.
fn block_head(line: &str) -> Option<&str> {
    let head = line.strip_suffix('{')?.trim_end();
    (!head.is_empty()).then_some(head)
}

/// Split at the first run of whitespace.
fn split_key(line: &str) -> Option<(&str, &str)> {
    let (key, rest) = line.split_once(char::is_whitespace)?;
    Some((key, rest.trim_start()))
}

/// Word characters plus `-`.
fn is_word(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Strip one pair of matching surrounding quotes.
fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}
