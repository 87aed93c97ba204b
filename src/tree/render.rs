//! Deterministic JSON-shaped rendering of a [`Tree`].
//!
//! Nodes are emitted in lexicographic order, include/exclude lists sorted and
//! sources in declaration order, so the output is stable enough for golden
//! file comparisons.

use std::fmt::{self, Write};

use super::{ROOT_NODE, SourceObject, Tree};

enum Value<'a> {
    Str(&'a str),
    List(Vec<&'a str>),
    Sources(&'a [SourceObject]),
}

fn sorted(items: &[String]) -> Vec<&str> {
    let mut items: Vec<&str> = items.iter().map(String::as_str).collect();
    items.sort_unstable();
    items
}

fn bool_str(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

fn tabs(f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
    for _ in 0..depth {
        f.write_char('\t')?;
    }
    Ok(())
}

/// Write `s` as a JSON string literal.
fn quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_char('"')?;
    for c in s.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            c if c.is_control() => write!(f, "\\u{:04x}", c as u32)?,
            c => f.write_char(c)?,
        }
    }
    f.write_char('"')
}

fn write_fields(f: &mut fmt::Formatter<'_>, depth: usize, fields: &[(&str, Value<'_>)]) -> fmt::Result {
    for (i, (key, value)) in fields.iter().enumerate() {
        let sep = if i + 1 == fields.len() { "" } else { "," };
        tabs(f, depth)?;
        quoted(f, key)?;
        f.write_str(": ")?;

        match value {
            Value::Str(s) => quoted(f, s)?,
            Value::List(items) if items.is_empty() => f.write_str("[]")?,
            Value::List(items) => {
                f.write_str("[\n")?;
                for (j, item) in items.iter().enumerate() {
                    tabs(f, depth + 1)?;
                    quoted(f, item)?;
                    f.write_str(if j + 1 == items.len() { "\n" } else { ",\n" })?;
                }
                tabs(f, depth)?;
                f.write_char(']')?;
            }
            Value::Sources(sources) if sources.is_empty() => f.write_str("[]")?,
            Value::Sources(sources) => {
                f.write_str("[\n")?;
                for (j, source) in sources.iter().enumerate() {
                    tabs(f, depth + 1)?;
                    f.write_str("{\n")?;
                    write_fields(f, depth + 2, &source_fields(source))?;
                    tabs(f, depth + 1)?;
                    f.write_str(if j + 1 == sources.len() { "}\n" } else { "},\n" })?;
                }
                tabs(f, depth)?;
                f.write_char(']')?;
            }
        }

        f.write_str(sep)?;
        f.write_char('\n')?;
    }
    Ok(())
}

fn source_fields(source: &SourceObject) -> Vec<(&'static str, Value<'_>)> {
    vec![
        ("name", Value::Str(source.name())),
        ("type", Value::Str(source.source_type().as_str())),
        ("description", Value::Str(source.description())),
        ("ip", Value::Str(source.ip())),
        ("prefix", Value::Str(source.prefix())),
        ("location", Value::Str(source.location())),
    ]
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{\n\t\"nodes\": [{\n")?;

        for (i, (name, node)) in self.iter().enumerate() {
            tabs(f, 2)?;
            quoted(f, name)?;
            f.write_str(": {\n")?;

            let mut fields = vec![
                ("disabled", Value::Str(bool_str(node.is_disabled()))),
                ("ip", Value::Str(node.ip())),
            ];
            if !node.description().is_empty() {
                fields.push(("description", Value::Str(node.description())));
            }
            if !node.prefix().is_empty() {
                fields.push(("prefix", Value::Str(node.prefix())));
            }
            fields.push(("excludes", Value::List(sorted(node.excludes()))));
            if name != ROOT_NODE {
                fields.push(("includes", Value::List(sorted(node.includes()))));
                fields.push(("sources", Value::Sources(node.sources())));
            }
            write_fields(f, 3, &fields)?;

            tabs(f, 2)?;
            f.write_str(if i + 1 == self.len() { "}\n" } else { "},\n" })?;
        }

        f.write_str("\t}]\n}")
    }
}
