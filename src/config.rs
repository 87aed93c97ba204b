//! Settings loading and validation.

use std::collections::HashSet;
use std::net::IpAddr;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Result, SettingsError, ValidationError};
use crate::tree::{ROOT_NODE, SourceType};

/// Settings consumed by the parser and view factory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Category nodes of interest, in the order views walk them.
    #[serde(default = "default_nodes")]
    pub nodes: Vec<String>,

    /// Source types reported by the all-sources view.
    #[serde(default = "default_leaf_types")]
    pub leaf_types: Vec<SourceType>,

    /// Location of the saved configuration dump.
    #[serde(default = "default_config_file")]
    pub config_file: PathBuf,

    /// Redirect target used when neither a node nor the root declares one.
    /// Only consulted through [`Tree::resolve_ip_or`](crate::Tree::resolve_ip_or).
    #[serde(default)]
    pub blackhole_ip: Option<IpAddr>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            nodes: default_nodes(),
            leaf_types: default_leaf_types(),
            config_file: default_config_file(),
            blackhole_ip: None,
        }
    }
}

fn default_nodes() -> Vec<String> {
    vec!["domains".to_string(), "hosts".to_string()]
}

fn default_leaf_types() -> Vec<SourceType> {
    vec![
        SourceType::File,
        SourceType::PreconfiguredDomain,
        SourceType::PreconfiguredHost,
        SourceType::Url,
    ]
}

fn default_config_file() -> PathBuf {
    PathBuf::from("/config/config.boot")
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(SettingsError::ReadFile)?;
        Self::parse(&content)
    }

    /// Parse settings from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        let settings: Self = toml::from_str(content).map_err(SettingsError::Parse)?;
        settings.validate().map_err(SettingsError::from)?;
        Ok(settings)
    }

    /// Source types reported by the all-sources view.
    pub fn leaf_types(&self) -> &[SourceType] {
        &self.leaf_types
    }

    fn validate(&self) -> std::result::Result<(), ValidationError> {
        if self.nodes.is_empty() {
            return Err(ValidationError::NoNodes);
        }

        let mut seen = HashSet::new();
        for name in &self.nodes {
            if name.is_empty() {
                return Err(ValidationError::EmptyNodeName);
            }
            if name == ROOT_NODE {
                return Err(ValidationError::ReservedNodeName { name: name.clone() });
            }
            if !seen.insert(name.as_str()) {
                return Err(ValidationError::DuplicateNodeName { name: name.clone() });
            }
        }

        if self.leaf_types.is_empty() {
            return Err(ValidationError::NoLeafTypes);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn validation_error(toml: &str) -> ValidationError {
        match Settings::parse(toml) {
            Err(Error::Settings(SettingsError::Validation(err))) => err,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_document_matches_default() {
        let settings = Settings::parse("").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_default_values() {
        let settings = Settings::default();
        assert_eq!(settings.nodes, vec!["domains", "hosts"]);
        assert_eq!(
            settings.leaf_types(),
            [
                SourceType::File,
                SourceType::PreconfiguredDomain,
                SourceType::PreconfiguredHost,
                SourceType::Url
            ]
        );
        assert_eq!(settings.config_file, PathBuf::from("/config/config.boot"));
        assert!(settings.blackhole_ip.is_none());
    }

    #[test]
    fn test_parse_valid_settings() {
        let toml = r#"
            nodes = ["hosts", "domains"]
            leaf_types = ["url", "pre-configured-host"]
            config_file = "/tmp/config.boot"
            blackhole_ip = "192.168.168.1"
        "#;

        let settings = Settings::parse(toml).unwrap();
        assert_eq!(settings.nodes, vec!["hosts", "domains"]);
        assert_eq!(
            settings.leaf_types,
            vec![SourceType::Url, SourceType::PreconfiguredHost]
        );
        assert_eq!(settings.config_file, PathBuf::from("/tmp/config.boot"));
        assert_eq!(settings.blackhole_ip, Some("192.168.168.1".parse().unwrap()));
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(matches!(
            Settings::parse("unknown_field = \"value\""),
            Err(Error::Settings(SettingsError::Parse(_)))
        ));
    }

    #[test]
    fn test_unknown_leaf_type_rejected() {
        assert!(Settings::parse("leaf_types = [\"zone\"]").is_err());
    }

    #[test]
    fn test_invalid_blackhole_ip_rejected() {
        assert!(Settings::parse("blackhole_ip = \"not-an-ip\"").is_err());
    }

    #[test]
    fn test_empty_nodes_rejected() {
        assert_eq!(validation_error("nodes = []"), ValidationError::NoNodes);
    }

    #[test]
    fn test_empty_node_name_rejected() {
        assert_eq!(
            validation_error("nodes = [\"domains\", \"\"]"),
            ValidationError::EmptyNodeName
        );
    }

    #[test]
    fn test_duplicate_node_rejected() {
        assert_eq!(
            validation_error("nodes = [\"hosts\", \"hosts\"]"),
            ValidationError::DuplicateNodeName {
                name: "hosts".into()
            }
        );
    }

    #[test]
    fn test_root_node_rejected() {
        assert_eq!(
            validation_error("nodes = [\"blacklist\"]"),
            ValidationError::ReservedNodeName {
                name: "blacklist".into()
            }
        );
    }

    #[test]
    fn test_empty_leaf_types_rejected() {
        assert_eq!(validation_error("leaf_types = []"), ValidationError::NoLeafTypes);
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            Settings::load("/nonexistent/settings.toml"),
            Err(Error::Settings(SettingsError::ReadFile(_)))
        ));
    }
}
