//! Error types for the blacklist configuration model.

use std::io;

use thiserror::Error;

/// Main error type for parsing and view construction.
#[derive(Debug, Error)]
pub enum Error {
    /// Parsing finished without a single node being opened.
    #[error("configuration data is empty, cannot continue")]
    EmptyConfiguration,

    /// A view was requested with a tag no [`ViewKind`](crate::view::ViewKind) answers to.
    #[error("unknown view kind requested: {tag:?}")]
    UnknownViewKind { tag: String },

    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Settings-related errors.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file: {0}")]
    ReadFile(#[source] io::Error),

    #[error("failed to parse settings: {0}")]
    Parse(#[source] toml::de::Error),

    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
}

/// Validation errors for settings values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("at least one blacklist node must be configured")]
    NoNodes,

    #[error("blacklist node name cannot be empty")]
    EmptyNodeName,

    #[error("duplicate blacklist node name: {name:?}")]
    DuplicateNodeName { name: String },

    #[error("{name:?} is the root node and cannot be listed as a category")]
    ReservedNodeName { name: String },

    #[error("at least one leaf type must be configured")]
    NoLeafTypes,
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;
