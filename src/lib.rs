//! EdgeOS blacklist - typed model of a router's DNS blacklist configuration.
//!
//! EdgeOS/VyOS appliances describe their dnsmasq blacklist as a nested,
//! brace-delimited configuration block. This crate parses that block into a
//! queryable tree and builds typed views over it: exclusions, inline
//! inclusions and declared file/url sources, each with its blackhole IP
//! resolved.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`parser`]: Line classification and the nesting-aware scanner
//! - [`tree`]: Nodes, source objects and deterministic rendering
//! - [`view`]: Request kinds and the view factory
//! - [`entry`]: Concurrency-safe entry set for exclusion lookups
//! - [`loader`]: Reading a saved configuration dump from disk
//! - [`config`]: Settings loading and validation
//! - [`error`]: Error types
//!
//! # Example
//!
//! ```rust
//! use edgeos_blacklist::{Settings, Tree, ViewFactory, ViewKind};
//!
//! let text = r#"
//! blacklist {
//!     dns-redirect-ip 0.0.0.0
//!     domains {
//!         exclude example.org
//!     }
//! }
//! "#;
//!
//! let tree: Tree = text.parse().unwrap();
//! let exclusions = tree.excludes(&["domains"]);
//! assert!(exclusions.contains_suffix("sub.example.org"));
//!
//! let settings = Settings::default();
//! let view = ViewFactory::new(&tree, &settings).build(ViewKind::ExcludedDomains);
//! assert_eq!(view.objects()[0].ip(), "0.0.0.0");
//! ```

pub mod config;
pub mod entry;
pub mod error;
pub mod loader;
pub mod parser;
pub mod tree;
pub mod view;

pub use config::Settings;
pub use entry::EntrySet;
pub use error::{Error, Result};
pub use tree::{Node, ROOT_NODE, SourceObject, SourceType, Tree};
pub use view::{View, ViewFactory, ViewKind};
