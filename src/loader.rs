//! File-based configuration loader.
//!
//! Reads a saved configuration dump (typically `/config/config.boot` or the
//! output of `show service dns forwarding blacklist` redirected to a file)
//! and parses it into a [`Tree`].

use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::parser::ConfigParser;
use crate::tree::Tree;

/// Error type for configuration file loading operations.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// File was not found at the specified path.
    #[error("file not found: {0:?}")]
    NotFound(PathBuf),

    /// Permission denied when accessing the file.
    #[error("permission denied: {0:?}")]
    PermissionDenied(PathBuf),

    /// I/O error while reading the file.
    #[error("I/O error reading {path:?}")]
    Io {
        /// Path to the file that caused the error.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Error parsing the configuration content.
    #[error("parse error")]
    Parse(#[from] Error),

    /// Task join error from spawning a blocking task.
    #[error("task join error")]
    Join(#[from] tokio::task::JoinError),
}

/// Loads configuration dumps from local files.
pub struct FileLoader;

impl FileLoader {
    /// Load and parse a configuration dump.
    ///
    /// The file is read asynchronously and parsed in a blocking task so large
    /// dumps do not stall the runtime.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] if:
    /// - The file does not exist ([`LoadError::NotFound`])
    /// - Permission is denied ([`LoadError::PermissionDenied`])
    /// - An I/O error occurs ([`LoadError::Io`])
    /// - The content holds no configuration nodes ([`LoadError::Parse`])
    ///
    /// # Example
    ///
    /// ```no_run
    /// use std::path::Path;
    /// use edgeos_blacklist::loader::FileLoader;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let tree = FileLoader::load(Path::new("/config/config.boot")).await?;
    /// println!("Loaded {} nodes", tree.len());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn load(path: &Path) -> Result<Tree, LoadError> {
        let path_buf = path.to_path_buf();

        let content = tokio::fs::read(path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => LoadError::NotFound(path_buf.clone()),
            std::io::ErrorKind::PermissionDenied => LoadError::PermissionDenied(path_buf.clone()),
            _ => LoadError::Io {
                path: path_buf.clone(),
                source: e,
            },
        })?;

        tracing::debug!(path = ?path_buf, bytes = content.len(), "read configuration dump");

        let tree = tokio::task::spawn_blocking(move || {
            ConfigParser::new().parse(&mut BufReader::new(content.as_slice()))
        })
        .await??;

        Ok(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn should_load_configuration_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "blacklist {{").unwrap();
        writeln!(file, "    dns-redirect-ip 0.0.0.0").unwrap();
        writeln!(file, "    hosts {{").unwrap();
        writeln!(file, "        exclude example.com").unwrap();
        writeln!(file, "    }}").unwrap();
        writeln!(file, "}}").unwrap();
        file.flush().unwrap();

        let tree = FileLoader::load(file.path()).await.unwrap();

        assert_eq!(tree.nodes(), vec!["blacklist", "hosts"]);
        assert_eq!(tree.resolve_ip("hosts"), "0.0.0.0");
    }

    #[tokio::test]
    async fn should_return_parse_error_when_file_is_empty() {
        let file = NamedTempFile::new().unwrap();

        let result = FileLoader::load(file.path()).await;

        assert!(matches!(
            result,
            Err(LoadError::Parse(Error::EmptyConfiguration))
        ));
    }

    #[tokio::test]
    async fn should_return_not_found_error_when_file_does_not_exist() {
        let result = FileLoader::load(Path::new("/nonexistent/path/to/config.boot")).await;

        assert!(matches!(result, Err(LoadError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_handle_file_with_mixed_line_endings() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"blacklist {\r\n    exclude a.com\n    exclude b.com\r\n}\n")
            .unwrap();
        file.flush().unwrap();

        let tree = FileLoader::load(file.path()).await.unwrap();

        assert_eq!(tree.get("blacklist").unwrap().excludes(), ["a.com", "b.com"]);
    }

    #[tokio::test]
    async fn should_load_file_with_invalid_utf8() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"blacklist {\n    description \"r\xe9seau\"\n    hosts {\n        exclude a.com\n    }\n}\n")
            .unwrap();
        file.flush().unwrap();

        let tree = FileLoader::load(file.path()).await.unwrap();

        assert_eq!(tree.get("blacklist").unwrap().description(), "r\u{fffd}seau");
        assert_eq!(tree.get("hosts").unwrap().excludes(), ["a.com"]);
    }

    #[tokio::test]
    async fn should_handle_large_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "blacklist {{").unwrap();
        writeln!(file, "    domains {{").unwrap();
        for i in 0..10_000 {
            writeln!(file, "        include domain{i}.example.com").unwrap();
        }
        writeln!(file, "    }}").unwrap();
        writeln!(file, "}}").unwrap();
        file.flush().unwrap();

        let tree = FileLoader::load(file.path()).await.unwrap();
        let includes = tree.get("domains").unwrap().includes();

        assert_eq!(includes.len(), 10_000);
        assert_eq!(includes[0], "domain0.example.com");
        assert_eq!(includes[9999], "domain9999.example.com");
    }
}
