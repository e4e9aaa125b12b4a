// Configuration
// Serializer and publisher settings, loadable from YAML

use serde::Deserialize;
use std::path::Path;

/// Rendering options for [`crate::serializer::to_yaml_with`]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SerializerConfig {
    /// Separate mapping entries of block sequences with one blank line
    pub blank_lines_between_items: bool,

    /// Comment lines emitted as `### <line>` above the document
    pub header: Vec<String>,
}

impl Default for SerializerConfig {
    fn default() -> Self {
        Self {
            blank_lines_between_items: true,
            header: Vec::new(),
        }
    }
}

impl SerializerConfig {
    pub fn with_header_line(mut self, line: impl Into<String>) -> Self {
        self.header.push(line.into());
        self
    }

    pub fn compact(mut self) -> Self {
        self.blank_lines_between_items = false;
        self
    }
}

/// Options for [`crate::publish::Publisher`]
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PublishConfig {
    pub serializer: SerializerConfig,

    /// Report a stale file instead of rewriting it
    pub fail_if_changed: bool,
}

impl PublishConfig {
    pub fn from_yaml_str(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = PublishConfig::default();
        assert!(config.serializer.blank_lines_between_items);
        assert!(config.serializer.header.is_empty());
        assert!(!config.fail_if_changed);
    }

    #[test]
    fn test_from_yaml_str_partial() {
        let config = PublishConfig::from_yaml_str(
            "failIfChanged: true\nserializer:\n  header:\n    - DO NOT EDIT\n",
        )
        .unwrap();
        assert!(config.fail_if_changed);
        assert!(config.serializer.blank_lines_between_items);
        assert_eq!(config.serializer.header, vec!["DO NOT EDIT".to_string()]);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "serializer:\n  blankLinesBetweenItems: false").unwrap();

        let config = PublishConfig::from_file(file.path()).unwrap();
        assert!(!config.serializer.blank_lines_between_items);
    }

    #[test]
    fn test_from_file_missing() {
        let err = PublishConfig::from_file("/nonexistent/azpipe.yml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
