//! Configuration file support for research-feed.
//!
//! # Configuration File Format
//!
//! ```toml
//! [index]
//! api_base = "https://inspirehep.net/api"
//! site_base = "https://inspirehep.net"
//! query = "a Edward.Hirst.1"
//! profile_url = "https://inspirehep.net/authors/1791403"
//! export_format = "bibtex"
//! timeout_secs = 30
//!
//! [display]
//! default_window = 3
//! max_publications = 6
//! author_limit = 8
//!
//! [typeset]
//! command = "mathjax-render"
//! args = []
//!
//! [logging]
//! level = "info"
//! format = "json"
//! ```

use std::path::Path;

use crate::config::Config;

/// File name looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "research-feed.toml";

impl Config {
    /// Load configuration from a TOML file, without environment overrides
    pub fn load_file(path: &Path) -> Result<Self, ConfigFileError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigFileError::Io(e.to_string()))?;

        toml::from_str(&content).map_err(|e| ConfigFileError::Parse(e.to_string()))
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: &Path) -> Result<(), ConfigFileError> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigFileError::Serialize(e.to_string()))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ConfigFileError::Io(e.to_string()))?;
        }

        std::fs::write(path, content).map_err(|e| ConfigFileError::Io(e.to_string()))
    }
}

/// Configuration file errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Serialize error: {0}")]
    Serialize(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[test]
    fn test_config_file_save_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.index.query = "a Saved.Author.1".to_string();
        config.display.default_window = 4;
        config.typeset.command = Some("tex2svg".to_string());

        config.save(&path).unwrap();

        let loaded = Config::load_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_config_file_nonexistent() {
        let path = PathBuf::from("/nonexistent/config.toml");
        assert!(matches!(Config::load_file(&path), Err(ConfigFileError::Io(_))));
    }

    #[test]
    fn test_config_file_invalid_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("invalid.toml");

        std::fs::write(&path, "invalid = toml = content").unwrap();

        assert!(matches!(Config::load_file(&path), Err(ConfigFileError::Parse(_))));
    }
}
