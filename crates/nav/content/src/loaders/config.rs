//! Navigator configuration loader.

use std::path::Path;

use nav_core::NavConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for navigator configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate a [`NavConfig`] from a TOML file.
    ///
    /// Missing keys take their defaults.
    pub fn load(path: &Path) -> LoadResult<NavConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<NavConfig> {
        let config: NavConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid navigator config: {}", e))?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn loads_partial_config_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "seed = 42\nstall_threshold = 3").unwrap();

        let config = ConfigLoader::load(file.path()).unwrap();
        assert_eq!(config.seed, 42);
        assert_eq!(config.stall_threshold, 3);
        assert_eq!(config.history_len, NavConfig::DEFAULT_HISTORY_LEN);
        assert_eq!(config.max_loop_strikes, NavConfig::DEFAULT_MAX_LOOP_STRIKES);
    }

    #[test]
    fn rejects_invalid_values() {
        let err = ConfigLoader::parse("history_len = 12").unwrap_err();
        assert!(err.to_string().contains("history length 12"));

        assert!(ConfigLoader::parse("seed = \"abc\"").is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ConfigLoader::load(&dir.path().join("nav.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read file"));
    }
}
