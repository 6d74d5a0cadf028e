use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

/// Settings that shape a parser instance.
///
/// Every field has a default so a config file only needs to name what it
/// overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserSettings {
    /// Keep `position` on every produced node.
    pub reserve_position: bool,
    /// Deepest container/inline nesting accepted before parsing aborts.
    pub max_nesting_depth: usize,
    /// Emit `linkReference`/`imageReference` nodes instead of resolving them
    /// into `link`/`image`.
    pub keep_references: bool,
    /// Tokenizer names removed from the default GFM set.
    pub disabled_tokenizers: Vec<String>,
}

impl Default for ParserSettings {
    fn default() -> Self {
        Self {
            reserve_position: true,
            max_nesting_depth: 128,
            keep_references: false,
            disabled_tokenizers: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoomConfig {
    pub parser: ParserSettings,
}

impl LoomConfig {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        // Expand shell variables and tilde before touching the filesystem
        let config_path = Self::expand_path(config_path.as_ref())
            .unwrap_or_else(|| config_path.as_ref().to_path_buf());
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.clone(),
                source,
            }
        })?;

        let config: LoomConfig =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.clone(),
                source,
            })?;

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/markdown-loom");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use tempfile::TempDir;

    #[test]
    fn test_config_path() {
        let config_path = LoomConfig::config_path();
        let path_str = config_path.to_string_lossy();

        assert!(!path_str.starts_with('~'));
        assert!(path_str.ends_with(".config/markdown-loom/config.toml"));
    }

    #[test]
    fn test_defaults() {
        let settings = ParserSettings::default();
        assert!(settings.reserve_position);
        assert_eq!(settings.max_nesting_depth, 128);
        assert!(!settings.keep_references);
        assert!(settings.disabled_tokenizers.is_empty());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: LoomConfig = toml::from_str("[parser]\nkeep_references = true\n").unwrap();

        assert!(config.parser.keep_references);
        assert!(config.parser.reserve_position);
        assert_eq!(config.parser.max_nesting_depth, 128);
    }

    #[test]
    fn test_empty_file_is_default() {
        let config: LoomConfig = toml::from_str("").unwrap();
        assert_eq!(config, LoomConfig::default());
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let path = PathBuf::from("~/test/path");
        let expanded = LoomConfig::expand_path(&path).unwrap();

        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.to_string_lossy().contains("test/path"));
    }

    #[test]
    fn test_expand_path_with_env_var() {
        unsafe {
            env::set_var("LOOM_TEST_VAR", "/test/env/path");
        }

        let path = PathBuf::from("$LOOM_TEST_VAR/subdir");
        let expanded = LoomConfig::expand_path(&path);

        assert_eq!(expanded, Some(PathBuf::from("/test/env/path/subdir")));

        unsafe {
            env::remove_var("LOOM_TEST_VAR");
        }
    }

    #[test]
    fn test_load_nonexistent_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("missing.toml");

        let result = LoomConfig::load_from_path(&config_path).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.toml");

        let original = LoomConfig {
            parser: ParserSettings {
                reserve_position: false,
                max_nesting_depth: 16,
                keep_references: true,
                disabled_tokenizers: vec!["table".to_string(), "math".to_string()],
            },
        };
        original.save_to_path(&config_path).unwrap();

        let loaded = LoomConfig::load_from_path(&config_path).unwrap().unwrap();
        assert_eq!(loaded, original);
    }

    #[test]
    fn test_invalid_toml_reports_path() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(&config_path, "[parser\nreserve_position = ").unwrap();

        let err = LoomConfig::load_from_path(&config_path).unwrap_err();
        assert!(matches!(err, ConfigError::ConfigParseError { .. }));
        assert!(err.to_string().contains("config.toml"));
    }
}
