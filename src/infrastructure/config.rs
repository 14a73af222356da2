//! Configuration management

use crate::domain::fingerprint::{MAX_FINGERPRINT_LEN, MIN_FINGERPRINT_LEN};
use crate::domain::resource::DEFAULT_MARKER_KEY;
use crate::domain::Dialect;
use crate::error::{Result, TaggerError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// File name searched for when no config path is given
pub const CONFIG_FILE_NAME: &str = ".iac-tagger.toml";

/// Environment variable pointing at a config file
pub const CONFIG_ENV_VAR: &str = "IAC_TAGGER_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TaggerConfig {
    /// Tag/label key the marker is stored under
    pub marker_key: String,
    /// Number of hex characters kept from the digest
    pub fingerprint_length: usize,
    /// Upper bound for a single `git log` call
    pub revision_timeout_secs: u64,
    /// Extra file suffixes mapped to a dialect, e.g. `".tofu" = "hcl"`
    pub extensions: BTreeMap<String, Dialect>,
}

impl Default for TaggerConfig {
    fn default() -> Self {
        TaggerConfig {
            marker_key: DEFAULT_MARKER_KEY.to_string(),
            fingerprint_length: MAX_FINGERPRINT_LEN,
            revision_timeout_secs: 10,
            extensions: BTreeMap::new(),
        }
    }
}

impl TaggerConfig {
    /// Load and validate a config file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                TaggerError::Config(format!("Config file not found: {}", path.display()))
            } else {
                TaggerError::Io(e)
            }
        })?;

        let config: TaggerConfig = toml::from_str(&contents).map_err(|e| {
            tracing::warn!(path = %path.display(), "invalid configuration file");
            TaggerError::from(e)
        })?;
        config.validate()?;

        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Resolve configuration: explicit path, then `IAC_TAGGER_CONFIG`,
    /// then the nearest `.iac-tagger.toml` above the current directory.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from_file(path);
        }

        if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR) {
            if !env_path.is_empty() {
                return Self::load_from_file(Path::new(&env_path));
            }
        }

        let current_dir = std::env::current_dir()?;
        match Self::discover_from(&current_dir) {
            Some(path) => Self::load_from_file(&path),
            None => Ok(Self::default()),
        }
    }

    /// Find the nearest config file walking up from `start`
    pub fn discover_from(start: &Path) -> Option<PathBuf> {
        let mut current = Some(start);

        while let Some(dir) = current {
            let candidate = dir.join(CONFIG_FILE_NAME);
            if candidate.is_file() {
                return Some(candidate);
            }
            current = dir.parent();
        }

        None
    }

    pub fn validate(&self) -> Result<()> {
        if self.marker_key.trim().is_empty() {
            return Err(TaggerError::Config(
                "marker_key must not be empty".to_string(),
            ));
        }

        if !(MIN_FINGERPRINT_LEN..=MAX_FINGERPRINT_LEN).contains(&self.fingerprint_length) {
            return Err(TaggerError::Config(format!(
                "fingerprint_length must be between {} and {}, got {}",
                MIN_FINGERPRINT_LEN, MAX_FINGERPRINT_LEN, self.fingerprint_length
            )));
        }

        if self.revision_timeout_secs == 0 {
            return Err(TaggerError::Config(
                "revision_timeout_secs must be greater than 0".to_string(),
            ));
        }

        for suffix in self.extensions.keys() {
            if suffix.is_empty() {
                return Err(TaggerError::Config(
                    "extensions keys must not be empty".to_string(),
                ));
            }
        }

        Ok(())
    }

    pub fn revision_timeout(&self) -> Duration {
        Duration::from_secs(self.revision_timeout_secs)
    }

    /// Build the suffix table used to pick a dialect for each file
    pub fn registry(&self) -> DialectRegistry {
        let mut registry = DialectRegistry::default();
        for (suffix, dialect) in &self.extensions {
            registry.register(suffix, *dialect);
        }
        registry
    }
}

/// Maps file name suffixes to dialects
#[derive(Debug, Clone, PartialEq)]
pub struct DialectRegistry {
    suffixes: BTreeMap<String, Dialect>,
}

impl Default for DialectRegistry {
    fn default() -> Self {
        let mut registry = DialectRegistry {
            suffixes: BTreeMap::new(),
        };
        registry.register(".tf", Dialect::DeclarativeBlock);
        registry.register(".yaml", Dialect::Manifest);
        registry.register(".yml", Dialect::Manifest);
        registry
    }
}

impl DialectRegistry {
    /// Register `suffix` (with or without the leading dot)
    pub fn register(&mut self, suffix: &str, dialect: Dialect) {
        let suffix = if suffix.starts_with('.') {
            suffix.to_lowercase()
        } else {
            format!(".{}", suffix.to_lowercase())
        };
        self.suffixes.insert(suffix, dialect);
    }

    /// Dialect for `path`; the longest matching suffix wins.
    pub fn dialect_for(&self, path: &Path) -> Option<Dialect> {
        let file_name = path.file_name()?.to_string_lossy().to_lowercase();

        self.suffixes
            .iter()
            .filter(|(suffix, _)| file_name.ends_with(suffix.as_str()))
            .max_by_key(|(suffix, _)| suffix.len())
            .map(|(_, dialect)| *dialect)
    }

    pub fn is_supported(&self, path: &Path) -> bool {
        self.dialect_for(path).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = TaggerConfig::default();
        assert_eq!(config.marker_key, "iac_tagger");
        assert_eq!(config.fingerprint_length, 64);
        assert_eq!(config.revision_timeout(), Duration::from_secs(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_partial_config() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(
            &path,
            "marker_key = \"tracking\"\n\n[extensions]\n\".tofu\" = \"hcl\"\n",
        )
        .unwrap();

        let config = TaggerConfig::load_from_file(&path).unwrap();
        assert_eq!(config.marker_key, "tracking");
        assert_eq!(config.fingerprint_length, 64);
        assert_eq!(
            config.extensions.get(".tofu"),
            Some(&Dialect::DeclarativeBlock)
        );
    }

    #[test]
    fn test_invalid_length_is_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "fingerprint_length = 8\n").unwrap();

        match TaggerConfig::load_from_file(&path).unwrap_err() {
            TaggerError::Config(msg) => assert!(msg.contains("fingerprint_length")),
            other => panic!("Expected Config error, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_dialect_is_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "[extensions]\n\".json\" = \"cloudformation\"\n").unwrap();

        let err = TaggerConfig::load_from_file(&path).unwrap_err();
        assert!(matches!(err, TaggerError::TomlDeserialize(_)));
        assert_eq!(err.exit_code(), 5);
    }

    #[test]
    fn test_missing_explicit_file() {
        let temp = TempDir::new().unwrap();
        let err = TaggerConfig::load_from_file(&temp.path().join("nope.toml")).unwrap_err();
        assert_eq!(err.exit_code(), 5);
    }

    #[test]
    fn test_discover_walks_up() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        fs::write(temp.path().join(CONFIG_FILE_NAME), "").unwrap();

        let found = TaggerConfig::discover_from(&nested).unwrap();
        assert_eq!(found, temp.path().join(CONFIG_FILE_NAME));
    }

    #[test]
    fn test_registry_defaults() {
        let registry = DialectRegistry::default();
        assert_eq!(
            registry.dialect_for(Path::new("infra/main.tf")),
            Some(Dialect::DeclarativeBlock)
        );
        assert_eq!(
            registry.dialect_for(Path::new("k8s/app.YML")),
            Some(Dialect::Manifest)
        );
        assert_eq!(registry.dialect_for(Path::new("notes.md")), None);
        assert!(!registry.is_supported(Path::new("Makefile")));
    }

    #[test]
    fn test_registry_longest_suffix_wins() {
        let mut config = TaggerConfig::default();
        config
            .extensions
            .insert(".tf.yaml".to_string(), Dialect::DeclarativeBlock);
        config.extensions.insert("tofu".to_string(), Dialect::DeclarativeBlock);

        let registry = config.registry();
        assert_eq!(
            registry.dialect_for(Path::new("odd.tf.yaml")),
            Some(Dialect::DeclarativeBlock)
        );
        assert_eq!(
            registry.dialect_for(Path::new("plain.yaml")),
            Some(Dialect::Manifest)
        );
        assert_eq!(
            registry.dialect_for(Path::new("main.tofu")),
            Some(Dialect::DeclarativeBlock)
        );
    }
}
