//! Optional settings from ~/.config/feedns/config.toml.
//!
//! Controls case folding, how opening tags are named, the reader's depth
//! limit, and extra namespace URIs layered over the built-in registry. With
//! no file, every setting takes its default. Keys feedns doesn't know are
//! logged and otherwise ignored.
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

use crate::namespace::scope::is_valid_prefix;
use crate::namespace::{NamespaceRegistry, NormalizerOptions};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// SEC-014: Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),

    /// A `[namespaces]` entry maps a URI to something that cannot be a prefix.
    #[error("Invalid canonical prefix {prefix:?} for namespace {uri}")]
    InvalidPrefix { uri: String, prefix: String },
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Top-level configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
/// Missing keys fall back to `Default::default()`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Lowercase local names while canonicalizing.
    pub fold_case: bool,

    /// Resolve an element's name with its own declarations in scope.
    pub self_scoped_names: bool,

    /// SEC-003: Maximum element nesting accepted by the document reader.
    pub max_depth: usize,

    /// Extra namespace URIs mapped to canonical prefixes. Entries override
    /// the built-in table for the same URI.
    pub namespaces: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fold_case: false,
            self_scoped_names: false,
            max_depth: crate::feed::DEFAULT_MAX_DEPTH,
            namespaces: BTreeMap::new(),
        }
    }
}

impl Config {
    /// SEC-014: Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    /// Reads the settings in `path`.
    ///
    /// With no file, or a blank one, every setting takes its default. A
    /// `[namespaces]` entry whose canonical prefix is not an identifier
    /// fails with [`ConfigError::InvalidPrefix`]. Keys feedns doesn't know
    /// are logged and skipped.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let Some(content) = Self::read_capped(path)? else {
            tracing::debug!(path = %path.display(), "No config file found, using defaults");
            return Ok(Self::default());
        };
        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(table) = content.parse::<toml::Table>() {
            warn_unknown_keys(&table);
        }

        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        tracing::info!(
            path = %path.display(),
            fold_case = config.fold_case,
            self_scoped_names = config.self_scoped_names,
            namespaces = config.namespaces.len(),
            "Loaded configuration"
        );
        Ok(config)
    }

    /// SEC-014: Refuses files over `MAX_FILE_SIZE` before reading
    /// them. `None` when there is no file at `path`.
    fn read_capped(path: &Path) -> Result<Option<String>, ConfigError> {
        let size = match std::fs::metadata(path) {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if size > Self::MAX_FILE_SIZE {
            return Err(ConfigError::TooLarge(format!(
                "{} is {} bytes (max {} bytes)",
                path.display(),
                size,
                Self::MAX_FILE_SIZE
            )));
        }

        match std::fs::read_to_string(path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Checks every `[namespaces]` entry names a usable prefix.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (uri, prefix) in &self.namespaces {
            if !is_valid_prefix(prefix) {
                return Err(ConfigError::InvalidPrefix {
                    uri: uri.clone(),
                    prefix: prefix.clone(),
                });
            }
        }
        Ok(())
    }

    /// Built-in namespace table extended with the configured entries.
    pub fn registry(&self) -> NamespaceRegistry {
        NamespaceRegistry::builtin().with_entries(
            self.namespaces
                .iter()
                .map(|(uri, prefix)| (uri.as_str(), prefix.clone())),
        )
    }

    pub fn normalizer_options(&self) -> NormalizerOptions {
        NormalizerOptions {
            fold_case: self.fold_case,
            self_scoped_names: self.self_scoped_names,
        }
    }
}

const KNOWN_KEYS: [&str; 4] = ["fold_case", "self_scoped_names", "max_depth", "namespaces"];

fn warn_unknown_keys(table: &toml::Table) {
    for key in table.keys() {
        if !KNOWN_KEYS.contains(&key.as_str()) {
            tracing::warn!(key = %key, "Unknown key in config file, ignoring");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
