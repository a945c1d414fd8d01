//! Configuration for seeding the root scope of a hub.
//!
//! Raw TOML structs stay private to this crate. They are resolved into the
//! validated [`ScopeConfig`] at the parse boundary, so holding a
//! `ScopeConfig` proves the breadcrumb limit is in range and tag keys are
//! non-empty.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use toml::de;

use scopestack_types::{DEFAULT_MAX_BREADCRUMBS, MAX_BREADCRUMBS, User};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] de::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScopeConfigError {
    #[error("max_breadcrumbs must be between 1 and 100, got {0}")]
    MaxBreadcrumbsOutOfRange(usize),
    #[error("tag keys must not be empty")]
    EmptyTagKey,
    #[error("extra keys must not be empty")]
    EmptyExtraKey,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawScopeConfig {
    max_breadcrumbs: Option<usize>,
    environment: Option<String>,
    release: Option<String>,
    #[serde(default)]
    tags: BTreeMap<String, String>,
    #[serde(default)]
    extra: BTreeMap<String, Value>,
    user: Option<User>,
}

/// Validated seed for a root scope.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawScopeConfig")]
pub struct ScopeConfig {
    max_breadcrumbs: usize,
    environment: Option<String>,
    release: Option<String>,
    tags: BTreeMap<String, String>,
    extra: BTreeMap<String, Value>,
    user: Option<User>,
}

impl TryFrom<RawScopeConfig> for ScopeConfig {
    type Error = ScopeConfigError;

    fn try_from(raw: RawScopeConfig) -> Result<Self, Self::Error> {
        let max_breadcrumbs = raw.max_breadcrumbs.unwrap_or(DEFAULT_MAX_BREADCRUMBS);
        if max_breadcrumbs == 0 || max_breadcrumbs > MAX_BREADCRUMBS {
            return Err(ScopeConfigError::MaxBreadcrumbsOutOfRange(max_breadcrumbs));
        }
        if raw.tags.keys().any(|key| key.trim().is_empty()) {
            return Err(ScopeConfigError::EmptyTagKey);
        }
        if raw.extra.keys().any(|key| key.trim().is_empty()) {
            return Err(ScopeConfigError::EmptyExtraKey);
        }
        Ok(Self {
            max_breadcrumbs,
            environment: non_blank(raw.environment),
            release: non_blank(raw.release),
            tags: raw.tags,
            extra: raw.extra,
            user: raw.user.filter(|user| !user.is_empty()),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            max_breadcrumbs: DEFAULT_MAX_BREADCRUMBS,
            environment: None,
            release: None,
            tags: BTreeMap::new(),
            extra: BTreeMap::new(),
            user: None,
        }
    }
}

impl ScopeConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(
            path = %path.display(),
            max_breadcrumbs = config.max_breadcrumbs,
            tags = config.tags.len(),
            "Loaded scope config"
        );
        Ok(config)
    }

    /// Loads `~/.scopestack/config.toml`.
    ///
    /// A missing file (or no home directory) is not an error and yields the defaults.
    pub fn load_default() -> Result<Self, ConfigError> {
        Self::load_or_default(Self::default_path().as_deref())
    }

    fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            tracing::trace!("No home directory; using default scope config");
            return Ok(Self::default());
        };
        if !path.exists() {
            tracing::trace!(path = %path.display(), "No scope config found; using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".scopestack").join("config.toml"))
    }

    #[must_use]
    pub fn max_breadcrumbs(&self) -> usize {
        self.max_breadcrumbs
    }

    #[must_use]
    pub fn environment(&self) -> Option<&str> {
        self.environment.as_deref()
    }

    #[must_use]
    pub fn release(&self) -> Option<&str> {
        self.release.as_deref()
    }

    #[must_use]
    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    #[must_use]
    pub fn extra(&self) -> &BTreeMap<String, Value> {
        &self.extra
    }

    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }
}
