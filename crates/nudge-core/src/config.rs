//! Insight pipeline configuration
//!
//! Config is loaded with a two-layer resolution:
//! 1. Check for override in data dir (~/.local/share/nudge/config/insights.toml)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Keys missing from an override keep their embedded default.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::insights::cache::{DEFAULT_MAX_ENTRIES, DEFAULT_TTL};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/insights.toml");

/// Default bound on a single model call
pub const DEFAULT_MODEL_TIMEOUT: Duration = Duration::from_secs(30);

/// Tuning knobs for the insight pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsightsConfig {
    /// Upper bound on one model call
    pub model_timeout: Duration,
    /// Freshness window for cached results
    pub cache_ttl: Duration,
    /// Maximum number of cached fingerprints
    pub cache_max_entries: usize,
}

impl Default for InsightsConfig {
    fn default() -> Self {
        Self {
            model_timeout: DEFAULT_MODEL_TIMEOUT,
            cache_ttl: DEFAULT_TTL,
            cache_max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

impl InsightsConfig {
    /// Load from the override location, or the embedded defaults
    pub fn load() -> Result<Self> {
        match default_config_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Self::parse(DEFAULT_CONFIG),
        }
    }

    /// Load from an explicit file, layered over the embedded defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let base = Self::parse(DEFAULT_CONFIG)?;
        base.overlay(&content)
    }

    /// Parse config from TOML content over built-in defaults
    pub fn parse(content: &str) -> Result<Self> {
        Self::default().overlay(content)
    }

    fn overlay(mut self, content: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

        if let Some(model) = raw.model {
            if let Some(secs) = model.timeout_secs {
                if secs == 0 {
                    return Err(Error::Config("model.timeout_secs must be positive".into()));
                }
                self.model_timeout = Duration::from_secs(secs);
            }
        }

        if let Some(cache) = raw.cache {
            if let Some(secs) = cache.ttl_secs {
                self.cache_ttl = Duration::from_secs(secs);
            }
            if let Some(max) = cache.max_entries {
                if max == 0 {
                    return Err(Error::Config("cache.max_entries must be positive".into()));
                }
                self.cache_max_entries = max;
            }
        }

        Ok(self)
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("nudge").join("config").join("insights.toml"))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    model: Option<RawModel>,
    cache: Option<RawCache>,
}

#[derive(Debug, Deserialize)]
struct RawModel {
    timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RawCache {
    ttl_secs: Option<u64>,
    max_entries: Option<usize>,
}
