//! TOML configuration for the circlet front end.
//!
//! Every section is optional; a missing file or an empty one yields the
//! defaults (SHA-1 tokens, 1024 collision probes, `info` logging).

use std::path::Path;

use anyhow::Context;
use circlet_ring::{DEFAULT_MAX_PROBES, HasherKind, Ring};
use serde::Deserialize;

/// Top-level configuration, parsed from TOML.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Ring behaviour.
    pub ring: RingSection,
    /// Logging configuration.
    pub log: LogSection,
}

/// `[ring]` section.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RingSection {
    /// Token hash function: `"sha1"` (default) or `"blake3"`.
    pub hasher: HasherKind,
    /// Maximum collision probes per inserted value.
    pub max_probes: Option<u32>,
}

/// `[log]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LogSection {
    /// Log level filter (e.g. `"info"`, `"debug"`, `"warn"`).
    pub level: String,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl CliConfig {
    /// Load config from a TOML file, or use defaults if no path given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(p) => {
                let content = std::fs::read_to_string(p)
                    .with_context(|| format!("failed to read {}", p.display()))?;
                let config: CliConfig = toml::from_str(&content)
                    .with_context(|| format!("failed to parse {}", p.display()))?;
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }

    /// Parse config from a TOML string (used in tests).
    #[cfg(test)]
    pub fn from_toml(s: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Effective collision probe cap.
    pub fn max_probes(&self) -> u32 {
        self.ring.max_probes.unwrap_or(DEFAULT_MAX_PROBES)
    }

    /// Build an empty ring with the configured hasher and probe cap.
    pub fn build_ring(&self) -> Ring<HasherKind> {
        Ring::with_hasher(self.ring.hasher).with_max_probes(self.max_probes())
    }
}
