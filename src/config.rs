//! Persisted settings for gensecret.
//!
//! Settings are read from a TOML file, by default
//! `~/.config/gensecret/config.toml`. A missing file yields the defaults; a
//! file that exists but does not parse is an error.
//!
//! ```toml
//! [core]
//! autoclip = false
//! cliptimeout = 45
//! showsafecontent = false
//!
//! [generate]
//! length = 24
//! symbols = true
//! external = "pwgen -s"
//!
//! [rules."example.com"]
//! min_length = 8
//! max_length = 20
//! change_url = "https://example.com/account/password"
//!
//! [templates]
//! "websites" = "{{ content }}\nurl: https://{{ name }}"
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

pub const DEFAULT_CONFIG_PATH: &str = "~/.config/gensecret/config.toml";

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub core: CoreConfig,
    pub generate: GenerateConfig,
    /// Domain rules keyed by path segment (usually a hostname)
    pub rules: BTreeMap<String, RuleConfig>,
    /// Templates keyed by directory prefix
    pub templates: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Copy generated passwords to the clipboard when stdout is a terminal
    pub autoclip: bool,
    /// Seconds until the clipboard is cleared
    pub cliptimeout: u64,
    /// Suppress printing when `--print=false` is given explicitly
    pub showsafecontent: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            autoclip: false,
            cliptimeout: 45,
            showsafecontent: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct GenerateConfig {
    /// Default password length, ignored when zero
    pub length: usize,
    /// Include symbols when `--symbols` is not given
    pub symbols: Option<bool>,
    /// Command line of an external password generator
    pub external: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RuleConfig {
    pub min_length: usize,
    pub max_length: usize,
    #[serde(default = "default_true")]
    pub symbols: bool,
    #[serde(default)]
    pub change_url: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load the config at `path`, falling back to defaults if it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)?;
        Self::from_toml(&raw)
            .map_err(|e| Error::Config(format!("failed to parse {}: {}", path.display(), e)))
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        let config: Config = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        for (domain, rule) in &self.rules {
            if rule.min_length == 0 || rule.max_length < rule.min_length {
                return Err(Error::Config(format!(
                    "rule for {} needs 1 <= min_length <= max_length",
                    domain
                )));
            }
        }
        Ok(())
    }
}
