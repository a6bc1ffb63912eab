use action_types::coin::validate_denom;
use action_types::{validate_address, DEFAULT_ADDRESS_PREFIX, DEFAULT_FEE_DENOM};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};

/// Governance module account, the default parameter authority
pub const DEFAULT_AUTHORITY: &str = "lumera10d07y265gmmuvt4z0w9aw880jnsr700jzan7cp";

/// Action module account; holds escrowed fees and reports evidence
pub const DEFAULT_MODULE_ADDRESS: &str = "lumera1hkfcc6y0fxmhcl79xlrtjg3w9jt7hhwk96zj4h";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeeperConfig {
    /// Bech32 human-readable prefix every account address must carry
    pub address_prefix: String,
    /// Only account allowed to replace module parameters
    pub authority: String,
    pub module_address: String,
    pub denom: String,
    pub sweeper: SweeperConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweeperConfig {
    pub enabled: bool,
    pub interval_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty`, `compact` or `json`
    pub format: String,
    pub module_filters: HashMap<String, String>,
    pub file_output: Option<PathBuf>,
}

impl Default for KeeperConfig {
    fn default() -> Self {
        Self {
            address_prefix: DEFAULT_ADDRESS_PREFIX.to_string(),
            authority: DEFAULT_AUTHORITY.to_string(),
            module_address: DEFAULT_MODULE_ADDRESS.to_string(),
            denom: DEFAULT_FEE_DENOM.to_string(),
            sweeper: SweeperConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 6,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            module_filters: HashMap::new(),
            file_output: None,
        }
    }
}

impl KeeperConfig {
    /// Read `path`, apply `ACTION_*` environment overrides, then validate
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let mut config: Self = toml::from_str(&content)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Apply environment variable overrides; unparsable numbers are ignored
    pub fn apply_env_overrides(&mut self) {
        if let Ok(authority) = env::var("ACTION_AUTHORITY") {
            self.authority = authority;
        }
        if let Ok(prefix) = env::var("ACTION_ADDRESS_PREFIX") {
            self.address_prefix = prefix;
        }
        if let Ok(interval) = env::var("ACTION_SWEEPER_INTERVAL_SECS") {
            if let Ok(secs) = interval.parse() {
                self.sweeper.interval_secs = secs;
            }
        }
        if let Ok(level) = env::var("ACTION_LOG_LEVEL") {
            self.logging.level = level;
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_address(&self.address_prefix, &self.authority)
            .with_context(|| format!("invalid authority {}", self.authority))?;
        validate_address(&self.address_prefix, &self.module_address)
            .with_context(|| format!("invalid module address {}", self.module_address))?;
        validate_denom(&self.denom)?;

        if self.sweeper.enabled && self.sweeper.interval_secs == 0 {
            bail!("sweeper.interval_secs must be > 0 when the sweeper is enabled");
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "compact" | "json") {
            bail!("unknown logging format '{}'", self.logging.format);
        }
        Ok(())
    }
}
