//! Planner configuration
//!
//! ## Configuration Resolution
//!
//! Later layers win:
//! 1. Embedded defaults (compiled into binary)
//! 2. Override file: an explicit path, or
//!    `~/.local/share/fintrack/config/planner.toml` if it exists
//! 3. Environment: `FINTRACK_BACKEND_URL`, `FINTRACK_TIMEOUT_SECS`
//!
//! Command-line flags are applied on top by the caller.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::budget::{DEFAULT_BALANCE_TOLERANCE, DEFAULT_WARNING_RATIO};
use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/planner.toml");

pub const ENV_BACKEND_URL: &str = "FINTRACK_BACKEND_URL";
pub const ENV_TIMEOUT_SECS: &str = "FINTRACK_TIMEOUT_SECS";

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackendConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl BackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannerSettings {
    pub warning_ratio: f64,
    pub balance_tolerance: f64,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            warning_ratio: DEFAULT_WARNING_RATIO,
            balance_tolerance: DEFAULT_BALANCE_TOLERANCE,
        }
    }
}

/// Resolved configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlannerConfig {
    pub backend: BackendConfig,
    pub planner: PlannerSettings,
    /// File the override layer came from, if any
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl PlannerConfig {
    /// Resolve embedded defaults, override file and environment
    ///
    /// An explicit `path` must exist; the default override location is
    /// only used when present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = Self::load_file(path)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Resolve embedded defaults and override file only
    pub fn load_file(path: Option<&Path>) -> Result<Self> {
        let mut config = parse_config(DEFAULT_CONFIG, Self::default())?;

        let override_path = match path {
            Some(p) => {
                if !p.exists() {
                    return Err(Error::Config(format!(
                        "Config file not found: {}",
                        p.display()
                    )));
                }
                Some(p.to_path_buf())
            }
            None => default_config_path().filter(|p| p.exists()),
        };

        if let Some(p) = override_path {
            let content = fs::read_to_string(&p)?;
            config = parse_config(&content, config)?;
            tracing::debug!(path = %p.display(), "Loaded config override");
            config.source = Some(p);
        }

        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_BACKEND_URL).filter(|v| !v.trim().is_empty()) {
            self.backend.base_url = url.trim().to_string();
        }

        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            self.backend.timeout_secs = raw.trim().parse().map_err(|_| {
                Error::Config(format!(
                    "{} must be a whole number of seconds, got {:?}",
                    ENV_TIMEOUT_SECS, raw
                ))
            })?;
        }

        self.validate()
    }

    /// Override the backend URL (command-line flag)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Result<Self> {
        self.backend.base_url = base_url.into();
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        let url = &self.backend.base_url;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "backend.base_url must be an http(s) URL, got {:?}",
                url
            )));
        }
        if self.backend.timeout_secs == 0 {
            return Err(Error::Config("backend.timeout_secs must be positive".into()));
        }

        let ratio = self.planner.warning_ratio;
        if !(ratio.is_finite() && ratio > 0.0 && ratio <= 1.0) {
            return Err(Error::Config(format!(
                "planner.warning_ratio must be in (0, 1], got {}",
                ratio
            )));
        }

        let tolerance = self.planner.balance_tolerance;
        if !(tolerance.is_finite() && tolerance > 0.0) {
            return Err(Error::Config(format!(
                "planner.balance_tolerance must be positive, got {}",
                tolerance
            )));
        }

        Ok(())
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("fintrack").join("config").join("planner.toml"))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    backend: Option<RawBackend>,
    planner: Option<RawPlanner>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawBackend {
    base_url: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPlanner {
    warning_ratio: Option<f64>,
    balance_tolerance: Option<f64>,
}

/// Layer TOML content over `base`
fn parse_config(content: &str, base: PlannerConfig) -> Result<PlannerConfig> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let mut config = base;

    if let Some(backend) = raw.backend {
        if let Some(url) = backend.base_url {
            config.backend.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(timeout) = backend.timeout_secs {
            config.backend.timeout_secs = timeout;
        }
    }

    if let Some(planner) = raw.planner {
        if let Some(ratio) = planner.warning_ratio {
            config.planner.warning_ratio = ratio;
        }
        if let Some(tolerance) = planner.balance_tolerance {
            config.planner.balance_tolerance = tolerance;
        }
    }

    Ok(config)
}
