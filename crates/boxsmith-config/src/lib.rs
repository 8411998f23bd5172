//! Configuration for the boxsmith CLI.
//!
//! Serialized defaults, then `config.toml` at the platform config path,
//! then `BOXSMITH_` environment variables (nested keys split on `__`,
//! e.g. `BOXSMITH_SINK__PUBLIC_DOMAIN`). Translates into the option
//! structs `boxsmith_core` takes at call time.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use boxsmith_core::config::DEFAULT_MAX_DEPTH;
use boxsmith_core::{CompileOptions, DeliveryMethod, ObjectStoreConfig};

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "BOXSMITH_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub defaults: Defaults,

    #[serde(default)]
    pub sink: SinkSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Entity store file used when `--store` is not given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store: Option<PathBuf>,

    /// Nested outbound levels resolved before a chain is cut.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            store: None,
            max_depth: default_max_depth(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

/// Where `export` sends compiled documents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct SinkSettings {
    #[serde(default)]
    pub method: DeliveryMethod,

    /// Directory standing in for the object-store bucket.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_root: Option<PathBuf>,

    /// Host serving uploaded objects publicly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_domain: Option<String>,
}

impl Config {
    pub fn compile_options(&self) -> Result<CompileOptions, ConfigError> {
        if self.defaults.max_depth == 0 {
            return Err(ConfigError::Validation {
                field: "defaults.max_depth".into(),
                reason: "must be at least 1".into(),
            });
        }
        Ok(CompileOptions {
            max_depth: self.defaults.max_depth,
        })
    }

    pub fn object_store(&self) -> ObjectStoreConfig {
        ObjectStoreConfig {
            root: self.sink.object_root.clone(),
            public_domain: self.sink.public_domain.clone(),
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("dev", "boxsmith", "boxsmith").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("boxsmith");
    p
}

// ── Config loading ──────────────────────────────────────────────────

fn figment(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
}

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file; a missing file contributes nothing.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let config: Config = figment(path).extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}
