//! CLI configuration: thin wrapper around `boxsmith_config`.
//!
//! Re-exports the shared types and resolves settings where a global flag
//! overrides the config file (`--store`, `--output`, `--color`, `--max-depth`).

use std::path::PathBuf;

use clap::ValueEnum;

use boxsmith_core::{CompileOptions, DataStore};

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use boxsmith_config::{Config, config_path, load_config, save_config};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Settings for one invocation after flags are applied over the config.
#[derive(Debug)]
pub struct Resolved {
    pub config: Config,
    pub output: OutputFormat,
    pub color: ColorMode,
}

impl Resolved {
    pub fn new(global: &GlobalOpts) -> Result<Self, CliError> {
        let config = load_config()?;
        let output = match global.output {
            Some(format) => format,
            None => parse_setting("defaults.output", &config.defaults.output)?,
        };
        let color = match global.color {
            Some(mode) => mode,
            None => parse_setting("defaults.color", &config.defaults.color)?,
        };
        Ok(Self {
            config,
            output,
            color,
        })
    }

    /// `--store`, else `defaults.store`.
    pub fn store_path(&self, global: &GlobalOpts) -> Result<PathBuf, CliError> {
        global
            .store
            .clone()
            .or_else(|| self.config.defaults.store.clone())
            .ok_or_else(|| CliError::NoStore {
                path: config_path().display().to_string(),
            })
    }

    pub async fn open_store(&self, global: &GlobalOpts) -> Result<DataStore, CliError> {
        let path = self.store_path(global)?;
        Ok(DataStore::load(&path).await?)
    }

    pub fn compile_options(&self, global: &GlobalOpts) -> Result<CompileOptions, CliError> {
        let mut options = self.config.compile_options()?;
        if let Some(depth) = global.max_depth {
            options.max_depth = depth;
        }
        Ok(options)
    }
}

fn parse_setting<T: ValueEnum>(field: &str, value: &str) -> Result<T, CliError> {
    T::from_str(value, true).map_err(|reason| CliError::Validation {
        field: field.into(),
        reason,
    })
}
