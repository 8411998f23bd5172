//! CLI error types with miette diagnostics.
//!
//! Maps core, config, and sink errors into user-facing errors with
//! actionable help text and distinct exit codes.

use miette::Diagnostic;
use thiserror::Error;

use boxsmith_config::ConfigError;
use boxsmith_core::{AccessError, CompileError, ExportError, SinkError, StoreError};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const INVALID: i32 = 6;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Entity store ─────────────────────────────────────────────────

    #[error("No entity store given")]
    #[diagnostic(
        code(boxsmith::no_store),
        help(
            "Pass --store <file>, set BOXSMITH_STORE, or set defaults.store in\n\
             {path}"
        )
    )]
    NoStore { path: String },

    #[error(transparent)]
    #[diagnostic(
        code(boxsmith::store),
        help("The store holds one array per kind: inbounds, outbounds, endpoints, route_rules, rule_sets, dns_servers, dns_rules, profiles.")
    )]
    Store(#[from] StoreError),

    #[error("{resource_type} #{identifier} not found")]
    #[diagnostic(
        code(boxsmith::not_found),
        help("Run: boxsmith list {list_kind} to see stored entries")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_kind: String,
    },

    // ── Access ───────────────────────────────────────────────────────

    #[error(transparent)]
    #[diagnostic(
        code(boxsmith::forbidden),
        help("Entities must be owned by --user or shared; profiles must be created by --user.")
    )]
    Forbidden(#[from] AccessError),

    // ── Compilation ──────────────────────────────────────────────────

    #[error(transparent)]
    #[diagnostic(code(boxsmith::export))]
    Export(#[from] ExportError),

    #[error(transparent)]
    #[diagnostic(code(boxsmith::compile))]
    Compile(CompileError),

    #[error("{failed} of {total} profiles failed the check")]
    #[diagnostic(code(boxsmith::check_failed))]
    CheckFailed { failed: usize, total: usize },

    // ── Delivery ─────────────────────────────────────────────────────

    #[error(transparent)]
    #[diagnostic(
        code(boxsmith::sink),
        help("Set sink.object_root in the config file or pass --object-root.")
    )]
    Sink(#[from] SinkError),

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(boxsmith::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Configuration file already exists")]
    #[diagnostic(
        code(boxsmith::config_exists),
        help("Use --force to overwrite {path}")
    )]
    ConfigExists { path: String },

    #[error(transparent)]
    #[diagnostic(code(boxsmith::config))]
    Config(#[from] ConfigError),

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON rendering failed: {0}")]
    #[diagnostic(code(boxsmith::json))]
    Json(#[from] serde_json::Error),

    #[error("YAML rendering failed: {0}")]
    #[diagnostic(code(boxsmith::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Forbidden(_) => exit_code::PERMISSION,
            Self::Validation { .. } | Self::NoStore { .. } | Self::ConfigExists { .. } => {
                exit_code::USAGE
            }
            Self::Compile(_) | Self::Export(_) | Self::CheckFailed { .. } => exit_code::INVALID,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CompileError → CliError mapping ──────────────────────────────────

impl From<CompileError> for CliError {
    fn from(err: CompileError) -> Self {
        match err {
            CompileError::ProfileNotFound { id } => CliError::NotFound {
                resource_type: "profile".into(),
                identifier: id.to_string(),
                list_kind: "profile".into(),
            },
            CompileError::Fragment(err) => CliError::Export(err),
            other => CliError::Compile(other),
        }
    }
}
