// ── Core configuration ──
//
// Plain option structs handed to the compiler and sinks at call time.
// Loading them from files and the environment is `boxsmith-config`'s job.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default cap on nested outbound resolution.
pub const DEFAULT_MAX_DEPTH: usize = 16;

/// Options for one compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileOptions {
    /// Deepest nested outbound level resolved below a top-level outbound.
    /// References beyond it are omitted.
    pub max_depth: usize,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// How a compiled document leaves the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum DeliveryMethod {
    /// Return the document inline.
    #[default]
    Direct,
    /// Upload to object storage and return its URL.
    ObjectStore,
}

/// Object storage settings for `DeliveryMethod::ObjectStore`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectStoreConfig {
    /// Directory standing in for the bucket root.
    pub root: Option<PathBuf>,
    /// Public host serving the bucket, without scheme.
    pub public_domain: Option<String>,
}
