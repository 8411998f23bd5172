// ── Core error types ──
//
// Hard failures only. A reference that does not resolve is not an error
// here: exporters report it as an `Omission` and carry on.

use std::path::PathBuf;

use thiserror::Error;

use crate::model::{EntityId, EntityKind, EntityRef};

/// An exporter built a fragment that breaks its own contract.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("{kind} #{id} violates its export contract: {detail}")]
    ShapeViolation {
        kind: EntityKind,
        id: EntityId,
        detail: String,
    },

    #[error("Export contract unavailable: {0}")]
    Contract(#[from] ContractError),
}

/// The embedded contract document could not be loaded or compiled.
#[derive(Debug, Clone, Error)]
#[error("{contract} contract: {detail}")]
pub struct ContractError {
    pub contract: String,
    pub detail: String,
}

/// Failure of a whole compile. No partial document accompanies any of these.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("Profile not found: {id}")]
    ProfileNotFound { id: EntityId },

    #[error(transparent)]
    Fragment(#[from] ExportError),

    #[error("Compiled document is invalid: {detail}")]
    DocumentInvalid { detail: String },

    #[error("Failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Loading an entity snapshot into a `DataStore`.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Cannot read entity store {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported entity store format '{extension}' (expected json, yaml, or toml)")]
    UnsupportedFormat { extension: String },

    #[error("Malformed entity store {path}: {detail}")]
    Parse { path: PathBuf, detail: String },

    #[error("Duplicate {entity} in entity store")]
    DuplicateId { entity: EntityRef },
}

/// Delivering a compiled document.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Object storage not configured")]
    NotConfigured,

    #[error("Object upload to '{key}' failed: {source}")]
    Upload {
        key: String,
        #[source]
        source: std::io::Error,
    },
}

/// Fail-closed access check performed before compiling on a user's behalf.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccessError {
    #[error("Profile {profile} does not belong to user {user}")]
    ProfileForbidden { profile: EntityId, user: u64 },

    #[error("Some {kind} entries are missing or not accessible: {ids:?}")]
    Inaccessible { kind: EntityKind, ids: Vec<EntityId> },
}
