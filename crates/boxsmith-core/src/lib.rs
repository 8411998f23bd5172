//! Compilation engine turning stored proxy building blocks into sing-box
//! configuration documents.
//!
//! - **[`DataStore`]**: in-memory entity storage behind the [`EntityStore`]
//!   lookup trait, loaded from a JSON, YAML or TOML snapshot.
//!
//! - **[`Exporter`]**: one exporter per entity kind. Each resolves a stored
//!   record into its sing-box fragment, replaces referenced ids with tags
//!   (recursively for outbound groups) and checks the fragment against its
//!   [`contract`]. References that do not resolve are reported as
//!   [`Omission`]s rather than errors.
//!
//! - **[`ProfileCompiler`]**: exports every list a [`Profile`] references
//!   concurrently, picks `route.final` and validates the assembled
//!   [`Document`].
//!
//! - **[`sink`]**: inline or object-storage delivery of a [`Compiled`]
//!   document.
//!
//! - **[`access`]**: owner/shared predicates applied before compiling on a
//!   user's behalf.

pub mod access;
pub mod compile;
pub mod config;
pub mod contract;
pub mod error;
pub mod export;
pub mod model;
pub mod singbox;
pub mod sink;
pub mod store;
pub mod tag;

// ── Primary re-exports ──────────────────────────────────────────────
pub use compile::{Compiled, ProfileCompiler};
pub use config::{CompileOptions, DeliveryMethod, ObjectStoreConfig};
pub use error::{AccessError, CompileError, ExportError, SinkError, StoreError};
pub use export::{Exporter, Omission, OmissionReason, Outcome};
pub use sink::{Delivery, DirectoryObjectStore, ObjectStore};
pub use singbox::Document;
pub use store::{DataStore, EntityStore, StoreSnapshot};

pub use model::{
    DnsRule, DnsServer, DnsServerKind, EntityId, EntityKind, EntityRef, Inbound, InboundKind,
    Outbound, Profile, RouteRule, RuleAction, RuleSet, RuleSetKind, WireguardEndpoint,
};
