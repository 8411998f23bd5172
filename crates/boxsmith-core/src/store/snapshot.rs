// ── Entity snapshot files ──
//
// One array per kind. The same document can be written as JSON, YAML,
// or TOML; the file extension decides.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::model::{
    DnsRule, DnsServer, Inbound, Outbound, Profile, RouteRule, RuleSet, WireguardEndpoint,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    Json,
    Yaml,
    Toml,
}

impl SnapshotFormat {
    pub fn from_path(path: &Path) -> Result<Self, StoreError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        match extension.as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            "toml" => Ok(Self::Toml),
            _ => Err(StoreError::UnsupportedFormat { extension }),
        }
    }
}

/// Serialized contents of an entity store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub inbounds: Vec<Inbound>,
    #[serde(default)]
    pub outbounds: Vec<Outbound>,
    #[serde(default)]
    pub endpoints: Vec<WireguardEndpoint>,
    #[serde(default)]
    pub route_rules: Vec<RouteRule>,
    #[serde(default)]
    pub rule_sets: Vec<RuleSet>,
    #[serde(default)]
    pub dns_servers: Vec<DnsServer>,
    #[serde(default)]
    pub dns_rules: Vec<DnsRule>,
    #[serde(default)]
    pub profiles: Vec<Profile>,
}

impl StoreSnapshot {
    /// Parse a snapshot, returning the parser's message on failure.
    pub fn parse(raw: &str, format: SnapshotFormat) -> Result<Self, String> {
        match format {
            SnapshotFormat::Json => serde_json::from_str(raw).map_err(|e| e.to_string()),
            SnapshotFormat::Yaml => serde_yaml::from_str(raw).map_err(|e| e.to_string()),
            SnapshotFormat::Toml => toml::from_str(raw).map_err(|e| e.to_string()),
        }
    }
}
