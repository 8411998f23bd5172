// ── DNS server ──

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::entity_id::EntityId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DnsServerKind {
    Udp,
    Https,
    Http3,
    Quic,
    Tls,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HttpsOptions {
    pub path: Option<String>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

/// Upstream resolver.
///
/// At most one detour is expected; when both are stored the outbound wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DnsServer {
    pub id: EntityId,
    pub owner: u64,
    #[serde(default)]
    pub share: bool,

    pub name: String,
    #[serde(rename = "type")]
    pub kind: DnsServerKind,
    pub address: String,
    pub port: Option<u16>,

    pub outbound_detour: Option<EntityId>,
    pub wg_endpoint_detour: Option<EntityId>,

    pub tls: Option<Value>,
    pub https: Option<HttpsOptions>,
}
