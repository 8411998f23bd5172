// ── Outbound / proxy chain ──

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::entity_id::EntityId;

/// A proxy server or group.
///
/// `kind` is free-form (`vmess`, `vless`, `shadowsocks`, `selector`, ...);
/// group kinds reference their members through `outbounds`, which may
/// point back at other groups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Outbound {
    pub id: EntityId,
    pub owner: u64,
    #[serde(default)]
    pub share: bool,

    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,

    /// Ordered member ids for group outbounds.
    pub outbounds: Option<Vec<EntityId>>,
    pub region: Option<String>,

    pub address: Option<String>,
    pub port: Option<u16>,
    /// `udp` or `tcp`.
    pub network: Option<String>,
    pub encryption: Option<String>,
    pub packet_encoding: Option<String>,
    pub uuid: Option<String>,
    pub password: Option<String>,
    pub alter_id: Option<u32>,
    pub flow: Option<String>,

    /// Opaque sing-box transport / TLS blocks, passed through untouched.
    pub transport: Option<Value>,
    pub tls: Option<Value>,
}
