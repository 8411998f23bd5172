// ── Inbound listener ──

use serde::{Deserialize, Serialize};

use super::entity_id::EntityId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum InboundKind {
    Mixed,
    Tun,
}

/// A local listener (`mixed` proxy port or `tun` device).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inbound {
    pub id: EntityId,
    pub owner: u64,
    #[serde(default)]
    pub share: bool,

    #[serde(rename = "type")]
    pub kind: InboundKind,
    pub address: Option<String>,
    pub port: Option<u16>,

    /// TUN network stack (`system`, `gvisor`, `mixed`).
    pub stack: Option<String>,
    pub mtu: Option<u32>,
}
