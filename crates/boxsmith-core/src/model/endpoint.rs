// ── WireGuard endpoint ──

use serde::{Deserialize, Serialize};

use super::entity_id::EntityId;

/// A WireGuard interface with its embedded peer list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireguardEndpoint {
    pub id: EntityId,
    pub owner: u64,
    #[serde(default)]
    pub share: bool,

    pub name: String,
    /// Use a system interface instead of the userspace stack.
    #[serde(default)]
    pub system: bool,
    pub addresses: Vec<String>,
    pub private_key: String,
    pub public_key: String,
    pub preshared_key: Option<String>,
    #[serde(default)]
    pub peers: Vec<Peer>,
    pub mtu: Option<u32>,
}

/// A peer embedded in an endpoint.
///
/// `id`, when present, names another endpoint whose public and
/// preshared keys this peer borrows at export time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Peer {
    pub id: Option<EntityId>,
    pub address: String,
    pub port: u16,
    #[serde(default)]
    pub allowed_ips: Vec<String>,
}
