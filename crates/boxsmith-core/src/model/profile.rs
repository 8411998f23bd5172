// ── Profile ──

use serde::{Deserialize, Serialize};

use super::entity_id::{EntityId, EntityKind};

/// A named bundle of entity references compiled into one document.
///
/// Profiles are private to their creator; they have no `share` column.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Profile {
    pub id: EntityId,
    pub created_by: u64,
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub inbounds: Vec<EntityId>,
    #[serde(default)]
    pub outbounds: Vec<EntityId>,
    /// Default route target; must also appear in `outbounds` to take effect.
    pub route_final: Option<EntityId>,
    #[serde(default)]
    pub wg_endpoints: Vec<EntityId>,
    #[serde(default)]
    pub rules: Vec<EntityId>,
    #[serde(default)]
    pub rule_sets: Vec<EntityId>,
    #[serde(default)]
    pub dns_rules: Vec<EntityId>,
    #[serde(default)]
    pub dns: Vec<EntityId>,
}

impl Profile {
    /// Every reference the profile holds, grouped by kind, in list order.
    pub fn references(&self) -> [(EntityKind, Vec<EntityId>); 7] {
        let mut outbounds = self.outbounds.clone();
        if let Some(id) = self.route_final {
            if !outbounds.contains(&id) {
                outbounds.push(id);
            }
        }
        [
            (EntityKind::Inbound, self.inbounds.clone()),
            (EntityKind::Outbound, outbounds),
            (EntityKind::Endpoint, self.wg_endpoints.clone()),
            (EntityKind::RouteRule, self.rules.clone()),
            (EntityKind::RuleSet, self.rule_sets.clone()),
            (EntityKind::DnsRule, self.dns_rules.clone()),
            (EntityKind::DnsServer, self.dns.clone()),
        ]
    }
}
