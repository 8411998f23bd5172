// ── Route and DNS rules ──

use serde::{Deserialize, Serialize};

use super::entity_id::EntityId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RuleAction {
    Route,
    Reject,
}

/// Routing rule. `outbound` is only meaningful for `RuleAction::Route`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteRule {
    pub id: EntityId,
    pub owner: u64,
    #[serde(default)]
    pub share: bool,

    pub name: String,
    pub action: RuleAction,
    pub outbound: Option<EntityId>,

    pub domains: Option<Vec<String>>,
    pub domain_suffixes: Option<Vec<String>>,
    pub domain_keywords: Option<Vec<String>>,
    pub domain_regexes: Option<Vec<String>>,
    pub rule_sets: Option<Vec<EntityId>>,
}

/// DNS rule. A missing action behaves like `route`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DnsRule {
    pub id: EntityId,
    pub owner: u64,
    #[serde(default)]
    pub share: bool,

    pub name: String,
    pub action: Option<RuleAction>,
    pub server: Option<EntityId>,

    pub domains: Option<Vec<String>>,
    pub domain_suffixes: Option<Vec<String>>,
    pub domain_keywords: Option<Vec<String>>,
    pub rule_sets: Option<Vec<EntityId>>,
}

impl DnsRule {
    pub fn is_reject(&self) -> bool {
        self.action == Some(RuleAction::Reject)
    }
}
