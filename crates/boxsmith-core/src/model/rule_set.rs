// ── Rule set ──

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::entity_id::EntityId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RuleSetKind {
    Inline,
    #[default]
    Remote,
}

/// Reusable match conditions, inline or fetched from `url`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSet {
    pub id: EntityId,
    pub owner: u64,
    #[serde(default)]
    pub share: bool,

    #[serde(rename = "type", default)]
    pub kind: RuleSetKind,
    pub name: String,
    /// Headless rule objects, passed through untouched.
    pub rules: Option<Vec<Value>>,
    pub url: Option<String>,
}
