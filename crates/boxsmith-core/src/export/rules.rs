// ── Route and DNS rule exporters ──
//
// Rules have no tag of their own. Their references (rule sets, the
// target outbound or server) are exported and replaced by tags, and a
// reference that does not resolve simply leaves its field out.

use tracing::debug;

use super::{Exporter, Outcome, non_empty, references, validated};
use crate::contract::Contract;
use crate::error::ExportError;
use crate::model::{EntityId, EntityKind, EntityRef, RuleAction};
use crate::singbox::{DnsRuleRecord, RouteRuleRecord};
use crate::store::EntityStore;

impl<S: EntityStore> Exporter<'_, S> {
    /// Export a route rule. `reject` never carries an outbound.
    pub async fn route_rule(&self, id: EntityId) -> Result<Outcome<RouteRuleRecord>, ExportError> {
        let entity = EntityRef::new(EntityKind::RouteRule, id);
        let Some(rule) = self.store.route_rule(id).await else {
            return Ok(Outcome::not_found(entity));
        };

        let mut omitted = Vec::new();
        let mut record = RouteRuleRecord {
            domain: non_empty(rule.domains.as_ref()),
            domain_suffix: non_empty(rule.domain_suffixes.as_ref()),
            domain_keyword: non_empty(rule.domain_keywords.as_ref()),
            domain_regex: non_empty(rule.domain_regexes.as_ref()),
            rule_set: self
                .rule_set_tags(rule.rule_sets.as_ref(), entity, &mut omitted)
                .await?,
            ..RouteRuleRecord::default()
        };

        match (rule.action, rule.outbound) {
            (RuleAction::Reject, _) => record.action = Some(RuleAction::Reject),
            (RuleAction::Route, Some(target)) => {
                let outcome = self.outbound(target).await?;
                record.outbound = references(vec![outcome], entity, &mut omitted)
                    .pop()
                    .map(|outbound| outbound.tag);
            }
            (RuleAction::Route, None) => {
                debug!(%entity, "route rule has no outbound");
            }
        }

        debug!(%entity, action = %rule.action, "exported route rule");
        let record = validated(Contract::RouteRule, entity, record)?;
        Ok(Outcome::exported(record, omitted))
    }

    /// Export a DNS rule. `reject` disables the cache instead of naming a server.
    pub async fn dns_rule(&self, id: EntityId) -> Result<Outcome<DnsRuleRecord>, ExportError> {
        let entity = EntityRef::new(EntityKind::DnsRule, id);
        let Some(rule) = self.store.dns_rule(id).await else {
            return Ok(Outcome::not_found(entity));
        };

        let mut omitted = Vec::new();
        let mut record = DnsRuleRecord {
            domain: non_empty(rule.domains.as_ref()),
            domain_suffix: non_empty(rule.domain_suffixes.as_ref()),
            domain_keyword: non_empty(rule.domain_keywords.as_ref()),
            rule_set: self
                .rule_set_tags(rule.rule_sets.as_ref(), entity, &mut omitted)
                .await?,
            ..DnsRuleRecord::default()
        };

        if rule.is_reject() {
            record.disable_cache = Some(true);
        } else if let Some(server) = rule.server {
            let outcome = self.dns_server(server).await?;
            record.server = references(vec![outcome], entity, &mut omitted)
                .pop()
                .map(|server| server.tag);
        }

        debug!(%entity, reject = rule.is_reject(), "exported dns rule");
        let record = validated(Contract::DnsRule, entity, record)?;
        Ok(Outcome::exported(record, omitted))
    }
}
