// ── Rule-set exporter ──

use tracing::debug;

use super::{Exporter, Omission, Outcome, present, references, validated};
use crate::contract::Contract;
use crate::error::ExportError;
use crate::model::{EntityId, EntityKind, EntityRef};
use crate::singbox::RuleSetRecord;
use crate::store::EntityStore;
use crate::tag;

impl<S: EntityStore> Exporter<'_, S> {
    pub async fn rule_set(&self, id: EntityId) -> Result<Outcome<RuleSetRecord>, ExportError> {
        let entity = EntityRef::new(EntityKind::RuleSet, id);
        let Some(rule_set) = self.store.rule_set(id).await else {
            return Ok(Outcome::not_found(entity));
        };

        let record = RuleSetRecord {
            tag: tag::rule_set(&rule_set),
            kind: rule_set.kind.to_string(),
            url: present(rule_set.url.as_ref()),
            rules: rule_set.rules.clone(),
        };

        debug!(%entity, tag = %record.tag, "exported rule set");
        let record = validated(Contract::RuleSet, entity, record)?;
        Ok(Outcome::exported(record, Vec::new()))
    }

    /// Export each rule set and keep the tags, in order.
    pub(crate) async fn rule_set_tags(
        &self,
        ids: Option<&Vec<EntityId>>,
        referrer: EntityRef,
        omitted: &mut Vec<Omission>,
    ) -> Result<Option<Vec<String>>, ExportError> {
        let Some(ids) = ids.filter(|ids| !ids.is_empty()) else {
            return Ok(None);
        };
        let outcomes = self.export_all(ids, |id| self.rule_set(id)).await?;
        let tags: Vec<String> = references(outcomes, referrer, omitted)
            .into_iter()
            .map(|record| record.tag)
            .collect();
        Ok(Some(tags).filter(|tags| !tags.is_empty()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use crate::config::CompileOptions;
    use crate::export::Exporter;
    use crate::model::EntityId;
    use crate::store::fixture;

    #[tokio::test]
    async fn inline_and_remote_sets() {
        let store = fixture(json!({ "rule_sets": [
            { "id": 1, "owner": 1, "type": "remote", "name": "geosite-cn",
              "url": "https://example.org/geosite-cn.srs" },
            { "id": 2, "owner": 1, "type": "inline", "name": "ads",
              "rules": [{ "domain_suffix": ["ads.example"] }] },
            { "id": 3, "owner": 1, "name": "bare" }
        ] }));
        let exporter = Exporter::new(&store, CompileOptions::default());

        let remote = exporter.rule_set(EntityId::new(1)).await.unwrap().into_record().unwrap();
        let inline = exporter.rule_set(EntityId::new(2)).await.unwrap().into_record().unwrap();
        let bare = exporter.rule_set(EntityId::new(3)).await.unwrap().into_record().unwrap();

        assert_eq!(
            serde_json::to_value(&remote).unwrap(),
            json!({ "tag": "rule_set.remote.1", "type": "remote",
                    "url": "https://example.org/geosite-cn.srs" })
        );
        assert_eq!(
            serde_json::to_value(&inline).unwrap(),
            json!({ "tag": "rule_set.inline.2", "type": "inline",
                    "rules": [{ "domain_suffix": ["ads.example"] }] })
        );
        assert_eq!(bare.tag, "rule_set.remote.3");
    }
}
