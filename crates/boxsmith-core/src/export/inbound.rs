// ── Inbound exporter ──

use tracing::debug;

use super::{Exporter, Outcome, present, validated};
use crate::contract::Contract;
use crate::error::ExportError;
use crate::model::{EntityId, EntityKind, EntityRef, InboundKind};
use crate::singbox::InboundRecord;
use crate::store::EntityStore;
use crate::tag;

impl<S: EntityStore> Exporter<'_, S> {
    /// Export an inbound listener. TUN inbounds always take over routing.
    pub async fn inbound(&self, id: EntityId) -> Result<Outcome<InboundRecord>, ExportError> {
        let entity = EntityRef::new(EntityKind::Inbound, id);
        let Some(inbound) = self.store.inbound(id).await else {
            return Ok(Outcome::not_found(entity));
        };

        let mut record = InboundRecord {
            kind: inbound.kind.to_string(),
            tag: tag::inbound(&inbound),
            listen: present(inbound.address.as_ref()),
            listen_port: inbound.port.filter(|p| *p != 0),
            stack: None,
            mtu: None,
            auto_route: None,
            auto_redirect: None,
            strict_route: None,
        };

        if inbound.kind == InboundKind::Tun {
            record.stack = present(inbound.stack.as_ref());
            record.mtu = inbound.mtu.filter(|m| *m != 0);
            record.auto_route = Some(true);
            record.auto_redirect = Some(true);
            record.strict_route = Some(true);
        }

        debug!(%entity, tag = %record.tag, "exported inbound");
        let record = validated(Contract::Inbound, entity, record)?;
        Ok(Outcome::exported(record, Vec::new()))
    }
}
