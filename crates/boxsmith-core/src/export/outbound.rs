// ── Outbound exporter ──
//
// Group outbounds reference members by id; members are exported in turn
// and replaced by their tags. The ids on the current chain travel with
// each call so a repeated id or an over-long chain is cut off softly.

use futures_util::future::{BoxFuture, FutureExt, join_all};
use tracing::debug;

use super::{Exporter, Omission, OmissionReason, Outcome, gather, present, validated};
use crate::contract::Contract;
use crate::error::ExportError;
use crate::model::{EntityId, EntityKind, EntityRef, Outbound};
use crate::singbox::OutboundRecord;
use crate::store::EntityStore;
use crate::tag;

impl<'s, S: EntityStore> Exporter<'s, S> {
    /// Export an outbound and, recursively, its members.
    pub async fn outbound(&self, id: EntityId) -> Result<Outcome<OutboundRecord>, ExportError> {
        self.outbound_on_chain(id, Vec::new()).await
    }

    fn outbound_on_chain(
        &self,
        id: EntityId,
        mut chain: Vec<EntityId>,
    ) -> BoxFuture<'s, Result<Outcome<OutboundRecord>, ExportError>> {
        let this = *self;
        async move {
            let entity = EntityRef::new(EntityKind::Outbound, id);
            if chain.contains(&id) {
                return Ok(Outcome::Omitted(Omission::new(entity, OmissionReason::Cycle)));
            }
            if chain.len() > this.options.max_depth {
                return Ok(Outcome::Omitted(Omission::new(
                    entity,
                    OmissionReason::DepthExceeded {
                        limit: this.options.max_depth,
                    },
                )));
            }
            let depth = chain.len();
            let Some(outbound) = this.store.outbound(id).await else {
                return Ok(Outcome::not_found(entity));
            };

            let mut record = base_record(&outbound);
            let mut omitted = Vec::new();

            if let Some(members) = outbound.outbounds.as_ref().filter(|m| !m.is_empty()) {
                chain.push(id);

                let outcomes: Vec<_> = join_all(
                    members
                        .iter()
                        .map(|member| this.outbound_on_chain(*member, chain.clone())),
                )
                .await
                .into_iter()
                .collect::<Result<_, _>>()?;

                let members = gather(outcomes, Some(entity)).map(|member| member.tag);
                if !members.records.is_empty() {
                    record.outbounds = Some(members.records);
                }
                omitted = members.omitted;
            }

            debug!(%entity, tag = %record.tag, depth = depth, "exported outbound");
            let record = validated(Contract::Outbound, entity, record)?;
            Ok(Outcome::exported(record, omitted))
        }
        .boxed()
    }
}

fn base_record(outbound: &Outbound) -> OutboundRecord {
    let encryption = present(outbound.encryption.as_ref());
    OutboundRecord {
        kind: outbound.kind.clone(),
        tag: tag::outbound(outbound),
        server: present(outbound.address.as_ref()),
        server_port: outbound.port.filter(|p| *p != 0),
        uuid: present(outbound.uuid.as_ref()),
        password: present(outbound.password.as_ref()),
        alter_id: outbound.alter_id.filter(|a| *a != 0),
        // sing-box reads the cipher from `method` (shadowsocks) or `security` (vmess).
        method: encryption.clone(),
        security: encryption,
        network: present(outbound.network.as_ref()),
        flow: present(outbound.flow.as_ref()),
        packet_encoding: present(outbound.packet_encoding.as_ref()),
        transport: outbound.transport.clone().filter(|v| !v.is_null()),
        tls: outbound.tls.clone().filter(|v| !v.is_null()),
        outbounds: None,
    }
}
