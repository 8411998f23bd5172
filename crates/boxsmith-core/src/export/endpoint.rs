// ── WireGuard endpoint exporter ──

use futures_util::future::join_all;
use tracing::{debug, warn};

use super::{Exporter, Omission, OmissionReason, Outcome, present, validated};
use crate::contract::Contract;
use crate::error::ExportError;
use crate::model::{EntityId, EntityKind, EntityRef, Peer};
use crate::singbox::{EndpointRecord, PeerRecord, WIREGUARD};
use crate::store::EntityStore;
use crate::tag;

impl<S: EntityStore> Exporter<'_, S> {
    /// Export a WireGuard endpoint with its peers.
    ///
    /// A peer that names another endpoint borrows that endpoint's public
    /// and preshared keys. The borrow is a plain lookup, so a peer naming
    /// its own endpoint is harmless.
    pub async fn endpoint(&self, id: EntityId) -> Result<Outcome<EndpointRecord>, ExportError> {
        let entity = EntityRef::new(EntityKind::Endpoint, id);
        let Some(endpoint) = self.store.endpoint(id).await else {
            return Ok(Outcome::not_found(entity));
        };

        let resolved = join_all(endpoint.peers.iter().map(|peer| self.peer(peer))).await;

        let mut peers = Vec::with_capacity(resolved.len());
        let mut omitted = Vec::new();
        for (record, missing) in resolved {
            peers.push(record);
            if let Some(missing) = missing {
                let omission = Omission {
                    referrer: Some(entity),
                    ..Omission::new(missing, OmissionReason::NotFound)
                };
                warn!(%omission, "peer key source missing; peer exported without keys");
                omitted.push(omission);
            }
        }

        let record = EndpointRecord {
            kind: WIREGUARD.into(),
            tag: tag::endpoint(&endpoint),
            system_interface: endpoint.system,
            interface_name: endpoint.name.clone(),
            local_address: endpoint.addresses.clone(),
            private_key: endpoint.private_key.clone(),
            peers,
            mtu: endpoint.mtu.filter(|m| *m != 0),
            pre_shared_key: present(endpoint.preshared_key.as_ref()),
        };

        debug!(%entity, tag = %record.tag, peers = record.peers.len(), "exported endpoint");
        let record = validated(Contract::Endpoint, entity, record)?;
        Ok(Outcome::exported(record, omitted))
    }

    /// Build one peer; the second value names a key source that did not resolve.
    async fn peer(&self, peer: &Peer) -> (PeerRecord, Option<EntityRef>) {
        let mut record = PeerRecord {
            server: peer.address.clone(),
            server_port: peer.port,
            allowed_ips: peer.allowed_ips.clone(),
            public_key: None,
            pre_shared_key: None,
        };

        let Some(source) = peer.id else {
            return (record, None);
        };
        match self.store.endpoint(source).await {
            Some(borrowed) => {
                record.public_key = Some(borrowed.public_key.clone());
                record.pre_shared_key = present(borrowed.preshared_key.as_ref());
                (record, None)
            }
            None => (record, Some(EntityRef::new(EntityKind::Endpoint, source))),
        }
    }
}
