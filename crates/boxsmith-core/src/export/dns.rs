// ── DNS server exporter ──

use tracing::debug;

use super::{Exporter, Outcome, references, validated};
use crate::contract::Contract;
use crate::error::ExportError;
use crate::model::{DnsServer, DnsServerKind, EntityId, EntityKind, EntityRef};
use crate::singbox::DnsServerRecord;
use crate::store::EntityStore;
use crate::tag;

/// Query path used by DoH and DoH3 servers without a configured one.
pub const DEFAULT_DOH_PATH: &str = "/dns-query";

/// Render the server address in the URL form sing-box expects for its type.
pub fn format_dns_address(server: &DnsServer) -> String {
    let host = match server.port.filter(|p| *p != 0) {
        Some(port) => format!("{}:{port}", server.address),
        None => server.address.clone(),
    };
    match server.kind {
        DnsServerKind::Udp => host,
        DnsServerKind::Tls => format!("tls://{host}"),
        DnsServerKind::Quic => format!("quic://{host}"),
        DnsServerKind::Https => format!("https://{host}{}", doh_path(server)),
        DnsServerKind::Http3 => format!("h3://{host}{}", doh_path(server)),
    }
}

fn doh_path(server: &DnsServer) -> String {
    let path = server
        .https
        .as_ref()
        .and_then(|https| https.path.as_deref())
        .filter(|p| !p.is_empty())
        .unwrap_or(DEFAULT_DOH_PATH);
    if path.starts_with('/') {
        path.to_owned()
    } else {
        format!("/{path}")
    }
}

impl<S: EntityStore> Exporter<'_, S> {
    /// Export a DNS server.
    ///
    /// The outbound detour takes precedence over the WireGuard one. The
    /// WireGuard detour is only consulted when no outbound detour is set;
    /// an outbound detour that is gone leaves `detour` out.
    pub async fn dns_server(&self, id: EntityId) -> Result<Outcome<DnsServerRecord>, ExportError> {
        let entity = EntityRef::new(EntityKind::DnsServer, id);
        let Some(server) = self.store.dns_server(id).await else {
            return Ok(Outcome::not_found(entity));
        };

        let mut omitted = Vec::new();
        let detour = if let Some(outbound) = server.outbound_detour {
            let outcome = self.outbound(outbound).await?;
            references(vec![outcome], entity, &mut omitted)
                .pop()
                .map(|outbound| outbound.tag)
        } else if let Some(endpoint) = server.wg_endpoint_detour {
            let outcome = self.endpoint(endpoint).await?;
            references(vec![outcome], entity, &mut omitted)
                .pop()
                .map(|endpoint| endpoint.tag)
        } else {
            None
        };

        let record = DnsServerRecord {
            tag: tag::dns_server(&server),
            address: format_dns_address(&server),
            detour,
        };

        debug!(%entity, tag = %record.tag, address = %record.address, "exported dns server");
        let record = validated(Contract::DnsServer, entity, record)?;
        Ok(Outcome::exported(record, omitted))
    }
}
