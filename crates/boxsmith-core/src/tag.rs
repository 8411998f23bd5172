// ── Tag formatter ──
//
// Pure functions from a stored entity to its document-wide identifier.
// Every tag ends in `.<id>`, so two entities never share a tag even when
// their type, region, and name coincide.

use crate::model::{DnsServer, Inbound, Outbound, RuleSet, WireguardEndpoint};

/// Region placeholder for outbounds without one.
pub const DEFAULT_REGION: &str = "default";

/// `in.<type>.<id>`
pub fn inbound(inbound: &Inbound) -> String {
    format!("in.{}.{}", inbound.kind, inbound.id)
}

/// `out.<type>.<region|default>[.<name>].<id>`
pub fn outbound(outbound: &Outbound) -> String {
    let region = non_empty(outbound.region.as_deref()).unwrap_or(DEFAULT_REGION);
    match non_empty(outbound.name.as_deref()) {
        Some(name) => format!("out.{}.{region}.{name}.{}", outbound.kind, outbound.id),
        None => format!("out.{}.{region}.{}", outbound.kind, outbound.id),
    }
}

/// `wg[.<name>].<id>`
pub fn endpoint(endpoint: &WireguardEndpoint) -> String {
    match non_empty(Some(endpoint.name.as_str())) {
        Some(name) => format!("wg.{name}.{}", endpoint.id),
        None => format!("wg.{}", endpoint.id),
    }
}

/// `rule_set.<type>.<id>`
pub fn rule_set(rule_set: &RuleSet) -> String {
    format!("rule_set.{}.{}", rule_set.kind, rule_set.id)
}

/// `dns.<type>.<id>`
pub fn dns_server(server: &DnsServer) -> String {
    format!("dns.{}.{}", server.kind, server.id)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DnsServerKind, EntityId, InboundKind, RuleSetKind};

    fn outbound_named(id: u64, name: Option<&str>, region: Option<&str>) -> Outbound {
        Outbound {
            id: EntityId::new(id),
            owner: 1,
            share: false,
            name: name.map(Into::into),
            kind: "vless".into(),
            outbounds: None,
            region: region.map(Into::into),
            address: None,
            port: None,
            network: None,
            encryption: None,
            packet_encoding: None,
            uuid: None,
            password: None,
            alter_id: None,
            flow: None,
            transport: None,
            tls: None,
        }
    }

    #[test]
    fn outbound_tag_variants() {
        assert_eq!(outbound(&outbound_named(5, None, None)), "out.vless.default.5");
        assert_eq!(
            outbound(&outbound_named(5, Some("tokyo-1"), Some("jp"))),
            "out.vless.jp.tokyo-1.5"
        );
        assert_eq!(
            outbound(&outbound_named(5, Some(""), Some(""))),
            "out.vless.default.5"
        );
    }

    #[test]
    fn same_named_outbounds_get_distinct_tags() {
        let a = outbound(&outbound_named(1, Some("edge"), Some("us")));
        let b = outbound(&outbound_named(2, Some("edge"), Some("us")));
        assert_ne!(a, b);
    }

    #[test]
    fn same_typed_inbounds_get_distinct_tags() {
        let make = |id| Inbound {
            id: EntityId::new(id),
            owner: 1,
            share: false,
            kind: InboundKind::Mixed,
            address: None,
            port: None,
            stack: None,
            mtu: None,
        };
        assert_eq!(inbound(&make(1)), "in.mixed.1");
        assert_ne!(inbound(&make(1)), inbound(&make(2)));
    }

    #[test]
    fn rule_set_and_dns_tags() {
        let rs = RuleSet {
            id: EntityId::new(8),
            owner: 1,
            share: true,
            kind: RuleSetKind::Inline,
            name: "ads".into(),
            rules: None,
            url: None,
        };
        assert_eq!(rule_set(&rs), "rule_set.inline.8");

        let dns = DnsServer {
            id: EntityId::new(3),
            owner: 1,
            share: false,
            name: "cloudflare".into(),
            kind: DnsServerKind::Https,
            address: "1.1.1.1".into(),
            port: None,
            outbound_detour: None,
            wg_endpoint_detour: None,
            tls: None,
            https: None,
        };
        assert_eq!(dns_server(&dns), "dns.https.3");
    }

    #[test]
    fn endpoint_tag_falls_back_to_id() {
        let mut wg = WireguardEndpoint {
            id: EntityId::new(6),
            owner: 1,
            share: false,
            name: "home".into(),
            system: false,
            addresses: vec![],
            private_key: String::new(),
            public_key: String::new(),
            preshared_key: None,
            peers: vec![],
            mtu: None,
        };
        assert_eq!(endpoint(&wg), "wg.home.6");
        wg.name.clear();
        assert_eq!(endpoint(&wg), "wg.6");
    }
}
