// ── Domain model ──
//
// Stored entity records as the CRUD layer persists them. Exporters read
// these; nothing in this crate writes them.

pub mod dns;
pub mod endpoint;
pub mod entity_id;
pub mod inbound;
pub mod outbound;
pub mod profile;
pub mod rule;
pub mod rule_set;

pub use dns::{DnsServer, DnsServerKind, HttpsOptions};
pub use endpoint::{Peer, WireguardEndpoint};
pub use entity_id::{EntityId, EntityKind, EntityRef};
pub use inbound::{Inbound, InboundKind};
pub use outbound::Outbound;
pub use profile::Profile;
pub use rule::{DnsRule, RouteRule, RuleAction};
pub use rule_set::{RuleSet, RuleSetKind};

/// Ownership columns shared by every shareable entity.
pub trait Owned {
    const KIND: EntityKind;

    fn id(&self) -> EntityId;

    /// User id of the owner.
    fn owner(&self) -> u64;

    /// Whether non-owners may read the entity.
    fn is_shared(&self) -> bool;
}

macro_rules! impl_owned {
    ($($ty:ty => $kind:ident),+ $(,)?) => {
        $(
            impl Owned for $ty {
                const KIND: EntityKind = EntityKind::$kind;

                fn id(&self) -> EntityId {
                    self.id
                }

                fn owner(&self) -> u64 {
                    self.owner
                }

                fn is_shared(&self) -> bool {
                    self.share
                }
            }
        )+
    };
}

impl_owned! {
    Inbound => Inbound,
    Outbound => Outbound,
    WireguardEndpoint => Endpoint,
    RouteRule => RouteRule,
    RuleSet => RuleSet,
    DnsServer => DnsServer,
    DnsRule => DnsRule,
}
