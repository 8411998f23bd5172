// ── Entity store ──
//
// `EntityStore` is the lookup seam between the compiler and whatever
// holds the entities. `DataStore` is the in-memory implementation the
// CLI loads from a snapshot file.

mod collection;
mod snapshot;

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::error::StoreError;
use crate::model::{
    DnsRule, DnsServer, EntityId, EntityKind, EntityRef, Inbound, Outbound, Profile, RouteRule,
    RuleSet, WireguardEndpoint,
};

use collection::EntityCollection;
pub use snapshot::{SnapshotFormat, StoreSnapshot};

/// Read access to stored entities, one lookup per kind.
///
/// A missing id yields `None`. Implementations must tolerate concurrent
/// calls; the compiler fans out lookups for every list it resolves.
pub trait EntityStore: Send + Sync {
    fn inbound(&self, id: EntityId) -> impl Future<Output = Option<Arc<Inbound>>> + Send;

    fn outbound(&self, id: EntityId) -> impl Future<Output = Option<Arc<Outbound>>> + Send;

    fn endpoint(&self, id: EntityId)
    -> impl Future<Output = Option<Arc<WireguardEndpoint>>> + Send;

    fn route_rule(&self, id: EntityId) -> impl Future<Output = Option<Arc<RouteRule>>> + Send;

    fn rule_set(&self, id: EntityId) -> impl Future<Output = Option<Arc<RuleSet>>> + Send;

    fn dns_server(&self, id: EntityId) -> impl Future<Output = Option<Arc<DnsServer>>> + Send;

    fn dns_rule(&self, id: EntityId) -> impl Future<Output = Option<Arc<DnsRule>>> + Send;

    fn profile(&self, id: EntityId) -> impl Future<Output = Option<Arc<Profile>>> + Send;
}

/// In-memory entity store.
pub struct DataStore {
    inbounds: EntityCollection<Inbound>,
    outbounds: EntityCollection<Outbound>,
    endpoints: EntityCollection<WireguardEndpoint>,
    route_rules: EntityCollection<RouteRule>,
    rule_sets: EntityCollection<RuleSet>,
    dns_servers: EntityCollection<DnsServer>,
    dns_rules: EntityCollection<DnsRule>,
    profiles: EntityCollection<Profile>,
}

impl Default for DataStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DataStore {
    pub fn new() -> Self {
        Self {
            inbounds: EntityCollection::new(),
            outbounds: EntityCollection::new(),
            endpoints: EntityCollection::new(),
            route_rules: EntityCollection::new(),
            rule_sets: EntityCollection::new(),
            dns_servers: EntityCollection::new(),
            dns_rules: EntityCollection::new(),
            profiles: EntityCollection::new(),
        }
    }

    /// Read and parse a snapshot file; the format follows the extension.
    pub async fn load(path: &Path) -> Result<Self, StoreError> {
        let format = SnapshotFormat::from_path(path)?;
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| StoreError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        let snapshot = StoreSnapshot::parse(&raw, format).map_err(|detail| StoreError::Parse {
            path: path.to_path_buf(),
            detail,
        })?;
        let store = Self::from_snapshot(snapshot)?;
        debug!(path = %path.display(), entities = store.len(), "loaded entity store");
        Ok(store)
    }

    /// Build a store from an in-memory snapshot, rejecting duplicate ids.
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Result<Self, StoreError> {
        fn fill<T: Send + Sync + 'static>(
            collection: &EntityCollection<T>,
            kind: EntityKind,
            items: Vec<T>,
            id_of: impl Fn(&T) -> EntityId,
        ) -> Result<(), StoreError> {
            for item in items {
                let id = id_of(&item);
                if !collection.insert(id, item) {
                    return Err(StoreError::DuplicateId {
                        entity: EntityRef::new(kind, id),
                    });
                }
            }
            Ok(())
        }

        let store = Self::new();
        fill(&store.inbounds, EntityKind::Inbound, snapshot.inbounds, |e| e.id)?;
        fill(&store.outbounds, EntityKind::Outbound, snapshot.outbounds, |e| e.id)?;
        fill(&store.endpoints, EntityKind::Endpoint, snapshot.endpoints, |e| e.id)?;
        fill(&store.route_rules, EntityKind::RouteRule, snapshot.route_rules, |e| e.id)?;
        fill(&store.rule_sets, EntityKind::RuleSet, snapshot.rule_sets, |e| e.id)?;
        fill(&store.dns_servers, EntityKind::DnsServer, snapshot.dns_servers, |e| e.id)?;
        fill(&store.dns_rules, EntityKind::DnsRule, snapshot.dns_rules, |e| e.id)?;
        fill(&store.profiles, EntityKind::Profile, snapshot.profiles, |e| e.id)?;
        Ok(store)
    }

    /// Whether an entity of `kind` with `id` exists.
    pub fn contains(&self, kind: EntityKind, id: EntityId) -> bool {
        match kind {
            EntityKind::Inbound => self.inbounds.contains(id),
            EntityKind::Outbound => self.outbounds.contains(id),
            EntityKind::Endpoint => self.endpoints.contains(id),
            EntityKind::RouteRule => self.route_rules.contains(id),
            EntityKind::RuleSet => self.rule_sets.contains(id),
            EntityKind::DnsServer => self.dns_servers.contains(id),
            EntityKind::DnsRule => self.dns_rules.contains(id),
            EntityKind::Profile => self.profiles.contains(id),
        }
    }

    /// Total number of stored entities across all kinds.
    pub fn len(&self) -> usize {
        self.inbounds.len()
            + self.outbounds.len()
            + self.endpoints.len()
            + self.route_rules.len()
            + self.rule_sets.len()
            + self.dns_servers.len()
            + self.dns_rules.len()
            + self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ── Ordered snapshots (listing) ──────────────────────────────────

    pub fn inbounds_snapshot(&self) -> Vec<Arc<Inbound>> {
        self.inbounds.snapshot()
    }

    pub fn outbounds_snapshot(&self) -> Vec<Arc<Outbound>> {
        self.outbounds.snapshot()
    }

    pub fn endpoints_snapshot(&self) -> Vec<Arc<WireguardEndpoint>> {
        self.endpoints.snapshot()
    }

    pub fn route_rules_snapshot(&self) -> Vec<Arc<RouteRule>> {
        self.route_rules.snapshot()
    }

    pub fn rule_sets_snapshot(&self) -> Vec<Arc<RuleSet>> {
        self.rule_sets.snapshot()
    }

    pub fn dns_servers_snapshot(&self) -> Vec<Arc<DnsServer>> {
        self.dns_servers.snapshot()
    }

    pub fn dns_rules_snapshot(&self) -> Vec<Arc<DnsRule>> {
        self.dns_rules.snapshot()
    }

    pub fn profiles_snapshot(&self) -> Vec<Arc<Profile>> {
        self.profiles.snapshot()
    }
}

impl EntityStore for DataStore {
    async fn inbound(&self, id: EntityId) -> Option<Arc<Inbound>> {
        self.inbounds.get(id)
    }

    async fn outbound(&self, id: EntityId) -> Option<Arc<Outbound>> {
        self.outbounds.get(id)
    }

    async fn endpoint(&self, id: EntityId) -> Option<Arc<WireguardEndpoint>> {
        self.endpoints.get(id)
    }

    async fn route_rule(&self, id: EntityId) -> Option<Arc<RouteRule>> {
        self.route_rules.get(id)
    }

    async fn rule_set(&self, id: EntityId) -> Option<Arc<RuleSet>> {
        self.rule_sets.get(id)
    }

    async fn dns_server(&self, id: EntityId) -> Option<Arc<DnsServer>> {
        self.dns_servers.get(id)
    }

    async fn dns_rule(&self, id: EntityId) -> Option<Arc<DnsRule>> {
        self.dns_rules.get(id)
    }

    async fn profile(&self, id: EntityId) -> Option<Arc<Profile>> {
        self.profiles.get(id)
    }
}

/// Build a store from an inline JSON fixture.
#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) fn fixture(value: serde_json::Value) -> DataStore {
    let snapshot: StoreSnapshot = serde_json::from_value(value).unwrap();
    DataStore::from_snapshot(snapshot).unwrap()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Write;

    use super::*;

    const SNAPSHOT: &str = r#"{
        "inbounds": [{ "id": 1, "owner": 1, "type": "mixed", "port": 7890 }],
        "outbounds": [{ "id": 2, "owner": 1, "type": "direct" }],
        "profiles": [{ "id": 3, "created_by": 1, "name": "laptop", "outbounds": [2] }]
    }"#;

    #[tokio::test]
    async fn lookups_return_stored_records() {
        let snapshot = StoreSnapshot::parse(SNAPSHOT, SnapshotFormat::Json).unwrap();
        let store = DataStore::from_snapshot(snapshot).unwrap();

        assert_eq!(store.len(), 3);
        assert_eq!(store.inbound(EntityId::new(1)).await.unwrap().port, Some(7890));
        assert_eq!(store.outbound(EntityId::new(2)).await.unwrap().kind, "direct");
        assert!(store.outbound(EntityId::new(1)).await.is_none());
        assert!(store.contains(EntityKind::Profile, EntityId::new(3)));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let raw = r#"{ "outbounds": [
            { "id": 2, "owner": 1, "type": "direct" },
            { "id": 2, "owner": 1, "type": "block" }
        ] }"#;
        let snapshot = StoreSnapshot::parse(raw, SnapshotFormat::Json).unwrap();
        let err = DataStore::from_snapshot(snapshot).err().unwrap();
        assert!(matches!(
            err,
            StoreError::DuplicateId { entity } if entity == EntityRef::new(EntityKind::Outbound, EntityId::new(2))
        ));
    }

    #[tokio::test]
    async fn load_reads_json_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(SNAPSHOT.as_bytes()).unwrap();

        let store = DataStore::load(file.path()).await.unwrap();
        assert_eq!(store.profiles_snapshot().len(), 1);
    }

    #[tokio::test]
    async fn load_rejects_unknown_extension() {
        let file = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
        let err = DataStore::load(file.path()).await.err().unwrap();
        assert!(matches!(err, StoreError::UnsupportedFormat { .. }));
    }
}
