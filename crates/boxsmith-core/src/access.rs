// ── Access predicates ──
//
// Checks a caller runs before compiling on a user's behalf. They fail
// closed: a missing entity is treated the same as one the user may not
// read. The compiler itself never consults them.

use std::future::Future;
use std::sync::Arc;

use futures_util::future::join_all;
use tracing::debug;

use crate::error::AccessError;
use crate::model::{EntityId, EntityKind, Owned, Profile};
use crate::store::EntityStore;

/// Owners read their own entities; anyone reads shared ones.
pub fn can_read<T: Owned + ?Sized>(record: &T, user: u64) -> bool {
    record.owner() == user || record.is_shared()
}

/// Profiles are never shared.
pub fn can_use_profile(profile: &Profile, user: u64) -> bool {
    profile.created_by == user
}

/// Verify that `user` owns `profile` and may read everything it references.
///
/// Lists are checked in profile order; the first list with a problem is
/// reported with every offending id in it.
pub async fn check_profile_access<S: EntityStore>(
    store: &S,
    profile: &Profile,
    user: u64,
) -> Result<(), AccessError> {
    if !can_use_profile(profile, user) {
        return Err(AccessError::ProfileForbidden {
            profile: profile.id,
            user,
        });
    }

    for (kind, ids) in profile.references() {
        let denied = match kind {
            EntityKind::Inbound => unreadable(&ids, user, |id| store.inbound(id)).await,
            EntityKind::Outbound => unreadable(&ids, user, |id| store.outbound(id)).await,
            EntityKind::Endpoint => unreadable(&ids, user, |id| store.endpoint(id)).await,
            EntityKind::RouteRule => unreadable(&ids, user, |id| store.route_rule(id)).await,
            EntityKind::RuleSet => unreadable(&ids, user, |id| store.rule_set(id)).await,
            EntityKind::DnsServer => unreadable(&ids, user, |id| store.dns_server(id)).await,
            EntityKind::DnsRule => unreadable(&ids, user, |id| store.dns_rule(id)).await,
            EntityKind::Profile => Vec::new(),
        };
        if !denied.is_empty() {
            return Err(AccessError::Inaccessible { kind, ids: denied });
        }
    }

    debug!(profile = %profile.id, user, "profile access granted");
    Ok(())
}

async fn unreadable<T, F, Fut>(ids: &[EntityId], user: u64, lookup: F) -> Vec<EntityId>
where
    T: Owned,
    F: Fn(EntityId) -> Fut,
    Fut: Future<Output = Option<Arc<T>>>,
{
    let found = join_all(ids.iter().copied().map(lookup)).await;
    ids.iter()
        .zip(found)
        .filter(|(_, record)| !record.as_deref().is_some_and(|r| can_read(r, user)))
        .map(|(id, _)| *id)
        .collect()
}
