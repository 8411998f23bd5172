// ── Entity exporters ──
//
// Each exporter fetches one stored entity, resolves whatever it references
// through the other exporters, and checks the fragment against its contract.
//
// Two channels come back from every exporter:
// - `Outcome::Omitted` (soft): the entity is absent from the output.
// - `ExportError` (hard): the fragment itself is malformed; the compile aborts.

mod dns;
mod endpoint;
mod inbound;
mod outbound;
mod rule_set;
mod rules;

use std::fmt;
use std::future::Future;

use futures_util::future::join_all;
use serde::Serialize;
use tracing::{error, warn};

use crate::config::CompileOptions;
use crate::contract::{self, Contract, ContractViolation};
use crate::error::ExportError;
use crate::model::{EntityId, EntityRef};
use crate::store::EntityStore;

pub use dns::format_dns_address;

// ── Soft channel ────────────────────────────────────────────────────

/// Why a reference was left out of the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum OmissionReason {
    NotFound,
    /// The id already appears on the current outbound chain.
    Cycle,
    DepthExceeded { limit: usize },
}

impl fmt::Display for OmissionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not found"),
            Self::Cycle => write!(f, "cyclic reference"),
            Self::DepthExceeded { limit } => write!(f, "nested deeper than {limit} levels"),
        }
    }
}

/// A reference that did not make it into the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Omission {
    pub entity: EntityRef,
    #[serde(flatten)]
    pub reason: OmissionReason,
    /// The entity holding the reference; `None` for profile-level ids.
    pub referrer: Option<EntityRef>,
}

impl Omission {
    pub fn new(entity: EntityRef, reason: OmissionReason) -> Self {
        Self {
            entity,
            reason,
            referrer: None,
        }
    }

    fn referenced_by(mut self, referrer: EntityRef) -> Self {
        self.referrer.get_or_insert(referrer);
        self
    }
}

impl fmt::Display for Omission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.entity, self.reason)?;
        if let Some(referrer) = self.referrer {
            write!(f, " (referenced by {referrer})")?;
        }
        Ok(())
    }
}

/// Result of exporting one entity.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// The fragment, plus references dropped while building it.
    Exported { record: T, omitted: Vec<Omission> },
    Omitted(Omission),
}

impl<T> Outcome<T> {
    fn exported(record: T, omitted: Vec<Omission>) -> Self {
        Self::Exported { record, omitted }
    }

    fn not_found(entity: EntityRef) -> Self {
        Self::Omitted(Omission::new(entity, OmissionReason::NotFound))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Self::Exported { record, omitted } => Outcome::Exported {
                record: f(record),
                omitted,
            },
            Self::Omitted(omission) => Outcome::Omitted(omission),
        }
    }

    pub fn record(&self) -> Option<&T> {
        match self {
            Self::Exported { record, .. } => Some(record),
            Self::Omitted(_) => None,
        }
    }

    pub fn into_record(self) -> Option<T> {
        match self {
            Self::Exported { record, .. } => Some(record),
            Self::Omitted(_) => None,
        }
    }

    /// Every omission this outcome carries, its own included.
    pub fn omissions(&self) -> &[Omission] {
        match self {
            Self::Exported { omitted, .. } => omitted,
            Self::Omitted(omission) => std::slice::from_ref(omission),
        }
    }
}

/// Surviving records of a list, in input order, with everything dropped.
#[derive(Debug)]
pub(crate) struct Gathered<T> {
    pub records: Vec<T>,
    pub omitted: Vec<Omission>,
}

impl<T> Gathered<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Gathered<U> {
        Gathered {
            records: self.records.into_iter().map(f).collect(),
            omitted: self.omitted,
        }
    }
}

/// Split outcomes into survivors and omissions, preserving order.
pub(crate) fn gather<T>(outcomes: Vec<Outcome<T>>, referrer: Option<EntityRef>) -> Gathered<T> {
    let mut records = Vec::with_capacity(outcomes.len());
    let mut omitted = Vec::new();
    for outcome in outcomes {
        match outcome {
            Outcome::Exported {
                record,
                omitted: nested,
            } => {
                records.push(record);
                omitted.extend(nested);
            }
            Outcome::Omitted(omission) => {
                let omission = match referrer {
                    Some(r) => omission.referenced_by(r),
                    None => omission,
                };
                warn!(
                    entity = %omission.entity,
                    reason = %omission.reason,
                    referrer = ?omission.referrer.map(|r| r.to_string()),
                    "reference omitted"
                );
                omitted.push(omission);
            }
        }
    }
    Gathered { records, omitted }
}

/// Resolve references whose tags are embedded in another fragment.
///
/// Only the references' own omissions are kept. Whatever a referenced
/// entity dropped while exporting belongs to that entity, which the
/// document lists separately when the profile includes it.
pub(crate) fn references<T>(
    outcomes: Vec<Outcome<T>>,
    referrer: EntityRef,
    omitted: &mut Vec<Omission>,
) -> Vec<T> {
    let direct = outcomes
        .into_iter()
        .map(|outcome| match outcome {
            Outcome::Exported { record, .. } => Outcome::exported(record, Vec::new()),
            Outcome::Omitted(omission) => Outcome::Omitted(omission),
        })
        .collect();
    let gathered = gather(direct, Some(referrer));
    omitted.extend(gathered.omitted);
    gathered.records
}

// ── Exporter ────────────────────────────────────────────────────────

/// Resolves stored entities into sing-box fragments.
///
/// Holds only a store handle and limits; every call is independent and
/// reads nothing but the store.
pub struct Exporter<'s, S> {
    store: &'s S,
    options: CompileOptions,
}

impl<S> Clone for Exporter<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for Exporter<'_, S> {}

impl<'s, S: EntityStore> Exporter<'s, S> {
    pub fn new(store: &'s S, options: CompileOptions) -> Self {
        Self { store, options }
    }

    pub fn store(&self) -> &'s S {
        self.store
    }

    pub fn options(&self) -> CompileOptions {
        self.options
    }

    /// Export every id concurrently; the result keeps input order.
    pub(crate) async fn export_all<T, F, Fut>(
        &self,
        ids: &[EntityId],
        export: F,
    ) -> Result<Vec<Outcome<T>>, ExportError>
    where
        F: Fn(EntityId) -> Fut,
        Fut: Future<Output = Result<Outcome<T>, ExportError>>,
    {
        join_all(ids.iter().copied().map(export))
            .await
            .into_iter()
            .collect()
    }
}

/// Check a finished fragment against its contract.
///
/// A failure here is an exporter defect, so it is logged loudly and
/// surfaced as a hard error.
fn validated<T: Serialize>(
    contract: Contract,
    entity: EntityRef,
    record: T,
) -> Result<T, ExportError> {
    match contract::check(contract, &record) {
        Ok(()) => Ok(record),
        Err(ContractViolation::Unavailable(err)) => {
            error!(%entity, error = %err, "export contract unavailable");
            Err(ExportError::Contract(err))
        }
        Err(ContractViolation::Invalid { detail }) => {
            error!(%entity, %detail, "exporter produced a fragment violating its contract");
            Err(ExportError::ShapeViolation {
                kind: entity.kind,
                id: entity.id,
                detail,
            })
        }
    }
}

/// `Some` for non-empty strings, mirroring "set" for optional text columns.
fn present(value: Option<&String>) -> Option<String> {
    value.filter(|v| !v.is_empty()).cloned()
}

/// `Some` for non-empty lists.
fn non_empty<T: Clone>(value: Option<&Vec<T>>) -> Option<Vec<T>> {
    value.filter(|v| !v.is_empty()).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EntityKind;

    fn omitted(kind: EntityKind, id: u64) -> Outcome<u32> {
        Outcome::not_found(EntityRef::new(kind, EntityId::new(id)))
    }

    #[test]
    fn gather_preserves_order_and_tags_referrer() {
        let parent = EntityRef::new(EntityKind::RouteRule, EntityId::new(9));
        let outcomes = vec![
            Outcome::exported(1, vec![]),
            omitted(EntityKind::RuleSet, 2),
            Outcome::exported(3, vec![]),
        ];

        let gathered = gather(outcomes, Some(parent));
        assert_eq!(gathered.records, vec![1, 3]);
        assert_eq!(gathered.omitted.len(), 1);
        assert_eq!(gathered.omitted[0].referrer, Some(parent));
    }

    #[test]
    fn nested_omissions_keep_their_original_referrer() {
        let inner = Omission::new(
            EntityRef::new(EntityKind::Outbound, EntityId::new(4)),
            OmissionReason::Cycle,
        )
        .referenced_by(EntityRef::new(EntityKind::Outbound, EntityId::new(3)));

        let gathered = gather(
            vec![Outcome::exported(7, vec![inner])],
            Some(EntityRef::new(EntityKind::Outbound, EntityId::new(1))),
        );
        assert_eq!(gathered.omitted, vec![inner]);
    }

    #[test]
    fn omission_display() {
        let omission = Omission::new(
            EntityRef::new(EntityKind::Outbound, EntityId::new(7)),
            OmissionReason::DepthExceeded { limit: 2 },
        )
        .referenced_by(EntityRef::new(EntityKind::Outbound, EntityId::new(6)));
        assert_eq!(
            omission.to_string(),
            "outbound #7: nested deeper than 2 levels (referenced by outbound #6)"
        );
    }
}
