// ── Profile compiler ──
//
// Fans a profile's reference lists out to the exporters, assembles the
// sing-box document around them and checks the result as a whole. Any
// reference that does not resolve is dropped and reported; a document
// that fails its contract is never returned.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::config::CompileOptions;
use crate::contract::{self, Contract, ContractViolation};
use crate::error::CompileError;
use crate::export::{Exporter, Omission, Outcome, gather};
use crate::model::{EntityId, Profile};
use crate::singbox::{
    CacheFile, DnsSection, Document, Experimental, LogOptions, OutboundRecord, RouteSection,
};
use crate::store::EntityStore;

/// `route.final` when the profile resolves no outbound at all.
pub const DIRECT_OUTBOUND: &str = "direct";

pub const LOG_LEVEL: &str = "info";

/// A compiled profile: the document plus every reference left out of it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Compiled {
    pub profile: EntityId,
    pub name: String,
    pub document: Document,
    pub omitted: Vec<Omission>,
    #[serde(skip)]
    content: String,
}

impl Compiled {
    /// Canonical text form: pretty JSON with two-space indentation.
    pub fn to_json(&self) -> &str {
        &self.content
    }

    /// File name offered alongside the document.
    pub fn file_name(&self) -> String {
        format!("{}.json", self.name)
    }
}

/// Compiles profiles against one store.
pub struct ProfileCompiler<'s, S> {
    exporter: Exporter<'s, S>,
}

impl<'s, S: EntityStore> ProfileCompiler<'s, S> {
    pub fn new(store: &'s S, options: CompileOptions) -> Self {
        Self {
            exporter: Exporter::new(store, options),
        }
    }

    /// Look the profile up, then compile it.
    pub async fn compile_id(&self, id: EntityId) -> Result<Compiled, CompileError> {
        let profile = self
            .exporter
            .store()
            .profile(id)
            .await
            .ok_or(CompileError::ProfileNotFound { id })?;
        self.compile(&profile).await
    }

    pub async fn compile(&self, profile: &Profile) -> Result<Compiled, CompileError> {
        let ex = self.exporter;

        let inbound_ids = distinct(&profile.inbounds);
        let outbound_ids = distinct(&profile.outbounds);
        let endpoint_ids = distinct(&profile.wg_endpoints);
        let rule_ids = distinct(&profile.rules);
        let rule_set_ids = distinct(&profile.rule_sets);
        let server_ids = distinct(&profile.dns);
        let dns_rule_ids = distinct(&profile.dns_rules);

        let (inbounds, outbounds, endpoints, rules, rule_sets, servers, dns_rules) = tokio::join!(
            ex.export_all(&inbound_ids, |id| ex.inbound(id)),
            ex.export_all(&outbound_ids, |id| ex.outbound(id)),
            ex.export_all(&endpoint_ids, |id| ex.endpoint(id)),
            ex.export_all(&rule_ids, |id| ex.route_rule(id)),
            ex.export_all(&rule_set_ids, |id| ex.rule_set(id)),
            ex.export_all(&server_ids, |id| ex.dns_server(id)),
            ex.export_all(&dns_rule_ids, |id| ex.dns_rule(id)),
        );

        let mut omitted = Vec::new();
        let inbounds = keep(inbounds?, &mut omitted);
        // Outbounds keep their source id for the `route.final` lookup.
        let sourced: Vec<(EntityId, OutboundRecord)> = keep(
            outbound_ids
                .iter()
                .zip(outbounds?)
                .map(|(id, outcome)| outcome.map(|record| (*id, record)))
                .collect(),
            &mut omitted,
        );
        let endpoints = keep(endpoints?, &mut omitted);
        let rules = keep(rules?, &mut omitted);
        let rule_sets = keep(rule_sets?, &mut omitted);
        let servers = keep(servers?, &mut omitted);
        let dns_rules = keep(dns_rules?, &mut omitted);

        let final_outbound = final_outbound(profile.route_final, &sourced);
        let outbounds = sourced.into_iter().map(|(_, record)| record).collect();

        let document = Document {
            log: LogOptions {
                level: LOG_LEVEL.into(),
                timestamp: true,
            },
            experimental: Experimental {
                cache_file: CacheFile {
                    enabled: true,
                    store_fakeip: true,
                    store_rdrc: false,
                },
            },
            inbounds,
            outbounds,
            endpoints,
            route: RouteSection {
                rule_set: rule_sets,
                rules,
                final_outbound,
                auto_detect_interface: true,
            },
            dns: DnsSection {
                disable_cache: false,
                disable_expire: false,
                independent_cache: false,
                servers,
                rules: dns_rules,
            },
        };

        check_document(&document)?;
        info!(
            profile = %profile.id,
            outbounds = document.outbounds.len(),
            omitted = omitted.len(),
            "compiled profile"
        );

        let content = serde_json::to_string_pretty(&document)?;
        Ok(Compiled {
            profile: profile.id,
            name: profile.name.clone(),
            document,
            omitted,
            content,
        })
    }
}

/// Surviving records of one profile list; omissions go to `omitted`.
fn keep<T>(outcomes: Vec<Outcome<T>>, omitted: &mut Vec<Omission>) -> Vec<T> {
    let gathered = gather(outcomes, None);
    omitted.extend(gathered.omitted);
    gathered.records
}

/// First occurrence of each id, in order.
fn distinct(ids: &[EntityId]) -> Vec<EntityId> {
    let mut seen = HashSet::with_capacity(ids.len());
    let unique: Vec<EntityId> = ids.iter().copied().filter(|id| seen.insert(*id)).collect();
    if unique.len() != ids.len() {
        debug!(listed = ids.len(), unique = unique.len(), "dropped repeated profile references");
    }
    unique
}

/// The exported `route_final`; when unset, the first outbound; else `direct`.
///
/// A `route_final` that did not resolve falls back to `direct`, never to
/// another outbound.
fn final_outbound(route_final: Option<EntityId>, outbounds: &[(EntityId, OutboundRecord)]) -> String {
    let chosen = match route_final {
        Some(wanted) => {
            let found = outbounds.iter().find(|(id, _)| *id == wanted);
            if found.is_none() {
                warn!(outbound = %wanted, "route_final is not among the exported outbounds");
            }
            found
        }
        None => outbounds.first(),
    };
    chosen.map_or_else(|| DIRECT_OUTBOUND.to_owned(), |(_, record)| record.tag.clone())
}

/// Whole-document checks: tag uniqueness, then the document contract.
fn check_document(document: &Document) -> Result<(), CompileError> {
    let tags = document
        .inbounds
        .iter()
        .map(|r| &r.tag)
        .chain(document.outbounds.iter().map(|r| &r.tag))
        .chain(document.endpoints.iter().map(|r| &r.tag))
        .chain(document.route.rule_set.iter().map(|r| &r.tag))
        .chain(document.dns.servers.iter().map(|r| &r.tag));

    let mut seen = HashSet::new();
    for tag in tags {
        if !seen.insert(tag.as_str()) {
            return Err(invalid(format!("tag '{tag}' is used more than once")));
        }
    }

    match contract::check(Contract::Document, document) {
        Ok(()) => Ok(()),
        Err(ContractViolation::Invalid { detail }) => Err(invalid(detail)),
        Err(ContractViolation::Unavailable(err)) => Err(invalid(err.to_string())),
    }
}

fn invalid(detail: String) -> CompileError {
    error!(%detail, "compiled document rejected");
    CompileError::DocumentInvalid { detail }
}
