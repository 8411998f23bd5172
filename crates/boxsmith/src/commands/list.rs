//! `boxsmith list`: tabulate stored entities of one kind.

use std::sync::Arc;

use serde::Serialize;
use tabled::Tabled;

use boxsmith_core::access::{can_read, can_use_profile};
use boxsmith_core::model::Owned;
use boxsmith_core::{Profile, tag};

use crate::cli::{GlobalOpts, KindArg, ListArgs, OutputFormat};
use crate::config::Resolved;
use crate::error::CliError;
use crate::output;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct EntityRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Owner")]
    owner: String,
    #[tabled(rename = "Shared")]
    shared: &'static str,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Tag")]
    tag: String,
}

#[derive(Tabled)]
struct ProfileRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Created by")]
    created_by: String,
    #[tabled(rename = "Inbounds")]
    inbounds: usize,
    #[tabled(rename = "Outbounds")]
    outbounds: usize,
    #[tabled(rename = "Rules")]
    rules: usize,
    #[tabled(rename = "DNS")]
    dns: usize,
    #[tabled(rename = "Final")]
    route_final: String,
}

fn row<T: Owned>(record: &T, kind: String, name: &str, tag: Option<String>) -> EntityRow {
    EntityRow {
        id: record.id().to_string(),
        owner: record.owner().to_string(),
        shared: if record.is_shared() { "yes" } else { "no" },
        kind,
        name: if name.is_empty() { "-".into() } else { name.into() },
        tag: tag.unwrap_or_else(|| "-".into()),
    }
}

fn profile_row(profile: &Arc<Profile>) -> ProfileRow {
    ProfileRow {
        id: profile.id.to_string(),
        name: profile.name.clone(),
        created_by: profile.created_by.to_string(),
        inbounds: profile.inbounds.len(),
        outbounds: profile.outbounds.len(),
        rules: profile.rules.len(),
        dns: profile.dns.len(),
        route_final: profile
            .route_final
            .map_or_else(|| "-".into(), |id| id.to_string()),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: ListArgs, resolved: &Resolved, global: &GlobalOpts) -> Result<(), CliError> {
    let user = match (args.readable, global.user) {
        (true, None) => {
            return Err(CliError::Validation {
                field: "--readable".into(),
                reason: "requires --user".into(),
            });
        }
        (true, Some(user)) => Some(user),
        (false, _) => None,
    };

    let store = resolved.open_store(global).await?;
    let format = resolved.output;

    let out = match args.kind {
        KindArg::Inbound => render(format, &visible(store.inbounds_snapshot(), user), |r| {
            row(r.as_ref(), r.kind.to_string(), "", Some(tag::inbound(r)))
        })?,
        KindArg::Outbound => render(format, &visible(store.outbounds_snapshot(), user), |r| {
            row(
                r.as_ref(),
                r.kind.clone(),
                r.name.as_deref().unwrap_or_default(),
                Some(tag::outbound(r)),
            )
        })?,
        KindArg::Endpoint => render(format, &visible(store.endpoints_snapshot(), user), |r| {
            row(r.as_ref(), "wireguard".into(), &r.name, Some(tag::endpoint(r)))
        })?,
        KindArg::RouteRule => render(format, &visible(store.route_rules_snapshot(), user), |r| {
            row(r.as_ref(), r.action.to_string(), &r.name, None)
        })?,
        KindArg::RuleSet => render(format, &visible(store.rule_sets_snapshot(), user), |r| {
            row(r.as_ref(), r.kind.to_string(), &r.name, Some(tag::rule_set(r)))
        })?,
        KindArg::DnsServer => render(format, &visible(store.dns_servers_snapshot(), user), |r| {
            row(r.as_ref(), r.kind.to_string(), &r.name, Some(tag::dns_server(r)))
        })?,
        KindArg::DnsRule => render(format, &visible(store.dns_rules_snapshot(), user), |r| {
            let action = r.action.map_or_else(|| "route".into(), |a| a.to_string());
            row(r.as_ref(), action, &r.name, None)
        })?,
        KindArg::Profile => {
            let mut profiles = store.profiles_snapshot();
            if let Some(user) = user {
                profiles.retain(|p| can_use_profile(p, user));
            }
            output::render_list(format, &profiles, profile_row, |p| p.id.to_string())?
        }
    };

    output::print_output(&out, global.quiet);
    Ok(())
}

fn visible<T: Owned>(mut records: Vec<Arc<T>>, user: Option<u64>) -> Vec<Arc<T>> {
    if let Some(user) = user {
        records.retain(|r| can_read(r.as_ref(), user));
    }
    records
}

fn render<T: Owned + Serialize>(
    format: OutputFormat,
    records: &[Arc<T>],
    to_row: impl Fn(&Arc<T>) -> EntityRow,
) -> Result<String, CliError> {
    output::render_list(format, records, to_row, |r| r.id().to_string())
}
