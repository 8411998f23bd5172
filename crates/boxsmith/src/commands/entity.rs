//! `boxsmith entity`: export a single stored entity as its sing-box fragment.

use std::future::Future;
use std::sync::Arc;

use serde_json::Value;

use boxsmith_core::access::can_read;
use boxsmith_core::model::Owned;
use boxsmith_core::{
    AccessError, EntityId, EntityKind, EntityRef, EntityStore, ExportError, Exporter, Omission,
    Outcome,
};

use crate::cli::{EntityArgs, GlobalOpts, KindArg};
use crate::config::Resolved;
use crate::error::CliError;
use crate::output;

pub async fn handle(
    args: EntityArgs,
    resolved: &Resolved,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let store = resolved.open_store(global).await?;
    let exporter = Exporter::new(&store, resolved.compile_options(global)?);
    let id = EntityId::new(args.id);
    let entity = EntityRef::new(EntityKind::from(args.kind), id);
    let user = global.user;

    let (fragment, omitted) = match args.kind {
        KindArg::Inbound => export(entity, store.inbound(id).await, user, exporter.inbound(id)).await?,
        KindArg::Outbound => {
            export(entity, store.outbound(id).await, user, exporter.outbound(id)).await?
        }
        KindArg::Endpoint => {
            export(entity, store.endpoint(id).await, user, exporter.endpoint(id)).await?
        }
        KindArg::RouteRule => {
            export(entity, store.route_rule(id).await, user, exporter.route_rule(id)).await?
        }
        KindArg::RuleSet => {
            export(entity, store.rule_set(id).await, user, exporter.rule_set(id)).await?
        }
        KindArg::DnsServer => {
            export(entity, store.dns_server(id).await, user, exporter.dns_server(id)).await?
        }
        KindArg::DnsRule => {
            export(entity, store.dns_rule(id).await, user, exporter.dns_rule(id)).await?
        }
        KindArg::Profile => {
            return Err(CliError::Validation {
                field: "kind".into(),
                reason: "profiles compile as a whole; use `boxsmith export <id>`".into(),
            });
        }
    };

    output::print_omissions(&omitted, resolved.color, global.quiet);

    let out = output::render_single(
        resolved.output,
        &fragment,
        |value| output::render_json_pretty(value),
        |value| {
            value
                .get("tag")
                .and_then(Value::as_str)
                .map_or_else(|| entity.to_string(), str::to_owned)
        },
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

/// Check the stored record is visible to `user`, then run its exporter.
async fn export<T, R>(
    entity: EntityRef,
    stored: Option<Arc<T>>,
    user: Option<u64>,
    exported: impl Future<Output = Result<Outcome<R>, ExportError>>,
) -> Result<(Value, Vec<Omission>), CliError>
where
    T: Owned,
    R: serde::Serialize,
{
    let Some(stored) = stored else {
        return Err(super::not_found(entity));
    };
    if let Some(user) = user {
        if !can_read(stored.as_ref(), user) {
            return Err(AccessError::Inaccessible {
                kind: entity.kind,
                ids: vec![entity.id],
            }
            .into());
        }
    }

    match exported.await? {
        Outcome::Exported { record, omitted } => Ok((serde_json::to_value(record)?, omitted)),
        Outcome::Omitted(_) => Err(super::not_found(entity)),
    }
}
