//! `boxsmith check`: compile profiles without delivering them.

use serde::Serialize;
use tabled::Tabled;

use boxsmith_core::{EntityId, Omission};

use crate::cli::{CheckArgs, GlobalOpts};
use crate::config::Resolved;
use crate::error::CliError;
use crate::output;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
enum Status {
    Ok,
    Omissions,
    Failed,
}

/// One checked profile.
#[derive(Debug, Serialize)]
struct Report {
    profile: EntityId,
    name: Option<String>,
    status: Status,
    outbounds: usize,
    omitted: Vec<Omission>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Tabled)]
struct ReportRow {
    #[tabled(rename = "Profile")]
    profile: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Outbounds")]
    outbounds: usize,
    #[tabled(rename = "Omitted")]
    omitted: usize,
    #[tabled(rename = "Error")]
    error: String,
}

impl From<&Report> for ReportRow {
    fn from(r: &Report) -> Self {
        Self {
            profile: r.profile.to_string(),
            name: r.name.clone().unwrap_or_else(|| "-".into()),
            status: r.status.to_string(),
            outbounds: r.outbounds,
            omitted: r.omitted.len(),
            error: r.error.clone().unwrap_or_default(),
        }
    }
}

pub async fn handle(
    args: CheckArgs,
    resolved: &Resolved,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let store = resolved.open_store(global).await?;
    let options = resolved.compile_options(global)?;

    let ids: Vec<EntityId> = if args.profiles.is_empty() {
        store.profiles_snapshot().iter().map(|p| p.id).collect()
    } else {
        args.profiles.iter().copied().map(EntityId::new).collect()
    };

    let mut reports = Vec::with_capacity(ids.len());
    for id in ids {
        let report = match super::compile_profile(&store, id, options, global.user).await {
            Ok(compiled) => Report {
                profile: id,
                name: Some(compiled.name),
                status: if compiled.omitted.is_empty() {
                    Status::Ok
                } else {
                    Status::Omissions
                },
                outbounds: compiled.document.outbounds.len(),
                omitted: compiled.omitted,
                error: None,
            },
            Err(err) => Report {
                profile: id,
                name: None,
                status: Status::Failed,
                outbounds: 0,
                omitted: Vec::new(),
                error: Some(err.to_string()),
            },
        };
        reports.push(report);
    }

    for report in &reports {
        output::print_omissions(&report.omitted, resolved.color, global.quiet);
    }

    let out = output::render_list(resolved.output, &reports, |r: &Report| ReportRow::from(r), |r| {
        format!("{}\t{}", r.profile, r.status)
    })?;
    output::print_output(&out, global.quiet);

    let failed = reports
        .iter()
        .filter(|r| r.status == Status::Failed || (args.strict && r.status == Status::Omissions))
        .count();
    if failed > 0 {
        return Err(CliError::CheckFailed {
            failed,
            total: reports.len(),
        });
    }
    Ok(())
}
