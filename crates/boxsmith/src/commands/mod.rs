//! Command dispatch and helpers shared by several handlers.

pub mod check;
pub mod config_cmd;
pub mod entity;
pub mod export;
pub mod list;

use boxsmith_core::access;
use boxsmith_core::{
    CompileOptions, Compiled, DataStore, EntityId, EntityKind, EntityRef, EntityStore,
    ProfileCompiler,
};

use crate::cli::{Command, GlobalOpts, KindArg};
use crate::config::Resolved;
use crate::error::CliError;

/// Route a parsed command to its handler.
pub async fn dispatch(
    cmd: Command,
    resolved: &Resolved,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Export(args) => export::handle(args, resolved, global).await,
        Command::Entity(args) => entity::handle(args, resolved, global).await,
        Command::List(args) => list::handle(args, resolved, global).await,
        Command::Check(args) => check::handle(args, resolved, global).await,
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}

/// Look up a profile, check `--user` access when given, then compile it.
pub(crate) async fn compile_profile(
    store: &DataStore,
    id: EntityId,
    options: CompileOptions,
    user: Option<u64>,
) -> Result<Compiled, CliError> {
    let profile = store
        .profile(id)
        .await
        .ok_or_else(|| not_found(EntityRef::new(EntityKind::Profile, id)))?;
    if let Some(user) = user {
        access::check_profile_access(store, &profile, user).await?;
    }
    Ok(ProfileCompiler::new(store, options).compile(&profile).await?)
}

pub(crate) fn not_found(entity: EntityRef) -> CliError {
    CliError::NotFound {
        resource_type: entity.kind.to_string(),
        identifier: entity.id.to_string(),
        list_kind: KindArg::from(entity.kind).name().into(),
    }
}

impl From<KindArg> for EntityKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Inbound => Self::Inbound,
            KindArg::Outbound => Self::Outbound,
            KindArg::Endpoint => Self::Endpoint,
            KindArg::RouteRule => Self::RouteRule,
            KindArg::RuleSet => Self::RuleSet,
            KindArg::DnsServer => Self::DnsServer,
            KindArg::DnsRule => Self::DnsRule,
            KindArg::Profile => Self::Profile,
        }
    }
}

impl From<EntityKind> for KindArg {
    fn from(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Inbound => Self::Inbound,
            EntityKind::Outbound => Self::Outbound,
            EntityKind::Endpoint => Self::Endpoint,
            EntityKind::RouteRule => Self::RouteRule,
            EntityKind::RuleSet => Self::RuleSet,
            EntityKind::DnsServer => Self::DnsServer,
            EntityKind::DnsRule => Self::DnsRule,
            EntityKind::Profile => Self::Profile,
        }
    }
}

impl KindArg {
    /// The value clap accepts for this kind.
    pub fn name(self) -> &'static str {
        match self {
            Self::Inbound => "inbound",
            Self::Outbound => "outbound",
            Self::Endpoint => "endpoint",
            Self::RouteRule => "route-rule",
            Self::RuleSet => "rule-set",
            Self::DnsServer => "dns-server",
            Self::DnsRule => "dns-rule",
            Self::Profile => "profile",
        }
    }
}
