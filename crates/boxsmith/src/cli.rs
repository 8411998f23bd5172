//! Clap derive structures for the `boxsmith` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.
//! Depends only on clap so the build script can include it for man pages.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// boxsmith -- compile proxy building blocks into sing-box configs
#[derive(Debug, Parser)]
#[command(
    name = "boxsmith",
    version,
    about = "Compile sing-box configuration profiles from stored entities",
    long_about = "Resolves a profile's inbounds, outbounds, WireGuard endpoints, rules,\n\
        rule sets and DNS settings from an entity store file into one\n\
        sing-box configuration document.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Entity store file (json, yaml, or toml)
    #[arg(long, short = 'S', env = "BOXSMITH_STORE", global = true)]
    pub store: Option<PathBuf>,

    /// Output format [default: from config, else table]
    #[arg(long, short = 'o', env = "BOXSMITH_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Act as this user id: profiles must be theirs and references readable
    #[arg(long, short = 'u', env = "BOXSMITH_USER", global = true)]
    pub user: Option<u64>,

    /// Deepest nested outbound level to resolve
    #[arg(long, global = true)]
    pub max_depth: Option<usize>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compile a profile and deliver the document
    #[command(alias = "x")]
    Export(ExportArgs),

    /// Export a single entity as its sing-box fragment
    #[command(alias = "e")]
    Entity(EntityArgs),

    /// List stored entities of one kind
    #[command(alias = "ls")]
    List(ListArgs),

    /// Compile profiles and report dropped references
    Check(CheckArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Entity kinds ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    #[value(alias = "in")]
    Inbound,
    #[value(alias = "out")]
    Outbound,
    #[value(alias = "wg")]
    Endpoint,
    RouteRule,
    RuleSet,
    DnsServer,
    DnsRule,
    Profile,
}

// ── Export ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MethodArg {
    /// Print the document (or write it with --out-file)
    Direct,
    /// Upload to the object store directory
    Oss,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Profile id
    pub profile: u64,

    /// Delivery method [default: from config, else direct]
    #[arg(long, short = 'm')]
    pub method: Option<MethodArg>,

    /// Object store root directory (overrides sink.object_root)
    #[arg(long)]
    pub object_root: Option<PathBuf>,

    /// Public domain serving uploaded objects (overrides sink.public_domain)
    #[arg(long)]
    pub public_domain: Option<String>,

    /// Write the document to this file instead of stdout (direct only)
    #[arg(long, short = 'f')]
    pub out_file: Option<PathBuf>,
}

// ── Entity ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct EntityArgs {
    /// Entity kind
    #[arg(value_enum)]
    pub kind: KindArg,

    /// Entity id
    pub id: u64,
}

// ── List ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Entity kind
    #[arg(value_enum)]
    pub kind: KindArg,

    /// Only entities owned by or shared with --user
    #[arg(long)]
    pub readable: bool,
}

// ── Check ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Profile ids to check [default: every profile in the store]
    pub profiles: Vec<u64>,

    /// Treat dropped references as failures
    #[arg(long)]
    pub strict: bool,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Display current resolved configuration
    Show,

    /// Print the config file path
    Path,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
