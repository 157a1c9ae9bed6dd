//! Command-line argument definitions.
//!
//! Only the shape of the CLI lives here. Converting arguments into core
//! types happens in the command handlers.

pub mod global;

use std::fmt;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use strata_core::domain::{ApiStyle, Layer, TestKind};

pub use global::{GlobalArgs, OutputFormat};

const EXAMPLES: &str = "\
EXAMPLES:
    strata new Acme.Shop
    strata new Acme.Shop --layers shared-kernel,application,infrastructure,api --tests
    strata new Acme.Shop --api minimal-api --cqrs --ef-core --output ./work
    strata add-tests ./work/Acme.Shop --kind unit
    strata check --layers application --edge domain:application
    strata layers";

/// Strata - layered .NET solution scaffolding.
#[derive(Debug, Parser)]
#[command(
    name = "strata",
    bin_name = "strata",
    version,
    author,
    about = "Scaffold layered .NET solutions with enforced dependency rules",
    long_about = "Strata generates a .NET solution whose projects follow a layered \
                  architecture (SharedKernel, Domain, Application, Infrastructure, API). \
                  Layer references are validated against a fixed dependency policy \
                  before anything is written, and re-running against an existing \
                  solution only adds what is missing.",
    after_help = EXAMPLES,
    arg_required_else_help = true,
    subcommand_required = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate a new layered solution.
    #[command(
        visible_alias = "n",
        after_help = "EXAMPLES:\n    strata new Acme.Shop --tests\n    strata new Acme.Shop --layers application,api --api grpc --dry-run"
    )]
    New(NewArgs),

    /// Add test projects to an existing solution.
    #[command(
        name = "add-tests",
        visible_alias = "t",
        after_help = "EXAMPLES:\n    strata add-tests ./Acme.Shop\n    strata add-tests ./Acme.Shop/Acme.Shop.sln --kind integration"
    )]
    AddTests(AddTestsArgs),

    /// Validate a layer selection without generating anything.
    #[command(
        visible_alias = "c",
        after_help = "EXAMPLES:\n    strata check --layers application,infrastructure\n    strata check --layers application --edge domain:application"
    )]
    Check(CheckArgs),

    /// Show the layer dependency policy.
    #[command(visible_alias = "ls")]
    Layers,

    /// Initialise a configuration file with the built-in defaults.
    Init(InitArgs),

    /// Generate shell completions.
    Completions(CompletionsArgs),

    /// Inspect configuration.
    #[command(subcommand)]
    Config(ConfigCommands),
}

// ── new ───────────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct NewArgs {
    /// Solution name, e.g. `Acme.Shop`.
    #[arg(value_name = "NAME")]
    pub name: String,

    #[arg(
        short = 'n',
        long,
        value_name = "NAMESPACE",
        help = "Base namespace for projects [default: NAME]"
    )]
    pub namespace: Option<String>,

    #[arg(
        short = 'f',
        long,
        value_name = "TFM",
        help = "Target framework, e.g. net9.0 [default: from config]"
    )]
    pub framework: Option<String>,

    #[arg(
        short = 'l',
        long,
        value_name = "LAYERS",
        value_delimiter = ',',
        value_parser = parse_layer,
        help = "Comma-separated layers to include (Domain is always included)"
    )]
    pub layers: Vec<Layer>,

    #[arg(
        short = 'a',
        long,
        value_enum,
        value_name = "STYLE",
        help = "API project style [default: from config]"
    )]
    pub api: Option<ApiStyleArg>,

    #[arg(long, help = "Add Commands/Queries folders to the Application project")]
    pub cqrs: bool,

    #[arg(long = "ef-core", help = "Add Entity Framework Core to Infrastructure")]
    pub ef_core: bool,

    #[arg(long, help = "Add unit and integration test projects")]
    pub tests: bool,

    #[arg(
        short = 'o',
        long,
        value_name = "DIR",
        default_value = ".",
        help = "Directory the solution folder is created in"
    )]
    pub output: PathBuf,

    #[arg(
        short = 'e',
        long = "edge",
        value_name = "FROM:TO",
        value_parser = parse_edge,
        help = "Declare an extra layer reference (validated like any other)"
    )]
    pub edges: Vec<(Layer, Layer)>,

    #[arg(long, help = "Show what would be generated without writing")]
    pub dry_run: bool,

    #[arg(short = 'y', long, help = "Skip the confirmation prompt")]
    pub yes: bool,

    #[arg(long, help = "Merge into an existing solution directory")]
    pub force: bool,
}

// ── add-tests ─────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AddTestsArgs {
    /// Solution directory or `.sln` file.
    #[arg(value_name = "PATH", default_value = ".")]
    pub path: PathBuf,

    #[arg(
        short = 'k',
        long = "kind",
        value_enum,
        value_name = "KIND",
        help = "Test project kind to add (repeatable) [default: unit and integration]"
    )]
    pub kinds: Vec<TestKindArg>,

    #[arg(
        short = 'f',
        long,
        value_name = "TFM",
        help = "Target framework [default: detected from the Domain project]"
    )]
    pub framework: Option<String>,

    #[arg(long, help = "Show what would be added without writing")]
    pub dry_run: bool,
}

// ── check ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CheckArgs {
    #[arg(
        short = 'l',
        long,
        value_name = "LAYERS",
        value_delimiter = ',',
        value_parser = parse_layer,
        help = "Comma-separated layers to check [default: from config]"
    )]
    pub layers: Vec<Layer>,

    #[arg(
        short = 'e',
        long = "edge",
        value_name = "FROM:TO",
        value_parser = parse_edge,
        help = "Extra layer reference to validate (repeatable)"
    )]
    pub edges: Vec<(Layer, Layer)>,
}

// ── init / completions / config ───────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct InitArgs {
    #[arg(long, help = "Overwrite an existing configuration file")]
    pub force: bool,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    #[arg(value_enum)]
    pub shell: Shell,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print one configuration value.
    Get {
        /// Dotted key, e.g. `defaults.framework`.
        key: String,
    },
    /// Print the effective configuration.
    List,
    /// Print the default configuration file path.
    Path,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    #[value(name = "powershell")]
    PowerShell,
    Elvish,
}

// ── value enums ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ApiStyleArg {
    WebApi,
    MinimalApi,
    Grpc,
}

impl From<ApiStyleArg> for ApiStyle {
    fn from(arg: ApiStyleArg) -> Self {
        match arg {
            ApiStyleArg::WebApi => ApiStyle::WebApi,
            ApiStyleArg::MinimalApi => ApiStyle::MinimalApi,
            ApiStyleArg::Grpc => ApiStyle::Grpc,
        }
    }
}

impl fmt::Display for ApiStyleArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(ApiStyle::from(*self).as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TestKindArg {
    Unit,
    Integration,
}

impl From<TestKindArg> for TestKind {
    fn from(arg: TestKindArg) -> Self {
        match arg {
            TestKindArg::Unit => TestKind::Unit,
            TestKindArg::Integration => TestKind::Integration,
        }
    }
}

impl fmt::Display for TestKindArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(TestKind::from(*self).as_str())
    }
}

// ── value parsers ─────────────────────────────────────────────────────────────

fn parse_layer(raw: &str) -> Result<Layer, String> {
    raw.trim().parse::<Layer>().map_err(|e| {
        format!("{e} (expected one of: shared-kernel, domain, application, infrastructure, api)")
    })
}

/// `domain:application` → `(Domain, Application)`
fn parse_edge(raw: &str) -> Result<(Layer, Layer), String> {
    let (from, to) = raw
        .split_once(':')
        .ok_or_else(|| format!("'{raw}' is not an edge; expected FROM:TO"))?;
    Ok((parse_layer(from)?, parse_layer(to)?))
}
