//! Implementation of the `strata new` command.
//!
//! Translates arguments into a [`SolutionConfiguration`], validates and plans
//! it, asks for confirmation, then generates.

use std::io::IsTerminal as _;
use std::path::Path;

use tracing::{debug, info, instrument};

use strata_core::{
    application::GenerateOptions,
    domain::{
        DomainValidator, Layer, SolutionConfiguration, SolutionPlan, policy::layer_def,
    },
    error::StrataError,
};

use crate::{
    cli::{GlobalArgs, NewArgs},
    commands::{print_report, service},
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

/// Execute the `strata new` command.
///
/// 1. Validate the free-text inputs
/// 2. Build the configuration, filling gaps from [`AppConfig`]
/// 3. Validate the layer graph and show the plan
/// 4. Confirm unless `--yes`, `--dry-run`, `--quiet` or JSON output
/// 5. Generate and report
#[instrument(skip_all, fields(solution = %args.name))]
pub fn execute(
    args: NewArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let solution = build_configuration(&args, &config)?;
    debug!(configuration = %solution, "Configuration resolved");

    let service = service(&config);
    let plan = service.plan(&solution, &args.edges)?;

    let interactive = !(args.yes || args.dry_run || global.quiet || output.is_json());
    if interactive {
        show_plan(&plan, &args.output, &output)?;
        if !confirm()? {
            return Err(CliError::Cancelled);
        }
    }

    let spinner = output.spinner(&format!("Generating {}...", solution.solution_name()));
    let result = service.generate(
        &solution,
        &args.output,
        GenerateOptions {
            dry_run: args.dry_run,
            force: args.force,
            extra_edges: args.edges,
        },
    );
    if let Some(bar) = spinner {
        bar.finish_and_clear();
    }
    let report = result?;
    info!(files = report.files_written(), "Generation finished");

    print_report(&report, &output)?;
    if report.dry_run || output.is_json() {
        return Ok(());
    }

    if report.is_noop() {
        output.success(&format!(
            "Solution '{}' is already up to date",
            solution.solution_name()
        ))?;
    } else {
        output.success(&format!("Solution '{}' created!", solution.solution_name()))?;
        output.print("")?;
        output.print("Next steps:")?;
        output.print(&format!("  cd {}", report.solution_root.display()))?;
        output.print("  dotnet build")?;
    }
    Ok(())
}

/// Arguments first, config defaults second.
fn build_configuration(args: &NewArgs, config: &AppConfig) -> CliResult<SolutionConfiguration> {
    DomainValidator::validate_solution_name(&args.name).map_err(StrataError::from)?;
    if let Some(namespace) = &args.namespace {
        DomainValidator::validate_namespace(namespace).map_err(StrataError::from)?;
    }

    let framework = args
        .framework
        .as_deref()
        .unwrap_or(&config.defaults.framework);
    DomainValidator::validate_target_framework(framework).map_err(StrataError::from)?;

    let layers: &[Layer] = if args.layers.is_empty() {
        &config.defaults.layers
    } else {
        &args.layers
    };

    let mut builder = SolutionConfiguration::builder()
        .solution_name(&args.name)
        .target_framework(framework)
        .layers(layers.iter().copied())
        .api_style(args.api.map_or(config.defaults.api_style, Into::into))
        .cqrs(args.cqrs)
        .ef_core(args.ef_core)
        .tests(args.tests);
    if let Some(namespace) = &args.namespace {
        builder = builder.base_namespace(namespace);
    }

    Ok(builder.build().map_err(StrataError::from)?)
}

// ── UI helpers ────────────────────────────────────────────────────────────────

fn show_plan(plan: &SolutionPlan, output_dir: &Path, out: &OutputManager) -> CliResult<()> {
    let config = plan.config();
    out.header("Solution")?;
    out.print(&format!("  Name:       {}", config.solution_name()))?;
    out.print(&format!("  Namespace:  {}", config.base_namespace()))?;
    out.print(&format!("  Framework:  {}", config.target_framework()))?;
    if config.has_layer(Layer::Api) {
        out.print(&format!("  API style:  {}", config.api_style()))?;
    }
    out.print(&format!(
        "  Location:   {}",
        output_dir.join(config.solution_name()).display()
    ))?;
    out.print("")?;

    out.header("Projects")?;
    for project in plan.projects() {
        let description = project
            .layer()
            .map_or("tests", |layer| layer_def(layer).description);
        out.print(&format!("  {:<32} {}", project.name(), description))?;
        for reference in project.references() {
            out.print(&format!("    -> {reference}"))?;
        }
    }
    out.print("")?;
    Ok(())
}

#[cfg(feature = "interactive")]
fn confirm() -> CliResult<bool> {
    require_terminal()?;
    dialoguer::Confirm::new()
        .with_prompt("Generate this solution?")
        .default(true)
        .interact()
        .map_err(|e| CliError::InvalidInput {
            message: "could not read confirmation".into(),
            source: Some(Box::new(e)),
        })
}

#[cfg(not(feature = "interactive"))]
fn confirm() -> CliResult<bool> {
    use std::io::{self, Write};

    require_terminal()?;
    print!("Generate this solution? [Y/n] ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    let input = input.trim().to_ascii_lowercase();
    Ok(input.is_empty() || input == "y" || input == "yes")
}

fn require_terminal() -> CliResult<()> {
    if std::io::stdin().is_terminal() {
        Ok(())
    } else {
        Err(CliError::InvalidInput {
            message: "stdin is not a terminal, cannot ask for confirmation (pass --yes)".into(),
            source: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    use crate::cli::{Cli, Commands};
    use strata_core::domain::ApiStyle;

    fn new_args(argv: &[&str]) -> NewArgs {
        let mut full = vec!["strata", "new"];
        full.extend_from_slice(argv);
        match Cli::parse_from(full).command {
            Commands::New(args) => args,
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn config_defaults_fill_gaps() {
        let config = AppConfig::default();
        let solution = build_configuration(&new_args(&["Acme.Shop"]), &config).unwrap();

        assert_eq!(solution.target_framework(), "net9.0");
        assert_eq!(solution.base_namespace(), "Acme.Shop");
        assert_eq!(solution.api_style(), ApiStyle::WebApi);
        assert!(solution.has_layer(Layer::Domain));
        assert!(solution.has_layer(Layer::Api));
        assert!(!solution.has_layer(Layer::SharedKernel));
    }

    #[test]
    fn flags_override_config() {
        let solution = build_configuration(
            &new_args(&[
                "Shop",
                "--namespace",
                "Acme.Shop",
                "--framework",
                "net8.0",
                "--layers",
                "application",
                "--api",
                "grpc",
            ]),
            &AppConfig::default(),
        )
        .unwrap();

        assert_eq!(solution.base_namespace(), "Acme.Shop");
        assert_eq!(solution.target_framework(), "net8.0");
        assert_eq!(solution.api_style(), ApiStyle::Grpc);
        assert!(!solution.has_layer(Layer::Infrastructure));
    }

    #[test]
    fn invalid_solution_name_is_rejected() {
        let err = build_configuration(&new_args(&["1Shop"]), &AppConfig::default()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn invalid_framework_is_rejected() {
        let err = build_configuration(
            &new_args(&["Shop", "--framework", "netcore"]),
            &AppConfig::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("netX.Y"));
    }
}
