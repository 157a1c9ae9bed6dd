//! `strata add-tests`: add test projects to an existing solution.

use tracing::{info, instrument};

use strata_adapters::find_solution;
use strata_core::{
    application::AddTestsOptions,
    domain::{DomainValidator, TestKind},
    error::StrataError,
};

use crate::{
    cli::AddTestsArgs,
    commands::{print_report, service},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

#[instrument(skip_all, fields(path = %args.path.display()))]
pub fn execute(args: AddTestsArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    if let Some(framework) = &args.framework {
        DomainValidator::validate_target_framework(framework).map_err(StrataError::from)?;
    }

    let solution_file = find_solution(&args.path, "sln")?;
    info!(solution = %solution_file.display(), "Found solution");

    let report = service(&config).add_test_projects(
        &solution_file,
        &requested_kinds(&args),
        AddTestsOptions {
            target_framework: args.framework,
            dry_run: args.dry_run,
        },
    )?;

    print_report(&report, &output)?;
    if report.dry_run || output.is_json() {
        return Ok(());
    }

    if report.is_noop() {
        output.success("All requested test projects already exist")?;
    } else {
        output.success(&format!(
            "Added {} test project(s) to {}",
            report.projects_added.len(),
            solution_file.display()
        ))?;
    }
    Ok(())
}

/// Both kinds when none are named; duplicates collapse.
fn requested_kinds(args: &AddTestsArgs) -> Vec<TestKind> {
    if args.kinds.is_empty() {
        return TestKind::ALL.to_vec();
    }
    let mut kinds: Vec<TestKind> = args.kinds.iter().map(|&k| k.into()).collect();
    kinds.sort();
    kinds.dedup();
    kinds
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use crate::cli::TestKindArg;

    fn args(kinds: Vec<TestKindArg>) -> AddTestsArgs {
        AddTestsArgs {
            path: PathBuf::from("."),
            kinds,
            framework: None,
            dry_run: false,
        }
    }

    #[test]
    fn no_kind_means_both() {
        assert_eq!(
            requested_kinds(&args(vec![])),
            [TestKind::Unit, TestKind::Integration]
        );
    }

    #[test]
    fn repeated_kinds_collapse() {
        assert_eq!(
            requested_kinds(&args(vec![
                TestKindArg::Integration,
                TestKindArg::Integration
            ])),
            [TestKind::Integration]
        );
    }
}
