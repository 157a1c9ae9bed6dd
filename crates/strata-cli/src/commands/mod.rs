//! Command handlers, one module per subcommand.
//!
//! Handlers translate arguments into core calls and print the result. No
//! business logic lives here.

pub mod add_tests;
pub mod check;
pub mod completions;
pub mod config;
pub mod init;
pub mod layers;
pub mod new;

use std::path::{Path, PathBuf};

use serde::Serialize;

use strata_adapters::{LocalFilesystem, MsBuildRenderer, SlnCodec};
use strata_core::{
    application::{GenerationReport, GenerationService},
    domain::Layer,
};

use crate::{config::AppConfig, error::CliResult, output::OutputManager};

/// The generation service wired to the real filesystem.
pub(crate) fn service(config: &AppConfig) -> GenerationService {
    GenerationService::new(
        Box::new(LocalFilesystem::new()),
        Box::new(SlnCodec::new()),
        Box::new(MsBuildRenderer::new()),
    )
    .with_id_strategy(config.defaults.id_strategy)
}

/// JSON shape of a [`GenerationReport`].
#[derive(Debug, Serialize)]
struct ReportView<'a> {
    solution_file: &'a Path,
    dry_run: bool,
    projects_added: &'a [String],
    projects_existing: &'a [String],
    references: Vec<EdgeView>,
    references_missing: Vec<EdgeView>,
    files: &'a [PathBuf],
    axes_added: usize,
    entries_added: usize,
    nestings_added: usize,
    config_lines_added: usize,
}

#[derive(Debug, Serialize)]
pub(crate) struct EdgeView {
    from: Layer,
    to: Layer,
}

impl EdgeView {
    pub(crate) fn all(edges: &[(Layer, Layer)]) -> Vec<Self> {
        edges.iter().map(|&(from, to)| Self { from, to }).collect()
    }
}

impl<'a> From<&'a GenerationReport> for ReportView<'a> {
    fn from(report: &'a GenerationReport) -> Self {
        Self {
            solution_file: &report.solution_file,
            dry_run: report.dry_run,
            projects_added: &report.projects_added,
            projects_existing: &report.projects_existing,
            references: EdgeView::all(&report.references),
            references_missing: EdgeView::all(&report.references_missing),
            files: &report.paths,
            axes_added: report.synthesis.axes_added,
            entries_added: report.synthesis.entries_added,
            nestings_added: report.synthesis.nestings_added,
            config_lines_added: report.synthesis.config_lines_added,
        }
    }
}

/// Print what a `new` or `add-tests` run did, in the selected format.
pub(crate) fn print_report(report: &GenerationReport, output: &OutputManager) -> CliResult<()> {
    if output.is_json() {
        return output.json("report", &ReportView::from(report));
    }

    for &(from, to) in &report.references_missing {
        output.warning(&format!(
            "{from} project was left as is and does not reference {to}; add the reference by hand"
        ))?;
    }

    if report.dry_run {
        output.info(&format!(
            "Dry run: would write {} file(s) under {}",
            report.files_written(),
            report.solution_root.display()
        ))?;
        for path in &report.paths {
            output.print(&format!("  {}", path.display()))?;
        }
        return Ok(());
    }

    for name in &report.projects_added {
        output.print(&format!("  + {name}"))?;
    }
    for name in &report.projects_existing {
        output.print(&format!("  = {name} (already present)"))?;
    }

    let s = &report.synthesis;
    if !s.is_noop() {
        output.print(&format!(
            "  {} entries, {} nestings, {} configuration lines, {} build axes added to {}",
            s.entries_added,
            s.nestings_added,
            s.config_lines_added,
            s.axes_added,
            report.solution_file.display()
        ))?;
    }
    Ok(())
}
