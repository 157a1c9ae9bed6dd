//! `strata check`: validate a layer selection without generating.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::instrument;

use strata_core::{application::GenerationService, domain::Layer};

use crate::{
    cli::CheckArgs,
    commands::EdgeView,
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

#[derive(Debug, Serialize)]
struct CheckView {
    valid: bool,
    layers: BTreeSet<Layer>,
    edges: Vec<EdgeView>,
}

/// Violations surface as the returned error, every one of them, and exit 2.
#[instrument(skip_all, fields(layers = args.layers.len(), edges = args.edges.len()))]
pub fn execute(args: CheckArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let layers: BTreeSet<Layer> = if args.layers.is_empty() {
        config.defaults.layers.iter().copied().collect()
    } else {
        args.layers.iter().copied().collect()
    };

    let report = GenerationService::check(&layers, &args.edges)?;

    if output.is_json() {
        return output.json(
            "check result",
            &CheckView {
                valid: true,
                layers: report.layers,
                edges: EdgeView::all(&report.edges),
            },
        );
    }

    let names: Vec<&str> = report.layers.iter().map(|l| l.project_suffix()).collect();
    output.success(&format!("Layer selection is valid: {}", names.join(", ")))?;
    for (from, to) in &report.edges {
        output.print(&format!("  {from} -> {to}"))?;
    }
    Ok(())
}
