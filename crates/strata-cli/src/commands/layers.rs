//! `strata layers`: print the dependency policy.

use serde::Serialize;

use strata_core::domain::{FOUNDATION, LAYER_REGISTRY, Layer, LayerDef};

use crate::{error::CliResult, output::OutputManager};

#[derive(Debug, Serialize)]
struct LayerView {
    layer: Layer,
    project_suffix: &'static str,
    mandatory: bool,
    may_depend_on: Vec<Layer>,
    references_by_default: Vec<Layer>,
    description: &'static str,
}

impl From<&LayerDef> for LayerView {
    fn from(def: &LayerDef) -> Self {
        Self {
            layer: def.layer,
            project_suffix: def.layer.project_suffix(),
            mandatory: def.mandatory,
            may_depend_on: may_depend_on(def),
            references_by_default: def.required.to_vec(),
            description: def.description,
        }
    }
}

/// Static permissions plus the foundation, which is granted only when it is
/// selected.
fn may_depend_on(def: &LayerDef) -> Vec<Layer> {
    let mut layers = def.allowed.to_vec();
    if def.foundation_consumer {
        layers.insert(0, FOUNDATION);
    }
    layers
}

pub fn execute(output: OutputManager) -> CliResult<()> {
    let views: Vec<LayerView> = LAYER_REGISTRY.iter().map(LayerView::from).collect();

    if output.is_json() {
        return output.json("layer policy", &views);
    }

    output.header("Layers (in emission order)")?;
    for view in &views {
        let marker = if view.mandatory { " (mandatory)" } else { "" };
        output.print(&format!("  {}{marker}", view.project_suffix))?;
        output.print(&format!("      {}", view.description))?;
        output.print(&format!("      may depend on: {}", render(&view.may_depend_on, view)))?;
    }
    output.print("")?;
    output.print(&format!(
        "{} is referenced only when it is part of the selection.",
        FOUNDATION
    ))?;
    Ok(())
}

fn render(layers: &[Layer], view: &LayerView) -> String {
    if layers.is_empty() {
        return "nothing".into();
    }
    layers
        .iter()
        .map(|layer| {
            if view.references_by_default.contains(layer) {
                format!("{layer} (default)")
            } else {
                layer.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}
