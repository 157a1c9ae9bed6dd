//! The `SolutionConfiguration` input and its typestate builder.
//!
//! A configuration is what the collaborator (the CLI) hands to the core: the
//! solution name, namespace, target framework, selected layers and feature
//! toggles. Free-text fields are expected to be checked by the caller with
//! `DomainValidator` before they get here; the builder only enforces the
//! structural rules (a name is present, mandatory layers are selected).
//!
//! # Typestate builder
//!
//! `NoName` / `HasName` markers make it a compile error to call `build()`
//! before a solution name has been given.

use std::collections::BTreeSet;
use std::fmt;
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

use crate::domain::{
    error::DomainError,
    policy,
    value_objects::{ApiStyle, Layer, TestKind},
};

/// Target framework used when none is given.
pub const DEFAULT_TARGET_FRAMEWORK: &str = "net9.0";

// ── Aggregate ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolutionConfiguration {
    solution_name: String,
    base_namespace: String,
    target_framework: String,
    layers: BTreeSet<Layer>,
    api_style: ApiStyle,
    cqrs: bool,
    ef_core: bool,
    tests: bool,
}

impl SolutionConfiguration {
    pub fn builder() -> SolutionConfigurationBuilder<NoName> {
        SolutionConfigurationBuilder::new()
    }

    pub fn solution_name(&self) -> &str {
        &self.solution_name
    }

    pub fn base_namespace(&self) -> &str {
        &self.base_namespace
    }

    pub fn target_framework(&self) -> &str {
        &self.target_framework
    }

    /// Selected layers, in precedence order.
    pub fn layers(&self) -> &BTreeSet<Layer> {
        &self.layers
    }

    pub fn has_layer(&self, layer: Layer) -> bool {
        self.layers.contains(&layer)
    }

    pub const fn api_style(&self) -> ApiStyle {
        self.api_style
    }

    pub const fn cqrs(&self) -> bool {
        self.cqrs
    }

    pub const fn ef_core(&self) -> bool {
        self.ef_core
    }

    pub const fn tests(&self) -> bool {
        self.tests
    }

    /// Test projects to generate: both kinds when tests are on, none otherwise.
    pub fn test_kinds(&self) -> Vec<TestKind> {
        if self.tests {
            TestKind::ALL.to_vec()
        } else {
            Vec::new()
        }
    }

    /// `Acme.Shop` + `Domain` → `Acme.Shop.Domain`.
    pub fn project_name(&self, layer: Layer) -> String {
        format!("{}.{}", self.base_namespace, layer.project_suffix())
    }

    /// `Acme.Shop` + `Unit` → `Acme.Shop.UnitTests`.
    pub fn test_project_name(&self, kind: TestKind) -> String {
        format!("{}.{}Tests", self.base_namespace, kind.as_str())
    }

    /// Structural checks. Called by the builder.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.solution_name.trim().is_empty() {
            return Err(DomainError::InvalidConfiguration(
                "solution name cannot be empty".into(),
            ));
        }
        if self.base_namespace.trim().is_empty() {
            return Err(DomainError::InvalidConfiguration(
                "namespace cannot be empty".into(),
            ));
        }
        if self.target_framework.trim().is_empty() {
            return Err(DomainError::InvalidConfiguration(
                "target framework cannot be empty".into(),
            ));
        }
        if let Some(missing) = policy::mandatory_layers().find(|l| !self.layers.contains(l)) {
            return Err(DomainError::MissingMandatoryLayer {
                layer: missing.to_string(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for SolutionConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let layers: Vec<&str> = self.layers.iter().map(|l| l.project_suffix()).collect();
        write!(
            f,
            "{} ({}, {})",
            self.solution_name,
            self.target_framework,
            layers.join(", ")
        )
    }
}

// ── Typestate markers ─────────────────────────────────────────────────────────

/// Marker: no solution name yet.
pub struct NoName;
/// Marker: solution name set; `build()` is available.
pub struct HasName;

// ── Builder ───────────────────────────────────────────────────────────────────

pub struct SolutionConfigurationBuilder<N> {
    solution_name: String,
    base_namespace: Option<String>,
    target_framework: Option<String>,
    layers: BTreeSet<Layer>,
    api_style: ApiStyle,
    cqrs: bool,
    ef_core: bool,
    tests: bool,
    _marker: PhantomData<N>,
}

impl SolutionConfigurationBuilder<NoName> {
    pub fn new() -> Self {
        Self {
            solution_name: String::new(),
            base_namespace: None,
            target_framework: None,
            layers: BTreeSet::new(),
            api_style: ApiStyle::default(),
            cqrs: false,
            ef_core: false,
            tests: false,
            _marker: PhantomData,
        }
    }

    pub fn solution_name(self, name: impl Into<String>) -> SolutionConfigurationBuilder<HasName> {
        SolutionConfigurationBuilder {
            solution_name: name.into(),
            base_namespace: self.base_namespace,
            target_framework: self.target_framework,
            layers: self.layers,
            api_style: self.api_style,
            cqrs: self.cqrs,
            ef_core: self.ef_core,
            tests: self.tests,
            _marker: PhantomData,
        }
    }
}

impl Default for SolutionConfigurationBuilder<NoName> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N> SolutionConfigurationBuilder<N> {
    /// Defaults to the solution name.
    pub fn base_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.base_namespace = Some(namespace.into());
        self
    }

    pub fn target_framework(mut self, framework: impl Into<String>) -> Self {
        self.target_framework = Some(framework.into());
        self
    }

    pub fn layer(mut self, layer: Layer) -> Self {
        self.layers.insert(layer);
        self
    }

    pub fn layers(mut self, layers: impl IntoIterator<Item = Layer>) -> Self {
        self.layers.extend(layers);
        self
    }

    pub fn api_style(mut self, style: ApiStyle) -> Self {
        self.api_style = style;
        self
    }

    pub fn cqrs(mut self, on: bool) -> Self {
        self.cqrs = on;
        self
    }

    pub fn ef_core(mut self, on: bool) -> Self {
        self.ef_core = on;
        self
    }

    pub fn tests(mut self, on: bool) -> Self {
        self.tests = on;
        self
    }
}

impl SolutionConfigurationBuilder<HasName> {
    /// Finish the configuration. Mandatory layers are always added.
    pub fn build(self) -> Result<SolutionConfiguration, DomainError> {
        let mut layers = self.layers;
        layers.extend(policy::mandatory_layers());

        let base_namespace = self
            .base_namespace
            .unwrap_or_else(|| self.solution_name.clone());

        let config = SolutionConfiguration {
            solution_name: self.solution_name,
            base_namespace,
            target_framework: self
                .target_framework
                .unwrap_or_else(|| DEFAULT_TARGET_FRAMEWORK.to_string()),
            layers,
            api_style: self.api_style,
            cqrs: self.cqrs,
            ef_core: self.ef_core,
            tests: self.tests,
        };
        config.validate()?;
        Ok(config)
    }
}
