//! Domain value objects: Layer, ApiStyle, BuildAxis, ConfigProperty, TestKind.
//!
//! # Design
//!
//! These are pure value types with equality-by-value and no identity.
//! They hold NO policy logic. Which layer may depend on which lives in
//! `policy.rs`. This file defines the types, their string representations,
//! and their `FromStr` parsers.
//!
//! # Adding a New Layer
//!
//! 1. Add the enum variant here, in precedence order
//! 2. Add the `as_str`, `project_suffix` and `FromStr` arms here
//! 3. Add a `LayerDef` entry in `policy.rs`
//! 4. Validation and ordering then derive from the registry

use crate::domain::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ── Layer ─────────────────────────────────────────────────────────────────────

/// An architectural layer, one generated project each.
///
/// Variant order is the emission precedence: foundational layer first, core
/// domain second, then outward by dependency distance. `Ord` is derived, so
/// any `BTreeSet<Layer>` iterates in that order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Layer {
    SharedKernel,
    Domain,
    Application,
    Infrastructure,
    Api,
}

impl Layer {
    /// Every layer, in precedence order.
    pub const ALL: [Layer; 5] = [
        Self::SharedKernel,
        Self::Domain,
        Self::Application,
        Self::Infrastructure,
        Self::Api,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SharedKernel => "shared-kernel",
            Self::Domain => "domain",
            Self::Application => "application",
            Self::Infrastructure => "infrastructure",
            Self::Api => "api",
        }
    }

    /// Suffix appended to the base namespace to name the layer's project,
    /// e.g. `Acme.Shop` + `Domain` → `Acme.Shop.Domain`.
    pub const fn project_suffix(&self) -> &'static str {
        match self {
            Self::SharedKernel => "SharedKernel",
            Self::Domain => "Domain",
            Self::Application => "Application",
            Self::Infrastructure => "Infrastructure",
            Self::Api => "API",
        }
    }

    /// Position in the emission order (0 = emitted first).
    pub const fn precedence(&self) -> u8 {
        *self as u8
    }

    /// Whether every solution must include this layer.
    ///
    /// Delegates to the policy registry.
    pub fn is_mandatory(self) -> bool {
        crate::domain::policy::layer_def(self).mandatory
    }

    /// Recover a layer from a generated project name such as
    /// `Acme.Shop.Infrastructure`.
    pub fn from_project_name(project_name: &str) -> Option<Self> {
        let suffix = project_name.rsplit('.').next()?;
        Self::ALL
            .into_iter()
            .find(|layer| layer.project_suffix().eq_ignore_ascii_case(suffix))
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.project_suffix())
    }
}

impl FromStr for Layer {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "shared-kernel" | "sharedkernel" | "shared_kernel" | "kernel" | "sk" => {
                Ok(Self::SharedKernel)
            }
            "domain" => Ok(Self::Domain),
            "application" | "app" => Ok(Self::Application),
            "infrastructure" | "infra" => Ok(Self::Infrastructure),
            "api" | "presentation" => Ok(Self::Api),
            other => Err(DomainError::UnknownLayer(other.to_string())),
        }
    }
}

// ── ApiStyle ──────────────────────────────────────────────────────────────────

/// Flavour of the API surface project. Only meaningful when `Layer::Api` is
/// selected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApiStyle {
    /// Controllers-based ASP.NET Core Web API.
    #[default]
    WebApi,
    MinimalApi,
    Grpc,
}

impl ApiStyle {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::WebApi => "web-api",
            Self::MinimalApi => "minimal-api",
            Self::Grpc => "grpc",
        }
    }

    /// Name shown in summaries.
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::WebApi => "WebAPI",
            Self::MinimalApi => "MinimalAPI",
            Self::Grpc => "gRPC",
        }
    }
}

impl fmt::Display for ApiStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for ApiStyle {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "web-api" | "webapi" | "controllers" => Ok(Self::WebApi),
            "minimal-api" | "minimalapi" | "minimal" => Ok(Self::MinimalApi),
            "grpc" => Ok(Self::Grpc),
            other => Err(DomainError::InvalidConfiguration(format!(
                "unknown API style: {other}"
            ))),
        }
    }
}

// ── TestKind ──────────────────────────────────────────────────────────────────

/// A generated test project flavour.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum TestKind {
    Unit,
    Integration,
}

impl TestKind {
    pub const ALL: [TestKind; 2] = [Self::Unit, Self::Integration];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unit => "Unit",
            Self::Integration => "Integration",
        }
    }
}

impl fmt::Display for TestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TestKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "unit" => Ok(Self::Unit),
            "integration" => Ok(Self::Integration),
            other => Err(DomainError::InvalidConfiguration(format!(
                "unknown test kind: {other}"
            ))),
        }
    }
}

// ── BuildAxis ─────────────────────────────────────────────────────────────────

/// One `(configuration, platform)` pair, e.g. `Debug|Any CPU`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BuildAxis {
    configuration: String,
    platform: String,
}

impl BuildAxis {
    pub fn new(configuration: impl Into<String>, platform: impl Into<String>) -> Self {
        Self {
            configuration: configuration.into(),
            platform: platform.into(),
        }
    }

    /// The fixed matrix every generated project is registered against.
    pub fn standard_matrix() -> Vec<BuildAxis> {
        vec![
            Self::new("Debug", "Any CPU"),
            Self::new("Release", "Any CPU"),
        ]
    }

    pub fn configuration(&self) -> &str {
        &self.configuration
    }

    pub fn platform(&self) -> &str {
        &self.platform
    }
}

impl fmt::Display for BuildAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.configuration, self.platform)
    }
}

impl FromStr for BuildAxis {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().split_once('|') {
            Some((cfg, platform)) if !cfg.is_empty() && !platform.is_empty() => {
                Ok(Self::new(cfg, platform))
            }
            _ => Err(DomainError::InvalidBuildAxis(s.to_string())),
        }
    }
}

// ── ConfigProperty ────────────────────────────────────────────────────────────

/// The property a per-project configuration line sets for one axis.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConfigProperty {
    /// `ActiveCfg`: which project configuration the axis maps to.
    ActiveCfg,
    /// `Build.0`: the project is built for the axis.
    Build0,
    /// Anything else found in a loaded file (`Deploy.0`, ...), kept verbatim.
    Other(String),
}

impl ConfigProperty {
    /// Properties written for every generated project, per axis.
    pub const STANDARD: [ConfigProperty; 2] = [Self::ActiveCfg, Self::Build0];

    pub fn as_str(&self) -> &str {
        match self {
            Self::ActiveCfg => "ActiveCfg",
            Self::Build0 => "Build.0",
            Self::Other(raw) => raw,
        }
    }

    pub fn parse(raw: &str) -> Self {
        match raw {
            "ActiveCfg" => Self::ActiveCfg,
            "Build.0" => Self::Build0,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ConfigProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
