//! Strata Core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers for the Strata
//! layered-solution scaffolder, following hexagonal (ports and adapters)
//! architecture.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │           strata-cli (CLI)              │
//! │     (Implements Driving Ports)          │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │          (GenerationService)            │
//! │         Orchestrates Use Cases          │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │  (Driven: Filesystem, Codec, Renderer)  │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │     strata-adapters (Infrastructure)    │
//! │  (SlnCodec, MsBuildRenderer, Local/     │
//! │   MemoryFilesystem)                     │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Domain Layer (Pure Logic)       │
//! │  (LayerGraph, DependencyRuleValidator,  │
//! │   ManifestDocument, ManifestSynthesizer)│
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use strata_core::{
//!     application::{GenerateOptions, GenerationService},
//!     domain::{Layer, SolutionConfiguration},
//! };
//! # fn adapters() -> GenerationService { unimplemented!() }
//!
//! // 1. Describe the solution
//! let config = SolutionConfiguration::builder()
//!     .solution_name("Shop")
//!     .layers([Layer::Application, Layer::Infrastructure, Layer::Api])
//!     .build()
//!     .unwrap();
//!
//! // 2. Use application service (with injected adapters)
//! let service = adapters();
//! service.generate(&config, "./out".as_ref(), GenerateOptions::default()).unwrap();
//! ```

// Re-export domain layer (stable, well-defined API)
pub mod domain;

// Re-export application layer (orchestration logic)
pub mod application;

// Re-export error types
pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        AddTestsOptions, GenerateOptions, GenerationReport, GenerationService,
        ports::{Filesystem, ManifestCodec, ProjectRenderer},
    };
    pub use crate::domain::{
        ApiStyle, DependencyPolicy, DependencyRuleValidator, IdStrategy, Layer, LayerGraph,
        ManifestDocument, ManifestSynthesizer, SolutionConfiguration, SolutionPlan, TestKind,
    };
    pub use crate::error::{StrataError, StrataResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
