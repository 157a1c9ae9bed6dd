//! Application services - orchestrate use cases.
//!
//! Services coordinate the domain layer and ports to accomplish
//! high-level use cases like "generate a solution" or "add test projects".

pub mod generation_service;

pub use generation_service::{
    AddTestsOptions, CheckReport, GenerateOptions, GenerationReport, GenerationService,
};
