//! Infrastructure adapters for Strata.
//!
//! This crate implements the ports defined in `strata-core::application::ports`.
//! It contains all external dependencies and I/O operations.

pub mod codec;
pub mod filesystem;
pub mod locate;
pub mod renderer;

// Re-export commonly used adapters
pub use codec::SlnCodec;
pub use filesystem::{LocalFilesystem, MemoryFilesystem};
pub use locate::find_solution;
pub use renderer::MsBuildRenderer;
