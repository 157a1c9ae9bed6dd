//! Project file renderers.

mod msbuild;

pub use msbuild::MsBuildRenderer;
