//! # helmforge-chart
//!
//! Writing side of the compose-to-chart conversion.
//!
//! Handles:
//! - **Values**: folding normalized components into `values.yaml`.
//! - **Skeleton**: loading and compiling the deployment/service skeletons.
//! - **Render**: filling skeletons with precomputed blocks per component.
//! - **Assemble**: driving a full run into an in-memory [`ChartFileSet`].
//! - **Emit**: writing a file set to disk atomically.

pub mod assemble;
pub mod emit;
pub mod render;
pub mod skeleton;
pub mod values;

pub use assemble::{ChartAssembler, ChartFile, ChartFileSet};
pub use emit::write_chart;
pub use render::ManifestRenderer;
pub use skeleton::{BuiltinSkeletons, DirectorySkeletons, ManifestKind, SkeletonSource};
pub use values::ValuesDocument;
