//! # helmforge-compose
//!
//! Reading side of the compose-to-chart conversion.
//!
//! Handles:
//! - **Document**: parsing the `services` mapping of a composition file,
//!   preserving component order and rejecting duplicate names.
//! - **Normalize**: turning one loosely-typed descriptor into a [`ComponentSpec`].
//! - **Classify**: deciding which components are workloads and which are
//!   infrastructure left out of the chart.

pub mod classify;
pub mod document;
pub mod normalize;

pub use classify::{AcceptAll, ComponentFilter, NameDenylist};
pub use document::{CompositionDocument, RawComponent};
pub use normalize::{ComponentSpec, normalize};
