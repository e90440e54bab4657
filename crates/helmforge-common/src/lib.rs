//! # helmforge-common
//!
//! Shared error definitions, chart options, resource quantities, and
//! constants used across the helmforge workspace.
//!
//! This crate is the leaf of the dependency graph: it depends on no other
//! internal crate.

pub mod config;
pub mod constants;
pub mod error;
pub mod types;
