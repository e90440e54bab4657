//! Unified error types for the helmforge workspace.
//!
//! Component-level variants carry the component name and the offending
//! value so a failed run can point at the exact field that broke it.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum ChartError {
    /// The composition document could not be parsed.
    #[error("invalid composition document: {message}")]
    Parse {
        /// Description of the parse failure.
        message: String,
    },

    /// A component descriptor has no `image` field.
    #[error("component \"{component}\" has no image field")]
    MissingImageField {
        /// Component name.
        component: String,
    },

    /// An environment entry is not `KEY=VALUE` or is not a scalar.
    #[error("component \"{component}\": malformed environment entry {entry:?}")]
    MalformedEnvironmentEntry {
        /// Component name.
        component: String,
        /// The entry as written in the document.
        entry: String,
    },

    /// A port entry does not resolve to a container port in `1..=65535`.
    #[error("component \"{component}\": invalid port spec {port:?}")]
    InvalidPortSpec {
        /// Component name.
        component: String,
        /// The entry as written in the document.
        port: String,
    },

    /// The same component name appears twice under `services`.
    #[error("duplicate component name: \"{name}\"")]
    DuplicateComponent {
        /// Repeated name.
        name: String,
    },

    /// A component name cannot be used as a manifest file name.
    #[error("invalid component name {name:?}: {reason}")]
    InvalidComponentName {
        /// Offending name.
        name: String,
        /// Why the name was rejected.
        reason: &'static str,
    },

    /// A component name collides with a fixed top-level values key.
    #[error("component name \"{name}\" collides with a reserved values key")]
    ReservedComponentName {
        /// Offending name.
        name: String,
    },

    /// A resource quantity failed validation.
    #[error("invalid {field} quantity {value:?}: {reason}")]
    InvalidResourceLimit {
        /// Which quantity (`cpu` or `memory`).
        field: &'static str,
        /// The rejected value.
        value: String,
        /// Why the value was rejected.
        reason: &'static str,
    },

    /// A manifest skeleton could not be located.
    #[error("{kind} skeleton not found at {path}")]
    TemplateNotFound {
        /// Manifest kind (`deployment` or `service`).
        kind: &'static str,
        /// Where the skeleton was looked up.
        path: PathBuf,
    },

    /// The chart base name cannot be used as a directory name.
    #[error("invalid chart name {name:?}: {reason}")]
    InvalidChartName {
        /// Offending name.
        name: String,
        /// Why the name was rejected.
        reason: &'static str,
    },

    /// A manifest skeleton or rendered manifest carries template syntax
    /// that would reach the output unresolved.
    #[error("{manifest} contains unresolved token {token:?}")]
    UnresolvedPlaceholder {
        /// Manifest kind.
        manifest: &'static str,
        /// The leftover token.
        token: String,
    },

    /// Serializing chart metadata or values failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_yaml::Error,
    },

    /// Reading an input file failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Writing the generated chart failed.
    #[error("failed to write chart output at {path}: {source}")]
    OutputWriteFailure {
        /// Path that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

impl ChartError {
    /// Returns the component name this error refers to, if any.
    #[must_use]
    pub fn component(&self) -> Option<&str> {
        match self {
            Self::MissingImageField { component }
            | Self::MalformedEnvironmentEntry { component, .. }
            | Self::InvalidPortSpec { component, .. } => Some(component),
            Self::DuplicateComponent { name }
            | Self::InvalidComponentName { name, .. }
            | Self::ReservedComponentName { name } => Some(name),
            _ => None,
        }
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, ChartError>;
