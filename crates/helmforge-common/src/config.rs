//! Chart-level options supplied by the caller of a conversion run.

use std::num::NonZeroU32;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_CHART_DESCRIPTION, DEFAULT_CHART_VERSION};
use crate::error::{ChartError, Result};
use crate::types::ResourceRequirements;

/// Options that shape the generated chart but not the component set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct ChartOptions {
    /// `description` written to `Chart.yaml`.
    pub description: String,
    /// `version` written to `Chart.yaml`.
    pub version: String,
    /// Optional `appVersion` written to `Chart.yaml`.
    pub app_version: Option<String>,
    /// Replica count for every deployment.
    pub replica_count: NonZeroU32,
    /// Resource limits and requests for every container.
    pub resources: ResourceRequirements,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            description: DEFAULT_CHART_DESCRIPTION.to_owned(),
            version: DEFAULT_CHART_VERSION.to_owned(),
            app_version: None,
            replica_count: NonZeroU32::MIN,
            resources: ResourceRequirements::default(),
        }
    }
}

impl ChartOptions {
    /// Loads options from a YAML file. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid YAML,
    /// or carries invalid resource quantities.
    pub fn from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "loading chart options");
        let content = std::fs::read_to_string(path).map_err(|source| ChartError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let options: Self = serde_yaml::from_str(&content).map_err(|e| ChartError::Parse {
            message: format!("options file {}: {e}", path.display()),
        })?;
        options.validate()?;
        Ok(options)
    }

    /// Validates the options before a run uses them.
    ///
    /// # Errors
    ///
    /// Returns an error if the chart version is empty or a resource quantity is malformed.
    pub fn validate(&self) -> Result<()> {
        if self.version.trim().is_empty() {
            return Err(ChartError::Parse {
                message: "chart version must not be empty".into(),
            });
        }
        self.resources.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_chart_conventions() {
        let options = ChartOptions::default();
        assert_eq!(options.version, "0.1.0");
        assert_eq!(options.replica_count.get(), 1);
        assert!(options.description.contains("{{ .Release.Name }}"));
        assert!(options.validate().is_ok());
    }

    #[test]
    fn from_file_merges_with_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("options.yaml");
        std::fs::write(&path, "replicaCount: 3\nappVersion: \"2.0\"\n").expect("write");

        let options = ChartOptions::from_file(&path).expect("load");
        assert_eq!(options.replica_count.get(), 3);
        assert_eq!(options.app_version.as_deref(), Some("2.0"));
        assert_eq!(options.version, "0.1.0");
    }

    #[test]
    fn from_file_rejects_zero_replicas() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("options.yaml");
        std::fs::write(&path, "replicaCount: 0\n").expect("write");
        assert!(matches!(
            ChartOptions::from_file(&path),
            Err(ChartError::Parse { .. })
        ));
    }

    #[test]
    fn from_file_rejects_bad_limits() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("options.yaml");
        std::fs::write(
            &path,
            "resources:\n  limits: {cpu: \"1\", memory: 512Mi}\n  requests: {cpu: 250m, memory: 256Mi}\n",
        )
        .expect("write");
        assert!(matches!(
            ChartOptions::from_file(&path),
            Err(ChartError::InvalidResourceLimit { field: "cpu", .. })
        ));
    }

    #[test]
    fn from_file_reports_missing_file() {
        let err = ChartOptions::from_file(Path::new("/nonexistent/options.yaml")).unwrap_err();
        assert!(matches!(err, ChartError::Io { .. }));
    }
}
