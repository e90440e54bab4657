//! System-wide constants and default file names.

/// Binary name for the CLI.
pub const BIN_NAME: &str = "helmforge";

/// Composition file read when none is given on the command line.
pub const DEFAULT_COMPOSE_FILE: &str = "docker-compose.yml";

/// `apiVersion` written to `Chart.yaml`.
pub const CHART_API_VERSION: &str = "v2";

/// Chart version used unless overridden.
pub const DEFAULT_CHART_VERSION: &str = "0.1.0";

/// Chart description used unless overridden.
///
/// `{{ .Release.Name }}` is left for Helm to expand at install time.
pub const DEFAULT_CHART_DESCRIPTION: &str = "A Helm chart for {{ .Release.Name }}";

/// Suffix appended to the chart base name for the chart name and directory.
pub const CHART_DIR_SUFFIX: &str = "-chart";

/// Chart metadata file name.
pub const CHART_FILE: &str = "Chart.yaml";

/// Values file name.
pub const VALUES_FILE: &str = "values.yaml";

/// Directory holding the rendered manifests inside a chart.
pub const TEMPLATES_DIR: &str = "templates";

/// Image tag used when the image reference carries none.
pub const DEFAULT_IMAGE_TAG: &str = "latest";

/// Name fragment marking infrastructure-only components.
pub const DEFAULT_INFRA_NEEDLE: &str = "db";

/// Top-level values keys that component names must not shadow.
pub const RESERVED_VALUES_KEYS: [&str; 3] = ["imagePullSecrets", "replicaCount", "serviceAccount"];

/// Default CPU limit.
pub const DEFAULT_CPU_LIMIT: &str = "500m";
/// Default memory limit.
pub const DEFAULT_MEMORY_LIMIT: &str = "512Mi";
/// Default CPU request.
pub const DEFAULT_CPU_REQUEST: &str = "250m";
/// Default memory request.
pub const DEFAULT_MEMORY_REQUEST: &str = "256Mi";
