//! Resource quantity types shared by options, values, and manifests.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CPU_LIMIT, DEFAULT_CPU_REQUEST, DEFAULT_MEMORY_LIMIT, DEFAULT_MEMORY_REQUEST,
};
use crate::error::{ChartError, Result};

/// A CPU/memory pair in Kubernetes quantity notation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceQuantities {
    /// CPU quantity in millicores, e.g. `500m`.
    pub cpu: String,
    /// Memory quantity, e.g. `512Mi` or `1Gi`.
    pub memory: String,
}

impl ResourceQuantities {
    /// Creates a quantity pair.
    #[must_use]
    pub fn new(cpu: impl Into<String>, memory: impl Into<String>) -> Self {
        Self {
            cpu: cpu.into(),
            memory: memory.into(),
        }
    }
}

/// Limits and requests applied to every generated container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRequirements {
    /// Upper bounds.
    pub limits: ResourceQuantities,
    /// Scheduling requests.
    pub requests: ResourceQuantities,
}

impl Default for ResourceRequirements {
    fn default() -> Self {
        Self {
            limits: ResourceQuantities::new(DEFAULT_CPU_LIMIT, DEFAULT_MEMORY_LIMIT),
            requests: ResourceQuantities::new(DEFAULT_CPU_REQUEST, DEFAULT_MEMORY_REQUEST),
        }
    }
}

impl ResourceRequirements {
    /// Validates both the limits and the requests.
    ///
    /// # Errors
    ///
    /// Returns [`ChartError::InvalidResourceLimit`] on the first bad quantity.
    pub fn validate(&self) -> Result<()> {
        validate_limits(&self.limits)?;
        validate_limits(&self.requests)
    }
}

/// Checks that `cpu` is expressed in millicores and `memory` in `Mi` or `Gi`.
///
/// # Errors
///
/// Returns [`ChartError::InvalidResourceLimit`] naming the offending field.
pub fn validate_limits(quantities: &ResourceQuantities) -> Result<()> {
    check_quantity("cpu", &quantities.cpu, &["m"], "cpu must end with m")?;
    check_quantity(
        "memory",
        &quantities.memory,
        &["Mi", "Gi"],
        "memory must end with Mi or Gi",
    )
}

fn check_quantity(
    field: &'static str,
    value: &str,
    suffixes: &[&str],
    suffix_reason: &'static str,
) -> Result<()> {
    let invalid = |reason| ChartError::InvalidResourceLimit {
        field,
        value: value.to_owned(),
        reason,
    };

    let magnitude = suffixes
        .iter()
        .find_map(|suffix| value.strip_suffix(suffix))
        .ok_or_else(|| invalid(suffix_reason))?;

    match magnitude.parse::<u64>() {
        Ok(n) if n > 0 => Ok(()),
        _ => Err(invalid("magnitude must be a positive integer")),
    }
}

/// Returns why `name` cannot be used as a file or object name, if it cannot.
///
/// Usable names are ASCII letters, digits, `-`, `.` and `_`, and start and
/// end with a letter or digit.
#[must_use]
pub fn name_rejection(name: &str) -> Option<&'static str> {
    let is_edge = |c: Option<char>| c.is_some_and(|c| c.is_ascii_alphanumeric());
    if name.is_empty() {
        Some("name is empty")
    } else if name.contains(['/', '\\']) {
        Some("name contains a path separator")
    } else if name.chars().any(char::is_whitespace) {
        Some("name contains whitespace")
    } else if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_'))
    {
        Some("name may only contain letters, digits, '-', '.' and '_'")
    } else if !is_edge(name.chars().next()) || !is_edge(name.chars().next_back()) {
        Some("name must start and end with a letter or digit")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_names_are_usable() {
        assert_eq!(name_rejection("web-frontend_2"), None);
    }

    #[test]
    fn path_like_names_are_rejected() {
        assert!(name_rejection("a/b").is_some());
        assert!(name_rejection("..").is_some());
        assert!(name_rejection("").is_some());
        assert!(name_rejection("my app").is_some());
    }

    #[test]
    fn names_outside_label_charset_are_rejected() {
        assert!(name_rejection("web:").is_some());
        assert!(name_rejection("-web").is_some());
        assert!(name_rejection("web.").is_some());
        assert!(name_rejection("caf\u{e9}").is_some());
        assert!(name_rejection("{{x}}").is_some());
        assert_eq!(name_rejection("userDB"), None);
        assert_eq!(name_rejection("8080"), None);
    }

    #[test]
    fn default_requirements_are_valid() {
        assert!(ResourceRequirements::default().validate().is_ok());
    }

    #[test]
    fn gibibyte_memory_is_accepted() {
        assert!(validate_limits(&ResourceQuantities::new("1000m", "2Gi")).is_ok());
    }

    #[test]
    fn cpu_without_millicore_suffix_fails() {
        let err = validate_limits(&ResourceQuantities::new("2", "512Mi")).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("cpu must end with m"), "got: {msg}");
    }

    #[test]
    fn memory_in_megabytes_fails() {
        let err = validate_limits(&ResourceQuantities::new("500m", "512M")).unwrap_err();
        assert!(matches!(
            err,
            ChartError::InvalidResourceLimit {
                field: "memory",
                ..
            }
        ));
    }

    #[test]
    fn non_numeric_magnitude_fails() {
        let err = validate_limits(&ResourceQuantities::new("lotsm", "512Mi")).unwrap_err();
        assert!(err.to_string().contains("positive integer"));
    }

    #[test]
    fn zero_magnitude_fails() {
        assert!(validate_limits(&ResourceQuantities::new("0m", "512Mi")).is_err());
    }
}
