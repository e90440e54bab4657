//! Descriptor normalization.
//!
//! Collapses the shapes compose files allow for images, environment, and
//! ports into one [`ComponentSpec`]. Fails on the first malformed entry.

use helmforge_common::constants::DEFAULT_IMAGE_TAG;
use helmforge_common::error::{ChartError, Result};
use indexmap::IndexMap;
use serde::Serialize;
use serde_yaml::Value;

use crate::document::RawComponent;

/// A component descriptor in canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentSpec {
    /// Image repository, everything before the first `:`.
    pub repository: String,
    /// Image tag, never empty.
    pub tag: String,
    /// Environment variables in declaration order.
    pub env: IndexMap<String, String>,
    /// Container-side ports in declaration order.
    pub ports: Vec<u16>,
}

/// Normalizes the descriptor of component `name`.
///
/// # Errors
///
/// Returns [`ChartError::MissingImageField`], [`ChartError::MalformedEnvironmentEntry`]
/// or [`ChartError::InvalidPortSpec`] for the first entry that does not fit.
pub fn normalize(name: &str, raw: &RawComponent) -> Result<ComponentSpec> {
    let image = raw
        .image
        .as_deref()
        .map(str::trim)
        .filter(|image| !image.is_empty())
        .ok_or_else(|| ChartError::MissingImageField {
            component: name.to_owned(),
        })?;
    let (repository, tag) = split_image(image);

    let spec = ComponentSpec {
        repository: repository.to_owned(),
        tag: tag.to_owned(),
        env: normalize_environment(name, raw.environment.as_ref())?,
        ports: normalize_ports(name, raw.ports.as_ref())?,
    };
    tracing::debug!(
        component = name,
        repository = %spec.repository,
        tag = %spec.tag,
        env = spec.env.len(),
        ports = ?spec.ports,
        "normalized component"
    );
    Ok(spec)
}

fn split_image(image: &str) -> (&str, &str) {
    match image.split_once(':') {
        Some((repository, tag)) if !tag.is_empty() => (repository, tag),
        Some((repository, _)) => (repository, DEFAULT_IMAGE_TAG),
        None => (image, DEFAULT_IMAGE_TAG),
    }
}

fn normalize_environment(component: &str, environment: Option<&Value>) -> Result<IndexMap<String, String>> {
    let malformed = |entry: String| ChartError::MalformedEnvironmentEntry {
        component: component.to_owned(),
        entry,
    };

    let mut env = IndexMap::new();
    match environment {
        None | Some(Value::Null) => {}
        Some(Value::Mapping(mapping)) => {
            for (key, value) in mapping {
                let key = scalar_to_string(key)
                    .filter(|k| !k.is_empty())
                    .ok_or_else(|| malformed(describe(key)))?;
                let value = scalar_to_string(value)
                    .ok_or_else(|| malformed(format!("{key}: {}", describe(value))))?;
                let _ = env.insert(key, value);
            }
        }
        Some(Value::Sequence(entries)) => {
            for entry in entries {
                let text = scalar_to_string(entry).ok_or_else(|| malformed(describe(entry)))?;
                match text.split_once('=') {
                    Some((key, value)) if !key.is_empty() => {
                        let _ = env.insert(key.to_owned(), value.to_owned());
                    }
                    _ => return Err(malformed(text)),
                }
            }
        }
        Some(other) => return Err(malformed(describe(other))),
    }
    Ok(env)
}

fn normalize_ports(component: &str, ports: Option<&Value>) -> Result<Vec<u16>> {
    let invalid = |port: String| ChartError::InvalidPortSpec {
        component: component.to_owned(),
        port,
    };

    match ports {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Sequence(entries)) => entries
            .iter()
            .map(|entry| {
                let text = match entry {
                    Value::String(s) => s.clone(),
                    Value::Number(n) => n.to_string(),
                    other => return Err(invalid(describe(other))),
                };
                parse_container_port(&text).ok_or_else(|| invalid(text))
            })
            .collect(),
        Some(other) => Err(invalid(describe(other))),
    }
}

/// Takes the part after the last `:` (`HOST:CONTAINER`) and parses it as a port.
fn parse_container_port(spec: &str) -> Option<u16> {
    let container = spec.rsplit_once(':').map_or(spec, |(_, port)| port).trim();
    if container.is_empty() || !container.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    container.parse::<u16>().ok().filter(|port| *port > 0)
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some(String::new()),
        _ => None,
    }
}

fn describe(value: &Value) -> String {
    serde_yaml::to_string(value).map_or_else(
        |_| format!("{value:?}"),
        |text| text.trim_end().replace('\n', " "),
    )
}
