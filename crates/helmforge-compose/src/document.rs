//! Composition document model and parser.
//!
//! Only the `services` mapping is read. Each entry keeps its raw
//! `environment` and `ports` values so the normalizer can report
//! malformed shapes against the component that declared them.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use helmforge_common::error::{ChartError, Result};
use helmforge_common::types::name_rejection;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

/// One component descriptor exactly as written in the composition file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawComponent {
    /// Image reference, `repo` or `repo:tag`.
    #[serde(default)]
    pub image: Option<String>,
    /// Environment as a mapping or as a list of `KEY=VALUE` strings.
    #[serde(default)]
    pub environment: Option<serde_yaml::Value>,
    /// Port list, each entry `N` or `HOST:N`.
    #[serde(default)]
    pub ports: Option<serde_yaml::Value>,
}

impl RawComponent {
    /// Creates a descriptor with only an image.
    #[must_use]
    pub fn with_image(image: impl Into<String>) -> Self {
        Self {
            image: Some(image.into()),
            ..Self::default()
        }
    }
}

/// A parsed composition document: component names mapped to descriptors,
/// in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompositionDocument {
    components: Vec<(String, RawComponent)>,
}

impl CompositionDocument {
    /// Parses a composition document from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`ChartError::Parse`] if the text is not valid YAML or has no
    /// `services` mapping, and [`ChartError::DuplicateComponent`] or
    /// [`ChartError::InvalidComponentName`] for unusable component names.
    pub fn parse(content: &str) -> Result<Self> {
        let file: ComposeFile = serde_yaml::from_str(content).map_err(|e| ChartError::Parse {
            message: e.to_string(),
        })?;
        Self::from_components(
            file.services
                .0
                .into_iter()
                .map(|(name, raw)| (name, raw.unwrap_or_default())),
        )
    }

    /// Reads and parses a composition file.
    ///
    /// # Errors
    ///
    /// Returns [`ChartError::Io`] if the file cannot be read, or any error
    /// from [`CompositionDocument::parse`].
    pub fn from_file(path: &Path) -> Result<Self> {
        tracing::info!(path = %path.display(), "reading composition file");
        let content = std::fs::read_to_string(path).map_err(|source| ChartError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Builds a document from `(name, descriptor)` pairs, keeping their order.
    ///
    /// # Errors
    ///
    /// Returns an error on a repeated or unusable component name.
    pub fn from_components<I, S>(components: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, RawComponent)>,
        S: Into<String>,
    {
        let components: Vec<(String, RawComponent)> = components
            .into_iter()
            .map(|(name, raw)| (name.into(), raw))
            .collect();

        let mut seen = HashSet::new();
        for (name, _) in &components {
            validate_component_name(name)?;
            if !seen.insert(name.as_str()) {
                return Err(ChartError::DuplicateComponent { name: name.clone() });
            }
        }

        Ok(Self { components })
    }

    /// Iterates components in document order.
    pub fn components(&self) -> impl Iterator<Item = (&str, &RawComponent)> {
        self.components.iter().map(|(name, raw)| (name.as_str(), raw))
    }

    /// Looks up a component by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&RawComponent> {
        self.components
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, raw)| raw)
    }

    /// Number of components in the document.
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Whether the document declares no components.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

/// Component names become file names and Kubernetes object names.
fn validate_component_name(name: &str) -> Result<()> {
    name_rejection(name).map_or(Ok(()), |reason| {
        Err(ChartError::InvalidComponentName {
            name: name.to_owned(),
            reason,
        })
    })
}

#[derive(Deserialize)]
struct ComposeFile {
    services: ServiceEntries,
}

/// `services` entries in document order, duplicates included.
struct ServiceEntries(Vec<(String, Option<RawComponent>)>);

impl<'de> Deserialize<'de> for ServiceEntries {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = ServiceEntries;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a mapping of component names to descriptors")
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry()? {
                    entries.push(entry);
                }
                Ok(ServiceEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}
