//! The chart's `values.yaml` document.
//!
//! Top-level keys are fixed (`imagePullSecrets`, `replicaCount`,
//! `serviceAccount`) and followed by one subtree per accepted component in
//! the order components were added.

use std::num::NonZeroU32;

use helmforge_common::constants::RESERVED_VALUES_KEYS;
use helmforge_common::error::{ChartError, Result};
use helmforge_common::types::ResourceRequirements;
use helmforge_compose::ComponentSpec;
use indexmap::IndexMap;
use serde::Serialize;

/// Root of `values.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuesDocument {
    image_pull_secrets: Vec<String>,
    replica_count: NonZeroU32,
    service_account: ServiceAccount,
    #[serde(flatten)]
    components: IndexMap<String, ComponentValues>,
    #[serde(skip)]
    resources: ResourceRequirements,
}

/// `serviceAccount` settings. Generated charts never create one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ServiceAccount {
    /// Whether the chart creates a service account.
    pub create: bool,
    /// Name of the service account to use.
    pub name: String,
}

/// One component's subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentValues {
    /// Image reference.
    pub image: ImageValues,
    /// Environment variables.
    pub env: IndexMap<String, String>,
    /// Container ports.
    pub ports: Vec<u16>,
    /// Resource limits and requests.
    pub resources: ResourceRequirements,
}

/// `image` subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageValues {
    /// Image repository.
    pub repository: String,
    /// Image tag.
    pub tag: String,
}

impl ValuesDocument {
    /// Creates a document with no components.
    #[must_use]
    pub fn new(replica_count: NonZeroU32, resources: ResourceRequirements) -> Self {
        Self {
            image_pull_secrets: Vec::new(),
            replica_count,
            service_account: ServiceAccount::default(),
            components: IndexMap::new(),
            resources,
        }
    }

    /// Adds or replaces the subtree for `name`. A replaced entry keeps its
    /// original position.
    ///
    /// # Errors
    ///
    /// Returns [`ChartError::ReservedComponentName`] if `name` would shadow a
    /// fixed top-level key.
    pub fn add(&mut self, name: &str, spec: &ComponentSpec) -> Result<()> {
        if RESERVED_VALUES_KEYS.contains(&name) {
            return Err(ChartError::ReservedComponentName {
                name: name.to_owned(),
            });
        }

        let values = ComponentValues {
            image: ImageValues {
                repository: spec.repository.clone(),
                tag: spec.tag.clone(),
            },
            env: spec.env.clone(),
            ports: spec.ports.clone(),
            resources: self.resources.clone(),
        };
        if self.components.insert(name.to_owned(), values).is_some() {
            tracing::warn!(component = name, "replacing existing values entry");
        }
        Ok(())
    }

    /// Looks up a component's subtree.
    #[must_use]
    pub fn component(&self, name: &str) -> Option<&ComponentValues> {
        self.components.get(name)
    }

    /// Component names in insertion order.
    pub fn component_names(&self) -> impl Iterator<Item = &str> {
        self.components.keys().map(String::as_str)
    }

    /// Serializes the document to YAML.
    ///
    /// # Errors
    ///
    /// Returns [`ChartError::Serialization`] if serialization fails.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}
