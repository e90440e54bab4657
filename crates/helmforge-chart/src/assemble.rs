//! Chart assembly: one conversion run from composition document to an
//! in-memory file set.
//!
//! The run is phased. Every accepted component is normalized first, then
//! folded into the values document, then rendered. Nothing is produced
//! unless every phase succeeds for every component.

use std::path::{Path, PathBuf};

use helmforge_common::config::ChartOptions;
use helmforge_common::constants::{CHART_API_VERSION, CHART_DIR_SUFFIX, CHART_FILE, TEMPLATES_DIR, VALUES_FILE};
use helmforge_common::error::{ChartError, Result};
use helmforge_common::types::name_rejection;
use helmforge_compose::{
    ComponentFilter, ComponentSpec, CompositionDocument, NameDenylist, RawComponent, normalize,
};
use serde::Serialize;

use crate::render::ManifestRenderer;
use crate::skeleton::{BuiltinSkeletons, ManifestKind, SkeletonSource};
use crate::values::ValuesDocument;

/// One generated file, relative to the chart directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartFile {
    /// Path relative to the chart directory.
    pub path: PathBuf,
    /// File contents.
    pub contents: String,
}

/// Everything one run produces, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartFileSet {
    /// Chart name, also the chart directory name.
    pub chart_name: String,
    /// Files in emission order: `Chart.yaml`, `values.yaml`, then manifests.
    pub files: Vec<ChartFile>,
    /// Components converted, in document order.
    pub accepted: Vec<String>,
    /// Components left out by the filter, in document order.
    pub skipped: Vec<String>,
}

impl ChartFileSet {
    /// Looks up a file by its path relative to the chart directory.
    #[must_use]
    pub fn get(&self, path: impl AsRef<Path>) -> Option<&str> {
        let path = path.as_ref();
        self.files
            .iter()
            .find(|f| f.path == path)
            .map(|f| f.contents.as_str())
    }

    /// Total size of all file contents in bytes.
    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        self.files.iter().map(|f| f.contents.len() as u64).sum()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ChartMetadata<'a> {
    api_version: &'a str,
    name: &'a str,
    description: &'a str,
    version: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    app_version: Option<&'a str>,
}

/// Converts composition documents into chart file sets.
pub struct ChartAssembler {
    options: ChartOptions,
    filter: Box<dyn ComponentFilter>,
    skeletons: Box<dyn SkeletonSource>,
}

impl std::fmt::Debug for ChartAssembler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChartAssembler")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Default for ChartAssembler {
    fn default() -> Self {
        Self::new(ChartOptions::default())
    }
}

impl ChartAssembler {
    /// Creates an assembler with the default name denylist and built-in skeletons.
    #[must_use]
    pub fn new(options: ChartOptions) -> Self {
        Self {
            options,
            filter: Box::new(NameDenylist::default()),
            skeletons: Box::new(BuiltinSkeletons),
        }
    }

    /// Replaces the component classification policy.
    #[must_use]
    pub fn with_filter(mut self, filter: impl ComponentFilter + 'static) -> Self {
        self.filter = Box::new(filter);
        self
    }

    /// Replaces the skeleton source.
    #[must_use]
    pub fn with_skeletons(mut self, skeletons: impl SkeletonSource + 'static) -> Self {
        self.skeletons = Box::new(skeletons);
        self
    }

    /// Whether the classification policy keeps component `name`.
    pub fn accepts(&self, name: &str, component: &RawComponent) -> bool {
        self.filter.accepts(name, component)
    }

    /// The options this assembler applies.
    #[must_use]
    pub const fn options(&self) -> &ChartOptions {
        &self.options
    }

    /// Runs one conversion.
    ///
    /// The chart is named `<chart_base>-chart`.
    ///
    /// # Errors
    ///
    /// Fails on invalid options or chart name, a missing or malformed
    /// skeleton, or the first component that cannot be normalized or
    /// rendered. No file set is returned in that case.
    pub fn assemble(&self, composition: &CompositionDocument, chart_base: &str) -> Result<ChartFileSet> {
        if let Some(reason) = name_rejection(chart_base) {
            return Err(ChartError::InvalidChartName {
                name: chart_base.to_owned(),
                reason,
            });
        }
        self.options.validate()?;
        let chart_name = format!("{chart_base}{CHART_DIR_SUFFIX}");
        tracing::info!(chart = %chart_name, components = composition.len(), "assembling chart");

        let renderer = ManifestRenderer::new(
            self.skeletons.as_ref(),
            self.options.replica_count,
            self.options.resources.clone(),
        )?;

        let mut accepted: Vec<(&str, ComponentSpec)> = Vec::new();
        let mut skipped = Vec::new();
        for (name, raw) in composition.components() {
            if self.accepts(name, raw) {
                accepted.push((name, normalize(name, raw)?));
            } else {
                tracing::info!(component = name, "skipping infrastructure component");
                skipped.push(name.to_owned());
            }
        }
        if accepted.is_empty() {
            tracing::warn!(chart = %chart_name, "no workload components; chart will contain no manifests");
        }

        let mut values = ValuesDocument::new(self.options.replica_count, self.options.resources.clone());
        for (name, spec) in &accepted {
            values.add(name, spec)?;
        }

        let mut files = vec![
            ChartFile {
                path: PathBuf::from(CHART_FILE),
                contents: self.chart_metadata(&chart_name)?,
            },
            ChartFile {
                path: PathBuf::from(VALUES_FILE),
                contents: values.to_yaml()?,
            },
        ];
        for (name, spec) in &accepted {
            for kind in ManifestKind::ALL {
                files.push(ChartFile {
                    path: Path::new(TEMPLATES_DIR).join(kind.manifest_file_name(name)),
                    contents: renderer.render(kind, name, spec)?,
                });
            }
        }

        tracing::info!(
            chart = %chart_name,
            accepted = accepted.len(),
            skipped = skipped.len(),
            files = files.len(),
            "chart assembled"
        );
        Ok(ChartFileSet {
            chart_name,
            files,
            accepted: accepted.into_iter().map(|(name, _)| name.to_owned()).collect(),
            skipped,
        })
    }

    fn chart_metadata(&self, chart_name: &str) -> Result<String> {
        let metadata = ChartMetadata {
            api_version: CHART_API_VERSION,
            name: chart_name,
            description: &self.options.description,
            version: &self.options.version,
            app_version: self.options.app_version.as_deref(),
        };
        Ok(serde_yaml::to_string(&metadata)?)
    }
}
