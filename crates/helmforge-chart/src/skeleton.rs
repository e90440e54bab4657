//! Manifest skeletons: where they come from and their compiled form.
//!
//! A skeleton is plain manifest text with `${...}` substitution points.
//! Inline points (`${name}`, `${image.repository}`, `${image.tag}`,
//! `${replicas}`) are replaced in place. Block points (`${ports}`, `${env}`,
//! `${resources}`) must stand alone on a line; they expand to zero or more
//! lines at that line's indentation, and the line disappears when the block
//! is empty.
//!
//! Skeletons are compiled once per run. Unknown substitution points and
//! template-control directives (`{{- ...`, `{{ range ...`, `{{ if ...`) are
//! rejected at compile time so they can never leak into a manifest.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use helmforge_common::error::{ChartError, Result};

const DEPLOYMENT_SKELETON: &str = include_str!("../skeletons/deployment.yaml");
const SERVICE_SKELETON: &str = include_str!("../skeletons/service.yaml");

const DIRECTIVE_KEYWORDS: [&str; 8] = [
    "range", "if", "else", "end", "with", "define", "template", "block",
];

/// The two manifests rendered per component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManifestKind {
    /// `apps/v1` Deployment.
    Deployment,
    /// `v1` Service.
    Service,
}

impl ManifestKind {
    /// Every kind, in emission order.
    pub const ALL: [Self; 2] = [Self::Deployment, Self::Service];

    /// Lower-case kind name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Deployment => "deployment",
            Self::Service => "service",
        }
    }

    /// File name of this kind's skeleton inside a skeleton directory.
    #[must_use]
    pub fn skeleton_file_name(self) -> String {
        format!("{}.yaml", self.as_str())
    }

    /// File name of the rendered manifest for `component`.
    #[must_use]
    pub fn manifest_file_name(self, component: &str) -> String {
        format!("{}-{component}.yaml", self.as_str())
    }
}

impl fmt::Display for ManifestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Supplies raw skeleton text for each manifest kind.
pub trait SkeletonSource {
    /// Returns the skeleton text for `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`ChartError::TemplateNotFound`] if the skeleton does not exist.
    fn load(&self, kind: ManifestKind) -> Result<String>;
}

/// Skeletons compiled into the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinSkeletons;

impl SkeletonSource for BuiltinSkeletons {
    fn load(&self, kind: ManifestKind) -> Result<String> {
        Ok(match kind {
            ManifestKind::Deployment => DEPLOYMENT_SKELETON,
            ManifestKind::Service => SERVICE_SKELETON,
        }
        .to_owned())
    }
}

/// Skeletons read from `deployment.yaml` and `service.yaml` in a directory.
#[derive(Debug, Clone)]
pub struct DirectorySkeletons {
    dir: PathBuf,
}

impl DirectorySkeletons {
    /// Creates a source rooted at `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl SkeletonSource for DirectorySkeletons {
    fn load(&self, kind: ManifestKind) -> Result<String> {
        let path = self.dir.join(kind.skeleton_file_name());
        tracing::debug!(path = %path.display(), %kind, "loading skeleton");
        std::fs::read_to_string(&path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ChartError::TemplateNotFound {
                    kind: kind.as_str(),
                    path,
                }
            } else {
                ChartError::Io { path, source }
            }
        })
    }
}

/// A substitution point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placeholder {
    /// `${name}`
    Name,
    /// `${image.repository}`
    ImageRepository,
    /// `${image.tag}`
    ImageTag,
    /// `${replicas}`
    Replicas,
    /// `${ports}`, a block.
    Ports,
    /// `${env}`, a block.
    Env,
    /// `${resources}`, a block.
    Resources,
}

impl Placeholder {
    fn parse(token: &str) -> Option<Self> {
        Some(match token {
            "name" => Self::Name,
            "image.repository" => Self::ImageRepository,
            "image.tag" => Self::ImageTag,
            "replicas" => Self::Replicas,
            "ports" => Self::Ports,
            "env" => Self::Env,
            "resources" => Self::Resources,
            _ => return None,
        })
    }

    /// Whether this point expands to whole lines.
    #[must_use]
    pub const fn is_block(self) -> bool {
        matches!(self, Self::Ports | Self::Env | Self::Resources)
    }
}

/// Values bound to the substitution points for one render.
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    inline: HashMap<Placeholder, String>,
    blocks: HashMap<Placeholder, Vec<String>>,
}

impl Bindings {
    /// Binds an inline point.
    #[must_use]
    pub fn inline(mut self, placeholder: Placeholder, value: impl Into<String>) -> Self {
        let _ = self.inline.insert(placeholder, value.into());
        self
    }

    /// Binds a block point to lines relative to the point's indentation.
    #[must_use]
    pub fn block(mut self, placeholder: Placeholder, lines: Vec<String>) -> Self {
        let _ = self.blocks.insert(placeholder, lines);
        self
    }
}

#[derive(Debug, Clone)]
enum Segment {
    Literal(String),
    Value(Placeholder),
}

#[derive(Debug, Clone)]
enum Line {
    Text(Vec<Segment>),
    Block {
        indent: String,
        placeholder: Placeholder,
    },
}

/// A skeleton split into literal text and substitution points.
#[derive(Debug, Clone)]
pub struct Skeleton {
    kind: ManifestKind,
    lines: Vec<Line>,
}

impl Skeleton {
    /// Loads and compiles the skeleton for `kind` from `source`.
    ///
    /// # Errors
    ///
    /// Returns the source's error, or any error from [`Skeleton::compile`].
    pub fn load(source: &dyn SkeletonSource, kind: ManifestKind) -> Result<Self> {
        Self::compile(kind, &source.load(kind)?)
    }

    /// Compiles skeleton text.
    ///
    /// # Errors
    ///
    /// Returns [`ChartError::UnresolvedPlaceholder`] for an unknown or
    /// unterminated `${...}`, a block point that does not stand alone on its
    /// line, or a template-control directive.
    pub fn compile(kind: ManifestKind, text: &str) -> Result<Self> {
        let unresolved = |token: &str| ChartError::UnresolvedPlaceholder {
            manifest: kind.as_str(),
            token: token.to_owned(),
        };

        let mut lines = Vec::new();
        for line in text.lines() {
            if let Some(directive) = find_directive(line) {
                return Err(unresolved(&directive));
            }

            let body = line.trim();
            let standalone = body
                .strip_prefix("${")
                .and_then(|rest| rest.strip_suffix('}'))
                .and_then(Placeholder::parse)
                .filter(|p| p.is_block());
            if let Some(placeholder) = standalone {
                let indent_len = line.len() - line.trim_start().len();
                lines.push(Line::Block {
                    indent: line[..indent_len].to_owned(),
                    placeholder,
                });
                continue;
            }

            let mut segments = Vec::new();
            let mut rest = line;
            while let Some(start) = rest.find("${") {
                if start > 0 {
                    segments.push(Segment::Literal(rest[..start].to_owned()));
                }
                let after = &rest[start + 2..];
                let end = after.find('}').ok_or_else(|| unresolved(&rest[start..]))?;
                let token = &after[..end];
                match Placeholder::parse(token) {
                    Some(p) if !p.is_block() => segments.push(Segment::Value(p)),
                    _ => return Err(unresolved(&format!("${{{token}}}"))),
                }
                rest = &after[end + 1..];
            }
            if !rest.is_empty() {
                segments.push(Segment::Literal(rest.to_owned()));
            }
            lines.push(Line::Text(segments));
        }

        Ok(Self { kind, lines })
    }

    /// The manifest kind this skeleton renders.
    #[must_use]
    pub const fn kind(&self) -> ManifestKind {
        self.kind
    }

    /// Fills every substitution point. Unbound inline points render empty,
    /// unbound blocks are dropped.
    #[must_use]
    pub fn render(&self, bindings: &Bindings) -> String {
        let mut out = String::new();
        for line in &self.lines {
            match line {
                Line::Text(segments) => {
                    for segment in segments {
                        match segment {
                            Segment::Literal(text) => out.push_str(text),
                            Segment::Value(p) => {
                                out.push_str(bindings.inline.get(p).map_or("", String::as_str));
                            }
                        }
                    }
                    out.push('\n');
                }
                Line::Block {
                    indent,
                    placeholder,
                } => {
                    for block_line in bindings.blocks.get(placeholder).into_iter().flatten() {
                        out.push_str(indent);
                        out.push_str(block_line);
                        out.push('\n');
                    }
                }
            }
        }
        out
    }
}

/// Finds the first template-control directive in `text`, such as
/// `{{- range ... }}` or `{{ end }}`. Plain expressions like
/// `{{ .Release.Name }}` are not directives.
#[must_use]
pub fn find_directive(text: &str) -> Option<String> {
    text.match_indices("{{").find_map(|(start, _)| {
        let after = &text[start + 2..];
        let trimmed = after.strip_prefix('-').is_some();
        let body = after.trim_start_matches('-').trim_start();
        let keyword = DIRECTIVE_KEYWORDS.iter().any(|kw| {
            body.strip_prefix(kw)
                .is_some_and(|tail| !tail.starts_with(|c: char| c.is_alphanumeric() || c == '_'))
        });
        (trimmed || keyword).then(|| {
            let end = after.find("}}").map_or(text.len(), |i| start + 2 + i + 2);
            text[start..end].to_owned()
        })
    })
}
