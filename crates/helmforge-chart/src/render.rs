//! Per-component manifest rendering.
//!
//! Variable-length sections (ports, environment, resources) are expanded
//! into plain lines here, before substitution, so the skeletons never need
//! loop or conditional directives.

use std::num::NonZeroU32;

use helmforge_common::error::{ChartError, Result};
use helmforge_common::types::{ResourceQuantities, ResourceRequirements};
use helmforge_compose::ComponentSpec;

use crate::skeleton::{Bindings, ManifestKind, Placeholder, Skeleton, SkeletonSource, find_directive};

/// Renders deployment and service manifests from compiled skeletons.
#[derive(Debug, Clone)]
pub struct ManifestRenderer {
    deployment: Skeleton,
    service: Skeleton,
    replica_count: NonZeroU32,
    resources: ResourceRequirements,
}

impl ManifestRenderer {
    /// Loads and compiles both skeletons from `source`.
    ///
    /// # Errors
    ///
    /// Returns [`ChartError::TemplateNotFound`] if a skeleton is missing, or
    /// [`ChartError::UnresolvedPlaceholder`] if one does not compile.
    pub fn new(
        source: &dyn SkeletonSource,
        replica_count: NonZeroU32,
        resources: ResourceRequirements,
    ) -> Result<Self> {
        Ok(Self {
            deployment: Skeleton::load(source, ManifestKind::Deployment)?,
            service: Skeleton::load(source, ManifestKind::Service)?,
            replica_count,
            resources,
        })
    }

    /// Renders the manifest of `kind` for component `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ChartError::UnresolvedPlaceholder`] if the output would
    /// still contain a template-control directive.
    pub fn render(&self, kind: ManifestKind, name: &str, spec: &ComponentSpec) -> Result<String> {
        match kind {
            ManifestKind::Deployment => self.render_deployment(name, spec),
            ManifestKind::Service => self.render_service(name, spec),
        }
    }

    /// Renders the deployment manifest for component `name`.
    ///
    /// # Errors
    ///
    /// See [`ManifestRenderer::render`].
    pub fn render_deployment(&self, name: &str, spec: &ComponentSpec) -> Result<String> {
        let bindings = common_bindings(name)
            .inline(Placeholder::ImageRepository, escape_template(&escape_double_quoted(&spec.repository)))
            .inline(Placeholder::ImageTag, escape_template(&escape_double_quoted(&spec.tag)))
            .inline(Placeholder::Replicas, self.replica_count.to_string())
            .block(Placeholder::Ports, container_ports_block(&spec.ports))
            .block(Placeholder::Env, env_block(spec))
            .block(Placeholder::Resources, resources_block(&self.resources));
        checked(&self.deployment, name, &bindings)
    }

    /// Renders the service manifest for component `name`.
    ///
    /// # Errors
    ///
    /// See [`ManifestRenderer::render`].
    pub fn render_service(&self, name: &str, spec: &ComponentSpec) -> Result<String> {
        let bindings = common_bindings(name).block(Placeholder::Ports, service_ports_block(&spec.ports));
        checked(&self.service, name, &bindings)
    }
}

fn common_bindings(name: &str) -> Bindings {
    Bindings::default().inline(Placeholder::Name, escape_template(name))
}

fn checked(skeleton: &Skeleton, name: &str, bindings: &Bindings) -> Result<String> {
    let manifest = skeleton.render(bindings);
    if let Some(token) = find_directive(&manifest) {
        return Err(ChartError::UnresolvedPlaceholder {
            manifest: skeleton.kind().as_str(),
            token,
        });
    }
    tracing::debug!(component = name, kind = %skeleton.kind(), bytes = manifest.len(), "rendered manifest");
    Ok(manifest)
}

fn container_ports_block(ports: &[u16]) -> Vec<String> {
    if ports.is_empty() {
        return Vec::new();
    }
    std::iter::once("ports:".to_owned())
        .chain(ports.iter().map(|port| format!("  - containerPort: {port}")))
        .collect()
}

fn service_ports_block(ports: &[u16]) -> Vec<String> {
    let mut seen = Vec::with_capacity(ports.len());
    let mut lines = Vec::new();
    for &port in ports {
        if seen.contains(&port) {
            continue;
        }
        seen.push(port);
        lines.extend([
            format!("  - name: tcp-{port}"),
            format!("    port: {port}"),
            format!("    targetPort: {port}"),
            "    protocol: TCP".to_owned(),
        ]);
    }
    if !lines.is_empty() {
        lines.insert(0, "ports:".to_owned());
    }
    lines
}

fn env_block(spec: &ComponentSpec) -> Vec<String> {
    if spec.env.is_empty() {
        return Vec::new();
    }
    let mut lines = vec!["env:".to_owned()];
    for (key, value) in &spec.env {
        lines.push(format!("  - name: {}", quote(key)));
        lines.push(format!("    value: {}", quote(value)));
    }
    lines
}

fn resources_block(resources: &ResourceRequirements) -> Vec<String> {
    let section = |label: &str, q: &ResourceQuantities| {
        [
            format!("  {label}:"),
            format!("    cpu: {}", q.cpu),
            format!("    memory: {}", q.memory),
        ]
    };
    std::iter::once("resources:".to_owned())
        .chain(section("limits", &resources.limits))
        .chain(section("requests", &resources.requests))
        .collect()
}

/// Renders `value` as a YAML double-quoted scalar that survives Helm's
/// template pass unchanged.
fn quote(value: &str) -> String {
    escape_template(&format!("\"{}\"", escape_double_quoted(value)))
}

fn escape_double_quoted(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04X}", u32::from(c))),
            c => out.push(c),
        }
    }
    out
}

/// Helm evaluates every `{{` in a template file; literal ones are emitted
/// through a string action.
fn escape_template(value: &str) -> String {
    value.replace("{{", "{{ \"{{\" }}")
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;

    use super::*;
    use crate::skeleton::BuiltinSkeletons;

    fn renderer() -> ManifestRenderer {
        ManifestRenderer::new(&BuiltinSkeletons, NonZeroU32::MIN, ResourceRequirements::default())
            .expect("builtin skeletons")
    }

    fn web() -> ComponentSpec {
        let mut env = IndexMap::new();
        let _ = env.insert("ENV".to_owned(), "prod".to_owned());
        ComponentSpec {
            repository: "nginx".into(),
            tag: "1.25".into(),
            env,
            ports: vec![80],
        }
    }

    fn bare() -> ComponentSpec {
        ComponentSpec {
            repository: "worker".into(),
            tag: "latest".into(),
            env: IndexMap::new(),
            ports: Vec::new(),
        }
    }

    /// Replaces the release expression so the manifest parses as plain YAML.
    fn parse(manifest: &str) -> serde_yaml::Value {
        serde_yaml::from_str(&manifest.replace("{{ .Release.Name }}", "rel")).expect("valid yaml")
    }

    #[test]
    fn deployment_binds_image_ports_and_env() {
        let out = renderer().render_deployment("web", &web()).expect("render");
        let doc = parse(&out);
        let container = &doc["spec"]["template"]["spec"]["containers"][0];
        assert_eq!(doc["kind"].as_str(), Some("Deployment"));
        assert_eq!(doc["metadata"]["name"].as_str(), Some("rel-web"));
        assert_eq!(doc["spec"]["replicas"].as_u64(), Some(1));
        assert_eq!(container["name"].as_str(), Some("web"));
        assert_eq!(container["image"].as_str(), Some("nginx:1.25"));
        assert_eq!(container["ports"][0]["containerPort"].as_u64(), Some(80));
        assert_eq!(container["env"][0]["name"].as_str(), Some("ENV"));
        assert_eq!(container["env"][0]["value"].as_str(), Some("prod"));
        assert_eq!(container["resources"]["limits"]["memory"].as_str(), Some("512Mi"));
    }

    #[test]
    fn deployment_without_ports_or_env_omits_sections() {
        let out = renderer().render_deployment("worker", &bare()).expect("render");
        assert!(!out.contains("ports:"));
        assert!(!out.contains("env:"));
        assert!(!out.contains("${"));
        let doc = parse(&out);
        assert!(doc["spec"]["template"]["spec"]["containers"][0]["ports"].is_null());
    }

    #[test]
    fn deployment_uses_configured_replicas() {
        let renderer = ManifestRenderer::new(
            &BuiltinSkeletons,
            NonZeroU32::new(3).expect("non-zero"),
            ResourceRequirements::default(),
        )
        .expect("renderer");
        let doc = parse(&renderer.render_deployment("web", &web()).expect("render"));
        assert_eq!(doc["spec"]["replicas"].as_u64(), Some(3));
    }

    #[test]
    fn service_exposes_each_port_once() {
        let mut spec = web();
        spec.ports = vec![80, 443, 80];
        let out = renderer().render_service("web", &spec).expect("render");
        let doc = parse(&out);
        assert_eq!(doc["spec"]["type"].as_str(), Some("ClusterIP"));
        assert_eq!(doc["spec"]["selector"]["app"].as_str(), Some("rel-web"));
        let ports = doc["spec"]["ports"].as_sequence().expect("ports");
        assert_eq!(ports.len(), 2);
        assert_eq!(ports[1]["port"].as_u64(), Some(443));
        assert_eq!(ports[1]["targetPort"].as_u64(), Some(443));
    }

    #[test]
    fn rendered_manifests_carry_no_directives() {
        let renderer = renderer();
        for spec in [web(), bare()] {
            for kind in ManifestKind::ALL {
                let out = renderer.render(kind, "web", &spec).expect("render");
                for marker in ["{{-", "-}}", "{{ range", "{{ if", "{{ end", "${"] {
                    assert!(!out.contains(marker), "{kind} contains {marker}:\n{out}");
                }
            }
        }
    }

    #[test]
    fn env_values_are_quoted_and_escaped() {
        let mut spec = bare();
        let _ = spec.env.insert("FLAG".into(), "true".into());
        let _ = spec.env.insert("MSG".into(), "say \"hi\"\nbye".into());
        let _ = spec.env.insert("TPL".into(), "{{- range .x }}".into());
        let out = renderer().render_deployment("worker", &spec).expect("render");

        assert!(out.contains("value: \"true\""));
        assert!(out.contains("value: \"say \\\"hi\\\"\\nbye\""));
        assert!(out.contains("value: \"{{ \"{{\" }}- range .x }}\""));
        assert_eq!(find_directive(&out), None);
    }

    #[test]
    fn scalar_like_component_names_stay_strings() {
        let renderer = renderer();
        for name in ["true", "8080", "null", "1.5"] {
            let doc = parse(&renderer.render_deployment(name, &bare()).expect("render"));
            let container = &doc["spec"]["template"]["spec"]["containers"][0];
            assert_eq!(container["name"].as_str(), Some(name), "container name for {name}");
            assert_eq!(doc["metadata"]["name"].as_str(), Some(format!("rel-{name}").as_str()));

            let doc = parse(&renderer.render_service(name, &bare()).expect("render"));
            assert_eq!(doc["spec"]["selector"]["app"].as_str(), Some(format!("rel-{name}").as_str()));
        }
    }

    #[test]
    fn escape_double_quoted_handles_controls() {
        assert_eq!(escape_double_quoted("a\\b\tc\u{1}"), "a\\\\b\\tc\\u0001");
    }
}
