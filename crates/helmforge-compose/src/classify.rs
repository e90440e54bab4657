//! Component classification: workload or infrastructure.
//!
//! Infrastructure components (databases and the like) are left out of the
//! generated chart entirely. The policy is a trait so callers can swap it
//! without touching the assembler.

use helmforge_common::constants::DEFAULT_INFRA_NEEDLE;

use crate::document::RawComponent;

/// Decides whether a component belongs in the chart.
pub trait ComponentFilter {
    /// Returns `true` if `name` is an application workload to convert.
    fn accepts(&self, name: &str, component: &RawComponent) -> bool;
}

impl<F> ComponentFilter for F
where
    F: Fn(&str, &RawComponent) -> bool,
{
    fn accepts(&self, name: &str, component: &RawComponent) -> bool {
        self(name, component)
    }
}

/// Rejects components whose name contains any needle, ignoring case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameDenylist {
    needles: Vec<String>,
}

impl NameDenylist {
    /// Creates a denylist from name fragments.
    pub fn new<I, S>(needles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            needles: needles
                .into_iter()
                .map(|n| n.as_ref().to_lowercase())
                .filter(|n| !n.is_empty())
                .collect(),
        }
    }

    /// The lower-cased needles.
    #[must_use]
    pub fn needles(&self) -> &[String] {
        &self.needles
    }
}

impl Default for NameDenylist {
    fn default() -> Self {
        Self::new([DEFAULT_INFRA_NEEDLE])
    }
}

impl ComponentFilter for NameDenylist {
    fn accepts(&self, name: &str, _component: &RawComponent) -> bool {
        let name = name.to_lowercase();
        !self.needles.iter().any(|needle| name.contains(needle.as_str()))
    }
}

/// Accepts every component.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl ComponentFilter for AcceptAll {
    fn accepts(&self, _name: &str, _component: &RawComponent) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw() -> RawComponent {
        RawComponent::with_image("img")
    }

    #[test]
    fn default_denylist_skips_db_in_any_case() {
        let filter = NameDenylist::default();
        for name in ["db", "mydb", "DB", "userDb", "mongodb-primary", "Db_replica"] {
            assert!(!filter.accepts(name, &raw()), "{name} should be skipped");
        }
    }

    #[test]
    fn default_denylist_keeps_workloads() {
        let filter = NameDenylist::default();
        for name in ["web", "api", "worker", "d-b"] {
            assert!(filter.accepts(name, &raw()), "{name} should be kept");
        }
    }

    #[test]
    fn custom_needles_are_case_insensitive() {
        let filter = NameDenylist::new(["Redis", "queue"]);
        assert!(!filter.accepts("cache-redis", &raw()));
        assert!(!filter.accepts("JobQueue", &raw()));
        assert!(filter.accepts("mydb", &raw()));
    }

    #[test]
    fn empty_needles_are_ignored() {
        let filter = NameDenylist::new([""]);
        assert!(filter.needles().is_empty());
        assert!(filter.accepts("anything", &raw()));
    }

    #[test]
    fn closures_act_as_filters() {
        let only_images = |_: &str, c: &RawComponent| c.image.as_deref() != Some("postgres");
        assert!(only_images.accepts("a", &raw()));
        assert!(!only_images.accepts("a", &RawComponent::with_image("postgres")));
    }

    #[test]
    fn accept_all_keeps_databases() {
        assert!(AcceptAll.accepts("mydb", &raw()));
    }
}
