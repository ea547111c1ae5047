// src/resolver.rs

//! Feature activation graph
//!
//! Each feature maps to the features it activates and the dependencies it
//! pulls in. The reserved key `None` holds the mandatory dependencies and is
//! activated by every named feature. Optional dependencies that no feature
//! mentions become implicit features of the same name, and `default` always
//! exists.
//!
//! The graph may contain cycles; [`FeatureGraph::resolve`] walks it with a
//! visited set.

use crate::error::{Error, Result};
use crate::metadata::Dependency;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Feature key; `None` is the mandatory, always-active bucket
pub type FeatureName = Option<String>;

pub const DEFAULT_FEATURE: &str = "default";

/// Direct activations of one feature
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureNode {
    pub features: BTreeSet<FeatureName>,
    pub dependencies: BTreeSet<Dependency>,
}

/// Transitive closure of a feature
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    pub features: BTreeSet<FeatureName>,
    pub dependencies: BTreeSet<Dependency>,
}

#[derive(Debug, Clone, Default)]
pub struct FeatureGraph {
    nodes: BTreeMap<FeatureName, FeatureNode>,
    implicit_default: bool,
}

/// What a feature activation entry points at
#[derive(Debug, PartialEq, Eq)]
enum Activation<'a> {
    Feature(&'a str),
    Dependency {
        key: &'a str,
        feature: Option<&'a str>,
    },
}

impl<'a> Activation<'a> {
    fn classify(entry: &'a str, declared: &BTreeMap<String, Vec<String>>) -> Self {
        if let Some(key) = entry.strip_prefix("dep:") {
            return Activation::Dependency { key, feature: None };
        }
        if let Some((key, feature)) = entry.split_once('/') {
            // `name?/feature` is taken as `name/feature` and pulls `name` in
            return Activation::Dependency {
                key: key.trim_end_matches('?'),
                feature: Some(feature),
            };
        }
        if declared.contains_key(entry) {
            Activation::Feature(entry)
        } else {
            Activation::Dependency {
                key: entry,
                feature: None,
            }
        }
    }
}

impl FeatureGraph {
    /// Build the graph from keyed non-dev dependencies and declared features
    ///
    /// `dependencies` pairs each dependency with the name feature entries use
    /// for it. Fails if an entry names neither a declared feature nor a
    /// dependency.
    pub fn build(
        dependencies: &[(String, Dependency)],
        declared: &BTreeMap<String, Vec<String>>,
    ) -> Result<Self> {
        let mut by_key: BTreeMap<&str, Vec<&Dependency>> = BTreeMap::new();
        for (key, dep) in dependencies {
            by_key.entry(key.as_str()).or_default().push(dep);
        }

        let mut nodes = BTreeMap::new();
        let mut referenced: BTreeSet<&str> = BTreeSet::new();

        for (feature, entries) in declared {
            let mut node = FeatureNode::default();
            node.features.insert(None);

            for entry in entries {
                match Activation::classify(entry, declared) {
                    Activation::Feature(name) => {
                        node.features.insert(Some(name.to_string()));
                    }
                    Activation::Dependency { key, feature: sub } => {
                        let (key, deps) = by_key.get_key_value(key).ok_or_else(|| {
                            Error::UnknownFeatureReference {
                                feature: feature.clone(),
                                reference: entry.clone(),
                            }
                        })?;
                        referenced.insert(*key);
                        for dep in deps {
                            let dep = match sub {
                                Some(sub) => dep.with_features(BTreeSet::from([Some(sub.to_string())])),
                                None => (*dep).clone(),
                            };
                            node.dependencies.insert(dep);
                        }
                    }
                }
            }
            nodes.insert(Some(feature.clone()), node);
        }

        for (key, deps) in &by_key {
            if referenced.contains(key) || declared.contains_key(*key) {
                continue;
            }
            let optional: BTreeSet<Dependency> = deps
                .iter()
                .filter(|dep| dep.optional)
                .map(|dep| (*dep).clone())
                .collect();
            if optional.is_empty() {
                continue;
            }
            debug!("Promoting optional dependency '{}' to a feature", key);
            nodes.insert(
                Some(key.to_string()),
                FeatureNode {
                    features: BTreeSet::from([None]),
                    dependencies: optional,
                },
            );
        }

        let mandatory: BTreeSet<Dependency> = dependencies
            .iter()
            .map(|(_, dep)| dep)
            .filter(|dep| !dep.optional)
            .cloned()
            .collect();
        nodes.insert(
            None,
            FeatureNode {
                features: BTreeSet::new(),
                dependencies: mandatory,
            },
        );

        let implicit_default = !nodes.contains_key(&Some(DEFAULT_FEATURE.to_string()));
        if implicit_default {
            nodes.insert(
                Some(DEFAULT_FEATURE.to_string()),
                FeatureNode {
                    features: BTreeSet::from([None]),
                    dependencies: BTreeSet::new(),
                },
            );
        }

        debug!(
            "Built feature graph with {} feature(s) from {} dependencies",
            nodes.len() - 1,
            dependencies.len()
        );

        Ok(Self {
            nodes,
            implicit_default,
        })
    }

    pub fn contains(&self, feature: Option<&str>) -> bool {
        self.nodes.contains_key(&feature.map(str::to_string))
    }

    /// Direct activations of a feature
    pub fn get(&self, feature: Option<&str>) -> Result<&FeatureNode> {
        self.nodes
            .get(&feature.map(str::to_string))
            .ok_or_else(|| Error::UnknownFeature(feature.unwrap_or_default().to_string()))
    }

    /// Named features a package really exposes: declared ones plus
    /// promoted optional dependencies, without a synthesized `default`
    pub fn feature_names(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().flatten().map(String::as_str).filter(|name| {
            !(self.implicit_default && *name == DEFAULT_FEATURE)
        })
    }

    /// Every dependency reachable from any feature
    pub fn all_dependencies(&self) -> BTreeSet<Dependency> {
        self.nodes
            .values()
            .flat_map(|node| node.dependencies.iter().cloned())
            .collect()
    }

    /// Transitive closure of activated features and dependencies
    pub fn resolve(&self, feature: Option<&str>) -> Result<Resolution> {
        let mut resolution = Resolution::default();
        let mut visited: BTreeSet<FeatureName> = BTreeSet::new();
        let mut pending: Vec<FeatureName> = vec![feature.map(str::to_string)];

        while let Some(name) = pending.pop() {
            if !visited.insert(name.clone()) {
                continue;
            }
            let node = self.get(name.as_deref())?;
            resolution
                .dependencies
                .extend(node.dependencies.iter().cloned());
            for activated in &node.features {
                resolution.features.insert(activated.clone());
                if !visited.contains(activated) {
                    pending.push(activated.clone());
                }
            }
        }

        Ok(resolution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::VersionConstraint;

    fn dep(name: &str, optional: bool) -> (String, Dependency) {
        let mut dep = Dependency::new(name.to_string(), VersionConstraint::any());
        dep.optional = optional;
        (name.to_string(), dep)
    }

    fn features(pairs: &[(&str, &[&str])]) -> BTreeMap<String, Vec<String>> {
        pairs
            .iter()
            .map(|(name, entries)| {
                (
                    name.to_string(),
                    entries.iter().map(|e| e.to_string()).collect(),
                )
            })
            .collect()
    }

    fn names(deps: &BTreeSet<Dependency>) -> Vec<&str> {
        deps.iter().map(|d| d.name.as_str()).collect()
    }

    #[test]
    fn test_mandatory_bucket_and_default() {
        let deps = vec![dep("libc", false)];
        let graph = FeatureGraph::build(&deps, &BTreeMap::new()).unwrap();

        assert_eq!(names(&graph.get(None).unwrap().dependencies), vec!["libc"]);
        assert!(graph.contains(Some("default")));
        assert_eq!(graph.feature_names().count(), 0);

        let default = graph.resolve(Some("default")).unwrap();
        assert_eq!(names(&default.dependencies), vec!["libc"]);
    }

    #[test]
    fn test_explicit_default_is_listed() {
        let graph =
            FeatureGraph::build(&[], &features(&[("default", &["std"]), ("std", &[])])).unwrap();
        assert_eq!(graph.feature_names().collect::<Vec<_>>(), vec!["default", "std"]);
    }

    #[test]
    fn test_feature_activates_feature_and_dependency() {
        let deps = vec![dep("serde", true), dep("libc", false)];
        let graph = FeatureGraph::build(
            &deps,
            &features(&[("std", &[]), ("serialize", &["std", "serde/derive"])]),
        )
        .unwrap();

        let node = graph.get(Some("serialize")).unwrap();
        assert!(node.features.contains(&Some("std".to_string())));
        assert!(node.features.contains(&None));
        let serde = node.dependencies.iter().next().unwrap();
        assert_eq!(serde.name, "serde");
        assert_eq!(serde.features, BTreeSet::from([Some("derive".to_string())]));

        // Referenced optional dependency is not promoted
        assert!(!graph.contains(Some("serde")));
    }

    #[test]
    fn test_unreferenced_optional_is_promoted() {
        let deps = vec![dep("rayon", true)];
        let graph = FeatureGraph::build(&deps, &BTreeMap::new()).unwrap();

        let node = graph.get(Some("rayon")).unwrap();
        assert_eq!(names(&node.dependencies), vec!["rayon"]);
        assert!(graph.get(None).unwrap().dependencies.is_empty());
        assert_eq!(graph.feature_names().collect::<Vec<_>>(), vec!["rayon"]);
    }

    #[test]
    fn test_dep_prefix_and_weak_references() {
        let deps = vec![dep("tokio", true), dep("log", true)];
        let graph = FeatureGraph::build(
            &deps,
            &features(&[("async", &["dep:tokio"]), ("logging", &["log?/std"])]),
        )
        .unwrap();

        assert_eq!(names(&graph.get(Some("async")).unwrap().dependencies), vec!["tokio"]);
        let log = graph.get(Some("logging")).unwrap().dependencies.iter().next().unwrap();
        assert_eq!(log.features, BTreeSet::from([Some("std".to_string())]));
        assert!(!graph.contains(Some("tokio")));
        assert!(!graph.contains(Some("log")));
    }

    #[test]
    fn test_cycle_resolves_to_union() {
        let deps = vec![dep("a-dep", true), dep("b-dep", true)];
        let graph = FeatureGraph::build(
            &deps,
            &features(&[("a", &["b", "a-dep"]), ("b", &["a", "b-dep"])]),
        )
        .unwrap();

        let resolution = graph.resolve(Some("a")).unwrap();
        assert_eq!(names(&resolution.dependencies), vec!["a-dep", "b-dep"]);
        assert!(resolution.features.contains(&Some("a".to_string())));
        assert!(resolution.features.contains(&Some("b".to_string())));
    }

    #[test]
    fn test_resolve_includes_mandatory() {
        let deps = vec![dep("core-dep", false), dep("extra", true)];
        let graph =
            FeatureGraph::build(&deps, &features(&[("full", &["extra"])])).unwrap();

        let resolution = graph.resolve(Some("full")).unwrap();
        assert_eq!(names(&resolution.dependencies), vec!["core-dep", "extra"]);
        assert_eq!(names(&graph.resolve(None).unwrap().dependencies), vec!["core-dep"]);
    }

    #[test]
    fn test_unknown_reference_fails() {
        let err = FeatureGraph::build(&[], &features(&[("broken", &["missing"])])).unwrap_err();
        match err {
            Error::UnknownFeatureReference { feature, reference } => {
                assert_eq!(feature, "broken");
                assert_eq!(reference, "missing");
            }
            other => panic!("unexpected error: {:?}", other),
        }

        let err =
            FeatureGraph::build(&[], &features(&[("broken", &["missing/std"])])).unwrap_err();
        assert!(matches!(err, Error::UnknownFeatureReference { .. }));
    }

    #[test]
    fn test_unknown_feature_lookup() {
        let graph = FeatureGraph::build(&[], &BTreeMap::new()).unwrap();
        assert!(matches!(graph.resolve(Some("nope")), Err(Error::UnknownFeature(_))));
        assert!(matches!(graph.get(Some("nope")), Err(Error::UnknownFeature(_))));
    }

    #[test]
    fn test_all_dependencies() {
        let deps = vec![dep("a", false), dep("b", true)];
        let graph = FeatureGraph::build(&deps, &BTreeMap::new()).unwrap();
        assert_eq!(names(&graph.all_dependencies()), vec!["a", "b"]);
    }
}
