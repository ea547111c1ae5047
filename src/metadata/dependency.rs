// src/metadata/dependency.rs

//! Dependencies of a package and their rendered requirement expressions

use super::raw::{RawDependency, RawDependencyKind};
use crate::config::{ExpressionStyle, ResolverConfig};
use crate::error::Result;
use crate::render;
use crate::version::VersionConstraint;
use std::collections::BTreeSet;
use std::fmt;

/// When a dependency is needed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DependencyKind {
    Runtime,
    Build,
    Dev,
}

impl DependencyKind {
    pub fn as_str(&self) -> &str {
        match self {
            DependencyKind::Runtime => "runtime",
            DependencyKind::Build => "build",
            DependencyKind::Dev => "dev",
        }
    }
}

impl From<Option<RawDependencyKind>> for DependencyKind {
    fn from(kind: Option<RawDependencyKind>) -> Self {
        match kind {
            None | Some(RawDependencyKind::Normal) => DependencyKind::Runtime,
            Some(RawDependencyKind::Build) => DependencyKind::Build,
            Some(RawDependencyKind::Dev) => DependencyKind::Dev,
        }
    }
}

/// A requirement on another package
///
/// `None` in `features` stands for the unqualified capability.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Dependency {
    pub name: String,
    pub constraint: VersionConstraint,
    pub features: BTreeSet<Option<String>>,
    pub optional: bool,
    pub kind: DependencyKind,
    /// Platform restriction, carried through unevaluated
    pub target: Option<String>,
}

impl Dependency {
    /// Unconditional runtime dependency on the unqualified capability
    pub fn new(name: String, constraint: VersionConstraint) -> Self {
        Self {
            name,
            constraint,
            features: BTreeSet::from([None]),
            optional: false,
            kind: DependencyKind::Runtime,
            target: None,
        }
    }

    /// Build a dependency from manifest metadata
    ///
    /// Returns the key feature entries refer to it by (its rename, if any)
    /// alongside the dependency itself.
    pub fn from_raw(raw: &RawDependency, config: &ResolverConfig) -> Result<(String, Self)> {
        let constraint = VersionConstraint::parse(&raw.req, config.prerelease)?;

        let mut features: BTreeSet<Option<String>> =
            raw.features.iter().cloned().map(Some).collect();
        if config.default_features && raw.uses_default_features {
            features.insert(Some("default".to_string()));
        }
        if features.is_empty() {
            features.insert(None);
        }

        let key = raw.rename.clone().unwrap_or_else(|| raw.name.clone());
        let dependency = Self {
            name: raw.name.clone(),
            constraint,
            features,
            optional: raw.optional,
            kind: raw.kind.into(),
            target: raw.target.clone(),
        };
        Ok((key, dependency))
    }

    /// Independent copy requiring exactly the given feature qualifiers
    pub fn with_features(&self, features: BTreeSet<Option<String>>) -> Self {
        Self {
            features,
            ..self.clone()
        }
    }

    /// One requirement expression per feature qualifier
    pub fn requires(&self, style: ExpressionStyle) -> Vec<String> {
        if self.features.is_empty() {
            return vec![render::render_dependency(
                &self.name,
                &self.constraint,
                &self.features,
                style,
            )];
        }
        self.features
            .iter()
            .map(|feature| {
                render::constrained(&self.name, feature.as_deref(), &self.constraint)
                    .render(style)
            })
            .collect()
    }

    /// Expression matching every version outside the required range, for
    /// any of the feature qualifiers
    pub fn conflicts(&self, style: ExpressionStyle) -> Option<String> {
        let clause = self.constraint.conflicts()?;
        let constraint = VersionConstraint::from_clause(clause);
        Some(render::render_dependency(
            &self.name,
            &constraint,
            &self.features,
            style,
        ))
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let features: Vec<&str> = self.features.iter().flatten().map(|s| s.as_str()).collect();
        write!(f, "{} {}", self.name, self.constraint)?;
        if !features.is_empty() {
            write!(f, " ({})", features.join(", "))?;
        }
        if self.kind != DependencyKind::Runtime {
            write!(f, " [{}]", self.kind.as_str())?;
        }
        Ok(())
    }
}

/// Render requirement expressions for a set of dependencies, deduplicated
/// and sorted
pub fn normalize_deps<'a>(
    deps: impl IntoIterator<Item = &'a Dependency>,
    style: ExpressionStyle,
) -> Vec<String> {
    deps.into_iter()
        .flat_map(|dep| dep.requires(style))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Conflicts expressions for a set of dependencies, deduplicated and sorted
pub fn normalize_conflicts<'a>(
    deps: impl IntoIterator<Item = &'a Dependency>,
    style: ExpressionStyle,
) -> Vec<String> {
    deps.into_iter()
        .filter_map(|dep| dep.conflicts(style))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PrereleasePolicy;

    fn raw(name: &str, req: &str) -> RawDependency {
        RawDependency {
            name: name.to_string(),
            req: req.to_string(),
            kind: None,
            optional: false,
            features: vec![],
            uses_default_features: true,
            target: None,
            rename: None,
        }
    }

    #[test]
    fn test_from_raw_defaults_to_unqualified() {
        let (key, dep) = Dependency::from_raw(&raw("libc", "^1.2.3"), &ResolverConfig::default())
            .unwrap();
        assert_eq!(key, "libc");
        assert_eq!(dep.features, BTreeSet::from([None]));
        assert_eq!(dep.kind, DependencyKind::Runtime);
        assert_eq!(
            dep.requires(ExpressionStyle::Bare),
            vec!["package(libc) >= 1.2.3 with package(libc) < 2.0.0"]
        );
        assert_eq!(
            dep.conflicts(ExpressionStyle::Bare).as_deref(),
            Some("package(libc) >= 2.0.0")
        );
    }

    #[test]
    fn test_from_raw_with_features_and_rename() {
        let mut r = raw("serde", "1.0");
        r.features = vec!["derive".to_string(), "std".to_string()];
        r.rename = Some("serde1".to_string());
        r.kind = Some(RawDependencyKind::Build);

        let (key, dep) = Dependency::from_raw(&r, &ResolverConfig::default()).unwrap();
        assert_eq!(key, "serde1");
        assert_eq!(dep.name, "serde");
        assert_eq!(dep.kind, DependencyKind::Build);
        assert_eq!(
            dep.requires(ExpressionStyle::Parenthesized),
            vec![
                "(package(serde/derive) >= 1.0.0 with package(serde/derive) < 2.0.0)",
                "(package(serde/std) >= 1.0.0 with package(serde/std) < 2.0.0)",
            ]
        );
        assert_eq!(
            dep.conflicts(ExpressionStyle::Bare).as_deref(),
            Some("package(serde/derive) >= 2.0.0 or package(serde/std) >= 2.0.0")
        );
    }

    #[test]
    fn test_default_features_policy() {
        let config = ResolverConfig::default().with_default_features(true);
        let (_, dep) = Dependency::from_raw(&raw("log", "0.4"), &config).unwrap();
        assert_eq!(dep.features, BTreeSet::from([Some("default".to_string())]));

        let mut r = raw("log", "0.4");
        r.uses_default_features = false;
        let (_, dep) = Dependency::from_raw(&r, &config).unwrap();
        assert_eq!(dep.features, BTreeSet::from([None]));
    }

    #[test]
    fn test_with_features_is_independent_copy() {
        let (_, original) =
            Dependency::from_raw(&raw("rand", "0.8"), &ResolverConfig::default()).unwrap();
        let mut narrowed = original.with_features(BTreeSet::from([Some("small_rng".to_string())]));
        narrowed.features.insert(Some("std".to_string()));

        assert_eq!(original.features, BTreeSet::from([None]));
        assert_eq!(narrowed.features.len(), 2);
        assert_eq!(narrowed.constraint, original.constraint);
    }

    #[test]
    fn test_unconstrained_has_no_conflicts() {
        let (_, dep) = Dependency::from_raw(&raw("any", "*"), &ResolverConfig::default()).unwrap();
        assert_eq!(dep.requires(ExpressionStyle::Bare), vec!["package(any)"]);
        assert_eq!(dep.conflicts(ExpressionStyle::Bare), None);
    }

    #[test]
    fn test_from_raw_propagates_requirement_errors() {
        let config = ResolverConfig::default().with_prerelease(PrereleasePolicy::Reject);
        assert!(Dependency::from_raw(&raw("x", "1.*"), &config).is_err());
        assert!(Dependency::from_raw(&raw("x", "^1.0.0-rc.1"), &config).is_err());
    }

    #[test]
    fn test_normalize_deduplicates_and_sorts() {
        let config = ResolverConfig::default();
        let (_, a) = Dependency::from_raw(&raw("zlib", "= 1.2.3"), &config).unwrap();
        let (_, b) = Dependency::from_raw(&raw("abc", "= 0.1.0"), &config).unwrap();
        let mut c = a.clone();
        c.kind = DependencyKind::Build;

        let rendered = normalize_deps([&a, &b, &c], ExpressionStyle::Bare);
        assert_eq!(rendered, vec!["package(abc) = 0.1.0", "package(zlib) = 1.2.3"]);
        assert!(normalize_conflicts([&a, &b], ExpressionStyle::Bare).is_empty());
    }

    #[test]
    fn test_display() {
        let mut r = raw("serde", "^1");
        r.features = vec!["derive".to_string()];
        let (_, dep) = Dependency::from_raw(&r, &ResolverConfig::default()).unwrap();
        assert_eq!(dep.to_string(), "serde >= 1.0.0, < 2.0.0 (derive)");

        let mut r = raw("cc", "*");
        r.kind = Some(RawDependencyKind::Build);
        let (_, dep) = Dependency::from_raw(&r, &ResolverConfig::default()).unwrap();
        assert_eq!(dep.to_string(), "cc * [build]");
    }
}
