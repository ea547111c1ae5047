// src/metadata/mod.rs

//! Package metadata model
//!
//! Built once from a manifest metadata document and read-only afterwards.
//! Produces the Provides / Requires / Conflicts / BuildRequires /
//! TestRequires lists for the package.

pub mod dependency;
pub mod raw;

pub use dependency::{Dependency, DependencyKind, normalize_conflicts, normalize_deps};
pub use raw::{RawDependency, RawManifest, RawTarget, parse_document};

use crate::config::{PrereleasePolicy, ResolverConfig};
use crate::error::{Error, Result};
use crate::render;
use crate::resolver::FeatureGraph;
use crate::version::VersionConstraint;
use semver::Version;
use std::collections::BTreeSet;
use std::fmt;
use tracing::debug;

/// Kind of a build target, taken from the first entry of its `kind` list
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TargetKind {
    Bin,
    Lib,
    Rlib,
    ProcMacro,
    Other(String),
}

impl TargetKind {
    pub fn as_str(&self) -> &str {
        match self {
            TargetKind::Bin => "bin",
            TargetKind::Lib => "lib",
            TargetKind::Rlib => "rlib",
            TargetKind::ProcMacro => "proc-macro",
            TargetKind::Other(kind) => kind,
        }
    }

    /// Whether the target ships as a library (source) package
    pub fn is_library(&self) -> bool {
        matches!(self, TargetKind::Lib | TargetKind::Rlib | TargetKind::ProcMacro)
    }
}

impl From<&str> for TargetKind {
    fn from(kind: &str) -> Self {
        match kind {
            "bin" => TargetKind::Bin,
            "lib" => TargetKind::Lib,
            "rlib" => TargetKind::Rlib,
            "proc-macro" => TargetKind::ProcMacro,
            other => TargetKind::Other(other.to_string()),
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Target {
    pub name: String,
    pub kind: TargetKind,
}

impl From<&RawTarget> for Target {
    fn from(raw: &RawTarget) -> Self {
        Self {
            name: raw.name.clone(),
            kind: raw.kind.first().map(String::as_str).unwrap_or("").into(),
        }
    }
}

/// Which packages a crate turns into
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageLayout<'a> {
    /// Binary targets shipped by the main package
    pub bins: Vec<&'a Target>,
    pub include_main: bool,
    /// Library source package
    pub include_devel: bool,
}

/// In-memory representation of one crate's metadata
#[derive(Debug, Clone)]
pub struct PackageMetadata {
    pub name: String,
    pub version: Version,
    pub license: Option<String>,
    pub license_file: Option<String>,
    pub description: Option<String>,
    pub readme: Option<String>,
    pub targets: BTreeSet<Target>,
    pub features: FeatureGraph,
    pub dev_dependencies: BTreeSet<Dependency>,
    config: ResolverConfig,
}

impl PackageMetadata {
    /// Parse a metadata document (`cargo read-manifest` JSON)
    pub fn from_json(json: &str, config: ResolverConfig) -> Result<Self> {
        Self::from_raw(parse_document(json)?, config)
    }

    pub fn from_raw(raw: RawManifest, config: ResolverConfig) -> Result<Self> {
        debug!("Building metadata for {} {}", raw.name, raw.version);

        let version = package_version(&raw.version)?;

        let mut dependencies = Vec::new();
        let mut dev_dependencies = BTreeSet::new();
        for raw_dep in &raw.dependencies {
            let (key, dep) = Dependency::from_raw(raw_dep, &config)?;
            match dep.kind {
                DependencyKind::Runtime | DependencyKind::Build => dependencies.push((key, dep)),
                DependencyKind::Dev => {
                    dev_dependencies.insert(dep);
                }
            }
        }

        let features = FeatureGraph::build(&dependencies, &raw.features)?;
        let targets = raw.targets.iter().map(Target::from).collect();

        Ok(Self {
            name: raw.name,
            version,
            license: raw.license,
            license_file: raw.license_file,
            description: raw.description,
            readme: raw.readme,
            targets,
            features,
            dev_dependencies,
            config,
        })
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Package version as RPM orders it, the form used in provides tokens
    pub fn rpm_version(&self) -> String {
        crate::version::rpm_version(&self.version)
    }

    /// Exact provides token for the package or one of its features
    pub fn provides_feature(&self, feature: Option<&str>) -> Result<String> {
        if !self.features.contains(feature) {
            return Err(Error::UnknownFeature(feature.unwrap_or_default().to_string()));
        }
        render::render_provides(
            &self.name,
            &VersionConstraint::exact(self.version.clone()),
            feature,
        )
    }

    /// `package(NAME) = VERSION` plus one token per exposed feature
    pub fn provides(&self) -> Result<Vec<String>> {
        let mut provides = BTreeSet::new();
        provides.insert(self.provides_feature(None)?);
        for feature in self.features.feature_names() {
            provides.insert(self.provides_feature(Some(feature))?);
        }
        Ok(provides.into_iter().collect())
    }

    /// Dependency on this package itself, qualified by one feature
    fn self_dependency(&self, feature: Option<String>) -> Dependency {
        Dependency::new(
            self.name.clone(),
            VersionConstraint::exact(self.version.clone()),
        )
        .with_features(BTreeSet::from([feature]))
    }

    /// Requirements of one feature
    ///
    /// Without `resolve` these are the feature's direct dependencies plus a
    /// requirement on this package for every feature it activates. With
    /// `resolve` they are the full transitive dependency closure.
    pub fn feature_requires(
        &self,
        feature: Option<&str>,
        resolve: bool,
    ) -> Result<BTreeSet<Dependency>> {
        if resolve {
            return Ok(self.features.resolve(feature)?.dependencies);
        }
        let node = self.features.get(feature)?;
        let mut deps: BTreeSet<Dependency> = node
            .features
            .iter()
            .map(|activated| self.self_dependency(activated.clone()))
            .collect();
        deps.extend(node.dependencies.iter().cloned());
        Ok(deps)
    }

    fn mandatory(&self, kinds: &[DependencyKind]) -> Result<BTreeSet<Dependency>> {
        Ok(self
            .feature_requires(None, true)?
            .into_iter()
            .filter(|dep| kinds.contains(&dep.kind))
            .collect())
    }

    /// Rendered runtime requirements of the package
    pub fn requires(&self) -> Result<Vec<String>> {
        let deps = self.mandatory(&[DependencyKind::Runtime])?;
        Ok(normalize_deps(&deps, self.config.style))
    }

    /// Versions of runtime dependencies outside their required ranges
    pub fn conflicts(&self) -> Result<Vec<String>> {
        let deps = self.mandatory(&[DependencyKind::Runtime])?;
        Ok(normalize_conflicts(&deps, self.config.style))
    }

    /// Everything needed to compile the package
    pub fn build_requires(&self) -> Result<Vec<String>> {
        let deps = self.mandatory(&[DependencyKind::Runtime, DependencyKind::Build])?;
        Ok(normalize_deps(&deps, self.config.style))
    }

    /// Extra requirements for running the test suite
    pub fn test_requires(&self) -> Vec<String> {
        normalize_deps(&self.dev_dependencies, self.config.style)
    }

    /// Rendered requirements of one feature, see [`Self::feature_requires`]
    pub fn render_feature_requires(
        &self,
        feature: Option<&str>,
        resolve: bool,
    ) -> Result<Vec<String>> {
        let deps = self.feature_requires(feature, resolve)?;
        Ok(normalize_deps(&deps, self.config.style))
    }

    pub fn target_kinds(&self) -> BTreeSet<&TargetKind> {
        self.targets.iter().map(|target| &target.kind).collect()
    }

    /// Classify the package by its targets
    pub fn layout(&self) -> Result<PackageLayout<'_>> {
        let bins: Vec<&Target> = self
            .targets
            .iter()
            .filter(|target| target.kind == TargetKind::Bin)
            .collect();
        let include_devel = self.targets.iter().any(|target| target.kind.is_library());

        if bins.is_empty() && !include_devel {
            return Err(Error::NoBuildTargets(self.name.clone()));
        }

        Ok(PackageLayout {
            include_main: !bins.is_empty(),
            bins,
            include_devel,
        })
    }
}

/// Parse the package's own version, coercing partial forms like `1.2`
fn package_version(raw: &str) -> Result<Version> {
    if let Ok(mut version) = Version::parse(raw.trim()) {
        version.build = semver::BuildMetadata::EMPTY;
        return Ok(version);
    }

    // The package's own version is always an exact pin, pre-release or not
    let pinned = VersionConstraint::parse(&format!("={}", raw), PrereleasePolicy::WithinRelease)
        .map_err(|_| Error::InvalidVersion(raw.to_string()))?;
    match pinned.clauses() {
        [clause] if pinned.is_exact() => Ok(clause.version.clone()),
        _ => Err(Error::InvalidVersion(raw.to_string())),
    }
}
