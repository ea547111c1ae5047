// src/version/mod.rs

//! Crate version requirements and their RPM comparison form
//!
//! Requirement strings are tokenized by [`requirement`] into clauses that
//! still carry the crate ecosystem's shorthand operators (`^`, `~`), then
//! [`interval`] expands those into plain comparisons that an RPM-style
//! package manager understands.

pub mod interval;
pub mod requirement;

pub use interval::{VersionConstraint, translate};
pub use requirement::{RequirementClause, RequirementOp, parse_requirement};

use semver::{BuildMetadata, Prerelease, Version};
use std::fmt;

/// A version literal as written in a requirement, with absent components
/// remembered so upper bounds can be computed from what was actually given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialVersion {
    pub major: u64,
    pub minor: Option<u64>,
    pub patch: Option<u64>,
    pub pre: Prerelease,
}

impl PartialVersion {
    pub fn new(major: u64, minor: Option<u64>, patch: Option<u64>) -> Self {
        Self {
            major,
            minor,
            patch,
            pre: Prerelease::EMPTY,
        }
    }

    /// Zero-fill missing components, keeping the pre-release tag
    pub fn coerce(&self) -> Version {
        Version {
            major: self.major,
            minor: self.minor.unwrap_or(0),
            patch: self.patch.unwrap_or(0),
            pre: self.pre.clone(),
            build: BuildMetadata::EMPTY,
        }
    }

    pub fn is_prerelease(&self) -> bool {
        !self.pre.is_empty()
    }

    /// First version of the next major release, `None` on overflow
    pub fn next_major(&self) -> Option<Version> {
        Some(Version::new(self.major.checked_add(1)?, 0, 0))
    }

    pub fn next_minor(&self) -> Option<Version> {
        Some(Version::new(self.major, self.minor.unwrap_or(0).checked_add(1)?, 0))
    }

    pub fn next_patch(&self) -> Option<Version> {
        Some(Version::new(
            self.major,
            self.minor.unwrap_or(0),
            self.patch.unwrap_or(0).checked_add(1)?,
        ))
    }
}

impl From<&semver::Comparator> for PartialVersion {
    fn from(comparator: &semver::Comparator) -> Self {
        Self {
            major: comparator.major,
            minor: comparator.minor,
            patch: comparator.patch,
            pre: comparator.pre.clone(),
        }
    }
}

impl fmt::Display for PartialVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.major)?;
        if let Some(minor) = self.minor {
            write!(f, ".{}", minor)?;
        }
        if let Some(patch) = self.patch {
            write!(f, ".{}", patch)?;
        }
        if self.is_prerelease() {
            write!(f, "-{}", self.pre)?;
        }
        Ok(())
    }
}

/// Comparison operator of a translated clause
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Op {
    Equal,
    Greater,
    GreaterEq,
    Less,
    LessEq,
}

impl Op {
    pub fn as_str(&self) -> &'static str {
        match self {
            Op::Equal => "=",
            Op::Greater => ">",
            Op::GreaterEq => ">=",
            Op::Less => "<",
            Op::LessEq => "<=",
        }
    }

    /// Operator matching exactly the versions this one rejects on the same
    /// bound. Equality has no single-clause complement.
    pub fn inverse(self) -> Option<Op> {
        match self {
            Op::Greater => Some(Op::LessEq),
            Op::LessEq => Some(Op::Greater),
            Op::Less => Some(Op::GreaterEq),
            Op::GreaterEq => Some(Op::Less),
            Op::Equal => None,
        }
    }

    pub fn is_upper_bound(self) -> bool {
        matches!(self, Op::Less | Op::LessEq)
    }

    pub fn is_lower_bound(self) -> bool {
        matches!(self, Op::Greater | Op::GreaterEq)
    }
}

/// One `OP VERSION` term
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ComparisonClause {
    pub op: Op,
    pub version: Version,
}

impl ComparisonClause {
    pub fn new(op: Op, version: Version) -> Self {
        Self { op, version }
    }

    pub fn inverted(&self) -> Option<Self> {
        self.op
            .inverse()
            .map(|op| Self::new(op, self.version.clone()))
    }
}

impl fmt::Display for ComparisonClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.op.as_str(), rpm_version(&self.version))
    }
}

/// Format a version the way RPM orders it: pre-release tags use `~` so
/// `1.0.0~beta` sorts before `1.0.0`. Build metadata is dropped.
pub fn rpm_version(version: &Version) -> String {
    if version.pre.is_empty() {
        format!("{}.{}.{}", version.major, version.minor, version.patch)
    } else {
        format!(
            "{}.{}.{}~{}",
            version.major, version.minor, version.patch, version.pre
        )
    }
}
