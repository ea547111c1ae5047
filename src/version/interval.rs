// src/version/interval.rs

//! Expansion of caret/tilde requirements into explicit version intervals
//!
//! Caret and tilde clauses become a `>= lower` / `< upper` pair. Plain
//! comparisons pass through with their version coerced to three
//! components. A requirement may expand to at most two clauses, because the
//! packaging target has no safe rendering for longer ranges.

use super::{ComparisonClause, Op, PartialVersion, RequirementClause, RequirementOp};
use crate::config::PrereleasePolicy;
use crate::error::{Error, Result};
use semver::Version;
use std::fmt;
use tracing::debug;

/// Maximum number of comparison clauses a requirement may expand to
const MAX_CLAUSES: usize = 2;

/// Ordered list of comparison clauses that must all hold
///
/// An empty constraint matches any version.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VersionConstraint {
    clauses: Vec<ComparisonClause>,
}

impl VersionConstraint {
    /// Constraint matching every version
    pub fn any() -> Self {
        Self::default()
    }

    pub fn exact(version: Version) -> Self {
        Self {
            clauses: vec![ComparisonClause::new(Op::Equal, version)],
        }
    }

    pub fn from_clause(clause: ComparisonClause) -> Self {
        Self {
            clauses: vec![clause],
        }
    }

    /// Parse and translate a requirement string in one step
    pub fn parse(req: &str, policy: PrereleasePolicy) -> Result<Self> {
        let clauses = super::parse_requirement(req)?;
        translate(req, &clauses, policy)
    }

    pub fn clauses(&self) -> &[ComparisonClause] {
        &self.clauses
    }

    pub fn is_any(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn is_exact(&self) -> bool {
        matches!(self.clauses.as_slice(), [clause] if clause.op == Op::Equal)
    }

    /// The interval that cannot coexist with this requirement
    ///
    /// Only a bounded range (one lower and one upper clause) has one: the
    /// inverse of its upper bound. Open ranges, exact pins and pairs of
    /// bounds on the same side have no conflicts.
    pub fn conflicts(&self) -> Option<ComparisonClause> {
        match self.clauses.as_slice() {
            [first, second] if first.op.is_lower_bound() && second.op.is_upper_bound() => {
                second.inverted()
            }
            [first, second] if first.op.is_upper_bound() && second.op.is_lower_bound() => {
                first.inverted()
            }
            _ => None,
        }
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.clauses.is_empty() {
            return write!(f, "*");
        }
        let parts: Vec<String> = self.clauses.iter().map(|c| c.to_string()).collect();
        write!(f, "{}", parts.join(", "))
    }
}

/// Expand parsed requirement clauses into a [`VersionConstraint`]
///
/// `req` is the requirement as written, used for error reporting.
pub fn translate(
    req: &str,
    clauses: &[RequirementClause],
    policy: PrereleasePolicy,
) -> Result<VersionConstraint> {
    let mut out = Vec::with_capacity(MAX_CLAUSES);

    for clause in clauses {
        let version = &clause.version;
        if version.is_prerelease() && policy == PrereleasePolicy::Reject {
            return Err(Error::UnsupportedRequirement {
                req: req.to_string(),
                reason: "pre-release requirements are not supported".to_string(),
            });
        }

        let lower = version.coerce();
        match clause.op {
            RequirementOp::Caret => {
                let upper = caret_upper(version).ok_or_else(|| overflow(req))?;
                out.push(ComparisonClause::new(Op::GreaterEq, lower));
                out.push(ComparisonClause::new(Op::Less, upper));
            }
            RequirementOp::Tilde => {
                let upper = tilde_upper(version).ok_or_else(|| overflow(req))?;
                out.push(ComparisonClause::new(Op::GreaterEq, lower));
                out.push(ComparisonClause::new(Op::Less, upper));
            }
            RequirementOp::Exact => out.push(ComparisonClause::new(Op::Equal, lower)),
            RequirementOp::Greater => out.push(ComparisonClause::new(Op::Greater, lower)),
            RequirementOp::GreaterEq => out.push(ComparisonClause::new(Op::GreaterEq, lower)),
            RequirementOp::Less => out.push(ComparisonClause::new(Op::Less, lower)),
            RequirementOp::LessEq => out.push(ComparisonClause::new(Op::LessEq, lower)),
        }
    }

    if out.len() > MAX_CLAUSES {
        return Err(Error::AmbiguousRequirement {
            req: req.to_string(),
            count: out.len(),
        });
    }

    let constraint = VersionConstraint { clauses: out };
    debug!("Translated requirement '{}' to '{}'", req, constraint);
    Ok(constraint)
}

fn overflow(req: &str) -> Error {
    Error::UnsupportedRequirement {
        req: req.to_string(),
        reason: "upper bound exceeds the largest representable version".to_string(),
    }
}

/// Exclusive upper bound of `^version`, `None` if it cannot be represented
pub fn caret_upper(version: &PartialVersion) -> Option<Version> {
    if version.is_prerelease() {
        return prerelease_upper(version);
    }
    if version.major != 0 {
        return version.next_major();
    }
    match version.minor {
        None => version.next_major(),
        Some(minor) if minor != 0 || version.patch.is_none() => version.next_minor(),
        Some(_) => version.next_patch(),
    }
}

/// Exclusive upper bound of `~version`, `None` if it cannot be represented
pub fn tilde_upper(version: &PartialVersion) -> Option<Version> {
    if version.is_prerelease() {
        return prerelease_upper(version);
    }
    if version.minor.is_none() {
        version.next_major()
    } else {
        version.next_minor()
    }
}

// Pre-releases only match within their own release: bump the most specific
// component that was given.
fn prerelease_upper(version: &PartialVersion) -> Option<Version> {
    if version.patch.is_some() {
        version.next_patch()
    } else if version.minor.is_some() {
        version.next_minor()
    } else {
        version.next_major()
    }
}
