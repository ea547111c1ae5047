// src/version/requirement.rs

//! Tokenizer for crate requirement strings
//!
//! Accepts the comma-separated comparator syntax used in crate manifests
//! (`^1.2.3`, `~1.2, <1.5`, `= 1.2.3`, `>=1.2.0`, bare `1.2`). Wildcards are
//! only accepted as the whole requirement (`*`), which means "any version".

use super::PartialVersion;
use crate::error::{Error, Result};
use semver::VersionReq;
use tracing::debug;

/// Operator of a requirement clause before interval expansion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequirementOp {
    Caret,
    Tilde,
    Exact,
    Greater,
    GreaterEq,
    Less,
    LessEq,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequirementClause {
    pub op: RequirementOp,
    pub version: PartialVersion,
}

/// Parse one requirement string into its clauses
///
/// `*` yields an empty list. Embedded wildcards and `!=` are rejected as
/// unsupported; anything that does not tokenize is malformed.
pub fn parse_requirement(req: &str) -> Result<Vec<RequirementClause>> {
    let trimmed = req.trim();

    if trimmed == "*" {
        return Ok(Vec::new());
    }
    if trimmed.contains('*') {
        return Err(unsupported(req, "'*' is only supported as the whole requirement"));
    }
    if trimmed.contains("!=") {
        return Err(unsupported(req, "'!=' is not supported"));
    }

    let parsed = VersionReq::parse(trimmed).map_err(|e| Error::MalformedRequirement {
        req: req.to_string(),
        reason: e.to_string(),
    })?;

    let mut clauses = Vec::with_capacity(parsed.comparators.len());
    for comparator in &parsed.comparators {
        let op = match comparator.op {
            semver::Op::Caret => RequirementOp::Caret,
            semver::Op::Tilde => RequirementOp::Tilde,
            semver::Op::Exact => RequirementOp::Exact,
            semver::Op::Greater => RequirementOp::Greater,
            semver::Op::GreaterEq => RequirementOp::GreaterEq,
            semver::Op::Less => RequirementOp::Less,
            semver::Op::LessEq => RequirementOp::LessEq,
            semver::Op::Wildcard => {
                return Err(unsupported(req, "wildcard components are not supported"));
            }
            _ => return Err(unsupported(req, "unknown operator")),
        };
        clauses.push(RequirementClause {
            op,
            version: PartialVersion::from(comparator),
        });
    }

    if clauses.is_empty() {
        return Err(unsupported(req, "empty requirement kind"));
    }

    debug!("Parsed requirement '{}' into {} clause(s)", req, clauses.len());
    Ok(clauses)
}

fn unsupported(req: &str, reason: &str) -> Error {
    Error::UnsupportedRequirement {
        req: req.to_string(),
        reason: reason.to_string(),
    }
}
