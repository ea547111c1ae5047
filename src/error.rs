// src/error.rs

use thiserror::Error;

/// Core error types for crate2rpm
///
/// Every failure is local to the package whose metadata triggered it.
#[derive(Error, Debug)]
pub enum Error {
    /// Requirement string could not be tokenized into operator + version
    #[error("Malformed requirement '{req}': {reason}")]
    MalformedRequirement { req: String, reason: String },

    /// Recognized syntax that has no translation rule
    #[error("Unsupported requirement '{req}': {reason}")]
    UnsupportedRequirement { req: String, reason: String },

    /// More than two comparison clauses after expansion
    #[error("Ambiguous requirement '{req}': {count} comparison clauses, at most 2 are supported")]
    AmbiguousRequirement { req: String, count: usize },

    /// A feature activation entry names neither a feature nor a dependency
    #[error("Feature '{feature}' references unknown feature or dependency '{reference}'")]
    UnknownFeatureReference { feature: String, reference: String },

    /// Lookup of a feature that is not part of the feature graph
    #[error("Feature '{0}' doesn't exist")]
    UnknownFeature(String),

    /// Attempt to render a ranged constraint as a provides token
    #[error("Cannot provide {name} with non-exact constraint '{constraint}'")]
    InvalidProvides { name: String, constraint: String },

    /// Package version is not a single exact version
    #[error("Incorrect package version: {0}")]
    InvalidVersion(String),

    /// Package has neither binary nor library targets
    #[error("Package {0} has no bin and no lib targets")]
    NoBuildTargets(String),

    /// External manifest reader failed
    #[error("Failed to read manifest: {0}")]
    ManifestError(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Metadata document is not valid JSON of the expected shape
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias using crate2rpm's Error type
pub type Result<T> = std::result::Result<T, Error>;
