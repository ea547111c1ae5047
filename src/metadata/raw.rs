// src/metadata/raw.rs

//! Serde model of the manifest metadata document
//!
//! Mirrors the JSON emitted by `cargo read-manifest`. The
//! `cargo metadata --no-deps` shape (`{"packages": [...]}`) is accepted
//! too; its first package is used.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::collections::BTreeMap;

/// One package as described by the manifest reader
#[derive(Debug, Clone, Deserialize)]
pub struct RawManifest {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub license: Option<String>,
    #[serde(default)]
    pub license_file: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub readme: Option<String>,
    #[serde(default)]
    pub targets: Vec<RawTarget>,
    #[serde(default)]
    pub dependencies: Vec<RawDependency>,
    #[serde(default)]
    pub features: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawTarget {
    pub name: String,
    #[serde(default)]
    pub kind: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawDependency {
    pub name: String,
    #[serde(default = "any_version")]
    pub req: String,
    /// `null` for normal dependencies
    #[serde(default)]
    pub kind: Option<RawDependencyKind>,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default = "enabled")]
    pub uses_default_features: bool,
    /// Platform `cfg(...)` expression or target triple
    #[serde(default)]
    pub target: Option<String>,
    /// Name the dependency is imported and referenced under in features
    #[serde(default)]
    pub rename: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RawDependencyKind {
    Normal,
    Build,
    Dev,
}

fn any_version() -> String {
    "*".to_string()
}

fn enabled() -> bool {
    true
}

/// Parse a metadata document into the package it describes
pub fn parse_document(json: &str) -> Result<RawManifest> {
    let mut value: serde_json::Value = serde_json::from_str(json)?;

    if let Some(packages) = value.get_mut("packages") {
        let first = packages
            .as_array_mut()
            .filter(|packages| !packages.is_empty())
            .map(|packages| packages.swap_remove(0))
            .ok_or_else(|| {
                Error::ManifestError("metadata document contains no packages".to_string())
            })?;
        return Ok(serde_json::from_value(first)?);
    }

    Ok(serde_json::from_value(value)?)
}
