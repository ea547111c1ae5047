// src/manifest.rs

//! Obtaining manifest metadata documents
//!
//! Metadata either comes from a JSON file produced earlier or from running
//! `cargo read-manifest` against a `Cargo.toml`.

use crate::config::ResolverConfig;
use crate::error::{Error, Result};
use crate::metadata::PackageMetadata;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Locate the manifest file for a path that may name its directory
pub fn manifest_path(path: &Path) -> PathBuf {
    if path.is_dir() {
        path.join("Cargo.toml")
    } else {
        path.to_path_buf()
    }
}

/// Run `cargo read-manifest` and return its JSON output
pub fn read_manifest(path: &Path) -> Result<String> {
    let manifest = manifest_path(path);
    let cargo = std::env::var("CARGO").unwrap_or_else(|_| "cargo".to_string());
    debug!("Running {} read-manifest on {}", cargo, manifest.display());

    let output = Command::new(&cargo)
        .arg("read-manifest")
        .arg(format!("--manifest-path={}", manifest.display()))
        .output()?;

    if !output.status.success() {
        return Err(Error::ManifestError(format!(
            "{} read-manifest failed for {}: {}",
            cargo,
            manifest.display(),
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    String::from_utf8(output.stdout)
        .map_err(|e| Error::ManifestError(format!("Invalid UTF-8 in manifest metadata: {}", e)))
}

/// Load package metadata from a `.json` document or a crate manifest
pub fn load(source: &str, config: ResolverConfig) -> Result<PackageMetadata> {
    let path = Path::new(source);
    let json = if path.extension().is_some_and(|ext| ext == "json") {
        debug!("Reading metadata document {}", path.display());
        std::fs::read_to_string(path)?
    } else {
        read_manifest(path)?
    };
    PackageMetadata::from_json(&json, config)
}
