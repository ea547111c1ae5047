// src/lib.rs

//! crate2rpm
//!
//! Translates a crate's dependency and feature metadata into the boolean
//! dependency expressions an RPM-style package manager consumes
//! (Provides, Requires, Conflicts, BuildRequires, TestRequires).
//!
//! # Architecture
//!
//! - `version`: requirement strings → exact version intervals
//! - `resolver`: feature activation graph and its transitive closure
//! - `render`: `package(NAME[/FEATURE]) OP VERSION` expressions
//! - `metadata`: the package model tying the above together
//!
//! Everything is a pure function of one metadata document; packages can be
//! processed independently and in parallel.

pub mod config;
mod error;
pub mod licensing;
pub mod manifest;
pub mod metadata;
pub mod render;
pub mod resolver;
pub mod version;

pub use config::{ExpressionStyle, PrereleasePolicy, ResolverConfig};
pub use error::{Error, Result};
pub use metadata::{Dependency, DependencyKind, PackageMetadata};
