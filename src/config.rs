// src/config.rs

//! Behaviour policies for requirement translation and rendering
//!
//! There are no configuration files; the command line fills in a
//! [`ResolverConfig`] and hands it to the metadata model.

/// How pre-release requirement literals (`^1.2.3-beta.1`) are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrereleasePolicy {
    /// Bound caret/tilde ranges at the next boundary of the most specific
    /// component present, so pre-releases stay within their own release.
    #[default]
    WithinRelease,
    /// Fail with `UnsupportedRequirement`
    Reject,
}

/// Parenthesization of multi-term expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpressionStyle {
    /// Only nested multi-term expressions are wrapped
    #[default]
    Bare,
    /// Every multi-term expression is wrapped, as RPM rich dependencies expect
    Parenthesized,
}

/// Policies applied while building and rendering package metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResolverConfig {
    pub prerelease: PrereleasePolicy,
    pub style: ExpressionStyle,
    /// Require `package(NAME/default)` for dependencies using default features
    pub default_features: bool,
}

impl ResolverConfig {
    pub fn with_prerelease(mut self, prerelease: PrereleasePolicy) -> Self {
        self.prerelease = prerelease;
        self
    }

    pub fn with_style(mut self, style: ExpressionStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_default_features(mut self, enabled: bool) -> Self {
        self.default_features = enabled;
        self
    }
}
