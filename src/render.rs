// src/render.rs

//! Boolean dependency expressions in RPM rich-dependency syntax
//!
//! A capability is written `package(NAME)` or `package(NAME/FEATURE)`.
//! Clauses of one requirement are joined with `with`, alternative feature
//! qualifiers with `or`.

use crate::config::ExpressionStyle;
use crate::error::{Error, Result};
use crate::version::{ComparisonClause, VersionConstraint};
use std::collections::BTreeSet;

/// Namespace of every capability this crate emits
pub const CAPABILITY_NAMESPACE: &str = "package";

/// Capability token for a package, optionally qualified by a feature
pub fn capability(name: &str, feature: Option<&str>) -> String {
    match feature {
        Some(feature) => format!("{}({}/{})", CAPABILITY_NAMESPACE, name, feature),
        None => format!("{}({})", CAPABILITY_NAMESPACE, name),
    }
}

/// Dependency expression tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// `CAPABILITY` or `CAPABILITY OP VERSION`
    Term {
        capability: String,
        clause: Option<ComparisonClause>,
    },
    /// All terms must hold
    With(Vec<Expr>),
    /// Any term may hold
    Or(Vec<Expr>),
}

impl Expr {
    fn with(mut terms: Vec<Expr>) -> Expr {
        if terms.len() == 1 {
            terms.remove(0)
        } else {
            Expr::With(terms)
        }
    }

    fn or(mut terms: Vec<Expr>) -> Expr {
        if terms.len() == 1 {
            terms.remove(0)
        } else {
            Expr::Or(terms)
        }
    }

    pub fn render(&self, style: ExpressionStyle) -> String {
        let mut out = String::new();
        self.write(&mut out, style == ExpressionStyle::Parenthesized);
        out
    }

    fn write(&self, out: &mut String, wrap: bool) {
        let (terms, separator) = match self {
            Expr::Term { capability, clause } => {
                out.push_str(capability);
                if let Some(clause) = clause {
                    out.push(' ');
                    out.push_str(&clause.to_string());
                }
                return;
            }
            Expr::With(terms) => (terms, " with "),
            Expr::Or(terms) => (terms, " or "),
        };

        if terms.len() == 1 {
            return terms[0].write(out, wrap);
        }
        if wrap {
            out.push('(');
        }
        for (i, term) in terms.iter().enumerate() {
            if i > 0 {
                out.push_str(separator);
            }
            term.write(out, true);
        }
        if wrap {
            out.push(')');
        }
    }
}

/// Expression for one feature qualifier of `name` restricted by `constraint`
pub fn constrained(name: &str, feature: Option<&str>, constraint: &VersionConstraint) -> Expr {
    let capability = capability(name, feature);
    if constraint.is_any() {
        return Expr::Term {
            capability,
            clause: None,
        };
    }
    Expr::with(
        constraint
            .clauses()
            .iter()
            .map(|clause| Expr::Term {
                capability: capability.clone(),
                clause: Some(clause.clone()),
            })
            .collect(),
    )
}

/// Expression satisfied by any of the given feature qualifiers
///
/// An empty feature set means the unqualified capability.
pub fn dependency_expr(
    name: &str,
    constraint: &VersionConstraint,
    features: &BTreeSet<Option<String>>,
) -> Expr {
    if features.is_empty() {
        return constrained(name, None, constraint);
    }
    Expr::or(
        features
            .iter()
            .map(|feature| constrained(name, feature.as_deref(), constraint))
            .collect(),
    )
}

pub fn render_dependency(
    name: &str,
    constraint: &VersionConstraint,
    features: &BTreeSet<Option<String>>,
    style: ExpressionStyle,
) -> String {
    dependency_expr(name, constraint, features).render(style)
}

/// Render a provides token: bare, or a single exact-equality clause
pub fn render_provides(
    name: &str,
    constraint: &VersionConstraint,
    feature: Option<&str>,
) -> Result<String> {
    if !constraint.is_any() && !constraint.is_exact() {
        return Err(Error::InvalidProvides {
            name: capability(name, feature),
            constraint: constraint.to_string(),
        });
    }
    Ok(constrained(name, feature, constraint).render(ExpressionStyle::Bare))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PrereleasePolicy;
    use semver::Version;

    fn constraint(req: &str) -> VersionConstraint {
        VersionConstraint::parse(req, PrereleasePolicy::default()).unwrap()
    }

    fn features(names: &[Option<&str>]) -> BTreeSet<Option<String>> {
        names.iter().map(|n| n.map(str::to_string)).collect()
    }

    #[test]
    fn test_capability_tokens() {
        assert_eq!(capability("libc", None), "package(libc)");
        assert_eq!(capability("serde", Some("derive")), "package(serde/derive)");
    }

    #[test]
    fn test_render_unconstrained() {
        let rendered = render_dependency(
            "test",
            &constraint("*"),
            &features(&[None]),
            ExpressionStyle::Bare,
        );
        assert_eq!(rendered, "package(test)");
    }

    #[test]
    fn test_render_single_clause_has_no_parens() {
        for style in [ExpressionStyle::Bare, ExpressionStyle::Parenthesized] {
            let rendered =
                render_dependency("test", &constraint("= 1.2.3"), &features(&[None]), style);
            assert_eq!(rendered, "package(test) = 1.2.3");
        }
    }

    #[test]
    fn test_render_range_styles() {
        let c = constraint("^1.2.3");
        assert_eq!(
            render_dependency("test", &c, &features(&[None]), ExpressionStyle::Bare),
            "package(test) >= 1.2.3 with package(test) < 2.0.0"
        );
        assert_eq!(
            render_dependency("test", &c, &features(&[None]), ExpressionStyle::Parenthesized),
            "(package(test) >= 1.2.3 with package(test) < 2.0.0)"
        );
    }

    #[test]
    fn test_render_feature_alternatives() {
        let rendered = render_dependency(
            "test",
            &constraint("~1.2"),
            &features(&[Some("a"), Some("b")]),
            ExpressionStyle::Bare,
        );
        assert_eq!(
            rendered,
            "(package(test/a) >= 1.2.0 with package(test/a) < 1.3.0) or \
             (package(test/b) >= 1.2.0 with package(test/b) < 1.3.0)"
        );
    }

    #[test]
    fn test_render_feature_alternatives_single_clause() {
        let rendered = render_dependency(
            "test",
            &constraint(">= 2"),
            &features(&[None, Some("std")]),
            ExpressionStyle::Parenthesized,
        );
        assert_eq!(rendered, "(package(test) >= 2.0.0 or package(test/std) >= 2.0.0)");
    }

    #[test]
    fn test_render_is_idempotent_on_normalized_input() {
        let c = constraint("= 1.2.3");
        let once = render_dependency("test", &c, &features(&[None]), ExpressionStyle::Bare);
        let twice = render_dependency("test", &c, &features(&[None]), ExpressionStyle::Bare);
        assert_eq!(once, twice);
        assert!(!once.starts_with('('));
        assert!(!once.ends_with(')'));
    }

    #[test]
    fn test_provides_exact_and_bare() {
        let exact = VersionConstraint::exact(Version::new(1, 2, 3));
        assert_eq!(
            render_provides("hello", &exact, None).unwrap(),
            "package(hello) = 1.2.3"
        );
        assert_eq!(
            render_provides("hello", &exact, Some("color")).unwrap(),
            "package(hello/color) = 1.2.3"
        );
        assert_eq!(
            render_provides("hello", &constraint("*"), None).unwrap(),
            "package(hello)"
        );
    }

    #[test]
    fn test_provides_rejects_ranges() {
        let err = render_provides("hello", &constraint("^1.2.3"), None).unwrap_err();
        assert!(matches!(err, Error::InvalidProvides { .. }));

        let err = render_provides("hello", &constraint(">= 1.0"), Some("x")).unwrap_err();
        assert!(matches!(err, Error::InvalidProvides { .. }));
    }
}
