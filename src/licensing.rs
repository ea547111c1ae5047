// src/licensing.rs

//! License expression translation for distribution targets
//!
//! Crates declare SPDX expressions; Fedora-family distributions historically
//! expect their own short names. The translation table is built once on
//! first use and handed to callers by reference.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::{info, warn};

/// SPDX identifier → Fedora short name. An empty short name marks a license
/// that is not acceptable for Fedora.
const SPDX_TO_FEDORA: &[(&str, &str)] = &[
    ("0BSD", "0BSD"),
    ("AGPL-3.0", "AGPLv3"),
    ("AGPL-3.0-or-later", "AGPLv3+"),
    ("Apache-2.0", "ASL 2.0"),
    ("Artistic-2.0", "Artistic 2.0"),
    ("BSD-2-Clause", "BSD"),
    ("BSD-3-Clause", "BSD"),
    ("BSL-1.0", "Boost"),
    ("CC0-1.0", "CC0"),
    ("GPL-2.0", "GPLv2"),
    ("GPL-2.0-or-later", "GPLv2+"),
    ("GPL-3.0", "GPLv3"),
    ("GPL-3.0-or-later", "GPLv3+"),
    ("ISC", "ISC"),
    ("JSON", ""),
    ("LGPL-2.1", "LGPLv2"),
    ("LGPL-2.1-or-later", "LGPLv2+"),
    ("LGPL-3.0", "LGPLv3"),
    ("LGPL-3.0-or-later", "LGPLv3+"),
    ("MIT", "MIT"),
    ("MPL-2.0", "MPLv2.0"),
    ("SSPL-1.0", ""),
    ("Unicode-DFS-2016", "Unicode"),
    ("Unlicense", "Unlicense"),
    ("WTFPL", "WTFPL"),
    ("Zlib", "zlib"),
];

static FEDORA_MAP: Lazy<LicenseMap> = Lazy::new(|| LicenseMap {
    entries: SPDX_TO_FEDORA.iter().copied().collect(),
});

/// Distribution the package is generated for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Distro {
    #[default]
    Plain,
    Fedora,
    Epel,
    Mageia,
    Opensuse,
}

impl Distro {
    pub fn as_str(&self) -> &str {
        match self {
            Distro::Plain => "plain",
            Distro::Fedora => "fedora",
            Distro::Epel => "epel",
            Distro::Mageia => "mageia",
            Distro::Opensuse => "opensuse",
        }
    }

    fn uses_fedora_names(&self) -> bool {
        matches!(self, Distro::Fedora | Distro::Epel)
    }
}

impl FromStr for Distro {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "plain" => Ok(Distro::Plain),
            "fedora" => Ok(Distro::Fedora),
            "epel" => Ok(Distro::Epel),
            "mageia" => Ok(Distro::Mageia),
            "opensuse" => Ok(Distro::Opensuse),
            _ => Err(format!("Invalid distribution target: {}", s)),
        }
    }
}

impl fmt::Display for Distro {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only SPDX → distribution license name table
#[derive(Debug)]
pub struct LicenseMap {
    entries: HashMap<&'static str, &'static str>,
}

impl LicenseMap {
    /// Process-wide Fedora table
    pub fn fedora() -> &'static LicenseMap {
        &FEDORA_MAP
    }

    pub fn get(&self, spdx: &str) -> Option<&'static str> {
        self.entries.get(spdx).copied()
    }

    /// Entries sorted by SPDX identifier
    pub fn entries(&self) -> Vec<(&'static str, &'static str)> {
        let mut entries: Vec<_> = self.entries.iter().map(|(k, v)| (*k, *v)).collect();
        entries.sort_unstable();
        entries
    }
}

/// Translated license tag with reviewer notes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatedLicense {
    pub license: String,
    /// `# FIXME` lines for tags that need manual review
    pub comments: Option<String>,
}

/// Replace the deprecated `A/B` syntax with `A OR B`
pub fn translate_slashes(license: &str) -> String {
    let parts: Vec<&str> = license.split('/').map(str::trim).collect();
    if parts.len() > 1 {
        warn!("Upstream uses deprecated \"/\" syntax. Replacing with \"OR\"");
    }
    parts.join(" OR ")
}

pub fn translate_license(map: &LicenseMap, distro: Distro, license: &str) -> TranslatedLicense {
    let license = translate_slashes(license);
    if !distro.uses_fedora_names() {
        return TranslatedLicense {
            license,
            comments: None,
        };
    }

    let mut comments = Vec::new();
    let mut tags = Vec::new();
    for token in license.split_whitespace() {
        // Keep grouping parentheses attached to the translated tag
        let tag = token.trim_start_matches('(').trim_end_matches(')');
        let open = &token[..token.len() - token.trim_start_matches('(').len()];
        let close = &token[token.trim_end_matches(')').len()..];

        let translated = if tag.eq_ignore_ascii_case("or") {
            "or".to_string()
        } else if tag.eq_ignore_ascii_case("and") {
            "and".to_string()
        } else {
            match map.get(tag) {
                None => {
                    comments.push(format!("# FIXME: Upstream uses unknown SPDX tag {}!", tag));
                    tag.to_string()
                }
                Some("") => {
                    comments.push(format!(
                        "# FIXME: Upstream SPDX tag {} not listed in Fedora's good licenses list.",
                        tag
                    ));
                    comments.push("# FIXME: This package might not be allowed in Fedora!".to_string());
                    tag.to_string()
                }
                Some(mapped) => {
                    if mapped != tag {
                        info!("Upstream license tag {} translated to {}", tag, mapped);
                    }
                    mapped.to_string()
                }
            }
        };
        tags.push(format!("{}{}{}", open, translated, close));
    }

    TranslatedLicense {
        license: tags.join(" "),
        comments: if comments.is_empty() {
            None
        } else {
            Some(comments.join("\n"))
        },
    }
}
