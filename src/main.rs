// src/main.rs

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use crate2rpm::licensing::{self, Distro, LicenseMap};
use crate2rpm::{ExpressionStyle, PackageMetadata, PrereleasePolicy, ResolverConfig, manifest};
use rayon::prelude::*;
use std::io::BufRead;
use tracing::{error, info};

/// Pre-release requirement handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PrereleaseArg {
    /// Bound pre-release ranges within their own release
    WithinRelease,
    /// Fail on pre-release requirements
    Reject,
}

impl From<PrereleaseArg> for PrereleasePolicy {
    fn from(arg: PrereleaseArg) -> Self {
        match arg {
            PrereleaseArg::WithinRelease => PrereleasePolicy::WithinRelease,
            PrereleaseArg::Reject => PrereleasePolicy::Reject,
        }
    }
}

#[derive(Parser)]
#[command(name = "crate2rpm")]
#[command(author, version, about = "Translate crate metadata into RPM dependency expressions", long_about = None)]
struct Cli {
    /// How pre-release requirements are translated
    #[arg(long, global = true, value_enum, default_value_t = PrereleaseArg::WithinRelease)]
    prerelease: PrereleaseArg,

    /// Wrap every multi-term expression in parentheses
    #[arg(long, global = true)]
    parenthesize: bool,

    /// Require the `default` feature of dependencies that use default features
    #[arg(long, global = true)]
    default_features: bool,

    /// Skip packages whose metadata fails instead of stopping
    #[arg(long, global = true)]
    keep_going: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print Provides
    Provides {
        /// Path(s) to Cargo.toml, crate directories or metadata .json files (read from stdin if omitted)
        manifests: Vec<String>,
    },
    /// Print Requires
    Requires {
        /// Path(s) to Cargo.toml, crate directories or metadata .json files
        manifests: Vec<String>,
        /// Requirements of one feature instead of the whole package
        #[arg(short, long)]
        feature: Option<String>,
        /// Expand the feature to its transitive dependency closure
        #[arg(long, requires = "feature")]
        resolve: bool,
    },
    /// Print Conflicts
    Conflicts {
        /// Path(s) to Cargo.toml, crate directories or metadata .json files
        manifests: Vec<String>,
    },
    /// Print BuildRequires
    BuildRequires {
        /// Path(s) to Cargo.toml, crate directories or metadata .json files
        manifests: Vec<String>,
    },
    /// Print TestRequires
    TestRequires {
        /// Path(s) to Cargo.toml, crate directories or metadata .json files
        manifests: Vec<String>,
    },
    /// Print package name
    Name {
        /// Path(s) to Cargo.toml, crate directories or metadata .json files
        manifests: Vec<String>,
    },
    /// Print package version
    Version {
        /// Path(s) to Cargo.toml, crate directories or metadata .json files
        manifests: Vec<String>,
    },
    /// Print target kinds
    TargetKinds {
        /// Path(s) to Cargo.toml, crate directories or metadata .json files
        manifests: Vec<String>,
    },
    /// Print the license tag translated for a distribution
    License {
        /// Path(s) to Cargo.toml, crate directories or metadata .json files
        manifests: Vec<String>,
        /// Distribution target (plain, fedora, epel, mageia, opensuse)
        #[arg(short, long, default_value = "plain")]
        distro: Distro,
    },
    /// Print the SPDX to Fedora license map
    LicenseMap,
    /// Generate shell completion scripts
    Completions {
        /// Shell type
        shell: clap_complete::Shell,
    },
}

impl Cli {
    fn config(&self) -> ResolverConfig {
        let style = if self.parenthesize {
            ExpressionStyle::Parenthesized
        } else {
            ExpressionStyle::Bare
        };
        ResolverConfig::default()
            .with_prerelease(self.prerelease.into())
            .with_style(style)
            .with_default_features(self.default_features)
    }
}

/// Manifest arguments, falling back to one path per line on stdin
fn collect_sources(manifests: Vec<String>) -> Result<Vec<String>> {
    if !manifests.is_empty() {
        return Ok(manifests);
    }
    let mut sources = Vec::new();
    for line in std::io::stdin().lock().lines() {
        let line = line?;
        let line = line.trim();
        if !line.is_empty() {
            sources.push(line.to_string());
        }
    }
    Ok(sources)
}

/// Load every manifest in parallel, render it with `emit`, and print the
/// results in argument order
fn run_each<F>(manifests: Vec<String>, config: ResolverConfig, keep_going: bool, emit: F) -> Result<()>
where
    F: Fn(&PackageMetadata) -> crate2rpm::Result<Vec<String>> + Sync,
{
    let sources = collect_sources(manifests)?;
    info!("Processing {} manifest(s)", sources.len());

    let results: Vec<(&String, crate2rpm::Result<Vec<String>>)> = sources
        .par_iter()
        .map(|source| {
            let lines = manifest::load(source, config).and_then(|md| emit(&md));
            (source, lines)
        })
        .collect();

    let mut failures = 0;
    for (source, result) in results {
        match result {
            Ok(lines) => {
                for line in lines {
                    println!("{}", line);
                }
            }
            Err(e) if keep_going => {
                error!("Skipping {}: {}", source, e);
                failures += 1;
            }
            Err(e) => return Err(anyhow::anyhow!("{}: {}", source, e)),
        }
    }

    if failures > 0 {
        return Err(anyhow::anyhow!("{} package(s) failed", failures));
    }
    Ok(())
}

fn main() -> Result<()> {
    // Logs go to stderr; stdout carries only the dependency lists
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.config();
    let keep_going = cli.keep_going;

    match cli.command {
        Some(Commands::Provides { manifests }) => {
            run_each(manifests, config, keep_going, |md| md.provides())
        }
        Some(Commands::Requires {
            manifests,
            feature,
            resolve,
        }) => run_each(manifests, config, keep_going, |md| match &feature {
            Some(feature) => md.render_feature_requires(Some(feature.as_str()), resolve),
            None => md.requires(),
        }),
        Some(Commands::Conflicts { manifests }) => {
            run_each(manifests, config, keep_going, |md| md.conflicts())
        }
        Some(Commands::BuildRequires { manifests }) => {
            run_each(manifests, config, keep_going, |md| md.build_requires())
        }
        Some(Commands::TestRequires { manifests }) => {
            run_each(manifests, config, keep_going, |md| Ok(md.test_requires()))
        }
        Some(Commands::Name { manifests }) => {
            run_each(manifests, config, keep_going, |md| Ok(vec![md.name.clone()]))
        }
        Some(Commands::Version { manifests }) => {
            run_each(manifests, config, keep_going, |md| Ok(vec![md.rpm_version()]))
        }
        Some(Commands::TargetKinds { manifests }) => {
            run_each(manifests, config, keep_going, |md| {
                Ok(md.target_kinds().iter().map(|k| k.to_string()).collect())
            })
        }
        Some(Commands::License { manifests, distro }) => {
            let map = LicenseMap::fedora();
            run_each(manifests, config, keep_going, |md| {
                let Some(license) = &md.license else {
                    return Ok(Vec::new());
                };
                let translated = licensing::translate_license(map, distro, license);
                let mut lines: Vec<String> = translated
                    .comments
                    .map(|c| c.lines().map(str::to_string).collect())
                    .unwrap_or_default();
                lines.push(translated.license);
                Ok(lines)
            })
        }
        Some(Commands::LicenseMap) => {
            for (spdx, fedora) in LicenseMap::fedora().entries() {
                println!("{} = {}", spdx, fedora);
            }
            Ok(())
        }
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(shell, &mut Cli::command(), "crate2rpm", &mut std::io::stdout());
            Ok(())
        }
        None => {
            // No command provided, show help
            println!("crate2rpm v{}", env!("CARGO_PKG_VERSION"));
            println!("Run 'crate2rpm --help' for usage information");
            Ok(())
        }
    }
}
