// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

fn manifests_arg() -> Arg {
    Arg::new("manifests")
        .num_args(0..)
        .help("Path(s) to Cargo.toml, crate directories or metadata .json files")
}

fn build_cli() -> Command {
    Command::new("crate2rpm")
        .version(env!("CARGO_PKG_VERSION"))
        .author("crate2rpm Contributors")
        .about("Translate crate metadata into RPM dependency expressions")
        .subcommand_required(false)
        .arg(
            Arg::new("prerelease")
                .long("prerelease")
                .global(true)
                .value_parser(["within-release", "reject"])
                .default_value("within-release")
                .help("How pre-release requirements are translated"),
        )
        .arg(
            Arg::new("parenthesize")
                .long("parenthesize")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Wrap every multi-term expression in parentheses"),
        )
        .arg(
            Arg::new("default_features")
                .long("default-features")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Require the default feature of dependencies that use default features"),
        )
        .arg(
            Arg::new("keep_going")
                .long("keep-going")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Skip packages whose metadata fails instead of stopping"),
        )
        .subcommand(
            Command::new("provides")
                .about("Print Provides")
                .arg(manifests_arg()),
        )
        .subcommand(
            Command::new("requires")
                .about("Print Requires")
                .arg(manifests_arg())
                .arg(
                    Arg::new("feature")
                        .short('f')
                        .long("feature")
                        .help("Requirements of one feature instead of the whole package"),
                )
                .arg(
                    Arg::new("resolve")
                        .long("resolve")
                        .action(ArgAction::SetTrue)
                        .requires("feature")
                        .help("Expand the feature to its transitive dependency closure"),
                ),
        )
        .subcommand(
            Command::new("conflicts")
                .about("Print Conflicts")
                .arg(manifests_arg()),
        )
        .subcommand(
            Command::new("build-requires")
                .about("Print BuildRequires")
                .arg(manifests_arg()),
        )
        .subcommand(
            Command::new("test-requires")
                .about("Print TestRequires")
                .arg(manifests_arg()),
        )
        .subcommand(
            Command::new("name")
                .about("Print package name")
                .arg(manifests_arg()),
        )
        .subcommand(
            Command::new("version")
                .about("Print package version")
                .arg(manifests_arg()),
        )
        .subcommand(
            Command::new("target-kinds")
                .about("Print target kinds")
                .arg(manifests_arg()),
        )
        .subcommand(
            Command::new("license")
                .about("Print the license tag translated for a distribution")
                .arg(manifests_arg())
                .arg(
                    Arg::new("distro")
                        .short('d')
                        .long("distro")
                        .value_parser(["plain", "fedora", "epel", "mageia", "opensuse"])
                        .default_value("plain")
                        .help("Distribution target"),
                ),
        )
        .subcommand(Command::new("license-map").about("Print the SPDX to Fedora license map"))
        .subcommand(
            Command::new("completions")
                .about("Generate shell completion scripts")
                .arg(
                    Arg::new("shell")
                        .required(true)
                        .value_parser(["bash", "elvish", "fish", "powershell", "zsh"])
                        .help("Shell type"),
                ),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Create man directory
    let out_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap());
    let man_dir = out_dir.join("man");
    fs::create_dir_all(&man_dir).expect("Failed to create man directory");

    // Generate main man page
    let cmd = build_cli();
    let man = Man::new(cmd);
    let mut buffer = Vec::new();
    man.render(&mut buffer).expect("Failed to render man page");

    let man_path = man_dir.join("crate2rpm.1");
    fs::write(&man_path, buffer).expect("Failed to write man page");
}
