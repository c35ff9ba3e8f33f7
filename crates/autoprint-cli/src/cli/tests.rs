//! CLI parse tests.

use super::{usage_exit_code, Cli};
use clap::Parser;
use std::path::Path;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(args).unwrap()
}

#[test]
fn cli_parse_url_only() {
    let cli = parse(&["autoprint", "https://example.com/menu.pdf"]);
    assert_eq!(cli.url, "https://example.com/menu.pdf");
    assert!(!cli.dry_run);
    assert!(!cli.force);
    assert!(!cli.verbose);
    assert!(cli.config.is_none());
}

#[test]
fn cli_parse_short_flags() {
    let cli = parse(&["autoprint", "-n", "-f", "-v", "https://example.com/x"]);
    assert!(cli.dry_run);
    assert!(cli.force);
    assert!(cli.verbose);
    let options = cli.options();
    assert!(options.dry_run);
    assert!(options.force);
}

#[test]
fn cli_parse_long_flags() {
    let cli = parse(&[
        "autoprint",
        "https://example.com/x",
        "--dry-run",
        "--force",
        "--verbose",
        "--config",
        "/etc/autoprint.toml",
    ]);
    assert!(cli.dry_run && cli.force && cli.verbose);
    assert_eq!(cli.config.as_deref(), Some(Path::new("/etc/autoprint.toml")));
}

#[test]
fn cli_parse_combined_short_flags() {
    let cli = parse(&["autoprint", "-nv", "https://example.com/x"]);
    assert!(cli.dry_run);
    assert!(cli.verbose);
    assert!(!cli.force);
}

#[test]
fn cli_requires_url() {
    assert!(Cli::try_parse_from(["autoprint"]).is_err());
    assert!(Cli::try_parse_from(["autoprint", "-n"]).is_err());
}

#[test]
fn cli_rejects_extra_positional() {
    assert!(Cli::try_parse_from(["autoprint", "https://a/", "https://b/"]).is_err());
}

fn exit_code_for(args: &[&str]) -> i32 {
    let err = Cli::try_parse_from(args).unwrap_err();
    usage_exit_code(&err)
}

#[test]
fn help_and_version_exit_zero() {
    assert_eq!(exit_code_for(&["autoprint", "--help"]), 0);
    assert_eq!(exit_code_for(&["autoprint", "-h"]), 0);
    assert_eq!(exit_code_for(&["autoprint", "--version"]), 0);
}

#[test]
fn usage_errors_exit_one() {
    assert_eq!(exit_code_for(&["autoprint"]), 1);
    assert_eq!(exit_code_for(&["autoprint", "https://a/", "https://b/"]), 1);
    assert_eq!(exit_code_for(&["autoprint", "--bogus", "https://a/"]), 1);
}
