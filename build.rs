//! Build script for the health console
//!
//! Exposes build metadata to `/version`.

use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn main() {
    let build_time = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    println!("cargo:rustc-env=BUILD_TIME={build_time}");

    let git_hash = command_output("git", &["rev-parse", "--short", "HEAD"]);
    println!("cargo:rustc-env=GIT_HASH={git_hash}");

    let rust_version = command_output("rustc", &["--version"]);
    println!("cargo:rustc-env=RUST_VERSION={rust_version}");

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/heads/");
    println!("cargo:rerun-if-changed=Cargo.toml");
}

/// Trimmed stdout of a successful command, `unknown` otherwise
fn command_output(program: &str, args: &[&str]) -> String {
    Command::new(program)
        .args(args)
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}
