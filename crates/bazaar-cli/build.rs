//! Embeds the version string reported by `bazaar --version`.
//!
//! `BAZAAR_VERSION` is the package version, suffixed with the short commit
//! hash when building from a git checkout. Setting `BAZAAR_BUILD_VERSION`
//! overrides it (release packaging).

use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=../../.git/HEAD");
    println!("cargo:rerun-if-env-changed=BAZAAR_BUILD_VERSION");

    let package = env!("CARGO_PKG_VERSION");
    let version = match std::env::var("BAZAAR_BUILD_VERSION") {
        Ok(pinned) if !pinned.trim().is_empty() => pinned.trim().to_string(),
        _ => match commit_hash() {
            Some(commit) => format!("{} ({})", package, commit),
            None => package.to_string(),
        },
    };

    println!("cargo:rustc-env=BAZAAR_VERSION={}", version);
}

fn commit_hash() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short=10", "HEAD"])
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    let hash = String::from_utf8(output.stdout).ok()?;
    let hash = hash.trim();
    (!hash.is_empty()).then(|| hash.to_string())
}
