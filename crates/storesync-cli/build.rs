//! Build script stamping the binary version with git build metadata.
//!
//! `STORESYNC_VERSION` is the package version, followed by `+<short hash>`
//! when built from a git checkout and `.dirty` when the tree has local
//! changes. Setting `STORESYNC_BUILD_VERSION` overrides it entirely.

use std::env;
use std::process::Command;

const OVERRIDE_VAR: &str = "STORESYNC_BUILD_VERSION";

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/index");
    println!("cargo:rerun-if-env-changed={}", OVERRIDE_VAR);

    let version = env::var(OVERRIDE_VAR)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| {
            let package = env!("CARGO_PKG_VERSION");
            match build_metadata() {
                Some(metadata) => format!("{}+{}", package, metadata),
                None => package.to_string(),
            }
        });

    println!("cargo:rustc-env=STORESYNC_VERSION={}", version);
}

/// Short commit hash, with `.dirty` appended for uncommitted changes.
fn build_metadata() -> Option<String> {
    let hash = git(&["rev-parse", "--short", "HEAD"])?;
    let dirty = git(&["status", "--porcelain", "--untracked-files=no"]).is_some();
    Some(if dirty { format!("{}.dirty", hash) } else { hash })
}

/// Trimmed stdout of a successful git command, if non-empty.
fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let stdout = String::from_utf8(output.stdout).ok()?;
    let stdout = stdout.trim();
    (!stdout.is_empty()).then(|| stdout.to_string())
}
