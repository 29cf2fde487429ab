//! Stamps the binary with build provenance shown by `stickyboard --version`.
//!
//! Exports `SB_BUILD_TIMESTAMP` (UTC, RFC 3339, seconds precision) and
//! `SB_GIT_COMMIT` (short hash, `unknown` outside a checkout). A set
//! `SOURCE_DATE_EPOCH` pins the timestamp for reproducible builds.

use std::process::Command;

use chrono::{DateTime, SecondsFormat, Utc};

fn main() {
    for watched in [".git/HEAD", ".git/index"] {
        println!("cargo:rerun-if-changed={watched}");
    }
    println!("cargo:rerun-if-env-changed=SOURCE_DATE_EPOCH");

    let built_at = pinned_build_time().unwrap_or_else(Utc::now);
    let stamp = built_at.to_rfc3339_opts(SecondsFormat::Secs, true);
    emit("SB_BUILD_TIMESTAMP", &stamp);

    let commit = git_short_hash().unwrap_or_else(|| "unknown".to_string());
    emit("SB_GIT_COMMIT", &commit);
}

fn emit(key: &str, value: &str) {
    println!("cargo:rustc-env={key}={value}");
}

fn pinned_build_time() -> Option<DateTime<Utc>> {
    let secs = std::env::var("SOURCE_DATE_EPOCH").ok()?.parse().ok()?;
    DateTime::from_timestamp(secs, 0)
}

fn git_short_hash() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|out| out.status.success())?;
    let hash = String::from_utf8(output.stdout).ok()?;
    Some(hash.trim().to_string())
}
