//! Common test utilities for stickyboard integration tests.
//!
//! Provides `TestEnv` so CLI tests never read the user's real
//! `~/.config/stickyboard/config.kdl` or inherit `STICKYBOARD_*` variables.

#![allow(dead_code)]

use assert_cmd::Command;
use std::path::{Path, PathBuf};
pub use tempfile::TempDir;

const INHERITED_VARS: &[&str] = &[
    "STICKYBOARD_CONFIG",
    "STICKYBOARD_HOST",
    "STICKYBOARD_PORT",
    "STICKYBOARD_LOG",
    "STICKYBOARD_LOG_FORMAT",
    "PORT",
    "RUST_LOG",
];

/// A test environment with an isolated home directory.
pub struct TestEnv {
    pub home_dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            home_dir: TempDir::new().unwrap(),
        }
    }

    /// Command for the stickyboard binary with HOME and XDG_CONFIG_HOME
    /// pointing into the temp dir.
    pub fn sb(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_stickyboard"));
        cmd.env("HOME", self.home_dir.path());
        cmd.env("XDG_CONFIG_HOME", self.config_home());
        for var in INHERITED_VARS {
            cmd.env_remove(var);
        }
        cmd
    }

    pub fn config_home(&self) -> PathBuf {
        self.home_dir.path().join(".config")
    }

    /// Write a config file at an arbitrary path inside the temp dir.
    pub fn write_config(&self, name: &str, content: &str) -> PathBuf {
        let path = self.home_dir.path().join(name);
        std::fs::write(&path, content).expect("Failed to write config file");
        path
    }

    pub fn path(&self) -> &Path {
        self.home_dir.path()
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
