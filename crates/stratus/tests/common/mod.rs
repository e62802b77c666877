#![allow(deprecated)]

use assert_cmd::Command;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Isolated working directory with an empty config file
pub struct TestProject {
    pub root: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        fs::write(root.path().join("stratus.yaml"), "").unwrap();
        Self { root }
    }

    pub fn write_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.root.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    /// `stratus` run inside the project, ignoring the caller's environment
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("stratus").unwrap();
        cmd.current_dir(self.root.path())
            .env("STRATUS_CONFIG", self.root.path().join("stratus.yaml"))
            .env_remove("STRATUS_HOST")
            .env_remove("STRATUS_API_KEY")
            .env_remove("STRATUS_REGION")
            .env_remove("STRATUS_OUTPUT")
            .env_remove("RUST_LOG");
        cmd
    }
}
