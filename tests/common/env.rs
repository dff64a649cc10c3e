//! Test environment builder for isolated kovl CLI testing.

use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

/// Result of running a kovl CLI command
#[derive(Debug)]
pub struct TestResult {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl TestResult {
    /// Combine stdout and stderr
    pub fn combined_output(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }
}

/// Isolated test environment with a temp project directory.
pub struct TestEnv {
    pub project_root: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            project_root: TempDir::new().expect("create temp project dir"),
        }
    }

    /// Absolute path inside the project directory
    pub fn path(&self, rel: &str) -> PathBuf {
        self.project_root.path().join(rel)
    }

    /// Write a file, creating parent directories
    pub fn write(&self, rel: &str, content: &str) -> &Self {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent dirs");
        }
        std::fs::write(&path, content).expect("write fixture file");
        self
    }

    pub fn read(&self, rel: &str) -> String {
        std::fs::read_to_string(self.path(rel)).expect("read file")
    }

    /// Run the kovl binary with the given args, from the project root.
    pub fn run(&self, args: &[&str]) -> TestResult {
        self.run_in(self.project_root.path(), args)
    }

    /// Run the kovl binary from a specific working directory.
    pub fn run_in(&self, cwd: &Path, args: &[&str]) -> TestResult {
        let bin = env!("CARGO_BIN_EXE_kovl");
        let output = Command::new(bin)
            .current_dir(cwd)
            .args(args)
            .output()
            .expect("run kovl binary");

        TestResult {
            success: output.status.success(),
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
