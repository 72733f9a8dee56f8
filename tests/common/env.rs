//! Test environment builder for isolated zdd testing.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

/// Result of running a zdd CLI command
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

/// Isolated test environment: a temp project directory and a runner for the
/// compiled zdd binary.
pub struct TestEnv {
    pub project_root: TempDir,
    bin: PathBuf,
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            project_root: TempDir::new().expect("create temp project dir"),
            bin: PathBuf::from(env!("CARGO_BIN_EXE_zdd")),
        }
    }

    /// Get a path relative to the project root
    pub fn path(&self, relative: &str) -> PathBuf {
        self.project_root.path().join(relative)
    }

    /// The default deployments root inside the project
    pub fn deployments_root(&self) -> PathBuf {
        self.path("deployments")
    }

    /// Run zdd from the project root
    pub fn run(&self, args: &[&str]) -> TestResult {
        self.run_with_env(args, &[])
    }

    /// Run zdd from the project root with extra environment variables
    pub fn run_with_env(&self, args: &[&str], env_vars: &[(&str, &str)]) -> TestResult {
        self.run_from_with_env(self.project_root.path(), args, env_vars)
    }

    /// Run zdd from a specific directory with extra environment variables
    pub fn run_from_with_env(
        &self,
        cwd: &Path,
        args: &[&str],
        env_vars: &[(&str, &str)],
    ) -> TestResult {
        let mut cmd = Command::new(&self.bin);
        cmd.current_dir(cwd)
            .env_remove("ZDD_DATABASE_URL")
            .env_remove("ZDD_DEPLOYMENTS_PATH")
            .args(args);

        for (key, value) in env_vars {
            cmd.env(key, value);
        }

        let output = cmd.output().expect("failed to execute zdd");
        to_result(output)
    }
}

fn to_result(output: Output) -> TestResult {
    TestResult {
        success: output.status.success(),
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    }
}
