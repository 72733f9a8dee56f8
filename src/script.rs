//! Phase script execution
//!
//! `CommandExecutor` is the capability seam for spawning phase hooks;
//! `ShellExecutor` is the production implementation: child process with the
//! deployment directory as working directory, a hard wall-clock timeout, and
//! combined stdout/stderr capture.

use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread::JoinHandle;
use std::time::Duration;

use wait_timeout::ChildExt;

use crate::error::{ZddError, ZddResult};

/// Default wall-clock limit for a single phase script.
pub const DEFAULT_SCRIPT_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Capability interface for running phase hook scripts.
pub trait CommandExecutor {
    /// Run `script` with `working_dir` as the current directory and `env`
    /// appended to the inherited environment. Returns the combined
    /// stdout/stderr on success; non-zero exit, signal termination, and
    /// timeout are errors.
    fn run_script(
        &self,
        script: &Path,
        working_dir: &Path,
        env: &[(String, String)],
    ) -> ZddResult<String>;
}

/// Runs scripts as child processes under a hard timeout.
#[derive(Debug, Clone)]
pub struct ShellExecutor {
    timeout: Duration,
}

impl ShellExecutor {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for ShellExecutor {
    fn default() -> Self {
        Self::new(DEFAULT_SCRIPT_TIMEOUT)
    }
}

impl CommandExecutor for ShellExecutor {
    fn run_script(
        &self,
        script: &Path,
        working_dir: &Path,
        env: &[(String, String)],
    ) -> ZddResult<String> {
        let mut child = Command::new(script)
            .current_dir(working_dir)
            .envs(env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        // Drain both pipes on threads so a chatty script cannot fill a pipe
        // buffer and deadlock against the timed wait.
        let stdout_reader = spawn_reader(child.stdout.take());
        let stderr_reader = spawn_reader(child.stderr.take());

        let status = match child.wait_timeout(self.timeout)? {
            Some(status) => status,
            None => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(ZddError::ScriptTimeout {
                    path: script.to_path_buf(),
                    seconds: self.timeout.as_secs(),
                });
            }
        };

        let mut output = stdout_reader.join().unwrap_or_default();
        output.push_str(&stderr_reader.join().unwrap_or_default());

        if !status.success() {
            return Err(ZddError::ScriptFailed {
                path: script.to_path_buf(),
                code: status.code().unwrap_or(-1),
                output,
            });
        }

        Ok(output)
    }
}

fn spawn_reader<R: Read + Send + 'static>(source: Option<R>) -> JoinHandle<String> {
    std::thread::spawn(move || {
        let mut buf = String::new();
        if let Some(mut source) = source {
            let _ = source.read_to_string(&mut buf);
        }
        buf
    })
}
