//! Subprocess invocation seam.
//!
//! The packager adapters never spawn processes directly; they go through the
//! [`ProcessRunner`] trait so that tests can substitute a scripted runner.
//! [`TokioProcessRunner`] is the default implementation backed by
//! `tokio::process`.

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use thiserror::Error;
use tracing::debug;

/// Captured output of a completed subprocess.
#[derive(Debug, Clone, Default)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Errors surfaced by a [`ProcessRunner`].
///
/// `NonZeroExit` carries the captured streams so callers can reclassify
/// known tool noise instead of failing outright.
#[derive(Error, Debug)]
pub enum SpawnError {
    /// The executable could not be started at all.
    #[error("failed to start '{command}': {source}")]
    Start {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The process ran but exited with a non-success status.
    #[error("'{command}' exited with status {code:?}")]
    NonZeroExit {
        command: String,
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },
}

impl SpawnError {
    /// Captured stdout, empty if the process never started.
    pub fn stdout(&self) -> &str {
        match self {
            SpawnError::Start { .. } => "",
            SpawnError::NonZeroExit { stdout, .. } => stdout,
        }
    }

    /// Captured stderr, empty if the process never started.
    pub fn stderr(&self) -> &str {
        match self {
            SpawnError::Start { .. } => "",
            SpawnError::NonZeroExit { stderr, .. } => stderr,
        }
    }
}

/// Runs an external command to completion and captures its output.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; a single runner may be shared by
/// several adapters.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Runs `command` with `args` in `cwd`, waiting for it to exit.
    ///
    /// # Errors
    ///
    /// Returns [`SpawnError::Start`] if the executable cannot be launched and
    /// [`SpawnError::NonZeroExit`] (with captured stdout/stderr) if it exits
    /// with a non-success status.
    async fn run(
        &self,
        command: &str,
        args: &[String],
        cwd: &Path,
    ) -> Result<ProcessOutput, SpawnError>;
}

/// Default runner on top of `tokio::process::Command`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioProcessRunner;

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(
        &self,
        command: &str,
        args: &[String],
        cwd: &Path,
    ) -> Result<ProcessOutput, SpawnError> {
        debug!(command, ?args, cwd = %cwd.display(), "spawning subprocess");

        let output = tokio::process::Command::new(command)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| SpawnError::Start {
                command: command.to_string(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if output.status.success() {
            debug!(command, "subprocess completed");
            Ok(ProcessOutput { stdout, stderr })
        } else {
            debug!(command, code = ?output.status.code(), "subprocess failed");
            Err(SpawnError::NonZeroExit {
                command: command.to_string(),
                code: output.status.code(),
                stdout,
                stderr,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_error_exposes_captured_streams() {
        let err = SpawnError::NonZeroExit {
            command: "pnpm".to_string(),
            code: Some(1),
            stdout: "out".to_string(),
            stderr: "err".to_string(),
        };
        assert_eq!(err.stdout(), "out");
        assert_eq!(err.stderr(), "err");
    }

    #[test]
    fn start_error_has_empty_streams() {
        let err = SpawnError::Start {
            command: "pnpm".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        assert_eq!(err.stdout(), "");
        assert_eq!(err.stderr(), "");
        assert!(err.to_string().contains("failed to start 'pnpm'"));
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn tokio_runner_captures_stdout() {
        let runner = TokioProcessRunner;
        let out = runner
            .run(
                "sh",
                &["-c".to_string(), "printf hello".to_string()],
                Path::new("."),
            )
            .await
            .unwrap();
        assert_eq!(out.stdout, "hello");
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn tokio_runner_reports_non_zero_exit() {
        let runner = TokioProcessRunner;
        let err = runner
            .run(
                "sh",
                &["-c".to_string(), "echo oops >&2; exit 3".to_string()],
                Path::new("."),
            )
            .await
            .unwrap_err();
        match err {
            SpawnError::NonZeroExit { code, stderr, .. } => {
                assert_eq!(code, Some(3));
                assert!(stderr.contains("oops"));
            }
            other => panic!("expected NonZeroExit, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn tokio_runner_reports_missing_executable() {
        let runner = TokioProcessRunner;
        let err = runner
            .run("definitely-not-a-real-binary-1234", &[], Path::new("."))
            .await
            .unwrap_err();
        assert!(matches!(err, SpawnError::Start { .. }));
    }
}
