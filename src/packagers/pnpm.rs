//! pnpm adapter.
//!
//! Thin facade over the `pnpm` executable: list production dependencies,
//! install, prune, run scripts. The only logic of note is the stderr scan
//! that keeps known pnpm noise from failing a dependency listing, and the
//! lockfile rebase delegated to [`crate::lockfile`].

use crate::lockfile::{self, LockfileNode};
use crate::process::{ProcessRunner, SpawnError, TokioProcessRunner};
use crate::traits::{Packager, PackagerError, PackagerOptions};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Known pnpm stderr prefixes (after `pnpm ERR! `) that must not fail a
/// dependency listing. The `log` flag marks lines worth surfacing as a
/// warning; it never changes the classification outcome.
struct KnownError {
    pattern: &'static str,
    log: bool,
}

const IGNORED_PNPM_ERRORS: &[KnownError] = &[
    KnownError {
        pattern: "code ELSPROBLEMS", // pnpm >= 7
        log: false,
    },
    KnownError {
        pattern: "extraneous",
        log: false,
    },
    KnownError {
        pattern: "missing",
        log: false,
    },
    KnownError {
        pattern: "peer dep missing",
        log: true,
    },
];

/// Picks the executable name for a platform identifier.
fn command_for_platform(platform: &str) -> &'static str {
    if platform.starts_with("win") {
        "pnpm.cmd"
    } else {
        "pnpm"
    }
}

fn command() -> &'static str {
    command_for_platform(std::env::consts::OS)
}

/// Scans the stderr of a failed `pnpm ls`, stopping at the first line that is
/// exactly `{` (the JSON payload start). The call is failed by the first
/// non-empty line that does not carry a known `pnpm ERR!` prefix; once
/// failed, it stays failed.
fn stderr_indicates_failure(stderr: &str) -> bool {
    stderr
        .split('\n')
        .take_while(|line| *line != "{")
        .fold(false, |failed, line| {
            if failed {
                return true;
            }
            if line.is_empty() {
                return false;
            }
            let known = IGNORED_PNPM_ERRORS
                .iter()
                .find(|known| line.starts_with(&format!("pnpm ERR! {}", known.pattern)));
            match known {
                Some(known) => {
                    if known.log {
                        warn!(line, "pnpm reported a peer dependency problem");
                    }
                    false
                }
                None => true,
            }
        })
}

/// Packager adapter for pnpm.
///
/// Stateless apart from the injected [`ProcessRunner`]; every operation is
/// independent given its inputs.
pub struct Pnpm {
    runner: Arc<dyn ProcessRunner>,
}

impl Pnpm {
    /// Creates an adapter that spawns real pnpm processes.
    pub fn new() -> Self {
        Self::with_runner(Arc::new(TokioProcessRunner))
    }

    /// Creates an adapter with an injected runner.
    pub fn with_runner(runner: Arc<dyn ProcessRunner>) -> Self {
        Self { runner }
    }
}

impl Default for Pnpm {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Packager for Pnpm {
    fn lockfile_name(&self) -> &'static str {
        "pnpm-lock.yaml"
    }

    fn copy_package_section_names(&self) -> &'static [&'static str] {
        &[]
    }

    fn must_copy_modules(&self) -> bool {
        true
    }

    async fn get_prod_dependencies(
        &self,
        cwd: &Path,
        depth: Option<u32>,
    ) -> Result<serde_json::Value, PackagerError> {
        let depth = depth.unwrap_or(1);
        let args = vec![
            "ls".to_string(),
            "-prod".to_string(),
            "-json".to_string(),
            format!("-depth={depth}"),
        ];

        info!(cwd = %cwd.display(), depth, "listing production dependencies");

        let stdout = match self.runner.run(command(), &args, cwd).await {
            Ok(output) => output.stdout,
            Err(err @ SpawnError::NonZeroExit { .. }) => {
                // Only fail on critical pnpm errors, ignoring extra output
                // from pnpm >= 7 before the JSON payload.
                if !stderr_indicates_failure(err.stderr()) && !err.stdout().is_empty() {
                    err.stdout().to_string()
                } else {
                    return Err(err.into());
                }
            }
            Err(err) => return Err(err.into()),
        };

        Ok(serde_json::from_str(&stdout)?)
    }

    async fn install(&self, cwd: &Path, options: &PackagerOptions) -> Result<(), PackagerError> {
        if options.no_install {
            info!("skipping install");
            return Ok(());
        }

        info!(cwd = %cwd.display(), "installing dependencies");
        self.runner
            .run(command(), &["install".to_string()], cwd)
            .await?;
        Ok(())
    }

    async fn prune(&self, cwd: &Path) -> Result<(), PackagerError> {
        info!(cwd = %cwd.display(), "pruning dependencies");
        self.runner
            .run(command(), &["prune".to_string()], cwd)
            .await?;
        Ok(())
    }

    async fn run_scripts(&self, cwd: &Path, script_names: &[String]) -> Result<(), PackagerError> {
        // Scripts may have order-dependent side effects, so each invocation
        // must finish before the next starts.
        for script_name in script_names {
            info!(script = %script_name, "running package script");
            self.runner
                .run(command(), &["run".to_string(), script_name.clone()], cwd)
                .await?;
        }
        Ok(())
    }

    fn rebase_lockfile(&self, path_to_package_root: &str, lockfile: &mut LockfileNode) {
        lockfile::rebase_lockfile(path_to_package_root, lockfile);
    }
}
