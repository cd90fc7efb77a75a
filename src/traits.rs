use crate::lockfile::LockfileNode;
use crate::process::SpawnError;
use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PackagerError {
    #[error(transparent)]
    Spawn(#[from] SpawnError),
    #[error("failed to parse dependency report: {0}")]
    Json(#[from] serde_json::Error),
}

/// Options recognized by [`Packager::install`].
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PackagerOptions {
    /// Skip the install step entirely.
    pub no_install: bool,
}

/// Uniform operation set over one external package-management tool.
///
/// The caller picks an implementation (e.g. [`Pnpm`](crate::Pnpm)) and drives
/// packaging through this trait. No operation retries; failures carry the
/// original spawn or parse error for the caller to act on.
#[async_trait]
pub trait Packager: Send + Sync {
    /// File name of this tool's lockfile (e.g. "pnpm-lock.yaml").
    fn lockfile_name(&self) -> &'static str;

    /// package.json sections the caller must copy verbatim into the bundle.
    fn copy_package_section_names(&self) -> &'static [&'static str];

    /// Whether installed modules must be copied wholesale rather than
    /// assembled from selective package sections.
    fn must_copy_modules(&self) -> bool;

    /// Lists the first-level production dependency graph as the tool's raw
    /// JSON report. `depth` defaults to 1 when unset.
    async fn get_prod_dependencies(
        &self,
        cwd: &Path,
        depth: Option<u32>,
    ) -> Result<serde_json::Value, PackagerError>;

    /// Installs dependencies in `cwd`. A no-op when `options.no_install`.
    async fn install(&self, cwd: &Path, options: &PackagerOptions) -> Result<(), PackagerError>;

    /// Removes packages not listed as dependencies.
    async fn prune(&self, cwd: &Path) -> Result<(), PackagerError>;

    /// Runs the named package scripts strictly in sequence; the first failure
    /// aborts the remaining scripts.
    async fn run_scripts(&self, cwd: &Path, script_names: &[String]) -> Result<(), PackagerError>;

    /// Rewrites relative `file:` references in a parsed lockfile so they stay
    /// valid after relocation.
    fn rebase_lockfile(&self, path_to_package_root: &str, lockfile: &mut LockfileNode);
}
