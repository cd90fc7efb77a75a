//! Lockfile tree and `file:` reference rebasing.
//!
//! The lockfile itself is parsed and re-serialized by the caller; this module
//! only models the recursive node shape and rewrites relative `file:`
//! references so they stay valid after the lockfile is relocated.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// One node of a parsed lockfile tree.
///
/// Only the fields the rebase cares about are typed; everything else the
/// lockfile carries is kept in `extra` so a parse/serialize round-trip is
/// lossless.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LockfileNode {
    /// Resolved version, possibly a `file:` reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Nested dependencies, package name to node.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<BTreeMap<String, LockfileNode>>,

    /// Fields this adapter does not interpret.
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// Rewrites a single module version if it is a short relative `file:`
/// reference.
///
/// The trigger is `file:` followed by at least two characters of which the
/// first two are not `/`. Matches become
/// `file:<path_to_package_root>/<original path>` with backslashes normalized
/// to forward slashes; anything else is returned unchanged. The two-character
/// heuristic is deliberately kept as-is, so re-applying the rewrite is only a
/// no-op when the rebased path starts with `/`.
pub fn rebase_file_reference(path_to_package_root: &str, module_version: &str) -> String {
    let Some(file_path) = module_version.strip_prefix("file:") else {
        return module_version.to_string();
    };

    let mut chars = file_path.chars();
    let matches = match (chars.next(), chars.next()) {
        (Some(a), Some(b)) => a != '/' && b != '/',
        _ => false,
    };
    if !matches {
        return module_version.to_string();
    }

    format!("file:{path_to_package_root}/{file_path}").replace('\\', "/")
}

/// Rebases every `file:` reference in the tree, mutating it in place.
///
/// Visits each node exactly once through its `dependencies` map; nodes whose
/// `version` does not match the trigger pattern are left untouched.
pub fn rebase_lockfile(path_to_package_root: &str, lockfile: &mut LockfileNode) {
    if let Some(version) = &lockfile.version {
        lockfile.version = Some(rebase_file_reference(path_to_package_root, version));
    }

    if let Some(dependencies) = &mut lockfile.dependencies {
        for dependency in dependencies.values_mut() {
            rebase_lockfile(path_to_package_root, dependency);
        }
    }
}
