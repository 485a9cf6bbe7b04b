//! Stack-metadata adapter - Graphite (`gt`) integration
//!
//! The branch tree is read from Graphite's persisted metadata cache rather
//! than scraping `gt log` output; mutations shell out to `gt`. The parsed
//! tree is cached per run and invalidated at the end of any sync this adapter
//! performs, so the resolver and the reconciliation phases never observe
//! stale parent/child data within the same run.

use crate::error::{Error, Result};
use crate::ports::StackPort;
use crate::resolver::BranchTree;
use crate::types::BranchNode;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::sync::Mutex;
use tracing::debug;

/// Filename of Graphite's persisted metadata cache inside `.git/`
const CACHE_FILE: &str = ".graphite_cache_persist";

/// Per-branch entry in the Graphite cache file
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CacheBranch {
    #[serde(default)]
    parent_branch_name: Option<String>,
    #[serde(default)]
    branch_revision: Option<String>,
    #[serde(default)]
    validation_result: Option<String>,
}

/// Top-level shape of the Graphite cache file
#[derive(Debug, Deserialize)]
struct CachePersist {
    branches: Vec<(String, CacheBranch)>,
}

/// Real Graphite adapter.
pub struct GraphiteCli {
    repo_root: PathBuf,
    enabled: bool,
    trunk_override: Option<String>,
    tree_cache: Mutex<Option<BranchTree>>,
}

impl GraphiteCli {
    /// Wrap the repository rooted at `repo_root`. `enabled` and
    /// `trunk_override` come from configuration: the former can force
    /// integration off even when the metadata file exists, the latter
    /// re-roots the tree at the named branch instead of trusting the
    /// cache's trunk marker.
    pub fn new(
        repo_root: impl Into<PathBuf>,
        enabled: bool,
        trunk_override: Option<String>,
    ) -> Self {
        Self {
            repo_root: repo_root.into(),
            enabled,
            trunk_override,
            tree_cache: Mutex::new(None),
        }
    }

    fn cache_path(&self) -> PathBuf {
        self.repo_root.join(".git").join(CACHE_FILE)
    }

    fn run_gt(&self, args: &[&str]) -> Result<String> {
        debug!(?args, "gt");
        let output = Command::new("gt")
            .current_dir(&self.repo_root)
            .args(args)
            .output()
            .map_err(|e| Error::Stack(format!("failed to run gt: {e}")))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Stack(format!(
                "gt {} failed: {}",
                args.join(" "),
                stderr.trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn load_tree(&self) -> Result<BranchTree> {
        let path = self.cache_path();
        let content = fs::read_to_string(&path)
            .map_err(|e| Error::Stack(format!("failed to read {}: {e}", path.display())))?;
        let persist: CachePersist = serde_json::from_str(&content)
            .map_err(|e| Error::Stack(format!("failed to parse {}: {e}", path.display())))?;
        parse_cache(persist, self.trunk_override.as_deref())
    }

    fn invalidate(&self) {
        *self.tree_cache.lock().expect("tree cache poisoned") = None;
    }
}

/// Convert the raw cache entries into a validated [`BranchTree`].
///
/// With a trunk override, the tree is re-rooted at the named branch: that
/// branch becomes trunk regardless of the cache's marker, and branches not
/// stacked on it (the cache's own trunk included) are out of scope.
fn parse_cache(persist: CachePersist, trunk_override: Option<&str>) -> Result<BranchTree> {
    let nodes = match trunk_override {
        Some(trunk) => reroot(persist.branches, trunk)?,
        None => persist
            .branches
            .into_iter()
            .map(|(name, entry)| {
                let sha = entry.branch_revision.unwrap_or_default();
                let is_trunk = entry.validation_result.as_deref() == Some("TRUNK")
                    || entry.parent_branch_name.is_none();
                if is_trunk {
                    BranchNode::trunk(name, sha)
                } else {
                    BranchNode {
                        name,
                        parent: entry.parent_branch_name,
                        children: Default::default(),
                        is_trunk: false,
                        commit_sha: sha,
                    }
                }
            })
            .collect(),
    };
    BranchTree::new(nodes)
}

fn reroot(entries: Vec<(String, CacheBranch)>, trunk: &str) -> Result<Vec<BranchNode>> {
    let parents: HashMap<String, Option<String>> = entries
        .iter()
        .map(|(name, entry)| (name.clone(), entry.parent_branch_name.clone()))
        .collect();
    if !parents.contains_key(trunk) {
        return Err(Error::Config(format!(
            "trunk override '{trunk}' is not in the stack metadata"
        )));
    }
    let descends_from_trunk = |name: &str| {
        let mut seen = HashSet::new();
        let mut cursor = name;
        loop {
            if cursor == trunk {
                return true;
            }
            if !seen.insert(cursor.to_string()) {
                return false;
            }
            match parents.get(cursor).and_then(Option::as_deref) {
                Some(parent) => cursor = parent,
                None => return false,
            }
        }
    };
    let mut nodes = Vec::new();
    for (name, entry) in entries {
        let sha = entry.branch_revision.unwrap_or_default();
        if name == trunk {
            nodes.push(BranchNode::trunk(name, sha));
        } else if descends_from_trunk(&name) {
            nodes.push(BranchNode {
                name,
                parent: entry.parent_branch_name,
                children: Default::default(),
                is_trunk: false,
                commit_sha: sha,
            });
        }
    }
    Ok(nodes)
}

impl StackPort for GraphiteCli {
    fn is_enabled(&self) -> bool {
        self.enabled && self.cache_path().exists()
    }

    fn branch_tree(&self) -> Result<BranchTree> {
        let mut cache = self.tree_cache.lock().expect("tree cache poisoned");
        if let Some(ref tree) = *cache {
            return Ok(tree.clone());
        }
        let tree = self.load_tree()?;
        *cache = Some(tree.clone());
        Ok(tree)
    }

    fn stack_for(&self, branch: &str) -> Result<Vec<String>> {
        self.branch_tree()?.stack_to(branch)
    }

    fn submit_branch(&self, branch: &str) -> Result<()> {
        self.run_gt(&["submit", "--branch", branch, "--no-edit", "--force"])?;
        Ok(())
    }

    fn sync(&self) -> Result<()> {
        let result = self.run_gt(&["sync", "--force"]).map(|_| ());
        // Parent/child links move during sync; drop the cached tree whether
        // or not the command succeeded.
        self.invalidate();
        result
    }

    fn sync_hint(&self) -> String {
        "gt sync".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_cache_into_tree() {
        let json = r#"{
            "branches": [
                ["main", {"validationResult": "TRUNK", "branchRevision": "aaa"}],
                ["feat-1", {"parentBranchName": "main", "branchRevision": "bbb"}],
                ["feat-2", {"parentBranchName": "feat-1", "branchRevision": "ccc"}]
            ]
        }"#;
        let persist: CachePersist = serde_json::from_str(json).unwrap();
        let tree = parse_cache(persist, None).unwrap();
        assert_eq!(tree.trunk(), "main");
        assert_eq!(tree.parent_of("feat-2"), Some("feat-1"));
        assert_eq!(tree.stack_to("feat-2").unwrap(), vec!["main", "feat-1", "feat-2"]);
    }

    #[test]
    fn rejects_cache_with_unknown_parent() {
        let json = r#"{
            "branches": [
                ["main", {"validationResult": "TRUNK"}],
                ["feat-1", {"parentBranchName": "deleted-branch"}]
            ]
        }"#;
        let persist: CachePersist = serde_json::from_str(json).unwrap();
        assert!(matches!(
            parse_cache(persist, None),
            Err(Error::MalformedTree(_))
        ));
    }

    #[test]
    fn trunk_override_reroots_the_tree() {
        let json = r#"{
            "branches": [
                ["main", {"validationResult": "TRUNK", "branchRevision": "aaa"}],
                ["develop", {"parentBranchName": "main", "branchRevision": "bbb"}],
                ["feat-1", {"parentBranchName": "develop", "branchRevision": "ccc"}],
                ["hotfix", {"parentBranchName": "main", "branchRevision": "ddd"}]
            ]
        }"#;
        let persist: CachePersist = serde_json::from_str(json).unwrap();
        let tree = parse_cache(persist, Some("develop")).unwrap();
        assert_eq!(tree.trunk(), "develop");
        assert_eq!(tree.parent_of("feat-1"), Some("develop"));
        // The cache's trunk and branches not stacked on the override drop out.
        assert!(!tree.contains("main"));
        assert!(!tree.contains("hotfix"));
    }

    #[test]
    fn unknown_trunk_override_is_a_config_error() {
        let json = r#"{
            "branches": [
                ["main", {"validationResult": "TRUNK"}]
            ]
        }"#;
        let persist: CachePersist = serde_json::from_str(json).unwrap();
        assert!(matches!(
            parse_cache(persist, Some("nope")),
            Err(Error::Config(_))
        ));
    }
}
