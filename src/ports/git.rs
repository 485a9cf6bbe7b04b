//! Git adapter - subprocess wrapper around the `git` CLI

use crate::error::{Error, Result};
use crate::ports::GitPort;
use crate::types::{WorktreeRecord, WorktreeStatus};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Real git adapter shelling out to `git`.
pub struct GitCli {
    repo_root: PathBuf,
}

impl GitCli {
    /// Wrap the repository rooted at `repo_root`
    pub fn new(repo_root: impl Into<PathBuf>) -> Self {
        Self {
            repo_root: repo_root.into(),
        }
    }

    /// Discover the root worktree of the repository containing `path`.
    ///
    /// `path` may be inside a linked worktree; the adapter is always anchored
    /// at the root worktree (the one holding the primary `.git` directory).
    pub fn discover(path: &Path) -> Result<Self> {
        let common = rev_parse(path, "--git-common-dir")?;
        let common = if Path::new(&common).is_absolute() {
            PathBuf::from(common)
        } else {
            path.join(common)
        };
        let root = common
            .parent()
            .ok_or_else(|| Error::Git(format!("unexpected git dir: {}", common.display())))?
            .to_path_buf();
        Ok(Self::new(root))
    }

    /// Root of the worktree containing `path` (not necessarily the repo root)
    pub fn worktree_toplevel(path: &Path) -> Result<PathBuf> {
        rev_parse(path, "--show-toplevel").map(PathBuf::from)
    }

    /// Root worktree path this adapter is anchored at
    pub fn repo_root(&self) -> &Path {
        &self.repo_root
    }

    /// URL of the named remote
    pub fn remote_url(&self, remote: &str) -> Result<String> {
        self.run(&self.repo_root, &["remote", "get-url", remote])
            .map(|s| s.trim().to_string())
    }

    pub(crate) fn run(&self, cwd: &Path, args: &[&str]) -> Result<String> {
        debug!(?args, cwd = %cwd.display(), "git");
        let output = Command::new("git")
            .arg("-C")
            .arg(cwd)
            .args(args)
            .output()
            .map_err(|e| Error::Git(format!("failed to run git: {e}")))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Git(format!(
                "git {} failed: {}",
                args.join(" "),
                stderr.trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

fn rev_parse(path: &Path, arg: &str) -> Result<String> {
    let output = Command::new("git")
        .arg("-C")
        .arg(path)
        .args(["rev-parse", arg])
        .output()
        .map_err(|e| Error::Git(format!("failed to run git: {e}")))?;
    if !output.status.success() {
        return Err(Error::Git(format!(
            "not a git repository: {}",
            path.display()
        )));
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Parse `git worktree list --porcelain` output.
///
/// Blocks are separated by blank lines; the first block is always the root
/// worktree (the one containing the primary `.git` directory).
fn parse_worktree_list(output: &str) -> Vec<WorktreeRecord> {
    let mut records = Vec::new();
    for (index, block) in output.split("\n\n").enumerate() {
        let mut path = None;
        let mut branch = None;
        for line in block.lines() {
            if let Some(p) = line.strip_prefix("worktree ") {
                path = Some(PathBuf::from(p));
            } else if let Some(r) = line.strip_prefix("branch ") {
                branch = Some(
                    r.strip_prefix("refs/heads/")
                        .unwrap_or(r)
                        .to_string(),
                );
            }
            // "detached" lines leave branch as None
        }
        if let Some(path) = path {
            records.push(WorktreeRecord {
                path,
                checked_out_branch: branch,
                is_root: index == 0,
            });
        }
    }
    records
}

/// Parse `git status --porcelain` output into a change summary.
fn parse_status(output: &str) -> WorktreeStatus {
    let mut status = WorktreeStatus::default();
    for line in output.lines() {
        let mut chars = line.chars();
        let x = chars.next().unwrap_or(' ');
        let y = chars.next().unwrap_or(' ');
        if x == '?' && y == '?' {
            status.untracked += 1;
        } else {
            if x != ' ' {
                status.staged += 1;
            }
            if y != ' ' {
                status.modified += 1;
            }
        }
    }
    status
}

impl GitPort for GitCli {
    fn list_worktrees(&self) -> Result<Vec<WorktreeRecord>> {
        let output = self.run(&self.repo_root, &["worktree", "list", "--porcelain"])?;
        Ok(parse_worktree_list(&output))
    }

    fn current_branch(&self, path: &Path) -> Result<Option<String>> {
        let output = Command::new("git")
            .arg("-C")
            .arg(path)
            .args(["symbolic-ref", "--short", "-q", "HEAD"])
            .output()
            .map_err(|e| Error::Git(format!("failed to run git: {e}")))?;
        if !output.status.success() {
            // symbolic-ref -q exits 1 on detached HEAD without stderr noise
            return Ok(None);
        }
        let branch = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok((!branch.is_empty()).then_some(branch))
    }

    fn status(&self, path: &Path) -> Result<WorktreeStatus> {
        let output = self.run(path, &["status", "--porcelain"])?;
        Ok(parse_status(&output))
    }

    fn checkout(&self, path: &Path, branch: &str) -> Result<()> {
        self.run(path, &["checkout", branch])?;
        Ok(())
    }

    fn path_exists(&self, path: &Path) -> bool {
        path.exists()
    }
}
