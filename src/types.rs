//! Core types for grove

use std::collections::BTreeSet;
use std::path::PathBuf;

/// One tracked branch in the stack metadata.
///
/// Nodes form a tree rooted at trunk. Exactly one trunk node exists per
/// query; every non-trunk node has exactly one parent reachable to trunk
/// (validated by [`crate::resolver::BranchTree::new`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchNode {
    /// Branch name
    pub name: String,
    /// Parent branch name (None means trunk)
    pub parent: Option<String>,
    /// Names of child branches
    pub children: BTreeSet<String>,
    /// Whether this node is the trunk branch
    pub is_trunk: bool,
    /// Commit the branch currently points at
    pub commit_sha: String,
}

impl BranchNode {
    /// A trunk node with no parent
    pub fn trunk(name: impl Into<String>, sha: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            children: BTreeSet::new(),
            is_trunk: true,
            commit_sha: sha.into(),
        }
    }

    /// A tracked non-trunk node
    pub fn tracked(
        name: impl Into<String>,
        parent: impl Into<String>,
        sha: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            parent: Some(parent.into()),
            children: BTreeSet::new(),
            is_trunk: false,
            commit_sha: sha.into(),
        }
    }
}

/// One git worktree as reported by `git worktree list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorktreeRecord {
    /// Absolute path of the worktree
    pub path: PathBuf,
    /// Branch checked out in this worktree (None for detached HEAD)
    pub checked_out_branch: Option<String>,
    /// Whether this is the root worktree (the one containing the primary
    /// `.git` directory). The root worktree is never deleted or reparented
    /// by grove.
    pub is_root: bool,
}

/// Uncommitted-change summary for a single worktree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorktreeStatus {
    /// Staged entries
    pub staged: usize,
    /// Modified-but-unstaged entries
    pub modified: usize,
    /// Untracked files
    pub untracked: usize,
}

impl WorktreeStatus {
    /// Whether the worktree has any uncommitted changes
    pub const fn is_dirty(&self) -> bool {
        self.staged + self.modified + self.untracked > 0
    }

    /// Short human description, e.g. "2 staged, 1 untracked"
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if self.staged > 0 {
            parts.push(format!("{} staged", self.staged));
        }
        if self.modified > 0 {
            parts.push(format!("{} modified", self.modified));
        }
        if self.untracked > 0 {
            parts.push(format!("{} untracked", self.untracked));
        }
        parts.join(", ")
    }
}

/// Pull request state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrState {
    /// PR is open and can be merged
    Open,
    /// PR was closed without merging
    Closed,
    /// PR was merged
    Merged,
}

impl std::fmt::Display for PrState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
            Self::Merged => write!(f, "merged"),
        }
    }
}

/// GitHub's computed mergeability for a PR.
///
/// `Unknown` means GitHub is still computing (or refused to answer); it is a
/// soft warning during validation, not a blocker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mergeability {
    /// No conflicts with the base branch
    Mergeable,
    /// Confirmed merge conflicts
    Conflicting,
    /// Not yet computed
    Unknown,
}

impl Mergeability {
    /// Map GitHub's `Option<bool>` mergeable field
    pub const fn from_api(mergeable: Option<bool>) -> Self {
        match mergeable {
            Some(true) => Self::Mergeable,
            Some(false) => Self::Conflicting,
            None => Self::Unknown,
        }
    }
}

/// A pull request as grove reads it from GitHub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestRecord {
    /// PR number
    pub number: u64,
    /// PR title
    pub title: String,
    /// Current state
    pub state: PrState,
    /// Base branch recorded on GitHub
    pub base_branch: String,
    /// Head branch
    pub head_branch: String,
    /// Computed mergeability
    pub mergeability: Mergeability,
    /// Raw merge-state string from the API, when available (e.g. "clean",
    /// "dirty", "blocked"); informational only
    pub merge_state: Option<String>,
}

/// A comment on a pull request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrComment {
    /// Comment ID
    pub id: u64,
    /// Comment body text
    pub body: String,
}

/// Merge method for landing a PR
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMethod {
    /// Squash all commits into one
    Squash,
    /// Create a merge commit
    Merge,
    /// Rebase commits onto base branch
    Rebase,
}

impl std::fmt::Display for MergeMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Squash => write!(f, "squash"),
            Self::Merge => write!(f, "merge"),
            Self::Rebase => write!(f, "rebase"),
        }
    }
}

/// Result of a merge call
#[derive(Debug, Clone)]
pub struct MergeResult {
    /// Whether the merge went through
    pub merged: bool,
    /// SHA of the merge commit, if successful
    pub sha: Option<String>,
    /// Message from the API, especially on failure
    pub message: Option<String>,
}
