//! Adapter ports over git, the stack tool, and GitHub
//!
//! Each capability the landing orchestrator needs from the outside world is a
//! trait here, with a real implementation, a dry-run decorator that intercepts
//! only mutating methods, and an in-memory fake for tests (under
//! `tests/common/`).

mod dry_run;
mod git;
mod github;
mod stack;

pub use dry_run::{DryRunGithub, DryRunStack, MutationLog};
pub use git::GitCli;
pub use github::{parse_owner_repo, GithubService};
pub use stack::GraphiteCli;

use crate::error::Result;
use crate::resolver::BranchTree;
use crate::types::{
    MergeMethod, MergeResult, PrComment, PullRequestRecord, WorktreeRecord, WorktreeStatus,
};
use async_trait::async_trait;
use std::path::Path;

/// Capability interface over the git repository.
///
/// Everything is read-only except `checkout`, which the landing orchestrator
/// itself never points at the root worktree.
pub trait GitPort: Send + Sync {
    /// All worktrees of the repository, root worktree first
    fn list_worktrees(&self) -> Result<Vec<WorktreeRecord>>;

    /// Branch checked out at `path`, or None for detached HEAD
    fn current_branch(&self, path: &Path) -> Result<Option<String>>;

    /// Uncommitted-change summary for the worktree at `path`
    fn status(&self, path: &Path) -> Result<WorktreeStatus>;

    /// Check out `branch` in the worktree at `path`
    fn checkout(&self, path: &Path, branch: &str) -> Result<()>;

    /// Whether `path` exists on disk
    fn path_exists(&self, path: &Path) -> bool;
}

/// Capability interface over the stack-metadata tool (Graphite).
pub trait StackPort: Send + Sync {
    /// Whether stack integration is enabled for this repository
    fn is_enabled(&self) -> bool;

    /// The full validated branch tree. Implementations may cache; the cache
    /// must be invalidated at the end of any `sync`.
    fn branch_tree(&self) -> Result<BranchTree>;

    /// The stack (trunk to leaf, inclusive) containing `branch`
    fn stack_for(&self, branch: &str) -> Result<Vec<String>>;

    /// Force-push (submit, no edit) a single branch so the remote reflects
    /// the local tip
    fn submit_branch(&self, branch: &str) -> Result<()>;

    /// Resync the stack onto the new trunk state. Never invoked by the
    /// landing executor; exists for explicit manual triggers only.
    fn sync(&self) -> Result<()>;

    /// The command line a user would run to resync manually
    fn sync_hint(&self) -> String;
}

/// Capability interface over GitHub pull requests.
#[async_trait]
pub trait GithubPort: Send + Sync {
    /// Most recent PR whose head is `branch`, in any state, if one exists
    async fn pr_for_branch(&self, branch: &str) -> Result<Option<PullRequestRecord>>;

    /// Full record for a PR by number (state, base, mergeability)
    async fn pr_details(&self, pr_number: u64) -> Result<PullRequestRecord>;

    /// Change the base branch of a PR
    async fn update_pr_base(&self, pr_number: u64, new_base: &str) -> Result<()>;

    /// Merge a PR with the given method. Never passes an auto-merge flag;
    /// landing is synchronous and sequential.
    async fn merge_pr(&self, pr_number: u64, method: MergeMethod) -> Result<MergeResult>;

    /// List comments on a PR
    async fn list_pr_comments(&self, pr_number: u64) -> Result<Vec<PrComment>>;

    /// Create a comment on a PR
    async fn create_pr_comment(&self, pr_number: u64, body: &str) -> Result<()>;
}
