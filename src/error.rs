//! Error types for grove

use thiserror::Error;

/// Crate-wide result type
pub type Result<T> = std::result::Result<T, Error>;

/// All errors grove can surface.
///
/// Precondition errors carry the identifiers the user needs to self-diagnose
/// (branch names, worktree paths, PR numbers). They are raised during
/// validation, before any side effect has happened, and are fully recoverable
/// by fixing the named condition and re-running.
#[derive(Debug, Error)]
pub enum Error {
    // === Precondition errors (validation, zero side effects) ===
    /// Stack metadata integration (Graphite) is not enabled for this repo
    #[error("stack integration is not enabled for this repository. Run 'gt init' first.")]
    IntegrationDisabled,

    /// HEAD is detached in the invoking worktree
    #[error("HEAD is detached; check out a branch before landing")]
    DetachedHead,

    /// The invoking worktree has uncommitted changes
    #[error("worktree has uncommitted changes ({0}); commit or stash them first")]
    DirtyWorktree(String),

    /// The current branch is trunk, which is never landed
    #[error("cannot land trunk branch '{0}'")]
    CannotLandTrunk(String),

    /// The current branch is not tracked in the stack metadata
    #[error("branch '{0}' is not tracked in any stack. Run 'gt track' first.")]
    BranchNotTracked(String),

    /// One or more plan branches are checked out in other worktrees
    #[error("{}", format_worktree_conflicts(.0))]
    WorktreeConflict(Vec<(String, String)>),

    /// A plan branch has no associated pull request
    #[error("branch '{0}' has no pull request. Run 'gt submit' first.")]
    NoPullRequest(String),

    /// A plan branch's pull request is closed or already merged
    #[error("pull request for branch '{0}' is {1}; re-open or re-submit it")]
    PullRequestClosed(String, String),

    /// A pull request has merge conflicts with its base
    #[error("PR #{0} ({1}) has merge conflicts; resolve them before landing")]
    MergeConflict(u64, String),

    // === Execution errors (mid-landing, partial state remains) ===
    /// The landing run stopped early; merged PRs stay merged and manual
    /// reconciliation is required for the rest
    #[error("landing stopped at branch '{branch}' during {phase}: {message}")]
    ExecutionFailed {
        /// Branch being processed when the run stopped
        branch: String,
        /// Human name of the failing phase
        phase: String,
        /// Underlying adapter error
        message: String,
    },

    // === Structural errors ===
    /// The branch metadata forms an invalid tree (cycle, missing parent,
    /// zero or multiple trunks)
    #[error("malformed branch tree: {0}")]
    MalformedTree(String),

    // === Adapter errors ===
    /// A git subprocess invocation failed
    #[error("git error: {0}")]
    Git(String),

    /// A stack-tool (gt) invocation or metadata read failed
    #[error("stack tool error: {0}")]
    Stack(String),

    /// A GitHub API call failed
    #[error("GitHub API error: {0}")]
    GitHub(String),

    /// Configuration file could not be read or parsed
    #[error("config error: {0}")]
    Config(String),

    /// Internal error that should not happen in normal operation
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<octocrab::Error> for Error {
    fn from(err: octocrab::Error) -> Self {
        Self::GitHub(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

fn format_worktree_conflicts(conflicts: &[(String, String)]) -> String {
    let mut msg = String::from("branches in the stack are checked out in other worktrees:\n");
    for (branch, path) in conflicts {
        msg.push_str(&format!("  {branch} -> {path}\n"));
    }
    msg.push_str(
        "Check out a different branch in those worktrees (or remove them) and re-run.",
    );
    msg
}
