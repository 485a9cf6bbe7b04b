//! Precondition validation for landing
//!
//! An ordered sequence of independent checks; the first failure aborts with
//! no side effects performed. Validation only reads - every adapter call here
//! is a query.

use crate::error::{Error, Result};
use crate::land::plan::LandingPlan;
use crate::ports::{GitPort, GithubPort, StackPort};
use crate::types::{Mergeability, PrState, PullRequestRecord};
use crate::worktree;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Output of a successful validation: the immutable plan, the pull request
/// for each plan branch, and any soft warnings to surface before execution.
#[derive(Debug, Clone)]
pub struct ValidatedPlan {
    /// The ordered landing plan, bottom-up
    pub plan: LandingPlan,
    /// Pull request per plan branch
    pub pull_requests: HashMap<String, PullRequestRecord>,
    /// Soft warnings (mergeability UNKNOWN); execution proceeds
    pub warnings: Vec<String>,
}

/// Run checks 1-8 in order and produce a go decision with diagnostics.
///
/// `current_worktree` is the worktree the command was invoked from; dirty
/// state is checked only there, never for unrelated worktrees.
pub async fn validate(
    git: &dyn GitPort,
    stack: &dyn StackPort,
    github: &dyn GithubPort,
    current_worktree: &Path,
    downstack: bool,
) -> Result<ValidatedPlan> {
    // 1. Stack integration must be enabled.
    if !stack.is_enabled() {
        return Err(Error::IntegrationDisabled);
    }

    // 2. Current branch must be resolvable.
    let current = git
        .current_branch(current_worktree)?
        .ok_or(Error::DetachedHead)?;
    debug!(current, "validating landing preconditions");

    // 3. The invoking worktree must be clean.
    let status = git.status(current_worktree)?;
    if status.is_dirty() {
        return Err(Error::DirtyWorktree(status.describe()));
    }

    // 4 + 5. Trunk and tracking checks are the resolver's own contract.
    let tree = stack.branch_tree()?;
    let plan = LandingPlan::resolve(&tree, &current, downstack)?;

    // 6. No plan branch may be checked out in another worktree.
    let worktrees = git.list_worktrees()?;
    worktree::ensure_no_conflicts(plan.branches(), &worktrees, current_worktree)?;

    // 7. Every plan branch needs an open PR. All of them are resolved before
    // any mergeability query, so a branch with no PR anywhere in the plan is
    // reported ahead of a conflict lower down.
    let mut numbered = Vec::new();
    for branch in plan.branches() {
        let pr = github
            .pr_for_branch(branch)
            .await?
            .ok_or_else(|| Error::NoPullRequest(branch.clone()))?;
        if pr.state != PrState::Open {
            return Err(Error::PullRequestClosed(branch.clone(), pr.state.to_string()));
        }
        numbered.push((branch.clone(), pr.number));
    }

    // 8. Conflicting PRs block the run no matter where they sit in the plan.
    let mut pull_requests = HashMap::new();
    let mut warnings = Vec::new();
    for (branch, number) in numbered {
        let details = github.pr_details(number).await?;
        match details.mergeability {
            Mergeability::Conflicting => {
                return Err(Error::MergeConflict(details.number, branch));
            }
            Mergeability::Unknown => {
                warnings.push(format!(
                    "PR #{} ({branch}): mergeability unknown, proceeding anyway",
                    details.number
                ));
            }
            Mergeability::Mergeable => {}
        }
        pull_requests.insert(branch, details);
    }

    debug!(
        branches = plan.len(),
        warnings = warnings.len(),
        "validation passed"
    );
    Ok(ValidatedPlan {
        plan,
        pull_requests,
        warnings,
    })
}
