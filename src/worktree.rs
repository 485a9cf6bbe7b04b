//! Worktree conflict detection
//!
//! Reconciles git's worktree model with the landing plan: a branch that is
//! about to be landed must not be checked out anywhere except the worktree
//! the command was invoked from.

use crate::error::{Error, Result};
use crate::types::WorktreeRecord;
use std::path::Path;

/// A plan branch checked out in a worktree other than the invoking one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorktreeConflict {
    /// The conflicting branch
    pub branch: String,
    /// Path of the worktree holding it
    pub path: String,
}

/// Find plan branches checked out in a worktree other than `current_path`.
///
/// The invoking worktree's own branch is expected to be in the plan and is
/// never a conflict. The root worktree's branch is never flagged either; the
/// root worktree is not a removal or checkout target in any phase.
pub fn detect_conflicts(
    plan: &[String],
    worktrees: &[WorktreeRecord],
    current_path: &Path,
) -> Vec<WorktreeConflict> {
    let mut conflicts = Vec::new();
    for record in worktrees {
        if record.path == current_path || record.is_root {
            continue;
        }
        let Some(ref branch) = record.checked_out_branch else {
            continue;
        };
        if plan.iter().any(|b| b == branch) {
            conflicts.push(WorktreeConflict {
                branch: branch.clone(),
                path: record.path.display().to_string(),
            });
        }
    }
    conflicts
}

/// Like [`detect_conflicts`], but fails with a structured error listing every
/// conflicting branch and its worktree path when any conflict exists.
pub fn ensure_no_conflicts(
    plan: &[String],
    worktrees: &[WorktreeRecord],
    current_path: &Path,
) -> Result<()> {
    let conflicts = detect_conflicts(plan, worktrees, current_path);
    if conflicts.is_empty() {
        return Ok(());
    }
    Err(Error::WorktreeConflict(
        conflicts
            .into_iter()
            .map(|c| (c.branch, c.path))
            .collect(),
    ))
}
