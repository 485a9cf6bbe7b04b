//! Landing execution - the effectful state machine
//!
//! Iterates the validated plan bottom-up, one branch at a time. For each
//! branch: reconcile the PR base against the expected parent, squash-merge,
//! suggest (never run) the stack resync, force-push every remaining branch,
//! then correct the bases of the remaining PRs. Execution stops at the first
//! failure; merges already performed are never rolled back.

use crate::error::Result;
use crate::land::plan::ExecutionState;
use crate::ports::{GithubPort, StackPort};
use crate::types::{MergeMethod, PrState};
use crate::validate::ValidatedPlan;
use tracing::debug;

/// Phase of the landing state machine, named for what it does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandPhase {
    /// Pre-merge base reconciliation
    BaseReconcile,
    /// The squash merge itself
    Merge,
    /// Force-push of a remaining branch
    Repush,
    /// Post-push base correction of remaining PRs
    BaseCorrect,
}

impl std::fmt::Display for LandPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BaseReconcile => write!(f, "base reconciliation"),
            Self::Merge => write!(f, "merge"),
            Self::Repush => write!(f, "re-push"),
            Self::BaseCorrect => write!(f, "base correction"),
        }
    }
}

/// Progress events emitted while landing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LandEvent {
    /// Starting to land a branch (1-based position, plan length)
    Landing {
        branch: String,
        pr_number: u64,
        position: usize,
        total: usize,
    },
    /// A stale PR base was corrected before or after a merge
    BaseCorrected {
        pr_number: u64,
        old_base: String,
        new_base: String,
    },
    /// The PR base already matched the expected parent; no write performed
    BaseAlreadyCorrect { pr_number: u64, base: String },
    /// A PR merged
    Merged {
        branch: String,
        pr_number: u64,
        sha: Option<String>,
    },
    /// The manual resync command the user should run; the executor never
    /// runs it itself
    SuggestSync { command: String },
    /// A remaining branch was force-pushed so its PR reflects the new trunk
    Repushed { branch: String },
}

/// Sink for landing progress events.
pub trait ProgressSink: Send + Sync {
    /// Observe one event
    fn on_event(&self, event: LandEvent);
}

/// A sink that drops every event
pub struct SilentSink;

impl ProgressSink for SilentSink {
    fn on_event(&self, _event: LandEvent) {}
}

/// The step at which a run stopped early.
#[derive(Debug, Clone)]
pub struct FailedStep {
    /// Branch being processed when the failure happened
    pub branch: String,
    /// Its PR number, when known
    pub pr_number: Option<u64>,
    /// Phase that failed
    pub phase: LandPhase,
    /// Error message from the adapter
    pub message: String,
}

/// Outcome of a landing run.
///
/// A failure after the first merge leaves the run partially completed: the
/// merged PRs stay merged, and `remaining` lists what is left for manual
/// reconciliation.
#[derive(Debug, Clone, Default)]
pub struct LandOutcome {
    /// Branches whose PRs merged, in landing order
    pub landed: Vec<String>,
    /// Branches not landed (failure point included)
    pub remaining: Vec<String>,
    /// PR base corrections performed, `(pr_number, new_base)` in call order
    pub corrected_bases: Vec<(u64, String)>,
    /// The failing step, if the run stopped early
    pub failed: Option<FailedStep>,
    /// Manual resync command to suggest after landing
    pub sync_hint: String,
}

impl LandOutcome {
    /// Whether every planned branch landed
    pub fn is_success(&self) -> bool {
        self.failed.is_none()
    }

    /// Whether at least one PR merged before a failure
    pub fn is_partial(&self) -> bool {
        self.failed.is_some() && !self.landed.is_empty()
    }
}

/// Execute a validated landing plan.
///
/// Single-threaded and strictly sequential: each phase's correctness depends
/// on the mutations of the previous one, so nothing is reordered or
/// parallelized. Adapter failures after the first merge are captured in the
/// outcome rather than returned as errors, so the caller can render the
/// partial-completion report.
pub async fn execute_land(
    validated: &ValidatedPlan,
    stack: &dyn StackPort,
    github: &dyn GithubPort,
    progress: &dyn ProgressSink,
) -> Result<LandOutcome> {
    let plan = &validated.plan;
    let mut state = ExecutionState::new();
    let mut outcome = LandOutcome {
        remaining: plan.branches().to_vec(),
        sync_hint: stack.sync_hint(),
        ..Default::default()
    };

    for (i, branch) in plan.branches().iter().enumerate() {
        state.index = i;
        let pr_number = match validated.pull_requests.get(branch) {
            Some(pr) => pr.number,
            None => {
                // Validation guarantees an entry per branch; treat a gap as
                // a failure at this branch rather than panicking.
                outcome.failed = Some(FailedStep {
                    branch: branch.clone(),
                    pr_number: None,
                    phase: LandPhase::Merge,
                    message: format!("no validated pull request for '{branch}'"),
                });
                break;
            }
        };

        progress.on_event(LandEvent::Landing {
            branch: branch.clone(),
            pr_number,
            position: i + 1,
            total: plan.len(),
        });

        // Base reconciliation: a previously-landed sibling may have deleted
        // this PR's recorded base. Compare against the expected parent and
        // write only on mismatch.
        match reconcile_base(plan_expected(validated, &state, branch), pr_number, github, progress)
            .await
        {
            Ok(corrected) => {
                if let Some(new_base) = corrected {
                    state.corrected_prs.insert(pr_number);
                    outcome.corrected_bases.push((pr_number, new_base));
                }
            }
            Err(e) => {
                outcome.failed = Some(FailedStep {
                    branch: branch.clone(),
                    pr_number: Some(pr_number),
                    phase: LandPhase::BaseReconcile,
                    message: e.to_string(),
                });
                break;
            }
        }

        // Merge. Squash, and never with an auto-merge flag: landing is
        // synchronous and sequential, so auto-merge has nothing to add and
        // would require branch-protection rules grove does not assume.
        match github.merge_pr(pr_number, MergeMethod::Squash).await {
            Ok(result) if result.merged => {
                debug!(branch, pr_number, sha = ?result.sha, "merged");
                progress.on_event(LandEvent::Merged {
                    branch: branch.clone(),
                    pr_number,
                    sha: result.sha,
                });
            }
            Ok(result) => {
                outcome.failed = Some(FailedStep {
                    branch: branch.clone(),
                    pr_number: Some(pr_number),
                    phase: LandPhase::Merge,
                    message: result
                        .message
                        .unwrap_or_else(|| "merge API returned unmerged".to_string()),
                });
                break;
            }
            Err(e) => {
                outcome.failed = Some(FailedStep {
                    branch: branch.clone(),
                    pr_number: Some(pr_number),
                    phase: LandPhase::Merge,
                    message: e.to_string(),
                });
                break;
            }
        }

        state.landed.insert(branch.clone());
        outcome.landed.push(branch.clone());
        outcome.remaining.retain(|b| b != branch);

        // Resync stays manual. Earlier designs force-synced here and deleted
        // worktrees out from under users; the executor now only suggests the
        // command.
        progress.on_event(LandEvent::SuggestSync {
            command: outcome.sync_hint.clone(),
        });

        // Re-push every branch still above this one so GitHub's view of each
        // remaining PR reflects the rebase this landing implied. For the leaf
        // branch there is nothing remaining and this loop is a no-op.
        let mut push_failed = false;
        for remaining in plan.remaining_above(i) {
            if let Err(e) = stack.submit_branch(remaining) {
                outcome.failed = Some(FailedStep {
                    branch: remaining.clone(),
                    pr_number: validated.pull_requests.get(remaining).map(|p| p.number),
                    phase: LandPhase::Repush,
                    message: e.to_string(),
                });
                push_failed = true;
                break;
            }
            progress.on_event(LandEvent::Repushed {
                branch: remaining.clone(),
            });
        }
        if push_failed {
            break;
        }

        // Post-push base correction for the remaining PRs, same
        // compare-then-write discipline as before the merge.
        let mut correct_failed = false;
        for remaining in plan.remaining_above(i) {
            let Some(pr) = validated.pull_requests.get(remaining) else {
                continue;
            };
            match reconcile_base(
                plan_expected(validated, &state, remaining),
                pr.number,
                github,
                progress,
            )
            .await
            {
                Ok(Some(new_base)) => {
                    state.corrected_prs.insert(pr.number);
                    outcome.corrected_bases.push((pr.number, new_base));
                }
                Ok(None) => {}
                Err(e) => {
                    outcome.failed = Some(FailedStep {
                        branch: remaining.clone(),
                        pr_number: Some(pr.number),
                        phase: LandPhase::BaseCorrect,
                        message: e.to_string(),
                    });
                    correct_failed = true;
                    break;
                }
            }
        }
        if correct_failed {
            break;
        }
    }

    Ok(outcome)
}

fn plan_expected(validated: &ValidatedPlan, state: &ExecutionState, branch: &str) -> String {
    validated.plan.expected_base(&state.landed, branch)
}

/// Compare the PR's live base against `expected` and update only on
/// mismatch. Returns the new base when a write happened.
async fn reconcile_base(
    expected: String,
    pr_number: u64,
    github: &dyn GithubPort,
    progress: &dyn ProgressSink,
) -> Result<Option<String>> {
    let details = github.pr_details(pr_number).await?;
    if details.state != PrState::Open {
        // Merged or closed out from under us; nothing to correct.
        return Ok(None);
    }
    if details.base_branch == expected {
        progress.on_event(LandEvent::BaseAlreadyCorrect {
            pr_number,
            base: expected,
        });
        return Ok(None);
    }
    debug!(
        pr_number,
        old_base = details.base_branch,
        new_base = expected,
        "correcting stale PR base"
    );
    github.update_pr_base(pr_number, &expected).await?;
    progress.on_event(LandEvent::BaseCorrected {
        pr_number,
        old_base: details.base_branch,
        new_base: expected.clone(),
    });
    Ok(Some(expected))
}
