//! Landing plan - the immutable output of stack resolution
//!
//! A plan is produced once by the resolver, validated, and then held
//! unchanged through execution. Per-run mutable bookkeeping lives in
//! [`ExecutionState`], which is created at the start of a run and discarded
//! at the end.

use crate::error::Result;
use crate::resolver::{self, BranchTree};
use std::collections::HashSet;

/// The ordered list of branches to land, bottom-up: trunk-adjacent branch
/// first, the current branch last.
///
/// Carries a snapshot of the branch tree so expected-parent questions can be
/// answered without further metadata reads.
#[derive(Debug, Clone)]
pub struct LandingPlan {
    tree: BranchTree,
    branches: Vec<String>,
    current: String,
}

impl LandingPlan {
    /// Resolve the plan for `current` against `tree`.
    ///
    /// With `downstack`, the list is restricted to branches strictly below
    /// the current branch's position, still inclusive of `current`.
    pub fn resolve(tree: &BranchTree, current: &str, downstack: bool) -> Result<Self> {
        let branches = if downstack {
            resolver::resolve_downstack(tree, current, current)?
        } else {
            resolver::resolve(tree, current)?
        };
        Ok(Self {
            tree: tree.clone(),
            branches,
            current: current.to_string(),
        })
    }

    /// Branches to land, bottom-up
    pub fn branches(&self) -> &[String] {
        &self.branches
    }

    /// The branch the command was invoked for (last in the plan)
    pub fn current(&self) -> &str {
        &self.current
    }

    /// Trunk branch name
    pub fn trunk(&self) -> &str {
        self.tree.trunk()
    }

    /// Number of branches in the plan
    pub fn len(&self) -> usize {
        self.branches.len()
    }

    /// Whether the plan is empty (cannot happen for a resolved plan, but
    /// callers pattern-match on it anyway)
    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }

    /// Branches above index `i`, i.e. not yet landed once `branches()[i]`
    /// has merged
    pub fn remaining_above(&self, i: usize) -> &[String] {
        self.branches.get(i + 1..).unwrap_or(&[])
    }

    /// The base branch GitHub should record for `branch` right now.
    ///
    /// This is the nearest ancestor in the tree that has not been landed;
    /// landed ancestors collapse to trunk. A stale base - one naming a branch
    /// that a previous landing deleted - is exactly a mismatch against this
    /// value.
    pub fn expected_base(&self, landed: &HashSet<String>, branch: &str) -> String {
        let mut cursor = branch;
        while let Some(parent) = self.tree.parent_of(cursor) {
            if !landed.contains(parent) {
                return parent.to_string();
            }
            cursor = parent;
        }
        self.trunk().to_string()
    }
}

/// Per-run mutable execution record. Never persisted.
#[derive(Debug, Default)]
pub struct ExecutionState {
    /// Index of the branch currently being landed
    pub index: usize,
    /// Branches landed so far this run
    pub landed: HashSet<String>,
    /// PR numbers whose base has been corrected this run
    pub corrected_prs: HashSet<u64>,
}

impl ExecutionState {
    /// Fresh state at the start of a run
    pub fn new() -> Self {
        Self::default()
    }
}
