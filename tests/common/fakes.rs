//! In-memory fake ports for testing
//!
//! Hand-written rather than generated: call tracking, configurable
//! responses, and error injection cover everything the landing tests need.

#![allow(dead_code)]

use async_trait::async_trait;
use grove::error::{Error, Result};
use grove::ports::{GitPort, GithubPort, StackPort};
use grove::resolver::BranchTree;
use grove::types::{
    MergeMethod, MergeResult, PrComment, PrState, PullRequestRecord, WorktreeRecord,
    WorktreeStatus,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Call record for `update_pr_base`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateBaseCall {
    pub pr_number: u64,
    pub new_base: String,
}

/// Call record for `merge_pr`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergePrCall {
    pub pr_number: u64,
    pub method: MergeMethod,
}

/// In-memory GitHub fake.
///
/// `update_pr_base` and `merge_pr` mutate the stored records, so later reads
/// observe the new base/state just like the real API.
#[derive(Default)]
pub struct FakeGithub {
    prs: Mutex<HashMap<u64, PullRequestRecord>>,
    by_branch: Mutex<HashMap<String, u64>>,
    comments: Mutex<HashMap<u64, Vec<PrComment>>>,
    // Call tracking
    pr_for_branch_calls: Mutex<Vec<String>>,
    pr_details_calls: Mutex<Vec<u64>>,
    update_base_calls: Mutex<Vec<UpdateBaseCall>>,
    merge_calls: Mutex<Vec<MergePrCall>>,
    comment_calls: Mutex<Vec<(u64, String)>>,
    // Error injection
    error_on_merge: Mutex<HashMap<u64, String>>,
    error_on_update_base: Mutex<Option<String>>,
}

impl FakeGithub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an open, mergeable PR for `branch` with the given base
    pub fn add_open_pr(&self, number: u64, branch: &str, base: &str) {
        let record = PullRequestRecord {
            number,
            title: format!("Change for {branch}"),
            state: PrState::Open,
            base_branch: base.to_string(),
            head_branch: branch.to_string(),
            mergeability: grove::types::Mergeability::Mergeable,
            merge_state: Some("clean".to_string()),
        };
        self.by_branch
            .lock()
            .unwrap()
            .insert(branch.to_string(), number);
        self.prs.lock().unwrap().insert(number, record);
    }

    /// Register a PR in an arbitrary state
    pub fn add_pr(&self, record: PullRequestRecord) {
        self.by_branch
            .lock()
            .unwrap()
            .insert(record.head_branch.clone(), record.number);
        self.prs.lock().unwrap().insert(record.number, record);
    }

    /// Override the stored mergeability for a PR
    pub fn set_mergeability(&self, number: u64, mergeability: grove::types::Mergeability) {
        if let Some(pr) = self.prs.lock().unwrap().get_mut(&number) {
            pr.mergeability = mergeability;
        }
    }

    /// Make `merge_pr` fail for a specific PR
    pub fn fail_merge_for(&self, number: u64, msg: &str) {
        self.error_on_merge
            .lock()
            .unwrap()
            .insert(number, msg.to_string());
    }

    /// Make `update_pr_base` fail
    pub fn fail_update_base(&self, msg: &str) {
        *self.error_on_update_base.lock().unwrap() = Some(msg.to_string());
    }

    pub fn update_base_calls(&self) -> Vec<UpdateBaseCall> {
        self.update_base_calls.lock().unwrap().clone()
    }

    pub fn merge_calls(&self) -> Vec<MergePrCall> {
        self.merge_calls.lock().unwrap().clone()
    }

    pub fn comment_calls(&self) -> Vec<(u64, String)> {
        self.comment_calls.lock().unwrap().clone()
    }

    pub fn base_of(&self, number: u64) -> Option<String> {
        self.prs
            .lock()
            .unwrap()
            .get(&number)
            .map(|pr| pr.base_branch.clone())
    }
}

#[async_trait]
impl GithubPort for FakeGithub {
    async fn pr_for_branch(&self, branch: &str) -> Result<Option<PullRequestRecord>> {
        self.pr_for_branch_calls
            .lock()
            .unwrap()
            .push(branch.to_string());
        let number = self.by_branch.lock().unwrap().get(branch).copied();
        Ok(number.and_then(|n| self.prs.lock().unwrap().get(&n).cloned()))
    }

    async fn pr_details(&self, pr_number: u64) -> Result<PullRequestRecord> {
        self.pr_details_calls.lock().unwrap().push(pr_number);
        self.prs
            .lock()
            .unwrap()
            .get(&pr_number)
            .cloned()
            .ok_or_else(|| Error::GitHub(format!("no PR #{pr_number} configured")))
    }

    async fn update_pr_base(&self, pr_number: u64, new_base: &str) -> Result<()> {
        self.update_base_calls.lock().unwrap().push(UpdateBaseCall {
            pr_number,
            new_base: new_base.to_string(),
        });
        if let Some(msg) = self.error_on_update_base.lock().unwrap().as_ref() {
            return Err(Error::GitHub(msg.clone()));
        }
        if let Some(pr) = self.prs.lock().unwrap().get_mut(&pr_number) {
            pr.base_branch = new_base.to_string();
        }
        Ok(())
    }

    async fn merge_pr(&self, pr_number: u64, method: MergeMethod) -> Result<MergeResult> {
        self.merge_calls
            .lock()
            .unwrap()
            .push(MergePrCall { pr_number, method });
        if let Some(msg) = self.error_on_merge.lock().unwrap().get(&pr_number) {
            return Err(Error::GitHub(msg.clone()));
        }
        if let Some(pr) = self.prs.lock().unwrap().get_mut(&pr_number) {
            pr.state = PrState::Merged;
        }
        Ok(MergeResult {
            merged: true,
            sha: Some(format!("merged-sha-{pr_number}")),
            message: None,
        })
    }

    async fn list_pr_comments(&self, pr_number: u64) -> Result<Vec<PrComment>> {
        Ok(self
            .comments
            .lock()
            .unwrap()
            .get(&pr_number)
            .cloned()
            .unwrap_or_default())
    }

    async fn create_pr_comment(&self, pr_number: u64, body: &str) -> Result<()> {
        self.comment_calls
            .lock()
            .unwrap()
            .push((pr_number, body.to_string()));
        Ok(())
    }
}

/// In-memory stack fake holding a fixed branch tree.
pub struct FakeStack {
    tree: BranchTree,
    enabled: Mutex<bool>,
    submit_calls: Mutex<Vec<String>>,
    sync_calls: Mutex<usize>,
    error_on_submit: Mutex<HashMap<String, String>>,
}

impl FakeStack {
    pub fn new(tree: BranchTree) -> Self {
        Self {
            tree,
            enabled: Mutex::new(true),
            submit_calls: Mutex::new(Vec::new()),
            sync_calls: Mutex::new(0),
            error_on_submit: Mutex::new(HashMap::new()),
        }
    }

    pub fn set_enabled(&self, enabled: bool) {
        *self.enabled.lock().unwrap() = enabled;
    }

    /// Make `submit_branch` fail for a specific branch
    pub fn fail_submit_for(&self, branch: &str, msg: &str) {
        self.error_on_submit
            .lock()
            .unwrap()
            .insert(branch.to_string(), msg.to_string());
    }

    pub fn submit_calls(&self) -> Vec<String> {
        self.submit_calls.lock().unwrap().clone()
    }

    /// How many times a branch was force-pushed
    pub fn submit_count(&self, branch: &str) -> usize {
        self.submit_calls
            .lock()
            .unwrap()
            .iter()
            .filter(|b| b.as_str() == branch)
            .count()
    }

    pub fn sync_calls(&self) -> usize {
        *self.sync_calls.lock().unwrap()
    }
}

impl StackPort for FakeStack {
    fn is_enabled(&self) -> bool {
        *self.enabled.lock().unwrap()
    }

    fn branch_tree(&self) -> Result<BranchTree> {
        Ok(self.tree.clone())
    }

    fn stack_for(&self, branch: &str) -> Result<Vec<String>> {
        self.tree.stack_to(branch)
    }

    fn submit_branch(&self, branch: &str) -> Result<()> {
        self.submit_calls.lock().unwrap().push(branch.to_string());
        if let Some(msg) = self.error_on_submit.lock().unwrap().get(branch) {
            return Err(Error::Stack(msg.clone()));
        }
        Ok(())
    }

    fn sync(&self) -> Result<()> {
        *self.sync_calls.lock().unwrap() += 1;
        Ok(())
    }

    fn sync_hint(&self) -> String {
        "gt sync".to_string()
    }
}

/// In-memory git fake backed by a list of worktree records.
#[derive(Default)]
pub struct FakeGit {
    worktrees: Mutex<Vec<WorktreeRecord>>,
    statuses: Mutex<HashMap<PathBuf, WorktreeStatus>>,
    checkout_calls: Mutex<Vec<(PathBuf, String)>>,
}

impl FakeGit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a worktree record
    pub fn add_worktree(&self, path: &str, branch: Option<&str>, is_root: bool) {
        self.worktrees.lock().unwrap().push(WorktreeRecord {
            path: PathBuf::from(path),
            checked_out_branch: branch.map(String::from),
            is_root,
        });
    }

    /// Mark a worktree dirty
    pub fn set_status(&self, path: &str, status: WorktreeStatus) {
        self.statuses
            .lock()
            .unwrap()
            .insert(PathBuf::from(path), status);
    }

    pub fn checkout_calls(&self) -> Vec<(PathBuf, String)> {
        self.checkout_calls.lock().unwrap().clone()
    }
}

impl GitPort for FakeGit {
    fn list_worktrees(&self) -> Result<Vec<WorktreeRecord>> {
        Ok(self.worktrees.lock().unwrap().clone())
    }

    fn current_branch(&self, path: &Path) -> Result<Option<String>> {
        let worktrees = self.worktrees.lock().unwrap();
        let record = worktrees
            .iter()
            .find(|w| w.path == path)
            .ok_or_else(|| Error::Git(format!("unknown worktree: {}", path.display())))?;
        Ok(record.checked_out_branch.clone())
    }

    fn status(&self, path: &Path) -> Result<WorktreeStatus> {
        Ok(self
            .statuses
            .lock()
            .unwrap()
            .get(path)
            .copied()
            .unwrap_or_default())
    }

    fn checkout(&self, path: &Path, branch: &str) -> Result<()> {
        self.checkout_calls
            .lock()
            .unwrap()
            .push((path.to_path_buf(), branch.to_string()));
        Ok(())
    }

    fn path_exists(&self, _path: &Path) -> bool {
        true
    }
}
