//! Dry-run decorators
//!
//! Each decorator wraps a real (or fake) port, forwards read methods, and
//! intercepts mutating methods: instead of executing, the call is recorded as
//! a "would execute" intent and a synthesized success is returned. Reads
//! observe the pretended mutations (base updates, merges), so a dry run
//! traverses every phase exactly like a real run would and its output is a
//! faithful preview.

use crate::error::Result;
use crate::ports::{GithubPort, StackPort};
use crate::resolver::BranchTree;
use crate::types::{MergeMethod, MergeResult, PrComment, PrState, PullRequestRecord};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// Shared log of intercepted mutations.
#[derive(Debug, Clone, Default)]
pub struct MutationLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl MutationLog {
    /// An empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one "would execute" intent
    pub fn record(&self, intent: impl Into<String>) {
        self.entries
            .lock()
            .expect("mutation log poisoned")
            .push(intent.into());
    }

    /// Snapshot of every recorded intent, in call order
    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().expect("mutation log poisoned").clone()
    }

    /// Whether anything was recorded
    pub fn is_empty(&self) -> bool {
        self.entries.lock().expect("mutation log poisoned").is_empty()
    }
}

/// GitHub port decorator for dry runs.
///
/// Pretended base updates and merges are kept in overlays consulted by
/// `pr_details`, so later phases see the state a real run would have
/// produced.
pub struct DryRunGithub {
    inner: Arc<dyn GithubPort>,
    log: MutationLog,
    base_overlay: Mutex<HashMap<u64, String>>,
    merged_overlay: Mutex<HashSet<u64>>,
}

impl DryRunGithub {
    /// Wrap `inner`, recording mutations into `log`
    pub fn new(inner: Arc<dyn GithubPort>, log: MutationLog) -> Self {
        Self {
            inner,
            log,
            base_overlay: Mutex::new(HashMap::new()),
            merged_overlay: Mutex::new(HashSet::new()),
        }
    }

    fn apply_overlays(&self, mut record: PullRequestRecord) -> PullRequestRecord {
        if let Some(base) = self
            .base_overlay
            .lock()
            .expect("overlay poisoned")
            .get(&record.number)
        {
            record.base_branch = base.clone();
        }
        if self
            .merged_overlay
            .lock()
            .expect("overlay poisoned")
            .contains(&record.number)
        {
            record.state = PrState::Merged;
        }
        record
    }
}

#[async_trait]
impl GithubPort for DryRunGithub {
    async fn pr_for_branch(&self, branch: &str) -> Result<Option<PullRequestRecord>> {
        Ok(self
            .inner
            .pr_for_branch(branch)
            .await?
            .map(|r| self.apply_overlays(r)))
    }

    async fn pr_details(&self, pr_number: u64) -> Result<PullRequestRecord> {
        Ok(self.apply_overlays(self.inner.pr_details(pr_number).await?))
    }

    async fn update_pr_base(&self, pr_number: u64, new_base: &str) -> Result<()> {
        self.log
            .record(format!("would execute: set base of PR #{pr_number} to '{new_base}'"));
        self.base_overlay
            .lock()
            .expect("overlay poisoned")
            .insert(pr_number, new_base.to_string());
        Ok(())
    }

    async fn merge_pr(&self, pr_number: u64, method: MergeMethod) -> Result<MergeResult> {
        self.log
            .record(format!("would execute: {method}-merge PR #{pr_number}"));
        self.merged_overlay
            .lock()
            .expect("overlay poisoned")
            .insert(pr_number);
        Ok(MergeResult {
            merged: true,
            sha: None,
            message: None,
        })
    }

    async fn list_pr_comments(&self, pr_number: u64) -> Result<Vec<PrComment>> {
        self.inner.list_pr_comments(pr_number).await
    }

    async fn create_pr_comment(&self, pr_number: u64, _body: &str) -> Result<()> {
        self.log
            .record(format!("would execute: comment on PR #{pr_number}"));
        Ok(())
    }
}

/// Stack port decorator for dry runs.
pub struct DryRunStack {
    inner: Arc<dyn StackPort>,
    log: MutationLog,
}

impl DryRunStack {
    /// Wrap `inner`, recording mutations into `log`
    pub fn new(inner: Arc<dyn StackPort>, log: MutationLog) -> Self {
        Self { inner, log }
    }
}

impl StackPort for DryRunStack {
    fn is_enabled(&self) -> bool {
        self.inner.is_enabled()
    }

    fn branch_tree(&self) -> Result<BranchTree> {
        self.inner.branch_tree()
    }

    fn stack_for(&self, branch: &str) -> Result<Vec<String>> {
        self.inner.stack_for(branch)
    }

    fn submit_branch(&self, branch: &str) -> Result<()> {
        self.log
            .record(format!("would execute: force-push branch '{branch}'"));
        Ok(())
    }

    fn sync(&self) -> Result<()> {
        self.log.record("would execute: resync stack".to_string());
        Ok(())
    }

    fn sync_hint(&self) -> String {
        self.inner.sync_hint()
    }
}
