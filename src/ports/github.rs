//! GitHub adapter using octocrab

use crate::error::{Error, Result};
use crate::ports::GithubPort;
use crate::types::{
    MergeMethod, MergeResult, Mergeability, PrComment, PrState, PullRequestRecord,
};
use async_trait::async_trait;
use octocrab::Octocrab;
use tracing::debug;

/// Real GitHub adapter.
pub struct GithubService {
    client: Octocrab,
    owner: String,
    repo: String,
}

impl GithubService {
    /// Create a service for `owner/repo` authenticated with `token`
    pub fn new(token: &str, owner: String, repo: String) -> Result<Self> {
        let client = Octocrab::builder()
            .personal_token(token.to_string())
            .build()
            .map_err(|e| Error::GitHub(e.to_string()))?;
        Ok(Self {
            client,
            owner,
            repo,
        })
    }
}

/// Parse `owner` and `repo` out of a GitHub remote URL.
///
/// Handles `git@github.com:owner/repo.git` and
/// `https://github.com/owner/repo[.git]` forms.
pub fn parse_owner_repo(url: &str) -> Result<(String, String)> {
    let trimmed = url.trim().trim_end_matches('/');
    let path = if let Some(rest) = trimmed.strip_prefix("git@") {
        rest.split_once(':').map(|(_, p)| p)
    } else if let Some(rest) = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .or_else(|| trimmed.strip_prefix("ssh://git@"))
    {
        rest.split_once('/').map(|(_, p)| p)
    } else {
        None
    };
    let path = path.ok_or_else(|| Error::GitHub(format!("unrecognized remote URL: {url}")))?;
    let path = path.strip_suffix(".git").unwrap_or(path);
    match path.split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() => {
            Ok((owner.to_string(), repo.to_string()))
        }
        _ => Err(Error::GitHub(format!("unrecognized remote URL: {url}"))),
    }
}

/// Convert an octocrab PR to grove's record type
fn record_from_octocrab(pr: &octocrab::models::pulls::PullRequest) -> PullRequestRecord {
    let state = match pr.state {
        Some(octocrab::models::IssueState::Open) => PrState::Open,
        Some(octocrab::models::IssueState::Closed) if pr.merged_at.is_some() => PrState::Merged,
        // IssueState is non-exhaustive; treat anything else as closed
        Some(_) | None => PrState::Closed,
    };
    PullRequestRecord {
        number: pr.number,
        title: pr.title.clone().unwrap_or_default(),
        state,
        base_branch: pr.base.ref_field.clone(),
        head_branch: pr.head.ref_field.clone(),
        mergeability: Mergeability::from_api(pr.mergeable),
        merge_state: pr
            .mergeable_state
            .as_ref()
            .map(|s| format!("{s:?}").to_lowercase()),
    }
}

#[async_trait]
impl GithubPort for GithubService {
    async fn pr_for_branch(&self, branch: &str) -> Result<Option<PullRequestRecord>> {
        debug!(branch, "finding PR for branch");
        let head = format!("{}:{}", self.owner, branch);
        // All states: the validator distinguishes missing from closed PRs.
        let prs = self
            .client
            .pulls(&self.owner, &self.repo)
            .list()
            .head(head)
            .state(octocrab::params::State::All)
            .send()
            .await?;
        let result = prs.items.first().map(record_from_octocrab);
        if let Some(ref pr) = result {
            debug!(branch, pr_number = pr.number, state = %pr.state, "found PR");
        } else {
            debug!(branch, "no PR");
        }
        Ok(result)
    }

    async fn pr_details(&self, pr_number: u64) -> Result<PullRequestRecord> {
        debug!(pr_number, "getting PR details");
        let pr = self
            .client
            .pulls(&self.owner, &self.repo)
            .get(pr_number)
            .await?;
        Ok(record_from_octocrab(&pr))
    }

    async fn update_pr_base(&self, pr_number: u64, new_base: &str) -> Result<()> {
        debug!(pr_number, new_base, "updating PR base");
        self.client
            .pulls(&self.owner, &self.repo)
            .update(pr_number)
            .base(new_base)
            .send()
            .await?;
        Ok(())
    }

    async fn merge_pr(&self, pr_number: u64, method: MergeMethod) -> Result<MergeResult> {
        debug!(pr_number, %method, "merging PR");

        // Squash merges use the PR title and body as the commit message.
        let pr = self
            .client
            .pulls(&self.owner, &self.repo)
            .get(pr_number)
            .await?;
        let title = pr.title.clone().unwrap_or_default();

        let octocrab_method = match method {
            MergeMethod::Squash => octocrab::params::pulls::MergeMethod::Squash,
            MergeMethod::Merge => octocrab::params::pulls::MergeMethod::Merge,
            MergeMethod::Rebase => octocrab::params::pulls::MergeMethod::Rebase,
        };

        let pulls = self.client.pulls(&self.owner, &self.repo);
        let result = if method == MergeMethod::Squash {
            let mut builder = pulls
                .merge(pr_number)
                .method(octocrab_method)
                .title(format!("{title} (#{pr_number})"));
            if let Some(ref body) = pr.body {
                builder = builder.message(body);
            }
            builder.send().await
        } else {
            pulls.merge(pr_number).method(octocrab_method).send().await
        }
        .map_err(|e| Error::GitHub(format!("merge failed: {e}")))?;

        let merge_result = MergeResult {
            merged: result.merged,
            sha: result.sha,
            message: result.message,
        };
        debug!(pr_number, merged = merge_result.merged, "merge complete");
        Ok(merge_result)
    }

    async fn list_pr_comments(&self, pr_number: u64) -> Result<Vec<PrComment>> {
        debug!(pr_number, "listing PR comments");
        let comments = self
            .client
            .issues(&self.owner, &self.repo)
            .list_comments(pr_number)
            .send()
            .await?;
        Ok(comments
            .items
            .into_iter()
            .map(|c| PrComment {
                id: c.id.0,
                body: c.body.unwrap_or_default(),
            })
            .collect())
    }

    async fn create_pr_comment(&self, pr_number: u64, body: &str) -> Result<()> {
        debug!(pr_number, "creating PR comment");
        self.client
            .issues(&self.owner, &self.repo)
            .create_comment(pr_number, body)
            .await?;
        Ok(())
    }
}
