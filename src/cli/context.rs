//! Shared command context for CLI commands
//!
//! A frozen dependency-injection struct constructed once per invocation and
//! passed by reference through the call chain; no global mutable state.

use grove::config::{load_config, Config};
use grove::error::{Error, Result};
use grove::ports::{
    parse_owner_repo, DryRunGithub, DryRunStack, GitCli, GitPort, GithubPort, GithubService,
    GraphiteCli, MutationLog, StackPort,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Everything a command needs to talk to git, the stack tool, and GitHub.
pub struct CommandContext {
    /// Loaded configuration
    pub config: Config,
    /// Root worktree path (holds the primary `.git`)
    pub repo_root: PathBuf,
    /// The worktree the command was invoked from
    pub invoked_from: PathBuf,
    /// Git capability port
    pub git: Arc<dyn GitPort>,
    /// Stack-metadata capability port
    pub stack: Arc<dyn StackPort>,
    /// GitHub capability port
    pub github: Arc<dyn GithubPort>,
    /// Recorded mutation intents; Some only under --dry-run
    pub mutation_log: Option<MutationLog>,
}

impl CommandContext {
    /// Build the context for a command invoked from `path`.
    ///
    /// Under `dry_run`, the stack and GitHub ports are wrapped in decorators
    /// that intercept mutating calls and record them instead.
    pub fn new(path: &Path, dry_run: bool) -> Result<Self> {
        let git = GitCli::discover(path)?;
        let repo_root = git.repo_root().to_path_buf();
        let invoked_from = GitCli::worktree_toplevel(path)?;

        let config = load_config(&repo_root)?;

        let remote_url = git.remote_url(&config.remote)?;
        let (owner, repo) = parse_owner_repo(&remote_url)?;
        let token = github_token()?;

        let stack: Arc<dyn StackPort> = Arc::new(GraphiteCli::new(
            &repo_root,
            config.stack.enabled,
            config.trunk.clone(),
        ));
        let github: Arc<dyn GithubPort> = Arc::new(GithubService::new(&token, owner, repo)?);

        let (stack, github, mutation_log) = if dry_run {
            let log = MutationLog::new();
            let stack: Arc<dyn StackPort> = Arc::new(DryRunStack::new(stack, log.clone()));
            let github: Arc<dyn GithubPort> = Arc::new(DryRunGithub::new(github, log.clone()));
            (stack, github, Some(log))
        } else {
            (stack, github, None)
        };

        Ok(Self {
            config,
            repo_root,
            invoked_from,
            git: Arc::new(git),
            stack,
            github,
            mutation_log,
        })
    }
}

fn github_token() -> Result<String> {
    std::env::var("GITHUB_TOKEN")
        .or_else(|_| std::env::var("GH_TOKEN"))
        .map_err(|_| {
            Error::GitHub("no GitHub token found; set GITHUB_TOKEN or GH_TOKEN".to_string())
        })
}
