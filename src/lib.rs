//! grove - git worktree fleet manager with stacked-PR landing
//!
//! grove orchestrates git, Graphite stacks, and GitHub pull requests: given a
//! chain of dependent branches it lands each branch's PR bottom-up while
//! keeping the remaining stack, its worktrees, and GitHub's view of PR bases
//! consistent despite the branch deletions landing causes.

pub mod config;
pub mod error;
pub mod land;
pub mod ports;
pub mod resolver;
pub mod types;
pub mod validate;
pub mod worktree;

pub use error::{Error, Result};
