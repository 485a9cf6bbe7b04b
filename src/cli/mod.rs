//! CLI commands and shared plumbing

pub mod context;
pub mod land;
pub mod style;
pub mod worktrees;
