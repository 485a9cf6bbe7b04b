//! Worktrees command - list the worktree fleet

use crate::cli::style::Stylize;
use anstream::println;
use grove::error::Result;
use grove::ports::GitPort;

/// Print every worktree with its branch and dirty state.
pub fn run_worktrees(git: &dyn GitPort, script: bool) -> Result<()> {
    let worktrees = git.list_worktrees()?;

    for record in &worktrees {
        let branch = record
            .checked_out_branch
            .as_deref()
            .unwrap_or("(detached)");
        let status = git.status(&record.path)?;
        if script {
            println!(
                "{}\t{}\t{}\t{}",
                record.path.display(),
                branch,
                if record.is_root { "root" } else { "linked" },
                if status.is_dirty() { "dirty" } else { "clean" }
            );
            continue;
        }
        let marker = if record.is_root {
            "root".emphasis()
        } else {
            "    ".to_string()
        };
        let dirty = if status.is_dirty() {
            format!(" ({})", status.describe()).warn()
        } else {
            String::new()
        };
        println!(
            "{marker} {} {}{dirty}",
            branch.accent(),
            record.path.display().muted()
        );
    }
    Ok(())
}
