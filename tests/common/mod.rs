//! Shared test fixtures

#![allow(dead_code)]

pub mod fakes;

pub use fakes::{FakeGit, FakeGithub, FakeStack, MergePrCall, UpdateBaseCall};

use grove::land::{LandEvent, ProgressSink};
use grove::resolver::BranchTree;
use grove::types::BranchNode;
use std::sync::Mutex;

/// Build a linear tree main -> names[0] -> names[1] -> ...
pub fn linear_tree(names: &[&str]) -> BranchTree {
    let mut nodes = vec![BranchNode::trunk("main", "sha-main")];
    let mut parent = "main".to_string();
    for name in names {
        nodes.push(BranchNode::tracked(
            *name,
            parent.clone(),
            format!("sha-{name}"),
        ));
        parent = (*name).to_string();
    }
    BranchTree::new(nodes).expect("fixture tree is well-formed")
}

/// A world with one root worktree on trunk and one linked worktree holding
/// the given branch; returns the fakes plus the linked worktree path.
pub fn stack_world(
    stack: &[&str],
    current: &str,
) -> (FakeGit, FakeStack, FakeGithub, &'static str) {
    let git = FakeGit::new();
    git.add_worktree("/repo", Some("main"), true);
    git.add_worktree("/repo/.wt/dev", Some(current), false);

    let stack_port = FakeStack::new(linear_tree(stack));

    let github = FakeGithub::new();
    let mut base = "main".to_string();
    for (i, branch) in stack.iter().enumerate() {
        github.add_open_pr(100 + i as u64, branch, &base);
        base = (*branch).to_string();
    }

    (git, stack_port, github, "/repo/.wt/dev")
}

/// Event sink that collects everything for assertions.
#[derive(Default)]
pub struct CollectingSink {
    events: Mutex<Vec<LandEvent>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<LandEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl ProgressSink for CollectingSink {
    fn on_event(&self, event: LandEvent) {
        self.events.lock().unwrap().push(event);
    }
}
