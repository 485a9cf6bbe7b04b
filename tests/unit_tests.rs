//! Unit tests for grove's validation and planning modules

mod common;

mod validator_test {
    use crate::common::{stack_world, FakeGit, FakeGithub, FakeStack, linear_tree};
    use grove::error::Error;
    use grove::types::{Mergeability, PrState, PullRequestRecord, WorktreeStatus};
    use grove::validate::validate;
    use std::path::Path;

    #[tokio::test]
    async fn passes_for_clean_stack() {
        let (git, stack, github, cwd) = stack_world(&["feat-1", "feat-2"], "feat-2");
        let validated = validate(&git, &stack, &github, Path::new(cwd), false)
            .await
            .unwrap();
        assert_eq!(validated.plan.branches(), ["feat-1", "feat-2"]);
        assert!(validated.warnings.is_empty());
        assert_eq!(validated.pull_requests.len(), 2);
    }

    #[tokio::test]
    async fn integration_disabled_is_checked_first() {
        let (git, stack, github, cwd) = stack_world(&["feat-1"], "feat-1");
        stack.set_enabled(false);
        // Even with a dirty worktree, the integration check fires first.
        git.set_status(
            cwd,
            WorktreeStatus {
                modified: 1,
                ..Default::default()
            },
        );
        let err = validate(&git, &stack, &github, Path::new(cwd), false)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::IntegrationDisabled));
    }

    #[tokio::test]
    async fn detached_head_fails() {
        let git = FakeGit::new();
        git.add_worktree("/repo", Some("main"), true);
        git.add_worktree("/repo/.wt/dev", None, false);
        let stack = FakeStack::new(linear_tree(&["feat-1"]));
        let github = FakeGithub::new();
        let err = validate(&git, &stack, &github, Path::new("/repo/.wt/dev"), false)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DetachedHead));
    }

    #[tokio::test]
    async fn dirty_worktree_fails_with_description() {
        let (git, stack, github, cwd) = stack_world(&["feat-1"], "feat-1");
        git.set_status(
            cwd,
            WorktreeStatus {
                staged: 2,
                untracked: 1,
                ..Default::default()
            },
        );
        let err = validate(&git, &stack, &github, Path::new(cwd), false)
            .await
            .unwrap_err();
        match err {
            Error::DirtyWorktree(desc) => {
                assert!(desc.contains("2 staged"));
                assert!(desc.contains("1 untracked"));
            }
            other => panic!("expected DirtyWorktree, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn dirty_unrelated_worktree_does_not_fail() {
        let (git, stack, github, cwd) = stack_world(&["feat-1"], "feat-1");
        // Only the invoking worktree's status matters.
        git.set_status(
            "/repo",
            WorktreeStatus {
                modified: 5,
                ..Default::default()
            },
        );
        assert!(validate(&git, &stack, &github, Path::new(cwd), false)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn landing_trunk_fails() {
        let git = FakeGit::new();
        git.add_worktree("/repo", Some("main"), true);
        git.add_worktree("/repo/.wt/dev", Some("main"), false);
        let stack = FakeStack::new(linear_tree(&["feat-1"]));
        let github = FakeGithub::new();
        let err = validate(&git, &stack, &github, Path::new("/repo/.wt/dev"), false)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::CannotLandTrunk(name) if name == "main"));
    }

    #[tokio::test]
    async fn untracked_branch_fails() {
        let git = FakeGit::new();
        git.add_worktree("/repo", Some("main"), true);
        git.add_worktree("/repo/.wt/dev", Some("rogue"), false);
        let stack = FakeStack::new(linear_tree(&["feat-1"]));
        let github = FakeGithub::new();
        let err = validate(&git, &stack, &github, Path::new("/repo/.wt/dev"), false)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::BranchNotTracked(name) if name == "rogue"));
    }

    #[tokio::test]
    async fn plan_branch_in_other_worktree_fails() {
        let (git, stack, github, cwd) = stack_world(&["feat-1", "feat-2"], "feat-2");
        git.add_worktree("/repo/.wt/other", Some("feat-1"), false);
        let err = validate(&git, &stack, &github, Path::new(cwd), false)
            .await
            .unwrap_err();
        match err {
            Error::WorktreeConflict(conflicts) => {
                assert_eq!(conflicts.len(), 1);
                assert_eq!(conflicts[0].0, "feat-1");
                assert_eq!(conflicts[0].1, "/repo/.wt/other");
            }
            other => panic!("expected WorktreeConflict, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_pr_fails() {
        let (git, stack, _github, cwd) = stack_world(&["feat-1", "feat-2"], "feat-2");
        let github = FakeGithub::new();
        github.add_open_pr(100, "feat-1", "main");
        // feat-2 has no PR at all.
        let err = validate(&git, &stack, &github, Path::new(cwd), false)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NoPullRequest(branch) if branch == "feat-2"));
    }

    #[tokio::test]
    async fn closed_pr_fails() {
        let (git, stack, github, cwd) = stack_world(&["feat-1", "feat-2"], "feat-2");
        github.add_pr(PullRequestRecord {
            number: 101,
            title: "Change for feat-2".to_string(),
            state: PrState::Closed,
            base_branch: "feat-1".to_string(),
            head_branch: "feat-2".to_string(),
            mergeability: Mergeability::Mergeable,
            merge_state: None,
        });
        let err = validate(&git, &stack, &github, Path::new(cwd), false)
            .await
            .unwrap_err();
        match err {
            Error::PullRequestClosed(branch, state) => {
                assert_eq!(branch, "feat-2");
                assert_eq!(state, "closed");
            }
            other => panic!("expected PullRequestClosed, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn conflicting_pr_fails_regardless_of_position() {
        // Conflict in the middle of a three-branch plan.
        let (git, stack, github, cwd) =
            stack_world(&["feat-1", "feat-2", "feat-3"], "feat-3");
        github.set_mergeability(101, Mergeability::Conflicting);
        let err = validate(&git, &stack, &github, Path::new(cwd), false)
            .await
            .unwrap_err();
        match err {
            Error::MergeConflict(pr_number, branch) => {
                assert_eq!(pr_number, 101);
                assert_eq!(branch, "feat-2");
            }
            other => panic!("expected MergeConflict, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_pr_is_reported_before_a_conflict_lower_in_the_plan() {
        let (git, stack, _github, cwd) =
            stack_world(&["feat-1", "feat-2", "feat-3"], "feat-3");
        let github = FakeGithub::new();
        github.add_open_pr(100, "feat-1", "main");
        github.add_open_pr(101, "feat-2", "feat-1");
        github.set_mergeability(100, Mergeability::Conflicting);
        // feat-3 has no PR; that wins over feat-1's conflict.
        let err = validate(&git, &stack, &github, Path::new(cwd), false)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NoPullRequest(branch) if branch == "feat-3"));
    }

    #[tokio::test]
    async fn unknown_mergeability_is_a_soft_warning() {
        let (git, stack, github, cwd) = stack_world(&["feat-1", "feat-2"], "feat-2");
        github.set_mergeability(100, Mergeability::Unknown);
        let validated = validate(&git, &stack, &github, Path::new(cwd), false)
            .await
            .unwrap();
        assert_eq!(validated.warnings.len(), 1);
        assert!(validated.warnings[0].contains("PR #100"));
        assert!(validated.warnings[0].contains("feat-1"));
    }

    #[tokio::test]
    async fn downstack_restricts_plan() {
        let (git, stack, github, cwd) =
            stack_world(&["feat-1", "feat-2", "feat-3"], "feat-2");
        let validated = validate(&git, &stack, &github, Path::new(cwd), true)
            .await
            .unwrap();
        assert_eq!(validated.plan.branches(), ["feat-1", "feat-2"]);
    }

    #[tokio::test]
    async fn leaf_plan_covers_whole_stack() {
        let (git, stack, github, cwd) =
            stack_world(&["feat-1", "feat-2", "feat-3", "feat-4"], "feat-4");
        let validated = validate(&git, &stack, &github, Path::new(cwd), false)
            .await
            .unwrap();
        assert_eq!(
            validated.plan.branches(),
            ["feat-1", "feat-2", "feat-3", "feat-4"]
        );
    }

    #[tokio::test]
    async fn validation_performs_no_mutations() {
        let (git, stack, github, cwd) = stack_world(&["feat-1", "feat-2"], "feat-2");
        validate(&git, &stack, &github, Path::new(cwd), false)
            .await
            .unwrap();
        assert!(github.merge_calls().is_empty());
        assert!(github.update_base_calls().is_empty());
        assert!(stack.submit_calls().is_empty());
        assert_eq!(stack.sync_calls(), 0);
        assert!(git.checkout_calls().is_empty());
    }
}
