//! Land command - land the current stack's pull requests bottom-up

use crate::cli::context::CommandContext;
use crate::cli::style::{arrow, check, spinner_style, Stylize};
use anstream::println;
use dialoguer::Confirm;
use grove::error::{Error, Result};
use grove::land::{execute_land, LandEvent, LandOutcome, ProgressSink};
use grove::validate::{validate, ValidatedPlan};
use indicatif::ProgressBar;
use std::time::Duration;

/// Options for the land command
#[derive(Debug, Clone, Copy, Default)]
pub struct LandOptions {
    /// Skip the confirmation prompt
    pub force: bool,
    /// Traverse every phase but record mutations instead of performing them
    pub dry_run: bool,
    /// Land only the current branch and its ancestors (downstack mode)
    pub down: bool,
    /// Machine-oriented output: no prompts, no styling frames
    pub script: bool,
}

/// Run the land command
pub async fn run_land(ctx: &CommandContext, options: LandOptions) -> Result<()> {
    // =========================================================================
    // Phase 1: VALIDATE - read-only go/no-go decision
    // =========================================================================

    let spinner = (!options.script).then(|| {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(spinner_style());
        spinner.set_message("Validating stack...");
        spinner.enable_steady_tick(Duration::from_millis(80));
        spinner
    });

    let validated = validate(
        ctx.git.as_ref(),
        ctx.stack.as_ref(),
        ctx.github.as_ref(),
        &ctx.invoked_from,
        options.down,
    )
    .await;

    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let validated = validated?;

    for warning in &validated.warnings {
        println!("{} {}", "warning:".warn(), warning);
    }

    print_plan(&validated, options);

    // =========================================================================
    // Phase 2: CONFIRM
    // =========================================================================

    if !options.force && !options.dry_run && !options.script {
        let count = validated.plan.len();
        let prompt = format!("Land {count} PR{}?", if count == 1 { "" } else { "s" });
        if !Confirm::new()
            .with_prompt(prompt)
            .default(true)
            .interact()
            .map_err(|e| Error::Internal(format!("failed to read confirmation: {e}")))?
        {
            println!("{}", "Aborted".muted());
            return Ok(());
        }
        println!();
    }

    // =========================================================================
    // Phase 3: EXECUTE - the landing state machine
    // =========================================================================

    let progress = CliProgress {
        script: options.script,
    };
    let outcome = execute_land(
        &validated,
        ctx.stack.as_ref(),
        ctx.github.as_ref(),
        &progress,
    )
    .await?;

    if options.dry_run {
        print_dry_run(ctx);
    }

    print_summary(&outcome, options);

    match outcome.failed {
        None => Ok(()),
        Some(step) => Err(Error::ExecutionFailed {
            branch: step.branch,
            phase: step.phase.to_string(),
            message: step.message,
        }),
    }
}

/// Progress sink rendering executor events as they happen.
struct CliProgress {
    script: bool,
}

impl ProgressSink for CliProgress {
    fn on_event(&self, event: LandEvent) {
        if self.script {
            print_script_event(&event);
            return;
        }
        match event {
            LandEvent::Landing {
                branch,
                pr_number,
                position,
                total,
            } => {
                println!(
                    "{} {} (PR #{pr_number}, {position}/{total})",
                    "Landing".emphasis(),
                    branch.accent()
                );
            }
            LandEvent::BaseCorrected {
                pr_number,
                old_base,
                new_base,
            } => {
                println!(
                    "  {} PR #{pr_number} base: {} {} {}",
                    "↪".accent(),
                    old_base.muted(),
                    arrow(),
                    new_base.accent()
                );
            }
            LandEvent::BaseAlreadyCorrect { .. } => {}
            LandEvent::Merged {
                branch, pr_number, sha,
            } => {
                let sha = sha.as_deref().unwrap_or("(no sha)");
                println!(
                    "  {} merged {} (PR #{pr_number}, {})",
                    check(),
                    branch.accent(),
                    sha.muted()
                );
            }
            LandEvent::SuggestSync { command } => {
                println!("  {} run '{}' to resync local branches", "hint:".muted(), command.emphasis());
            }
            LandEvent::Repushed { branch } => {
                println!("  {} re-pushed {}", check(), branch.accent());
            }
        }
    }
}

fn print_script_event(event: &LandEvent) {
    match event {
        LandEvent::Landing {
            branch, pr_number, ..
        } => println!("landing\t{branch}\t{pr_number}"),
        LandEvent::BaseCorrected {
            pr_number,
            old_base,
            new_base,
        } => println!("base-corrected\t{pr_number}\t{old_base}\t{new_base}"),
        LandEvent::BaseAlreadyCorrect { pr_number, base } => {
            println!("base-ok\t{pr_number}\t{base}");
        }
        LandEvent::Merged {
            branch, pr_number, ..
        } => println!("merged\t{branch}\t{pr_number}"),
        LandEvent::SuggestSync { command } => println!("suggest-sync\t{command}"),
        LandEvent::Repushed { branch } => println!("repushed\t{branch}"),
    }
}

fn print_plan(validated: &ValidatedPlan, options: LandOptions) {
    if options.script {
        for branch in validated.plan.branches() {
            if let Some(pr) = validated.pull_requests.get(branch) {
                println!("plan\t{branch}\t{}", pr.number);
            }
        }
        return;
    }
    println!("{}:", "Landing plan".emphasis());
    for branch in validated.plan.branches() {
        if let Some(pr) = validated.pull_requests.get(branch) {
            println!(
                "  {} {} {} PR #{}: {}",
                arrow(),
                branch.accent(),
                "·".muted(),
                pr.number,
                pr.title.muted()
            );
        }
    }
    println!();
}

fn print_dry_run(ctx: &CommandContext) {
    let Some(ref log) = ctx.mutation_log else {
        return;
    };
    println!();
    println!("{}:", "Dry run - recorded intents".emphasis());
    if log.is_empty() {
        println!("  {}", "nothing to do".muted());
    }
    for entry in log.entries() {
        println!("  {} {entry}", arrow());
    }
}

fn print_summary(outcome: &LandOutcome, options: LandOptions) {
    if options.script {
        return;
    }
    println!();
    if outcome.is_success() {
        if options.dry_run {
            println!("{}", "Dry run complete".muted());
        } else {
            println!(
                "{} Landed {} branch{}",
                check(),
                outcome.landed.len().accent(),
                if outcome.landed.len() == 1 { "" } else { "es" }
            );
            println!(
                "{} Run '{}' to rebase local branches onto the new trunk.",
                "hint:".muted(),
                outcome.sync_hint.emphasis()
            );
        }
        return;
    }

    // Partial completion: name exactly what landed and what remains, plus the
    // manual steps to finish.
    println!("{}", "Landing partially complete".warn());
    if !outcome.landed.is_empty() {
        println!("  landed:    {}", outcome.landed.join(", ").accent());
    }
    if !outcome.remaining.is_empty() {
        println!("  remaining: {}", outcome.remaining.join(", ").warn());
    }
    if let Some(ref step) = outcome.failed {
        println!(
            "  failed at: {} during {} {}",
            step.branch.failure(),
            step.phase,
            format!("({})", step.message).muted()
        );
    }
    println!();
    println!("{}", "To finish manually:".emphasis());
    println!("  1. {} - rebase the remaining stack onto trunk", outcome.sync_hint.emphasis());
    println!("  2. re-run '{}' from the remaining branch", "grove land".emphasis());
}
