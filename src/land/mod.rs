//! Stacked-PR landing: plan and executor

pub mod execute;
pub mod plan;

pub use execute::{
    execute_land, FailedStep, LandEvent, LandOutcome, LandPhase, ProgressSink, SilentSink,
};
pub use plan::{ExecutionState, LandingPlan};
