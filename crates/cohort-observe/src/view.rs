use cohort_model::{Decision, StepContext, SubjectSpec, TaskIndex};
use tracing::{info, warn};

#[inline]
pub fn message_for(decision: Decision) -> &'static str {
    match decision {
        Decision::Skip => "subject marked skip; excluded from all steps",
        Decision::NotScheduledForStep => "subject not scheduled for this step",
        Decision::AlreadyProcessed => "subject already processed; skipping",
        Decision::Run => "subject scheduled to run",
        Decision::ForceRun => "forced rerun; completion ledger bypassed",
    }
}

/// One log line per decision, at a level matching how unusual the outcome is.
pub fn log_decision(index: TaskIndex, spec: &SubjectSpec, step: &StepContext, decision: Decision) {
    let msg = message_for(decision);
    let subject = spec.id();
    let step = step.name.as_str();
    let kind = decision.kind();

    match decision {
        Decision::ForceRun => warn!(target: "cohort.decision", index, subject, step, decision = kind, "{msg}"),
        Decision::Skip
        | Decision::NotScheduledForStep
        | Decision::AlreadyProcessed
        | Decision::Run => info!(target: "cohort.decision", index, subject, step, decision = kind, "{msg}"),
    }
}
