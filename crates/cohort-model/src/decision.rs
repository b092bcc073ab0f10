use serde::{Deserialize, Serialize};

/// What the caller should do with one subject for one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Decision {
    /// `skip` modifier: excluded from every step.
    Skip,
    /// `stepN` modifiers exclude the current step.
    NotScheduledForStep,
    /// Completion ledger already lists the subject.
    AlreadyProcessed,
    /// Proceed.
    Run,
    /// Proceed without consulting the ledger.
    ForceRun,
}

impl Decision {
    /// Returns `true` if the caller should execute the step.
    pub fn should_run(&self) -> bool {
        matches!(self, Decision::Run | Decision::ForceRun)
    }

    /// Short symbolic identifier, stable for scripts and logs:
    /// - `"skip"`
    /// - `"not-scheduled"`
    /// - `"already-processed"`
    /// - `"run"`
    /// - `"force-run"`
    pub fn kind(&self) -> &'static str {
        match self {
            Decision::Skip => "skip",
            Decision::NotScheduledForStep => "not-scheduled",
            Decision::AlreadyProcessed => "already-processed",
            Decision::Run => "run",
            Decision::ForceRun => "force-run",
        }
    }
}
