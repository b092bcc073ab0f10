//! Seam between the decision core and whatever executes the pipeline step.
use async_trait::async_trait;
use cohort_model::{Decision, StepContext, SubjectId, WorkDirs};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("invalid step command: {0}")]
    InvalidSpec(String),
    #[error("failed to start step: {0}")]
    Spawn(String),
    #[error("step io error: {0}")]
    Io(String),
}

/// Everything a runner needs to execute one step for one subject.
#[derive(Debug, Clone)]
pub struct StepRequest {
    pub subject: SubjectId,
    pub step: StepContext,
    pub decision: Decision,
    pub workdirs: WorkDirs,
}

/// How a step execution ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Succeeded,
    /// Non-zero exit; `None` when terminated by a signal.
    Failed { code: Option<i32> },
    Cancelled,
}

impl StepOutcome {
    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self, StepOutcome::Succeeded)
    }
}

#[async_trait]
pub trait StepRunner: Send + Sync {
    fn name(&self) -> &'static str;

    /// Execute the step. Must return [`StepOutcome::Cancelled`] once `cancel` fires.
    async fn run(
        &self,
        req: &StepRequest,
        cancel: CancellationToken,
    ) -> Result<StepOutcome, RunnerError>;
}
