//! One batch-array task: index → entry → spec → decision → (run) → ledger.
use cohort_model::{Decision, StepContext, SubjectEntry, SubjectSpec, TaskIndex, WorkDirs};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::{
    config::WorkerConfig,
    engine::DecisionEngine,
    error::CoreError,
    ledger::Ledger,
    list::SubjectList,
    parser::ModifierParser,
    runner::{StepOutcome, StepRequest, StepRunner},
};

/// Everything known about one index before anything is executed.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub index: TaskIndex,
    pub entry: SubjectEntry,
    pub spec: SubjectSpec,
    pub step: StepContext,
    pub decision: Decision,
}

/// Result of [`Worker::execute`].
#[derive(Debug, Clone)]
pub struct Execution {
    pub resolved: Resolved,
    /// `None` when the step was not executed (decision or dry run).
    pub outcome: Option<StepOutcome>,
    /// Whether the subject was appended to the ledger.
    pub recorded: bool,
}

/// One line of [`Worker::plan`].
#[derive(Debug)]
pub struct PlanEntry {
    pub index: TaskIndex,
    pub entry: SubjectEntry,
    pub result: Result<(SubjectSpec, Decision), CoreError>,
}

pub struct Worker<L> {
    list: SubjectList,
    step: StepContext,
    parser: ModifierParser,
    engine: DecisionEngine,
    ledger: L,
    workdirs: WorkDirs,
    dry_run: bool,
}

impl<L: Ledger> Worker<L> {
    pub fn new(list: SubjectList, step: StepContext, ledger: L) -> Self {
        Self {
            list,
            step,
            parser: ModifierParser::default(),
            engine: DecisionEngine::default(),
            ledger,
            workdirs: WorkDirs::default(),
            dry_run: false,
        }
    }

    /// Validate `cfg`, load its subject list and resolve its step label.
    pub fn from_config(cfg: &WorkerConfig, ledger: L) -> Result<Self, CoreError> {
        cfg.validate()?;
        let list = SubjectList::load(&cfg.list_path)?;
        Ok(Self::new(list, StepContext::resolve(cfg.step_label.clone()), ledger)
            .with_parser(cfg.parser())
            .with_engine(cfg.engine())
            .with_workdirs(cfg.workdirs.clone())
            .with_dry_run(cfg.dry_run))
    }

    pub fn with_parser(mut self, parser: ModifierParser) -> Self {
        self.parser = parser;
        self
    }

    pub fn with_engine(mut self, engine: DecisionEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_workdirs(mut self, workdirs: WorkDirs) -> Self {
        self.workdirs = workdirs;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    #[inline]
    pub fn list(&self) -> &SubjectList {
        &self.list
    }

    #[inline]
    pub fn step(&self) -> &StepContext {
        &self.step
    }

    #[inline]
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Map `index` to a subject and decide. Parse errors abort before the ledger is read.
    #[instrument(level = "debug", target = "cohort.core.worker", skip(self), fields(step = %self.step.name))]
    pub fn resolve(&self, index: TaskIndex) -> Result<Resolved, CoreError> {
        let entry = self.list.entry(index)?.clone();
        let spec = self.parser.parse_entry(&entry)?;
        let decision = self.engine.decide(&spec, &self.step, &self.ledger)?;
        debug!(target: "cohort.core.worker", subject = spec.id(), decision = decision.kind(), "resolved");

        Ok(Resolved {
            index,
            entry,
            spec,
            step: self.step.clone(),
            decision,
        })
    }

    /// Decision for every entry of the list, without executing anything.
    pub fn plan(&self) -> Vec<PlanEntry> {
        self.list
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                let result = self
                    .parser
                    .parse_entry(entry)
                    .map_err(CoreError::from)
                    .and_then(|spec| {
                        let decision = self.engine.decide(&spec, &self.step, &self.ledger)?;
                        Ok((spec, decision))
                    });
                PlanEntry {
                    index,
                    entry: entry.clone(),
                    result,
                }
            })
            .collect()
    }

    /// Resolve `index` and, when scheduled, run the step and record completion.
    ///
    /// The ledger is appended only after a successful run; failures and cancellation leave it untouched
    /// so the subject is picked up again on the next pass.
    pub async fn execute<R>(
        &self,
        index: TaskIndex,
        runner: &R,
        cancel: CancellationToken,
    ) -> Result<Execution, CoreError>
    where
        R: StepRunner + ?Sized,
    {
        let resolved = self.resolve(index)?;
        self.run_resolved(resolved, runner, cancel).await
    }

    /// Second half of [`Worker::execute`], for callers that want to report the decision before running.
    pub async fn run_resolved<R>(
        &self,
        resolved: Resolved,
        runner: &R,
        cancel: CancellationToken,
    ) -> Result<Execution, CoreError>
    where
        R: StepRunner + ?Sized,
    {
        if !resolved.decision.should_run() || self.dry_run {
            if self.dry_run && resolved.decision.should_run() {
                info!(target: "cohort.core.worker", subject = resolved.spec.id(), "dry run; step not executed");
            }
            return Ok(Execution {
                resolved,
                outcome: None,
                recorded: false,
            });
        }

        let req = StepRequest {
            subject: resolved.spec.id().to_string(),
            step: resolved.step.clone(),
            decision: resolved.decision,
            workdirs: self.workdirs.clone(),
        };
        debug!(target: "cohort.core.worker", runner = runner.name(), subject = %req.subject, "starting step");
        let outcome = runner.run(&req, cancel).await?;

        let recorded = if outcome.is_success() {
            self.ledger.append(resolved.spec.id())?;
            true
        } else {
            warn!(
                target: "cohort.core.worker",
                subject = %req.subject,
                ?outcome,
                "step did not complete; ledger left untouched"
            );
            false
        };

        Ok(Execution {
            resolved,
            outcome: Some(outcome),
            recorded,
        })
    }
}
