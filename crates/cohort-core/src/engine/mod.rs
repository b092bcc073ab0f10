//! Four-way run decision for one subject and one step.
//!
//! Precedence, highest first: `skip`, step eligibility, `force`, ledger lookup, run.
use cohort_model::{Decision, StepContext, SubjectSpec};
use tracing::{debug, warn};

use crate::{error::LedgerError, ledger::Ledger};

#[derive(Debug, Clone, Copy)]
pub struct EngineOptions {
    /// When `false`, `force` modifiers are ignored and the ledger is always consulted.
    pub allow_force: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self { allow_force: true }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DecisionEngine {
    opts: EngineOptions,
}

impl DecisionEngine {
    pub fn new(opts: EngineOptions) -> Self {
        Self { opts }
    }

    #[inline]
    pub fn options(&self) -> EngineOptions {
        self.opts
    }

    /// Decide what to do with `spec` for `step`.
    ///
    /// The result depends only on the arguments and the ledger contents at call time.
    /// The only possible error is a failed ledger read.
    pub fn decide<L>(
        &self,
        spec: &SubjectSpec,
        step: &StepContext,
        ledger: &L,
    ) -> Result<Decision, LedgerError>
    where
        L: Ledger + ?Sized,
    {
        if spec.has_skip() {
            return Ok(Decision::Skip);
        }

        let steps = spec.step_only();
        if !steps.is_empty() {
            match step.number {
                Some(current) if !steps.contains(&current) => {
                    return Ok(Decision::NotScheduledForStep);
                }
                Some(_) => {}
                None => debug!(
                    target: "cohort.core.engine",
                    subject = spec.id(),
                    step = %step.name,
                    "step label has no numeric prefix; step modifiers not applied"
                ),
            }
        }

        if spec.has_force() {
            if self.opts.allow_force {
                return Ok(Decision::ForceRun);
            }
            warn!(
                target: "cohort.core.engine",
                subject = spec.id(),
                "force modifier ignored: forced reprocessing is disabled"
            );
        }

        if ledger.contains(spec.id())? {
            return Ok(Decision::AlreadyProcessed);
        }
        Ok(Decision::Run)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ledger::MemoryLedger, parser::ModifierParser};

    fn spec(raw: &str) -> SubjectSpec {
        ModifierParser::default().parse(raw).unwrap()
    }

    fn decide(raw: &str, step: &StepContext, ledger: &MemoryLedger) -> Decision {
        DecisionEngine::default()
            .decide(&spec(raw), step, ledger)
            .unwrap()
    }

    #[test]
    fn plain_subject_runs() {
        let step = StepContext::resolve("04-x");
        assert_eq!(decide("101", &step, &MemoryLedger::new()), Decision::Run);
    }

    #[test]
    fn ledger_hit_is_already_processed() {
        let step = StepContext::resolve("04-x");
        let ledger = MemoryLedger::with_entries(["101"]);
        assert_eq!(decide("101", &step, &ledger), Decision::AlreadyProcessed);
    }

    #[test]
    fn force_bypasses_ledger() {
        let step = StepContext::resolve("04-x");
        let ledger = MemoryLedger::with_entries(["104"]);
        assert_eq!(decide("104:force", &step, &ledger), Decision::ForceRun);
        assert_eq!(decide("104:force", &step, &MemoryLedger::new()), Decision::ForceRun);
    }

    #[test]
    fn skip_wins_over_everything() {
        let ledger = MemoryLedger::with_entries(["106"]);
        for label in ["04-x", "02-y", "no-number"] {
            let step = StepContext::resolve(label);
            assert_eq!(decide("106:skip:force", &step, &ledger), Decision::Skip);
            assert_eq!(decide("106:force:skip", &step, &MemoryLedger::new()), Decision::Skip);
            assert_eq!(decide("106:step2:skip", &step, &ledger), Decision::Skip);
        }
    }

    #[test]
    fn step_only_matches_current_step() {
        let ledger = MemoryLedger::new();
        assert_eq!(decide("105:step2", &StepContext::numbered("02-a", 2), &ledger), Decision::Run);
        assert_eq!(
            decide("105:step2", &StepContext::numbered("03-b", 3), &ledger),
            Decision::NotScheduledForStep
        );
    }

    #[test]
    fn several_step_modifiers_form_a_set() {
        let ledger = MemoryLedger::new();
        let raw = "105:step2:step5";
        assert_eq!(decide(raw, &StepContext::resolve("05-x"), &ledger), Decision::Run);
        assert_eq!(decide(raw, &StepContext::resolve("02-x"), &ledger), Decision::Run);
        assert_eq!(
            decide(raw, &StepContext::resolve("04-x"), &ledger),
            Decision::NotScheduledForStep
        );
    }

    #[test]
    fn step_eligibility_beats_force() {
        let ledger = MemoryLedger::new();
        let step = StepContext::resolve("03-x");
        assert_eq!(decide("105:step2:force", &step, &ledger), Decision::NotScheduledForStep);

        let step = StepContext::resolve("02-x");
        assert_eq!(decide("105:step2:force", &step, &ledger), Decision::ForceRun);
    }

    #[test]
    fn unnumbered_step_fails_open() {
        let step = StepContext::resolve("prep-fmriprep");
        assert_eq!(decide("105:step2", &step, &MemoryLedger::new()), Decision::Run);

        let ledger = MemoryLedger::with_entries(["105"]);
        assert_eq!(decide("105:step2", &step, &ledger), Decision::AlreadyProcessed);
    }

    #[test]
    fn unknown_modifier_is_inert() {
        let step = StepContext::resolve("04-x");
        assert_eq!(decide("109:bogus", &step, &MemoryLedger::new()), Decision::Run);

        let ledger = MemoryLedger::with_entries(["109"]);
        assert_eq!(decide("109:bogus", &step, &ledger), Decision::AlreadyProcessed);
    }

    #[test]
    fn force_can_be_disabled_globally() {
        let engine = DecisionEngine::new(EngineOptions { allow_force: false });
        let step = StepContext::resolve("04-x");

        let ledger = MemoryLedger::with_entries(["104"]);
        let decision = engine.decide(&spec("104:force"), &step, &ledger).unwrap();
        assert_eq!(decision, Decision::AlreadyProcessed);

        let decision = engine
            .decide(&spec("104:force"), &step, &MemoryLedger::new())
            .unwrap();
        assert_eq!(decision, Decision::Run);

        let decision = engine.decide(&spec("104:force:skip"), &step, &ledger).unwrap();
        assert_eq!(decision, Decision::Skip);
    }

    #[test]
    fn same_inputs_same_decision() {
        let engine = DecisionEngine::default();
        let step = StepContext::resolve("04-x");
        let ledger = MemoryLedger::with_entries(["101"]);
        for raw in ["101", "102", "103:force", "104:step4", "105:step3", "106:skip"] {
            let spec = spec(raw);
            let first = engine.decide(&spec, &step, &ledger).unwrap();
            let second = engine.decide(&spec, &step, &ledger).unwrap();
            assert_eq!(first, second, "{raw}");
        }
    }
}
