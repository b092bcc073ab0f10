use cohort_core::Resolved;
use cohort_model::{Decision, Modifier, StepNumber, TaskIndex};
use serde::Serialize;

/// Machine-readable view of one decision, printed on stdout.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionReport<'a> {
    pub index: TaskIndex,
    pub subject: &'a str,
    #[serde(skip_serializing_if = "no_modifiers")]
    pub modifiers: &'a [Modifier],
    pub step: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_number: Option<StepNumber>,
    pub decision: Decision,
    pub host: String,
}

impl<'a> DecisionReport<'a> {
    pub fn new(resolved: &'a Resolved) -> Self {
        Self {
            index: resolved.index,
            subject: resolved.spec.id(),
            modifiers: resolved.spec.modifiers(),
            step: &resolved.step.name,
            step_number: resolved.step.number,
            decision: resolved.decision,
            host: host(),
        }
    }

    /// `<decision> <subject>`; the subject id is what the caller interpolates downstream.
    pub fn to_line(&self) -> String {
        format!("{} {}", self.decision.kind(), self.subject)
    }
}

fn no_modifiers(m: &&[Modifier]) -> bool {
    m.is_empty()
}

pub fn host() -> String {
    hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| "unknown-host".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cohort_core::{MemoryLedger, SubjectList, Worker};
    use cohort_model::StepContext;

    fn resolved(line: &str, label: &str) -> Resolved {
        let list = SubjectList::from_text("subjects.txt", line);
        Worker::new(list, StepContext::resolve(label), MemoryLedger::new())
            .resolve(0)
            .unwrap()
    }

    #[test]
    fn line_format() {
        let r = resolved("103:force", "04-x");
        assert_eq!(DecisionReport::new(&r).to_line(), "force-run 103");
    }

    #[test]
    fn json_shape() {
        let r = resolved("102:step1", "04-x");
        let json = serde_json::to_value(DecisionReport::new(&r)).unwrap();
        assert_eq!(json["subject"], "102");
        assert_eq!(json["decision"], "notScheduledForStep");
        assert_eq!(json["stepNumber"], 4);
        assert_eq!(json["modifiers"][0]["kind"], "stepOnly");

        let r = resolved("101", "prep");
        let json = serde_json::to_value(DecisionReport::new(&r)).unwrap();
        assert!(json.get("modifiers").is_none());
        assert!(json.get("stepNumber").is_none());
    }
}
