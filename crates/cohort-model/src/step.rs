use serde::{Deserialize, Serialize};

use crate::StepNumber;

/// Identity of the pipeline step being executed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepContext {
    /// Label as handed in by the caller, e.g. `"04-prep-fmriprep"`.
    pub name: String,
    /// Numeric prefix of `name`, if it has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<StepNumber>,
}

impl StepContext {
    /// Extract the step number from a `"<NN>-<name>"` label.
    ///
    /// Never fails. A label without a leading `digits-` prefix (or with an all-zero prefix) yields no number,
    /// which turns step-only filtering off for this invocation.
    pub fn resolve(label: impl Into<String>) -> Self {
        let name = label.into();
        let number = leading_step_number(&name);
        Self { name, number }
    }

    /// Step context with an explicit number, mostly for tests.
    pub fn numbered(name: impl Into<String>, number: u32) -> Self {
        Self {
            name: name.into(),
            number: StepNumber::new(number),
        }
    }
}

fn leading_step_number(label: &str) -> Option<StepNumber> {
    let digits_end = label
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(label.len());
    if digits_end == 0 || !label[digits_end..].starts_with('-') {
        return None;
    }
    label[..digits_end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number_of(label: &str) -> Option<u32> {
        StepContext::resolve(label).number.map(StepNumber::get)
    }

    #[test]
    fn zero_padded_prefix() {
        assert_eq!(number_of("04-prep-fmriprep"), Some(4));
        assert_eq!(number_of("12-qc"), Some(12));
        assert_eq!(number_of("4-x"), Some(4));
    }

    #[test]
    fn no_prefix_means_no_number() {
        assert_eq!(number_of("prep-fmriprep"), None);
        assert_eq!(number_of("04prep"), None);
        assert_eq!(number_of("04"), None);
        assert_eq!(number_of("-04-x"), None);
        assert_eq!(number_of(""), None);
    }

    #[test]
    fn zero_prefix_is_not_a_step() {
        assert_eq!(number_of("00-setup"), None);
    }

    #[test]
    fn name_is_kept_verbatim() {
        let step = StepContext::resolve("04-prep-fmriprep");
        assert_eq!(step.name, "04-prep-fmriprep");
    }
}
