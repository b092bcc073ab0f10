//! Subject-list entry grammar: `subject_id(:modifier)*`.
//!
//! The first colon-delimited segment is the subject id; every later non-empty segment is a modifier token.
//! Tokens are classified into [`Modifier`] here and nowhere else.
use std::fmt;

use cohort_model::{
    DEFAULT_MAX_STEP_NUMBER, MODIFIER_SEPARATOR, Modifier, STEP_MODIFIER_PREFIX, StepNumber,
    SubjectEntry, SubjectSpec,
};
use tracing::warn;

use crate::error::ParseError;

/// Non-fatal finding produced while parsing an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Token did not match any known modifier; it is kept as [`Modifier::Unknown`] and ignored.
    UnknownModifier { token: String },
    /// `stepN` with `N` above the configured maximum; still recorded.
    StepAboveMaximum { step: StepNumber, max: u32 },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnknownModifier { token } => {
                write!(f, "unknown modifier {token:?} ignored")
            }
            Diagnostic::StepAboveMaximum { step, max } => {
                write!(f, "step modifier step{step} exceeds maximum step number {max}")
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ModifierParser {
    max_step: u32,
}

impl Default for ModifierParser {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_STEP_NUMBER)
    }
}

impl ModifierParser {
    pub fn new(max_step: u32) -> Self {
        Self { max_step }
    }

    #[inline]
    pub fn max_step(&self) -> u32 {
        self.max_step
    }

    /// Parse an entry, logging every diagnostic as a warning.
    pub fn parse(&self, raw: &str) -> Result<SubjectSpec, ParseError> {
        let (spec, diagnostics) = self.parse_with_diagnostics(raw)?;
        for d in &diagnostics {
            warn!(target: "cohort.core.parser", subject = spec.id(), "{d}");
        }
        Ok(spec)
    }

    pub fn parse_entry(&self, entry: &SubjectEntry) -> Result<SubjectSpec, ParseError> {
        self.parse(entry.raw_text())
    }

    /// Parse an entry and hand the diagnostics back instead of logging them.
    pub fn parse_with_diagnostics(
        &self,
        raw: &str,
    ) -> Result<(SubjectSpec, Vec<Diagnostic>), ParseError> {
        let mut segments = raw.split(MODIFIER_SEPARATOR);

        let id = segments.next().unwrap_or_default().trim();
        if id.is_empty() {
            return Err(ParseError::InvalidSubject {
                raw: raw.to_string(),
            });
        }

        let mut modifiers = Vec::new();
        let mut diagnostics = Vec::new();
        for token in segments.map(str::trim).filter(|t| !t.is_empty()) {
            let modifier = self.classify(token, &mut diagnostics);
            modifiers.push(modifier);
        }

        Ok((SubjectSpec::new(id, modifiers), diagnostics))
    }

    fn classify(&self, token: &str, diagnostics: &mut Vec<Diagnostic>) -> Modifier {
        match token {
            "skip" => return Modifier::Skip,
            "force" => return Modifier::Force,
            _ => {}
        }

        if let Some(digits) = token.strip_prefix(STEP_MODIFIER_PREFIX)
            && let Ok(step) = digits.parse::<StepNumber>()
        {
            if step.get() > self.max_step {
                diagnostics.push(Diagnostic::StepAboveMaximum {
                    step,
                    max: self.max_step,
                });
            }
            return Modifier::StepOnly(step);
        }

        diagnostics.push(Diagnostic::UnknownModifier {
            token: token.to_string(),
        });
        Modifier::Unknown(token.to_string())
    }
}
