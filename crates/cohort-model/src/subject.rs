use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{Modifier, StepNumber};

/// One surviving (non-blank, non-comment) line of the subject list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectEntry {
    raw: String,
}

impl SubjectEntry {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    #[inline]
    pub fn raw_text(&self) -> &str {
        &self.raw
    }
}

impl From<&str> for SubjectEntry {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Parsed subject-list entry: the id plus its modifiers in the order they were written.
///
/// Construction goes through the parser in `cohort-core`, which guarantees a non-empty, trimmed id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectSpec {
    id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    modifiers: Vec<Modifier>,
}

impl SubjectSpec {
    /// Callers are expected to have validated `id`; see `ModifierParser`.
    pub fn new(id: impl Into<String>, modifiers: Vec<Modifier>) -> Self {
        Self {
            id: id.into(),
            modifiers,
        }
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[inline]
    pub fn modifiers(&self) -> &[Modifier] {
        &self.modifiers
    }

    pub fn has_skip(&self) -> bool {
        self.modifiers.contains(&Modifier::Skip)
    }

    pub fn has_force(&self) -> bool {
        self.modifiers.contains(&Modifier::Force)
    }

    /// Steps named by `stepN` modifiers. Empty means "every step".
    pub fn step_only(&self) -> BTreeSet<StepNumber> {
        self.modifiers
            .iter()
            .filter_map(|m| match m {
                Modifier::StepOnly(n) => Some(*n),
                _ => None,
            })
            .collect()
    }
}
