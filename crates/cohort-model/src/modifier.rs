use std::fmt;

use serde::{Deserialize, Serialize};

use crate::StepNumber;

/// Suffix token of a subject-list entry, classified.
///
/// The parser is the only place that looks at raw token text; everything downstream matches on this type.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "value")]
pub enum Modifier {
    /// Exclude the subject from every step.
    Skip,
    /// Run even when the completion ledger already lists the subject.
    Force,
    /// Run the subject only for the given step.
    StepOnly(StepNumber),
    /// Unrecognised token, kept for diagnostics and otherwise inert.
    Unknown(String),
}

impl Modifier {
    /// Short symbolic name, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Modifier::Skip => "skip",
            Modifier::Force => "force",
            Modifier::StepOnly(_) => "step",
            Modifier::Unknown(_) => "unknown",
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Modifier::Skip => f.write_str("skip"),
            Modifier::Force => f.write_str("force"),
            Modifier::StepOnly(n) => write!(f, "step{n}"),
            Modifier::Unknown(token) => f.write_str(token),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_list_syntax() {
        assert_eq!(Modifier::Skip.to_string(), "skip");
        assert_eq!(Modifier::Force.to_string(), "force");
        assert_eq!(Modifier::StepOnly(StepNumber::new(2).unwrap()).to_string(), "step2");
        assert_eq!(Modifier::Unknown("bogus".into()).to_string(), "bogus");
    }

    #[test]
    fn serde_tagged_shape() {
        let json = serde_json::to_string(&Modifier::StepOnly(StepNumber::new(4).unwrap())).unwrap();
        assert_eq!(json, r#"{"kind":"stepOnly","value":4}"#);
        let json = serde_json::to_string(&Modifier::Force).unwrap();
        assert_eq!(json, r#"{"kind":"force"}"#);
    }
}
