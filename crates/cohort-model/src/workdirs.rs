use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Directories resolved by the surrounding environment.
///
/// Cohort never interprets these; they are forwarded to the step command as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkDirs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logs: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scratch: Option<PathBuf>,
    /// Container image file or reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<PathBuf>,
}
