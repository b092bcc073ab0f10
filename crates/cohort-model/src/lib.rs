//! Data types shared by every cohort crate.
//!
//! Nothing in here touches the filesystem: a raw subject-list line becomes a [`SubjectEntry`], the parser in `cohort-core` turns it into a [`SubjectSpec`],
//! and the decision engine combines that with a [`StepContext`] to produce a [`Decision`].
mod constants;
pub use constants::{COMMENT_MARKER, DEFAULT_MAX_STEP_NUMBER, MODIFIER_SEPARATOR, STEP_MODIFIER_PREFIX};

mod step_number;
pub use step_number::{StepNumber, StepNumberError};

mod modifier;
pub use modifier::Modifier;

mod subject;
pub use subject::{SubjectEntry, SubjectSpec};

mod step;
pub use step::StepContext;

mod decision;
pub use decision::Decision;

mod workdirs;
pub use workdirs::WorkDirs;

/// Zero-based index handed out by the batch scheduler (one per array task).
pub type TaskIndex = usize;

/// Subject identifier as written in the subject list and the completion ledger.
pub type SubjectId = String;
