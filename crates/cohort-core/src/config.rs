use std::path::PathBuf;

use cohort_model::{DEFAULT_MAX_STEP_NUMBER, WorkDirs};

use crate::{
    engine::{DecisionEngine, EngineOptions},
    error::CoreError,
    ledger::FileLedger,
    parser::ModifierParser,
};

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Subject list, one `subject_id(:modifier)*` entry per line.
    pub list_path: PathBuf,
    /// Completion ledger of the current pipeline stage.
    pub ledger_path: PathBuf,
    /// Label of the step being executed (`"04-prep-fmriprep"`).
    pub step_label: String,
    /// `stepN` modifiers above this are reported (default: 14).
    pub max_step_number: u32,
    /// Honour `force` modifiers (default: true).
    pub allow_force: bool,
    /// Decide only; never execute or touch the ledger.
    pub dry_run: bool,
    /// Passed through to the step command untouched.
    pub workdirs: WorkDirs,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            list_path: PathBuf::from("subjects.txt"),
            ledger_path: PathBuf::from("completed.txt"),
            step_label: String::new(),
            max_step_number: DEFAULT_MAX_STEP_NUMBER,
            allow_force: true,
            dry_run: false,
            workdirs: WorkDirs::default(),
        }
    }
}

impl WorkerConfig {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.list_path.as_os_str().is_empty() {
            return Err(CoreError::Config("subject list path is empty".into()));
        }
        if self.ledger_path.as_os_str().is_empty() {
            return Err(CoreError::Config("ledger path is empty".into()));
        }
        if self.step_label.trim().is_empty() {
            return Err(CoreError::Config("step label is empty".into()));
        }
        if self.max_step_number == 0 {
            return Err(CoreError::Config("maximum step number must be positive".into()));
        }
        Ok(())
    }

    pub fn parser(&self) -> ModifierParser {
        ModifierParser::new(self.max_step_number)
    }

    pub fn engine(&self) -> DecisionEngine {
        DecisionEngine::new(EngineOptions {
            allow_force: self.allow_force,
        })
    }

    pub fn file_ledger(&self) -> FileLedger {
        FileLedger::new(&self.ledger_path)
    }
}
