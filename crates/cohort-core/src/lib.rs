pub mod error;
pub use error::{CoreError, LedgerError, ListError, ParseError};

pub mod config;
pub use config::WorkerConfig;

pub mod parser;
pub use parser::{Diagnostic, ModifierParser};

pub mod list;
pub use list::SubjectList;

pub mod ledger;
pub use ledger::{FileLedger, Ledger, MemoryLedger};

pub mod engine;
pub use engine::{DecisionEngine, EngineOptions};

pub mod runner;
pub use runner::{RunnerError, StepOutcome, StepRequest, StepRunner};

pub mod worker;
pub use worker::{Execution, PlanEntry, Resolved, Worker};
