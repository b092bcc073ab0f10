use std::{io, path::PathBuf};

use cohort_model::TaskIndex;
use thiserror::Error;

use crate::runner::RunnerError;

/// Failure to turn a raw entry into a subject specification.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid subject entry {raw:?}: subject id is empty")]
    InvalidSubject { raw: String },
}

/// Failure to map an array index to a subject-list entry.
#[derive(Debug, Error)]
pub enum ListError {
    #[error("subject list {path} has no eligible entries")]
    EmptyList { path: PathBuf },
    #[error("no subject for array index {index}: list {path} has {len} eligible entries")]
    NotFound {
        index: TaskIndex,
        len: usize,
        path: PathBuf,
    },
    #[error("failed to read subject list {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("completion ledger {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    List(#[from] ListError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error(transparent)]
    Runner(#[from] RunnerError),
}

impl CoreError {
    /// Stable identifier for logs and exit-code mapping.
    pub fn kind(&self) -> &'static str {
        match self {
            CoreError::Parse(ParseError::InvalidSubject { .. }) => "invalid-subject",
            CoreError::List(ListError::EmptyList { .. }) => "empty-list",
            CoreError::List(ListError::NotFound { .. }) => "not-found",
            CoreError::List(ListError::Read { .. }) => "list-io",
            CoreError::Ledger(_) => "ledger-io",
            CoreError::Config(_) => "config",
            CoreError::Runner(_) => "runner",
        }
    }
}
