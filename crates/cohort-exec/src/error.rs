use cohort_core::RunnerError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExecError {
    #[error("missing program")]
    MissingProgram,
    #[error("placeholder {{{placeholder}}} used but {what} is not configured")]
    UnboundPlaceholder {
        placeholder: &'static str,
        what: &'static str,
    },
    #[error("spawn failed: {0}")]
    Spawn(String),
    #[error("io error: {0}")]
    Io(String),
}

pub type ExecResult<T> = Result<T, ExecError>;

impl From<std::io::Error> for ExecError {
    fn from(e: std::io::Error) -> Self {
        ExecError::Io(e.to_string())
    }
}

impl From<ExecError> for RunnerError {
    fn from(e: ExecError) -> Self {
        match e {
            ExecError::MissingProgram | ExecError::UnboundPlaceholder { .. } => {
                RunnerError::InvalidSpec(e.to_string())
            }
            ExecError::Spawn(msg) => RunnerError::Spawn(msg),
            ExecError::Io(msg) => RunnerError::Io(msg),
        }
    }
}
