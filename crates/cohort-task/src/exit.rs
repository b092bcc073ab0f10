//! Process exit codes.
//!
//! Core failures use sysexits-style codes so they never collide with the 0/1/2 codes
//! returned by the step command itself, which is passed through unchanged.
use cohort_core::{CoreError, StepOutcome};

pub const OK: u8 = 0;
pub const USAGE: u8 = 64;
pub const INVALID_SUBJECT: u8 = 65;
pub const NO_SUBJECT: u8 = 66;
pub const SOFTWARE: u8 = 70;
pub const IO: u8 = 74;
pub const CANCELLED: u8 = 130;

pub fn for_error(err: &CoreError) -> u8 {
    match err {
        CoreError::Parse(_) => INVALID_SUBJECT,
        CoreError::List(cohort_core::ListError::Read { .. }) => IO,
        CoreError::List(_) => NO_SUBJECT,
        CoreError::Ledger(_) => IO,
        CoreError::Config(_) => USAGE,
        CoreError::Runner(_) => SOFTWARE,
    }
}

pub fn for_outcome(outcome: Option<StepOutcome>) -> u8 {
    match outcome {
        None | Some(StepOutcome::Succeeded) => OK,
        Some(StepOutcome::Cancelled) => CANCELLED,
        Some(StepOutcome::Failed { code }) => code
            .and_then(|c| u8::try_from(c).ok())
            .filter(|c| *c != OK)
            .unwrap_or(1),
    }
}
