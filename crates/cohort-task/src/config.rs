//! Turns parsed CLI arguments (already merged with the environment by clap) into component configs.
use cohort_core::{CoreError, WorkerConfig};
use cohort_model::WorkDirs;
use cohort_observe::{LoggerConfig, LoggerError, LoggerFormat, LoggerLevel};

use crate::cli::GlobalArgs;

/// `.env` is loaded unless this variable is set.
pub const NO_DOTENV_VAR: &str = "COHORT_NO_DOTENV";

pub fn load_dotenv() {
    if std::env::var_os(NO_DOTENV_VAR).is_none() {
        let _ = dotenvy::dotenv();
    }
}

pub fn logger_config(args: &GlobalArgs) -> Result<LoggerConfig, LoggerError> {
    Ok(LoggerConfig {
        format: args.log_format.parse::<LoggerFormat>()?,
        level: LoggerLevel::new(args.log_level.as_str())?,
        ..Default::default()
    })
}

/// Worker configuration for the commands that need a list, a ledger and a step.
pub fn worker_config(args: &GlobalArgs, dry_run: bool) -> Result<WorkerConfig, CoreError> {
    let list_path = args
        .list
        .clone()
        .ok_or_else(|| CoreError::Config("--list (COHORT_LIST) is required".into()))?;
    let ledger_path = args
        .ledger
        .clone()
        .ok_or_else(|| CoreError::Config("--ledger (COHORT_LEDGER) is required".into()))?;
    let step_label = args
        .step
        .clone()
        .ok_or_else(|| CoreError::Config("--step (COHORT_STEP) is required".into()))?;

    let cfg = WorkerConfig {
        list_path,
        ledger_path,
        step_label,
        max_step_number: args.max_step,
        allow_force: args.allow_force,
        dry_run,
        workdirs: WorkDirs {
            logs: args.log_dir.clone(),
            scratch: args.scratch_dir.clone(),
            image: args.image.clone(),
        },
    };
    cfg.validate()?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    fn global(argv: &[&str]) -> GlobalArgs {
        let mut full = vec!["cohort"];
        full.extend_from_slice(argv);
        full.push("check");
        Cli::try_parse_from(full).unwrap().global
    }

    #[test]
    fn worker_config_from_flags() {
        let args = global(&[
            "--list", "subjects.txt", "--ledger", "done.txt", "--step", "04-prep",
            "--max-step", "9", "--allow-force", "false", "--image", "/img/fmriprep.sif",
        ]);
        let cfg = worker_config(&args, true).unwrap();
        assert_eq!(cfg.list_path.to_str(), Some("subjects.txt"));
        assert_eq!(cfg.ledger_path.to_str(), Some("done.txt"));
        assert_eq!(cfg.step_label, "04-prep");
        assert_eq!(cfg.max_step_number, 9);
        assert!(!cfg.allow_force);
        assert!(cfg.dry_run);
        assert_eq!(cfg.workdirs.image.as_deref().and_then(|p| p.to_str()), Some("/img/fmriprep.sif"));
    }

    #[test]
    fn missing_step_is_a_config_error() {
        let args = global(&["--list", "subjects.txt", "--ledger", "done.txt"]);
        let err = worker_config(&args, false).unwrap_err();
        assert_eq!(err.kind(), "config");
        assert!(err.to_string().contains("--step"));
    }

    #[test]
    fn logger_config_rejects_bad_format() {
        let args = global(&["--log-format", "xml"]);
        assert!(matches!(logger_config(&args), Err(LoggerError::InvalidFormat(_))));
    }
}
