use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use cohort_model::{DEFAULT_MAX_STEP_NUMBER, TaskIndex};

#[derive(Debug, Parser)]
#[command(
    name = "cohort",
    version,
    about = "Decide, per batch-array task, whether a pipeline step should run for its subject"
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Subject list file, one `subject_id(:modifier)*` entry per line
    #[arg(long, global = true, env = "COHORT_LIST")]
    pub list: Option<PathBuf>,

    /// Completion ledger of the current pipeline stage
    #[arg(long, global = true, env = "COHORT_LEDGER")]
    pub ledger: Option<PathBuf>,

    /// Label of the step being executed, e.g. 04-prep-fmriprep
    #[arg(long, global = true, env = "COHORT_STEP")]
    pub step: Option<String>,

    /// Step modifiers above this number are reported
    #[arg(long, global = true, env = "COHORT_MAX_STEP", default_value_t = DEFAULT_MAX_STEP_NUMBER)]
    pub max_step: u32,

    /// Honour `force` modifiers
    #[arg(long, global = true, env = "COHORT_ALLOW_FORCE", default_value_t = true, action = ArgAction::Set)]
    pub allow_force: bool,

    /// Log directory forwarded to the step command
    #[arg(long, global = true, env = "COHORT_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Scratch directory forwarded to the step command
    #[arg(long, global = true, env = "COHORT_SCRATCH_DIR")]
    pub scratch_dir: Option<PathBuf>,

    /// Container image forwarded to the step command
    #[arg(long, global = true, env = "COHORT_IMAGE")]
    pub image: Option<PathBuf>,

    /// Log filter directive (e.g. `info`, `warn,cohort.core=debug`)
    #[arg(long, global = true, env = "COHORT_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Log format: text | json | journald
    #[arg(long, global = true, env = "COHORT_LOG_FORMAT", default_value = "text")]
    pub log_format: String,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the decision for one array index
    Decide {
        #[command(flatten)]
        index: IndexArg,
        /// Emit a JSON report instead of `<decision> <subject>`
        #[arg(long)]
        json: bool,
    },
    /// Decide, run the step command when scheduled, record completion on success
    Run(RunArgs),
    /// Print the decision for every entry of the list
    Plan {
        #[arg(long)]
        json: bool,
    },
    /// Validate the subject list and print every diagnostic
    Check,
    /// Inspect or update the completion ledger
    #[command(subcommand)]
    Ledger(LedgerCommand),
}

#[derive(Debug, Args)]
pub struct IndexArg {
    /// Zero-based array index
    #[arg(long, env = "SLURM_ARRAY_TASK_ID")]
    pub index: TaskIndex,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub index: IndexArg,

    /// Decide and report, but neither execute nor record
    #[arg(long, env = "COHORT_DRY_RUN")]
    pub dry_run: bool,

    /// Forward the step's stdout to the log
    #[arg(long)]
    pub log_output: bool,

    /// Treat a non-zero exit of the step as success
    #[arg(long)]
    pub ignore_exit_code: bool,

    /// Seconds between SIGTERM and SIGKILL when cancelled
    #[arg(long, default_value_t = 10)]
    pub kill_grace_secs: u64,

    /// Step command; `{subject}`, `{step}`, `{logs}`, `{scratch}`, `{image}` are substituted
    #[arg(last = true, required = true, num_args = 1..)]
    pub command: Vec<String>,
}

#[derive(Debug, Subcommand)]
pub enum LedgerCommand {
    /// Print every ledger line
    List,
    /// Append a subject id
    Mark { id: String },
    /// Exit 0 when the subject id is recorded, 1 otherwise
    Has { id: String },
}
