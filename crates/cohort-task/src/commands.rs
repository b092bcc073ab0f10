use std::time::Duration;

use anyhow::Context;
use cohort_core::{
    CoreError, FileLedger, Ledger, ListError, ModifierParser, PlanEntry, SubjectList, Worker,
};
use cohort_exec::{ProcConfig, ProcRunner};
use cohort_model::Decision;
use cohort_observe::log_decision;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::{
    cli::{Cli, Command, GlobalArgs, LedgerCommand, RunArgs},
    config::worker_config,
    exit,
    report::DecisionReport,
};

pub async fn dispatch(cli: &Cli) -> anyhow::Result<u8> {
    let global = &cli.global;
    match &cli.command {
        Command::Decide { index, json } => decide(global, index.index, *json),
        Command::Run(args) => run(global, args).await,
        Command::Plan { json } => plan(global, *json),
        Command::Check => check(global),
        Command::Ledger(cmd) => ledger(global, cmd),
    }
}

fn file_worker(global: &GlobalArgs, dry_run: bool) -> Result<Worker<FileLedger>, CoreError> {
    let cfg = worker_config(global, dry_run)?;
    Worker::from_config(&cfg, cfg.file_ledger())
}

fn print_report(report: &DecisionReport<'_>, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string(report).context("serialize decision report")?);
    } else {
        println!("{}", report.to_line());
    }
    Ok(())
}

fn decide(global: &GlobalArgs, index: usize, json: bool) -> anyhow::Result<u8> {
    let worker = file_worker(global, true)?;
    let resolved = worker.resolve(index)?;
    log_decision(resolved.index, &resolved.spec, &resolved.step, resolved.decision);
    print_report(&DecisionReport::new(&resolved), json)?;
    Ok(exit::OK)
}

async fn run(global: &GlobalArgs, args: &RunArgs) -> anyhow::Result<u8> {
    let worker = file_worker(global, args.dry_run)?;
    let resolved = worker.resolve(args.index.index)?;
    log_decision(resolved.index, &resolved.spec, &resolved.step, resolved.decision);

    let (program, rest) = args
        .command
        .split_first()
        .ok_or_else(|| CoreError::Config("step command is empty".into()))?;
    let runner = ProcRunner::new(ProcConfig {
        program: program.clone(),
        args: rest.to_vec(),
        fail_on_non_zero: !args.ignore_exit_code,
        log_output: args.log_output,
        kill_grace: Duration::from_secs(args.kill_grace_secs),
        ..Default::default()
    })
    .with_name("step");

    let cancel = CancellationToken::new();
    watch_signals(cancel.clone());

    let exec = worker.run_resolved(resolved, &runner, cancel).await?;
    if exec.recorded {
        info!(subject = exec.resolved.spec.id(), ledger = %worker.ledger().path().display(), "step completed; subject recorded");
    }
    Ok(exit::for_outcome(exec.outcome))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PlanRow<'a> {
    index: usize,
    entry: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    subject: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    decision: Option<Decision>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<'a> From<&'a PlanEntry> for PlanRow<'a> {
    fn from(p: &'a PlanEntry) -> Self {
        let (subject, decision, error) = match &p.result {
            Ok((spec, decision)) => (Some(spec.id()), Some(*decision), None),
            Err(e) => (None, None, Some(e.to_string())),
        };
        Self {
            index: p.index,
            entry: p.entry.raw_text(),
            subject,
            decision,
            error,
        }
    }
}

fn plan(global: &GlobalArgs, json: bool) -> anyhow::Result<u8> {
    let worker = file_worker(global, true)?;
    if worker.list().is_empty() {
        return Err(CoreError::from(ListError::EmptyList {
            path: worker.list().path().to_path_buf(),
        })
        .into());
    }

    let plan = worker.plan();
    let rows: Vec<PlanRow<'_>> = plan.iter().map(PlanRow::from).collect();
    if json {
        println!("{}", serde_json::to_string_pretty(&rows).context("serialize plan")?);
    } else {
        for row in &rows {
            match (row.decision, &row.error) {
                (Some(decision), _) => {
                    println!("{}\t{}\t{}", row.index, decision.kind(), row.subject.unwrap_or_default())
                }
                (None, Some(error)) => println!("{}\terror\t{}", row.index, error),
                (None, None) => {}
            }
        }
    }

    let code = plan
        .iter()
        .find_map(|p| p.result.as_ref().err())
        .map(exit::for_error)
        .unwrap_or(exit::OK);
    Ok(code)
}

fn check(global: &GlobalArgs) -> anyhow::Result<u8> {
    let path = global
        .list
        .clone()
        .ok_or_else(|| CoreError::Config("--list (COHORT_LIST) is required".into()))?;
    let list = SubjectList::load(&path).map_err(CoreError::from)?;
    if list.is_empty() {
        return Err(CoreError::from(ListError::EmptyList { path }).into());
    }

    let parser = ModifierParser::new(global.max_step);
    let mut invalid = 0usize;
    let mut warnings = 0usize;
    for (index, entry) in list.iter().enumerate() {
        match parser.parse_with_diagnostics(entry.raw_text()) {
            Ok((spec, diagnostics)) => {
                for d in diagnostics {
                    warnings += 1;
                    println!("{index}\t{}\twarning: {d}", spec.id());
                }
            }
            Err(e) => {
                invalid += 1;
                println!("{index}\t-\terror: {e}");
            }
        }
    }
    info!(path = %path.display(), entries = list.len(), invalid, warnings, "subject list checked");

    Ok(if invalid > 0 { exit::INVALID_SUBJECT } else { exit::OK })
}

fn ledger(global: &GlobalArgs, cmd: &LedgerCommand) -> anyhow::Result<u8> {
    let path = global
        .ledger
        .clone()
        .ok_or_else(|| CoreError::Config("--ledger (COHORT_LEDGER) is required".into()))?;
    let ledger = FileLedger::new(path);

    match cmd {
        LedgerCommand::List => {
            for id in ledger.entries().map_err(CoreError::from)? {
                println!("{id}");
            }
            Ok(exit::OK)
        }
        LedgerCommand::Mark { id } => {
            let id = bare_subject_id(id)?;
            ledger.append(id).map_err(CoreError::from)?;
            info!(subject = id, "subject recorded as completed");
            Ok(exit::OK)
        }
        LedgerCommand::Has { id } => {
            let found = ledger.contains(id).map_err(CoreError::from)?;
            println!("{}", if found { "yes" } else { "no" });
            Ok(if found { exit::OK } else { 1 })
        }
    }
}

/// A ledger line must be exactly one subject id: no modifiers, padding or line breaks.
fn bare_subject_id(id: &str) -> Result<&str, CoreError> {
    let spec = ModifierParser::default().parse(id)?;
    if id.contains(['\n', '\r']) || spec.id() != id || !spec.modifiers().is_empty() {
        return Err(CoreError::Config(format!(
            "ledger entries must be bare subject ids, got {id:?}"
        )));
    }
    Ok(id)
}

fn watch_signals(cancel: CancellationToken) {
    tokio::spawn(async move {
        wait_for_shutdown().await;
        warn!("termination requested; stopping step");
        cancel.cancel();
    });
}

#[cfg(unix)]
async fn wait_for_shutdown() {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut term) => {
            tokio::select! {
                res = tokio::signal::ctrl_c() => {
                    if res.is_err() {
                        term.recv().await;
                    }
                }
                _ = term.recv() => {}
            }
        }
        Err(_) => {
            if tokio::signal::ctrl_c().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::{fs, path::Path};

    fn args(list: &Path, ledger: &Path, command: &[&str]) -> Cli {
        let mut argv = vec![
            "cohort",
            "--list",
            list.to_str().unwrap(),
            "--ledger",
            ledger.to_str().unwrap(),
            "--step",
            "04-prep-fmriprep",
        ];
        argv.extend_from_slice(command);
        Cli::try_parse_from(argv).unwrap()
    }

    fn workspace(list: &str) -> (tempfile::TempDir, std::path::PathBuf, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let list_path = dir.path().join("subjects.txt");
        fs::write(&list_path, list).unwrap();
        let ledger_path = dir.path().join("completed.txt");
        (dir, list_path, ledger_path)
    }

    fn core_error(err: anyhow::Error) -> CoreError {
        err.downcast::<CoreError>().unwrap()
    }

    #[tokio::test]
    async fn check_accepts_a_clean_list() {
        let (_dir, list, ledger) = workspace("# cohort\n101\n102:force\n\n103:step4\n");
        let cli = args(&list, &ledger, &["check"]);
        assert_eq!(dispatch(&cli).await.unwrap(), exit::OK);
    }

    #[tokio::test]
    async fn check_flags_invalid_entries() {
        let (_dir, list, ledger) = workspace("101\n:skip\n102:bogus\n");
        let cli = args(&list, &ledger, &["check"]);
        assert_eq!(dispatch(&cli).await.unwrap(), exit::INVALID_SUBJECT);
    }

    #[tokio::test]
    async fn check_warnings_alone_do_not_fail() {
        let (_dir, list, ledger) = workspace("101:bogus\n102:step40\n");
        let cli = args(&list, &ledger, &["check"]);
        assert_eq!(dispatch(&cli).await.unwrap(), exit::OK);
    }

    #[tokio::test]
    async fn check_rejects_an_empty_list() {
        let (_dir, list, ledger) = workspace("# nothing yet\n\n");
        let cli = args(&list, &ledger, &["check"]);
        let err = core_error(dispatch(&cli).await.unwrap_err());
        assert!(matches!(err, CoreError::List(ListError::EmptyList { .. })));
        assert_eq!(exit::for_error(&err), exit::NO_SUBJECT);
    }

    #[tokio::test]
    async fn plan_exit_code_follows_first_error() {
        let (_dir, list, ledger) = workspace("101\n:oops\n102\n");
        let cli = args(&list, &ledger, &["plan"]);
        assert_eq!(dispatch(&cli).await.unwrap(), exit::INVALID_SUBJECT);
        assert!(!ledger.exists() || fs::read_to_string(&ledger).unwrap().is_empty());
    }

    #[tokio::test]
    async fn plan_of_valid_list_succeeds() {
        let (_dir, list, ledger) = workspace("101\n102:skip\n");
        let cli = args(&list, &ledger, &["plan", "--json"]);
        assert_eq!(dispatch(&cli).await.unwrap(), exit::OK);
    }

    #[tokio::test]
    async fn plan_rejects_an_empty_list() {
        let (_dir, list, ledger) = workspace("# only comments\n");
        let cli = args(&list, &ledger, &["plan"]);
        let err = core_error(dispatch(&cli).await.unwrap_err());
        assert!(matches!(err, CoreError::List(ListError::EmptyList { .. })));
    }

    #[tokio::test]
    async fn ledger_mark_then_has() {
        let (_dir, list, ledger) = workspace("101\n");

        let mark = args(&list, &ledger, &["ledger", "mark", "101"]);
        assert_eq!(dispatch(&mark).await.unwrap(), exit::OK);
        assert_eq!(fs::read_to_string(&ledger).unwrap(), "101\n");

        let has = args(&list, &ledger, &["ledger", "has", "101"]);
        assert_eq!(dispatch(&has).await.unwrap(), exit::OK);

        let missing = args(&list, &ledger, &["ledger", "has", "102"]);
        assert_eq!(dispatch(&missing).await.unwrap(), 1);

        let listed = args(&list, &ledger, &["ledger", "list"]);
        assert_eq!(dispatch(&listed).await.unwrap(), exit::OK);
    }

    #[tokio::test]
    async fn ledger_mark_rejects_non_bare_ids() {
        let (_dir, list, ledger) = workspace("101\n");

        for id in ["101:force", " 101", "101 ", "101\n102", "101\r"] {
            let cli = args(&list, &ledger, &["ledger", "mark", id]);
            let err = core_error(dispatch(&cli).await.unwrap_err());
            assert_eq!(err.kind(), "config", "{id:?}");
        }

        let cli = args(&list, &ledger, &["ledger", "mark", ":skip"]);
        let err = core_error(dispatch(&cli).await.unwrap_err());
        assert_eq!(exit::for_error(&err), exit::INVALID_SUBJECT);

        assert!(!ledger.exists());
    }

    #[test]
    fn bare_subject_id_accepts_plain_ids() {
        assert_eq!(bare_subject_id("sub-01").unwrap(), "sub-01");
        assert!(bare_subject_id("sub-01\nsub-02").is_err());
    }
}
