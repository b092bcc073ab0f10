//! Runs the downstream step command (typically a container invocation) for one subject.
use std::{path::PathBuf, process::Stdio, time::Duration};

use async_trait::async_trait;
use cohort_core::{RunnerError, StepOutcome, StepRequest, StepRunner};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    process::Command,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

use crate::{
    error::{ExecError, ExecResult},
    util::kill_graceful,
};

/// Step command template.
///
/// `args` may contain the placeholders `{subject}`, `{step}`, `{logs}`, `{scratch}` and `{image}`.
#[derive(Clone, Debug)]
pub struct ProcConfig {
    pub program: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
    pub cwd: Option<PathBuf>,
    /// Report a non-zero exit code as a failed step.
    pub fail_on_non_zero: bool,
    /// Forward the child's stdout to the log instead of inheriting it.
    pub log_output: bool,
    /// Time between SIGTERM and SIGKILL on cancellation.
    pub kill_grace: Duration,
}

impl Default for ProcConfig {
    fn default() -> Self {
        Self {
            program: String::new(),
            args: Vec::new(),
            env: Vec::new(),
            cwd: None,
            fail_on_non_zero: true,
            log_output: false,
            kill_grace: Duration::from_secs(10),
        }
    }
}

impl ProcConfig {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            ..Default::default()
        }
    }

    /// Arguments with every placeholder substituted for `req`.
    pub fn render_args(&self, req: &StepRequest) -> ExecResult<Vec<String>> {
        self.args.iter().map(|arg| render(arg, req)).collect()
    }

    /// Variables exported to the child on top of `self.env`.
    pub fn step_env(req: &StepRequest) -> Vec<(&'static str, String)> {
        let mut env = vec![
            ("COHORT_SUBJECT", req.subject.clone()),
            ("COHORT_STEP", req.step.name.clone()),
            ("COHORT_DECISION", req.decision.kind().to_string()),
        ];
        if let Some(n) = req.step.number {
            env.push(("COHORT_STEP_NUMBER", n.to_string()));
        }
        let dirs = &req.workdirs;
        for (key, value) in [
            ("COHORT_LOG_DIR", &dirs.logs),
            ("COHORT_SCRATCH_DIR", &dirs.scratch),
            ("COHORT_IMAGE", &dirs.image),
        ] {
            if let Some(path) = value {
                env.push((key, path.display().to_string()));
            }
        }
        env
    }

    fn command(&self, req: &StepRequest) -> ExecResult<Command> {
        if self.program.trim().is_empty() {
            return Err(ExecError::MissingProgram);
        }
        let mut cmd = Command::new(&self.program);
        cmd.args(self.render_args(req)?);

        if let Some(cwd) = &self.cwd {
            cmd.current_dir(cwd);
        }
        for (k, v) in &self.env {
            cmd.env(k, v);
        }
        for (k, v) in Self::step_env(req) {
            cmd.env(k, v);
        }

        cmd.stdin(Stdio::null());
        if self.log_output {
            cmd.stdout(Stdio::piped());
        } else {
            cmd.stdout(Stdio::inherit());
        }
        cmd.stderr(Stdio::inherit());
        cmd.kill_on_drop(true);
        Ok(cmd)
    }
}

fn render(arg: &str, req: &StepRequest) -> ExecResult<String> {
    let mut out = arg
        .replace("{subject}", &req.subject)
        .replace("{step}", &req.step.name);

    let dirs = &req.workdirs;
    for (placeholder, what, value) in [
        ("logs", "log directory", &dirs.logs),
        ("scratch", "scratch directory", &dirs.scratch),
        ("image", "container image", &dirs.image),
    ] {
        let token = format!("{{{placeholder}}}");
        if !out.contains(&token) {
            continue;
        }
        let path = value
            .as_ref()
            .ok_or(ExecError::UnboundPlaceholder { placeholder, what })?;
        out = out.replace(&token, &path.display().to_string());
    }
    Ok(out)
}

/// Runner that spawns [`ProcConfig`] as a child process.
pub struct ProcRunner {
    name: &'static str,
    cfg: ProcConfig,
}

impl ProcRunner {
    pub fn new(cfg: ProcConfig) -> Self {
        Self { name: "proc", cfg }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    #[inline]
    pub fn config(&self) -> &ProcConfig {
        &self.cfg
    }
}

#[async_trait]
impl StepRunner for ProcRunner {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn run(
        &self,
        req: &StepRequest,
        cancel: CancellationToken,
    ) -> Result<StepOutcome, RunnerError> {
        let mut cmd = self.cfg.command(req)?;
        trace!(target: "cohort.exec.proc", program = %self.cfg.program, subject = %req.subject, "spawn");

        let mut child = cmd
            .spawn()
            .map_err(|e| ExecError::Spawn(format!("{}: {e}", self.cfg.program)))?;

        let forward = child.stdout.take().map(|stdout| {
            let subject = req.subject.clone();
            tokio::spawn(async move {
                let mut lines = BufReader::new(stdout).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    info!(target: "cohort.exec.proc.out", subject = %subject, "{line}");
                }
            })
        });

        let outcome = tokio::select! {
            status = child.wait() => {
                let status = status.map_err(ExecError::from)?;
                if status.success() || !self.cfg.fail_on_non_zero {
                    debug!(target: "cohort.exec.proc", code = ?status.code(), "exit");
                    StepOutcome::Succeeded
                } else {
                    debug!(target: "cohort.exec.proc", code = ?status.code(), "exit non-zero");
                    StepOutcome::Failed { code: status.code() }
                }
            }
            _ = cancel.cancelled() => {
                debug!(target: "cohort.exec.proc", "cancelled; stopping child");
                let _ = kill_graceful(&mut child, self.cfg.kill_grace).await;
                StepOutcome::Cancelled
            }
        };

        if let Some(handle) = forward {
            let _ = handle.await;
        }
        Ok(outcome)
    }
}
