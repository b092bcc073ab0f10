use std::time::Duration;

use tokio::process::Child;
use tracing::debug;

/// Ask the child to stop with SIGTERM, then kill it if it is still alive after `grace`.
#[cfg(target_family = "unix")]
pub async fn kill_graceful(child: &mut Child, grace: Duration) -> std::io::Result<()> {
    if let Some(id) = child.id()
        && let Ok(pid) = libc::pid_t::try_from(id)
    {
        // SAFETY: plain signal delivery to a pid we spawned and have not reaped yet.
        unsafe {
            libc::kill(pid, libc::SIGTERM);
        }
        if tokio::time::timeout(grace, child.wait()).await.is_ok() {
            return Ok(());
        }
        debug!(target: "cohort.exec.proc", pid, "grace period elapsed; killing child");
    }
    child.kill().await
}

#[cfg(target_family = "windows")]
pub async fn kill_graceful(child: &mut Child, _grace: Duration) -> std::io::Result<()> {
    child.kill().await
}
