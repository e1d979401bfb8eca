use std::{
    fs::File,
    path::{Path, PathBuf},
    process::{Command, ExitStatus, Stdio},
    time::{Duration, Instant, SystemTime, UNIX_EPOCH},
};

use anyhow::Context as _;

use crate::foundation::error::{AnimError, AnimResult};

const POLL_INTERVAL: Duration = Duration::from_millis(25);
const OUTPUT_TAIL_BYTES: usize = 4000;

#[derive(Debug)]
pub(crate) struct ProcessOutput {
    pub(crate) status: ExitStatus,
    pub(crate) stdout: String,
    pub(crate) stderr: String,
}

/// Run `cmd` to completion, killing it once `timeout` has elapsed.
///
/// Output goes to `<log_dir>/<label>.stdout|stderr` rather than pipes so a chatty child can
/// never block on a full pipe while we poll.
pub(crate) fn run_with_timeout(
    cmd: &mut Command,
    timeout: Duration,
    log_dir: &Path,
    label: &str,
) -> AnimResult<ProcessOutput> {
    let stdout_path = log_dir.join(format!("{label}.stdout"));
    let stderr_path = log_dir.join(format!("{label}.stderr"));
    let stdout = File::create(&stdout_path)
        .with_context(|| format!("failed to create '{}'", stdout_path.display()))?;
    let stderr = File::create(&stderr_path)
        .with_context(|| format!("failed to create '{}'", stderr_path.display()))?;

    let program = cmd.get_program().to_string_lossy().into_owned();
    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(stdout)
        .stderr(stderr)
        .spawn()
        .map_err(|e| {
            AnimError::render(format!(
                "failed to spawn {label} ('{program}'; is it installed and on PATH?): {e}"
            ))
        })?;

    let started = Instant::now();
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if started.elapsed() >= timeout => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(AnimError::render_with_output(
                    format!("{label} timed out after {:.1}s", timeout.as_secs_f64()),
                    read_tail(&stderr_path),
                ));
            }
            Ok(None) => std::thread::sleep(POLL_INTERVAL),
            Err(e) => {
                let _ = child.kill();
                return Err(AnimError::render(format!(
                    "failed to wait for {label}: {e}"
                )));
            }
        }
    };
    tracing::debug!(%status, elapsed_ms = started.elapsed().as_millis() as u64, "{label} exited");

    Ok(ProcessOutput {
        status,
        stdout: read_tail(&stdout_path),
        stderr: read_tail(&stderr_path),
    })
}

/// Turn a non-zero exit into a render error carrying the tail of stderr.
pub(crate) fn expect_success(label: &str, output: ProcessOutput) -> AnimResult<ProcessOutput> {
    if output.status.success() {
        return Ok(output);
    }
    let detail = if output.stderr.trim().is_empty() {
        output.stdout.clone()
    } else {
        output.stderr.clone()
    };
    Err(AnimError::render_with_output(
        format!("{label} exited with status {}", output.status),
        detail.trim(),
    ))
}

/// Run a short-lived probe command under `timeout` and return its output if it exits successfully.
///
/// Logs go to a scratch directory below `scratch_root` that is removed afterwards.
pub(crate) fn probe(
    cmd: &mut Command,
    timeout: Duration,
    scratch_root: &Path,
    label: &str,
) -> Option<ProcessOutput> {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let dir = scratch_root.join(format!("probe-{label}-{}-{nanos}", std::process::id()));
    if let Err(e) = ensure_dir(&dir) {
        tracing::debug!("{label} probe skipped: {e}");
        return None;
    }
    let _cleanup = TempDirGuard::new(dir.clone());
    match run_with_timeout(cmd, timeout, &dir, label) {
        Ok(out) if out.status.success() => Some(out),
        Ok(out) => {
            tracing::debug!(status = %out.status, "{label} probe failed");
            None
        }
        Err(e) => {
            tracing::debug!("{label} probe failed: {e}");
            None
        }
    }
}

/// Whether `program version_arg` can be spawned and exits successfully within `timeout`.
pub fn is_program_available(
    program: &str,
    version_arg: &str,
    timeout: Duration,
    scratch_root: &Path,
) -> bool {
    probe(
        Command::new(program).arg(version_arg),
        timeout,
        scratch_root,
        "availability",
    )
    .is_some()
}

/// Removes a scratch directory tree when dropped.
pub(crate) struct TempDirGuard(Option<PathBuf>);

impl TempDirGuard {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self(Some(path))
    }
}

impl Drop for TempDirGuard {
    fn drop(&mut self) {
        if let Some(path) = self.0.take() {
            let _ = std::fs::remove_dir_all(path);
        }
    }
}

pub(crate) fn ensure_dir(path: &Path) -> AnimResult<()> {
    std::fs::create_dir_all(path)
        .with_context(|| format!("failed to create directory '{}'", path.display()))?;
    Ok(())
}

fn read_tail(path: &Path) -> String {
    let bytes = std::fs::read(path).unwrap_or_default();
    let start = bytes.len().saturating_sub(OUTPUT_TAIL_BYTES);
    String::from_utf8_lossy(&bytes[start..]).into_owned()
}

#[cfg(test)]
#[path = "../../tests/unit/render/process.rs"]
mod tests;
