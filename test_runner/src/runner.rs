//! Spawns the grading suite and collects its report.
//!
//! State machine per attempt: spawn, drain stdout and stderr concurrently,
//! wait for exit, all bounded by one wall-clock timeout. The suite's exit
//! code is not authoritative; the run succeeded only if `TestResult.xml`
//! exists in the workspace afterwards. Failures never escape this module:
//! every path degrades to "no report" with a log line carrying the trace
//! token.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use util::config;

use crate::workspace::Workspace;

/// Native suite binary expected under the suite root.
const NATIVE_SUITE: &str = if cfg!(windows) {
    "provquest-tests.exe"
} else {
    "provquest-tests"
};

/// Portable assembly form of the suite, run through the dotnet host when the
/// native binary is not deployed.
const SUITE_ASSEMBLY: &str = "ProvQuest.Tests.dll";

/// Grace period for stream drains after the child has been killed. Pipes
/// close immediately on kill in the normal case; this only guards against a
/// surviving descendant holding the write end open.
const DRAIN_GRACE: Duration = Duration::from_secs(5);

/// Bound on captured bytes per stream. Suite output is diagnostics, not the
/// report, so truncation is harmless.
const MAX_OUTPUT_BYTES: usize = 4 * 1024 * 1024;

/// One execution of the grading suite.
#[derive(Debug, Clone)]
pub struct GradeInvocation {
    /// Caller-supplied correlation token for logs and the workspace name.
    pub trace: String,
    /// Opaque credentials document, written verbatim for the suite to read.
    pub credentials_payload: String,
    /// Resolved test-selection expression.
    pub filter: String,
    /// Wall-clock ceiling for the whole run, exit and stream drains included.
    pub timeout: Duration,
}

impl GradeInvocation {
    /// Build an invocation with the configured timeout ceiling.
    pub fn new(
        trace: impl Into<String>,
        credentials_payload: impl Into<String>,
        filter: impl Into<String>,
    ) -> Self {
        Self {
            trace: trace.into(),
            credentials_payload: credentials_payload.into(),
            filter: filter.into(),
            timeout: Duration::from_millis(config::grade_timeout_ms()),
        }
    }
}

/// Terminal state of one suite attempt.
enum Attempt {
    /// Process exited and both streams drained within the budget.
    Completed,
    /// Exit or a stream drain outran the timeout; the child was killed.
    TimedOut,
    /// The caller tore the invocation down; the child was killed.
    Cancelled,
    /// Spawn or wait failed at the OS level.
    Failed,
}

/// Run the suite for one invocation and return the raw report, if any.
///
/// The workspace is created, used and removed entirely within this call,
/// whichever terminal state the run reaches. `None` covers every failure:
/// launch errors, timeout, cancellation and a missing report file.
pub async fn run(invocation: &GradeInvocation, cancel: CancellationToken) -> Option<String> {
    let workspace = match Workspace::allocate(&invocation.trace) {
        Ok(ws) => ws,
        Err(e) => {
            error!(
                "trace {}: failed to allocate a workspace: {e}",
                invocation.trace
            );
            return None;
        }
    };

    let report = execute_in(&workspace, invocation, cancel).await;
    workspace.release(&invocation.trace);
    report
}

async fn execute_in(
    workspace: &Workspace,
    invocation: &GradeInvocation,
    cancel: CancellationToken,
) -> Option<String> {
    let credentials = match workspace.write_credentials(&invocation.credentials_payload) {
        Ok(path) => path,
        Err(e) => {
            error!(
                "trace {}: failed to stage credentials: {e}",
                invocation.trace
            );
            return None;
        }
    };

    // The native binary is the primary strategy; the dotnet-hosted assembly
    // is attempted once when the primary produces no report. A timeout or a
    // cancellation abandons the invocation outright.
    for (attempt, command) in suite_commands().into_iter().enumerate() {
        if attempt > 0 {
            info!(
                "trace {}: primary suite produced no report, falling back to {}",
                invocation.trace, command.label
            );
        }
        match execute_once(&command, workspace, invocation, &credentials, cancel.clone()).await {
            Attempt::Completed => {
                if let Some(report) = workspace.read_report() {
                    return Some(report);
                }
                error!(
                    "trace {}: suite exited without writing {}",
                    invocation.trace,
                    workspace.report_path().display()
                );
            }
            Attempt::TimedOut | Attempt::Cancelled => return None,
            Attempt::Failed => {}
        }
    }
    None
}

/// One way of launching the suite.
struct SuiteCommand {
    program: PathBuf,
    leading_args: Vec<PathBuf>,
    label: &'static str,
}

fn suite_commands() -> Vec<SuiteCommand> {
    let suite_root = resolve_suite_root();
    let mut commands = vec![SuiteCommand {
        program: suite_root.join(NATIVE_SUITE),
        leading_args: Vec::new(),
        label: "native suite",
    }];

    let assembly = suite_root.join(SUITE_ASSEMBLY);
    if assembly.exists() {
        commands.push(SuiteCommand {
            program: dotnet_host(),
            leading_args: vec![assembly],
            label: "dotnet-hosted suite",
        });
    }
    commands
}

fn resolve_suite_root() -> PathBuf {
    let path = PathBuf::from(config::suite_root());
    if path.is_relative() {
        std::env::current_dir()
            .map(|cwd| cwd.join(&path))
            .unwrap_or(path)
    } else {
        path
    }
}

/// Locate the dotnet host: explicit override, then well-known install
/// locations, then a bare name resolved through PATH.
fn dotnet_host() -> PathBuf {
    let configured = config::dotnet_path();
    if !configured.trim().is_empty() {
        return PathBuf::from(configured);
    }
    let well_known: &[&str] = if cfg!(windows) {
        &[r"C:\Program Files\dotnet\dotnet.exe"]
    } else {
        &[
            "/usr/bin/dotnet",
            "/usr/local/bin/dotnet",
            "/usr/share/dotnet/dotnet",
        ]
    };
    for candidate in well_known {
        let path = PathBuf::from(candidate);
        if path.exists() {
            return path;
        }
    }
    PathBuf::from("dotnet")
}

async fn execute_once(
    command: &SuiteCommand,
    workspace: &Workspace,
    invocation: &GradeInvocation,
    credentials: &Path,
    cancel: CancellationToken,
) -> Attempt {
    let mut cmd = Command::new(&command.program);
    for arg in &command.leading_args {
        cmd.arg(arg);
    }
    // Arguments stay discrete tokens; nothing here passes through a shell.
    cmd.arg(format!("--credentials={}", credentials.display()))
        .arg(format!("--work={}", workspace.path().display()))
        .arg(format!("--trace={}", invocation.trace))
        .arg(format!("--where={}", invocation.filter))
        .current_dir(workspace.path())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    // The child leads its own process group so a timeout can take the whole
    // tree down, not just the immediate process.
    #[cfg(unix)]
    cmd.process_group(0);

    debug!(
        "trace {}: spawning {} with filter '{}'",
        invocation.trace,
        command.program.display(),
        invocation.filter
    );

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => {
            warn!(
                "trace {}: failed to launch {} ({}): {e}",
                invocation.trace,
                command.program.display(),
                command.label
            );
            return Attempt::Failed;
        }
    };

    let stdout_task = child
        .stdout
        .take()
        .map(|s| tokio::spawn(read_bounded(s, MAX_OUTPUT_BYTES)));
    let stderr_task = child
        .stderr
        .take()
        .map(|s| tokio::spawn(read_bounded(s, MAX_OUTPUT_BYTES)));

    let started = Instant::now();
    let mut outcome = Attempt::Completed;
    let mut exit_code: Option<i32> = None;

    tokio::select! {
        result = child.wait() => match result {
            Ok(status) => {
                exit_code = status.code();
            }
            Err(e) => {
                error!(
                    "trace {}: failed waiting on the suite process: {e}",
                    invocation.trace
                );
                kill_tree(&mut child, &invocation.trace).await;
                outcome = Attempt::Failed;
            }
        },
        () = tokio::time::sleep(invocation.timeout) => {
            warn!(
                "trace {}: suite exceeded {}ms, killing it",
                invocation.trace,
                invocation.timeout.as_millis()
            );
            kill_tree(&mut child, &invocation.trace).await;
            outcome = Attempt::TimedOut;
        }
        () = cancel.cancelled() => {
            info!(
                "trace {}: invocation cancelled, killing the suite",
                invocation.trace
            );
            kill_tree(&mut child, &invocation.trace).await;
            outcome = Attempt::Cancelled;
        }
    }

    // Exit, stdout-closed and stderr-closed all share the one timeout. After
    // a kill the pipes are already closed, so collection only needs a grace
    // period to reap the drain tasks.
    let drain_budget = match outcome {
        Attempt::Completed => invocation.timeout.saturating_sub(started.elapsed()),
        _ => DRAIN_GRACE,
    };
    let stdout = collect(stdout_task, drain_budget, "stdout", &invocation.trace).await;
    let stderr = collect(stderr_task, drain_budget, "stderr", &invocation.trace).await;

    if !matches!(outcome, Attempt::Completed) {
        return outcome;
    }

    let (Some(stdout), Some(stderr)) = (stdout, stderr) else {
        warn!(
            "trace {}: suite exited but its output streams stayed open past the time budget",
            invocation.trace
        );
        return Attempt::TimedOut;
    };

    // Exit code and stderr are diagnostics only. The report file decides.
    if !stderr.is_empty() {
        warn!(
            "trace {}: suite wrote {} bytes to stderr: {}",
            invocation.trace,
            stderr.len(),
            String::from_utf8_lossy(&stderr).trim()
        );
    }
    debug!(
        "trace {}: suite exited with code {:?} after {}ms ({} stdout bytes)",
        invocation.trace,
        exit_code,
        started.elapsed().as_millis(),
        stdout.len()
    );

    Attempt::Completed
}

/// Kill the child's whole process group, then reap it.
async fn kill_tree(child: &mut Child, trace: &str) {
    #[cfg(unix)]
    if let Some(pid) = child.id() {
        unsafe {
            libc::kill(-(pid as i32), libc::SIGKILL);
        }
    }
    if let Err(e) = child.kill().await {
        warn!("trace {trace}: failed to kill the suite process: {e}");
    }
    let _ = child.wait().await;
}

/// Await a drain task with a budget. `None` means the drain outran the
/// budget; I/O errors and panics degrade to an empty buffer.
async fn collect(
    task: Option<JoinHandle<std::io::Result<Vec<u8>>>>,
    budget: Duration,
    stream: &str,
    trace: &str,
) -> Option<Vec<u8>> {
    let Some(task) = task else {
        return Some(Vec::new());
    };
    match timeout(budget, task).await {
        Ok(Ok(Ok(buf))) => Some(buf),
        Ok(Ok(Err(e))) => {
            warn!("trace {trace}: {stream} capture failed: {e}");
            Some(Vec::new())
        }
        Ok(Err(e)) => {
            warn!("trace {trace}: {stream} drain task panicked: {e}");
            Some(Vec::new())
        }
        Err(_) => None,
    }
}

/// Drain a stream into a bounded buffer, discarding past the limit so the
/// pipe never backs up and deadlocks the child.
async fn read_bounded<R: tokio::io::AsyncRead + Unpin>(
    mut reader: R,
    max_bytes: usize,
) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(8192);
    let mut chunk = [0u8; 8192];

    loop {
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        let remaining = max_bytes.saturating_sub(buf.len());
        if remaining == 0 {
            while reader.read(&mut chunk).await? > 0 {}
            break;
        }
        buf.extend_from_slice(&chunk[..n.min(remaining)]);
    }

    Ok(buf)
}
