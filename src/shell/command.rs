//! Child process execution with captured output.

use crate::error::Result;
use std::io::Read;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// How often a running child is polled for exit.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Result of executing a command.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Exit code (None if killed by signal or timeout).
    pub exit_code: Option<i32>,

    /// Standard output.
    pub stdout: String,

    /// Standard error.
    pub stderr: String,

    /// Execution duration.
    pub duration: Duration,

    /// Whether the command exited with code 0.
    pub success: bool,

    /// Whether the command was killed for exceeding its timeout.
    pub timed_out: bool,
}

/// Options for command execution.
#[derive(Debug, Clone, Default)]
pub struct CommandOptions {
    /// Working directory.
    pub cwd: Option<PathBuf>,

    /// Timeout (None = wait forever).
    pub timeout: Option<Duration>,
}

/// How long output readers may lag behind a killed child.
const DRAIN_GRACE: Duration = Duration::from_millis(200);

/// Run `program` with `args`, capturing stdout and stderr.
///
/// Arguments are passed directly, never through a shell. Spawn failures
/// (e.g. program not found) are returned as errors; a non-zero exit or a
/// timeout is reported in the [`CommandResult`].
///
/// On unix the child leads its own process group, so a timeout kills
/// anything it spawned as well. Output is collected until the deadline;
/// readers still blocked on a pipe held open by a stray descendant are
/// abandoned.
pub fn execute(program: &str, args: &[String], options: &CommandOptions) -> Result<CommandResult> {
    let start = Instant::now();
    let deadline = options.timeout.map(|limit| start + limit);

    let mut cmd = Command::new(program);
    cmd.args(args);

    if let Some(cwd) = &options.cwd {
        cmd.current_dir(cwd);
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        cmd.process_group(0);
    }

    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    tracing::debug!("Spawning {} with {} argument(s)", program, args.len());
    let mut child = cmd.spawn()?;

    let stdout_handle = child.stdout.take().map(spawn_reader);
    let stderr_handle = child.stderr.take().map(spawn_reader);

    let mut timed_out = false;
    let status = loop {
        if let Some(status) = child.try_wait()? {
            break Some(status);
        }
        if deadline.is_some_and(|d| Instant::now() >= d) {
            tracing::warn!("{} exceeded its timeout, killing it", program);
            kill_tree(&mut child);
            timed_out = true;
            break None;
        }
        thread::sleep(POLL_INTERVAL);
    };

    let handles = [stdout_handle.as_ref(), stderr_handle.as_ref()];
    let drain_until = if timed_out {
        Some(Instant::now() + DRAIN_GRACE)
    } else {
        deadline
    };
    if !wait_for_readers(&handles, drain_until) && !timed_out {
        tracing::warn!("{} left output pipes open, killing its process group", program);
        kill_tree(&mut child);
        wait_for_readers(&handles, Some(Instant::now() + DRAIN_GRACE));
    }

    let stdout = collect(stdout_handle);
    let stderr = collect(stderr_handle);

    let exit_code = status.and_then(|s| s.code());
    let success = status.is_some_and(|s| s.success());

    Ok(CommandResult {
        exit_code,
        stdout,
        stderr,
        duration: start.elapsed(),
        success,
        timed_out,
    })
}

fn spawn_reader<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        String::from_utf8_lossy(&buf).to_string()
    })
}

/// Wait until every reader has finished or `until` passes.
///
/// Returns whether all readers finished.
fn wait_for_readers(handles: &[Option<&JoinHandle<String>>], until: Option<Instant>) -> bool {
    loop {
        let done = handles.iter().flatten().all(|h| h.is_finished());
        if done {
            return true;
        }
        if until.is_some_and(|d| Instant::now() >= d) {
            return false;
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Output of a finished reader; an unfinished one is detached.
fn collect(handle: Option<JoinHandle<String>>) -> String {
    match handle {
        Some(h) if h.is_finished() => h.join().unwrap_or_default(),
        _ => String::new(),
    }
}

/// Kill the child and, on unix, every process in its group.
fn kill_tree(child: &mut Child) {
    #[cfg(unix)]
    {
        if let Ok(pgid) = libc::pid_t::try_from(child.id()) {
            // SAFETY: kill() only sends a signal; a negative pid targets the
            // process group the child leads since spawn.
            unsafe {
                libc::kill(-pgid, libc::SIGKILL);
            }
        }
    }
    let _ = child.kill();
    let _ = child.wait();
}
