// ============================================================================
// sweep-core/src/external/transcoder.rs
// ============================================================================
//
// TRANSCODER EXECUTION: Running one invocation to completion
//
// The sweep controller only sees the `Transcoder` trait. `ProcessTranscoder`
// spawns the real executable with stdout and stderr both appended to the run
// log, then blocks until it exits (or, with a timeout, kills it).
//
// With a timeout on Unix the child leads its own process group, so a
// wrapper such as `cargo run` is killed together with the transcoder it
// started. Without a timeout the child stays in the controller's group and
// receives terminal signals like Ctrl-C.

use super::invocation::RunConfiguration;
use super::check_transcoder;
use crate::config::SweepConfig;
use crate::error::{CoreResult, command_start_error, command_wait_error};

use std::fs::File;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

/// Interval between exit polls when a timeout is set.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// How long to wait for the rest of a killed process group to disappear.
const GROUP_EXIT_GRACE: Duration = Duration::from_secs(2);

/// How an invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// The process exited. `code` is `None` when it was killed by a signal.
    Exited { code: Option<i32> },
    /// The process exceeded its timeout and was killed.
    TimedOut { after: Duration },
}

impl RunStatus {
    /// True only for a zero exit code.
    pub fn success(&self) -> bool {
        matches!(self, RunStatus::Exited { code: Some(0) })
    }
}

impl From<ExitStatus> for RunStatus {
    fn from(status: ExitStatus) -> Self {
        RunStatus::Exited {
            code: status.code(),
        }
    }
}

/// Runs transcoder invocations.
///
/// Implementations must not return before the invocation has finished: the
/// sweep relies on it to keep invocations strictly sequential.
pub trait Transcoder {
    /// Checks that the transcoder can be run at all. Called once before the
    /// first invocation.
    fn check_available(&self) -> CoreResult<()> {
        Ok(())
    }

    /// Runs one invocation with its combined output appended to `log`.
    ///
    /// An `Err` means the invocation could not be started or waited for. A
    /// process that ran and failed is an `Ok` with a nonzero exit code.
    fn run(
        &self,
        run: &RunConfiguration,
        log: File,
        timeout: Option<Duration>,
    ) -> CoreResult<RunStatus>;
}

/// Runs the transcoder as a child process.
#[derive(Debug, Clone)]
pub struct ProcessTranscoder {
    program: String,
    leading_args: Vec<String>,
}

impl ProcessTranscoder {
    /// Creates a transcoder running `program`, with `leading_args` placed
    /// before the per-run arguments.
    pub fn new(program: impl Into<String>, leading_args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            leading_args,
        }
    }

    /// Creates the transcoder named by the sweep configuration.
    pub fn from_config(config: &SweepConfig) -> Self {
        Self::new(config.transcoder_program.clone(), config.transcoder_args.clone())
    }

    /// The executable being run.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Builds the command for `run`, without any stdio configuration.
    pub fn command_for(&self, run: &RunConfiguration) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.leading_args).args(run.to_args());
        cmd
    }
}

impl Transcoder for ProcessTranscoder {
    fn check_available(&self) -> CoreResult<()> {
        check_transcoder(&self.program).map(|_| ())
    }

    fn run(
        &self,
        run: &RunConfiguration,
        log: File,
        timeout: Option<Duration>,
    ) -> CoreResult<RunStatus> {
        let stderr_log = log.try_clone()?;

        let mut cmd = self.command_for(run);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::from(log))
            .stderr(Stdio::from(stderr_log));

        if timeout.is_some() {
            lead_own_process_group(&mut cmd);
        }

        log::debug!("Transcoder command: {:?}", cmd);

        let mut child = cmd
            .spawn()
            .map_err(|e| command_start_error(&self.program, e))?;

        match timeout {
            None => child
                .wait()
                .map(RunStatus::from)
                .map_err(|e| command_wait_error(&self.program, e)),
            Some(limit) => wait_with_timeout(&mut child, &self.program, limit),
        }
    }
}

/// Polls `child` until it exits or `limit` elapses, killing it in the latter case.
fn wait_with_timeout(child: &mut Child, program: &str, limit: Duration) -> CoreResult<RunStatus> {
    let start = Instant::now();

    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status.into()),
            Ok(None) => {}
            Err(e) => return Err(command_wait_error(program, e)),
        }

        let elapsed = start.elapsed();
        if elapsed >= limit {
            break;
        }
        std::thread::sleep(POLL_INTERVAL.min(limit - elapsed));
    }

    log::warn!(
        "'{}' exceeded its {}s timeout; killing it",
        program,
        limit.as_secs_f64()
    );

    kill_process_tree(child, program)?;

    Ok(RunStatus::TimedOut {
        after: start.elapsed(),
    })
}

#[cfg(unix)]
fn lead_own_process_group(cmd: &mut Command) {
    use std::os::unix::process::CommandExt;
    cmd.process_group(0);
}

#[cfg(not(unix))]
fn lead_own_process_group(_cmd: &mut Command) {}

/// Kills the child's process group and waits until every member is gone.
#[cfg(unix)]
fn kill_process_tree(child: &mut Child, program: &str) -> CoreResult<()> {
    use nix::errno::Errno;
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    let group = i32::try_from(child.id()).ok().map(Pid::from_raw);

    // The child may exit between the last poll and the kill.
    match group.map(|pgid| killpg(pgid, Signal::SIGKILL)) {
        Some(Ok(())) => {}
        Some(Err(e)) => {
            log::debug!("Kill of process group of '{}' failed: {}", program, e);
            let _ = child.kill();
        }
        None => {
            let _ = child.kill();
        }
    }
    child.wait().map_err(|e| command_wait_error(program, e))?;

    let Some(pgid) = group else {
        return Ok(());
    };
    let deadline = Instant::now() + GROUP_EXIT_GRACE;
    while Instant::now() < deadline {
        if killpg(pgid, None::<Signal>) == Err(Errno::ESRCH) {
            return Ok(());
        }
        std::thread::sleep(POLL_INTERVAL);
    }
    log::warn!(
        "Processes started by '{}' were still present {}s after the kill",
        program,
        GROUP_EXIT_GRACE.as_secs()
    );
    Ok(())
}

#[cfg(not(unix))]
fn kill_process_tree(child: &mut Child, program: &str) -> CoreResult<()> {
    // The child may exit between the last poll and the kill.
    if let Err(e) = child.kill() {
        log::debug!("Kill of '{}' failed: {}", program, e);
    }
    child.wait().map_err(|e| command_wait_error(program, e))?;
    Ok(())
}
