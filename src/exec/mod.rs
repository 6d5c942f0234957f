//! Process execution facade
//!
//! Every child process depot runs goes through [`run`], which selects
//! exactly one of three execution modes:
//!
//! - *blocking*: inherits stdio and waits; a non-zero exit or signal
//!   aborts the run
//! - *capture*: waits and returns the full output; only failure to
//!   start is fatal
//! - *streamed*: spawns, pumps output line records to the log from a
//!   background task, and returns the task handle immediately
//!
//! Capture and streamed are mutually exclusive; combining them is
//! rejected before anything spawns.

mod args;
mod stream;

pub use args::ArgBuilder;
pub use stream::LineAssembler;

use crate::error::{DepotError, DepotResult};
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// A child process invocation: program, argument vector, working dir.
///
/// The working directory is always set here, per command; depot never
/// changes its own process-global cwd.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    program: String,
    args: Vec<String>,
    cwd: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Human-readable command line for logs and error messages
    pub fn rendered(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(cwd) = &self.cwd {
            cmd.current_dir(cwd);
        }
        cmd
    }
}

/// Execution mode selectors; both false means plain blocking
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecOptions {
    pub capture: bool,
    pub streamed: bool,
}

/// Full output of a capture-mode command
#[derive(Debug)]
pub struct CapturedOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// What [`run`] hands back, depending on the selected mode
#[derive(Debug)]
pub enum Execution {
    Completed,
    Captured(CapturedOutput),
    Streaming(JoinHandle<()>),
}

/// Execute a command in the mode selected by `opts`
pub async fn run(spec: CommandSpec, opts: ExecOptions) -> DepotResult<Execution> {
    if opts.capture && opts.streamed {
        return Err(DepotError::ModeConflict);
    }

    debug!("Executing: {}", spec.rendered());

    if opts.streamed {
        return spawn_streamed_task(spec).map(Execution::Streaming);
    }

    if opts.capture {
        let output = spec
            .command()
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| DepotError::command_failed(spec.rendered(), e))?;

        return Ok(Execution::Captured(CapturedOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }));
    }

    let status = spec
        .command()
        .status()
        .await
        .map_err(|e| DepotError::command_failed(spec.rendered(), e))?;

    if status.success() {
        return Ok(Execution::Completed);
    }

    match status.code() {
        Some(code) => Err(DepotError::CommandExit {
            command: spec.rendered(),
            code,
        }),
        None => Err(DepotError::CommandSignaled {
            command: spec.rendered(),
            signal: termination_signal(&status),
        }),
    }
}

/// Run to completion; non-zero exit or signal termination is an error
pub async fn run_blocking(spec: CommandSpec) -> DepotResult<()> {
    match run(spec, ExecOptions::default()).await? {
        Execution::Completed => Ok(()),
        other => unreachable!("blocking mode returned {:?}", other),
    }
}

/// Run to completion and return the full output
pub async fn run_capture(spec: CommandSpec) -> DepotResult<CapturedOutput> {
    let opts = ExecOptions {
        capture: true,
        streamed: false,
    };
    match run(spec, opts).await? {
        Execution::Captured(output) => Ok(output),
        other => unreachable!("capture mode returned {:?}", other),
    }
}

/// Spawn without waiting; output streams to the log from a background task
pub async fn spawn_streamed(spec: CommandSpec) -> DepotResult<JoinHandle<()>> {
    let opts = ExecOptions {
        capture: false,
        streamed: true,
    };
    match run(spec, opts).await? {
        Execution::Streaming(handle) => Ok(handle),
        other => unreachable!("streamed mode returned {:?}", other),
    }
}

fn spawn_streamed_task(spec: CommandSpec) -> DepotResult<JoinHandle<()>> {
    let mut child = spec
        .command()
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| DepotError::command_failed(spec.rendered(), e))?;

    let stdout = child.stdout.take().expect("stdout piped");
    let stderr = child.stderr.take().expect("stderr piped");
    let command = spec.rendered();

    Ok(tokio::spawn(async move {
        let mut stdout = stdout;
        let mut stderr = stderr;
        let mut stdout_asm = LineAssembler::new();
        let mut stderr_asm = LineAssembler::new();
        let mut stdout_buf = [0u8; 4096];
        let mut stderr_buf = [0u8; 4096];
        let mut stdout_done = false;
        let mut stderr_done = false;

        while !stdout_done || !stderr_done {
            tokio::select! {
                read = stdout.read(&mut stdout_buf), if !stdout_done => {
                    match read {
                        Ok(n) if n > 0 => {
                            for record in stdout_asm.feed(&stdout_buf[..n]) {
                                debug!(stream = "stdout", "{}", record.trim_end());
                            }
                        }
                        _ => {
                            close_stream("stdout", std::mem::take(&mut stdout_asm));
                            stdout_done = true;
                        }
                    }
                }
                read = stderr.read(&mut stderr_buf), if !stderr_done => {
                    match read {
                        Ok(n) if n > 0 => {
                            for record in stderr_asm.feed(&stderr_buf[..n]) {
                                debug!(stream = "stderr", "{}", record.trim_end());
                            }
                        }
                        _ => {
                            close_stream("stderr", std::mem::take(&mut stderr_asm));
                            stderr_done = true;
                        }
                    }
                }
            }
        }

        // Fire-and-forget: a failing background command is logged, not raised
        match child.wait().await {
            Ok(status) if !status.success() => {
                warn!("Background command failed ({}): {}", status, command);
            }
            Err(e) => warn!("Background command unreachable: {}: {}", command, e),
            Ok(_) => debug!("Background command finished: {}", command),
        }
    }))
}

fn close_stream(label: &str, asm: LineAssembler) {
    if let Some(tail) = asm.finish() {
        debug!(stream = label, "{}", tail.trim_end());
    }
    debug!(stream = label, "stream closed");
}

#[cfg(unix)]
fn termination_signal(status: &std::process::ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    status.signal().unwrap_or(0)
}

#[cfg(not(unix))]
fn termination_signal(_status: &std::process::ExitStatus) -> i32 {
    0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn capture_and_streamed_rejected_before_spawn() {
        // A nonexistent program never gets spawned; the conflict wins
        let spec = CommandSpec::new("depot-test-no-such-binary");
        let opts = ExecOptions {
            capture: true,
            streamed: true,
        };
        let err = run(spec, opts).await.unwrap_err();
        assert!(matches!(err, DepotError::ModeConflict));
    }

    #[tokio::test]
    async fn capture_returns_output() {
        let spec = CommandSpec::new("sh").args(["-c", "echo out; echo err >&2"]);
        let output = run_capture(spec).await.unwrap();
        assert!(output.success);
        assert_eq!(output.stdout.trim(), "out");
        assert_eq!(output.stderr.trim(), "err");
    }

    #[tokio::test]
    async fn blocking_surfaces_exit_code() {
        let spec = CommandSpec::new("sh").args(["-c", "exit 3"]);
        let err = run_blocking(spec).await.unwrap_err();
        match err {
            DepotError::CommandExit { code, .. } => assert_eq!(code, 3),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn streamed_failure_is_not_an_error() {
        let spec = CommandSpec::new("sh").args(["-c", "echo progress; exit 1"]);
        let handle = spawn_streamed(spec).await.unwrap();
        // The task completes without propagating the child's failure
        handle.await.unwrap();
    }

    #[test]
    fn rendered_joins_program_and_args() {
        let spec = CommandSpec::new("git").args(["fetch", "--depth", "1"]);
        assert_eq!(spec.rendered(), "git fetch --depth 1");
    }
}
