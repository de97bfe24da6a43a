//! External command execution.
//!
//! A non-zero exit is not an error here: callers inspect
//! [`CommandOutput::exit_code`] because some git commands (notably
//! `merge-base --is-ancestor`) use the exit code as their answer.

use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::EngineError;
use crate::remote::Redactor;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Exit status and captured output of one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// `-1` when the process was terminated by a signal.
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Runs one external command to completion.
pub trait CommandRunner {
    fn run(
        &self,
        program: &str,
        args: &[&str],
        cwd: Option<&Path>,
    ) -> Result<CommandOutput, EngineError>;
}

/// [`CommandRunner`] backed by `std::process`.
///
/// Children inherit the parent environment plus `GIT_TERMINAL_PROMPT=0`, so
/// a rejected credential fails instead of waiting on a prompt. Logged
/// command lines and captured output pass through the redactor.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    timeout: Option<Duration>,
    redactor: Redactor,
}

impl ProcessRunner {
    pub fn new(timeout: Option<Duration>, redactor: Redactor) -> Self {
        Self { timeout, redactor }
    }
}

impl CommandRunner for ProcessRunner {
    fn run(
        &self,
        program: &str,
        args: &[&str],
        cwd: Option<&Path>,
    ) -> Result<CommandOutput, EngineError> {
        let command_line = self
            .redactor
            .redact(&format!("{program} {}", args.join(" ")));
        tracing::debug!("running: {command_line}");

        let mut command = Command::new(program);
        command
            .args(args)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = cwd {
            command.current_dir(dir);
        }

        let mut child = command.spawn().map_err(|source| EngineError::Spawn {
            program: program.to_string(),
            source,
        })?;

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = match self.timeout {
            Some(timeout) => match wait_with_deadline(&mut child, timeout) {
                Ok(Some(status)) => status,
                Ok(None) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    tracing::warn!("killed after {}s: {command_line}", timeout.as_secs());
                    return Err(EngineError::Timeout {
                        command: command_line,
                        timeout,
                    });
                }
                Err(source) => {
                    return Err(EngineError::Spawn {
                        program: program.to_string(),
                        source,
                    })
                }
            },
            None => child.wait().map_err(|source| EngineError::Spawn {
                program: program.to_string(),
                source,
            })?,
        };

        let output = CommandOutput {
            exit_code: status.code().unwrap_or(-1),
            stdout: self.redactor.redact(&join(stdout)),
            stderr: self.redactor.redact(&join(stderr)),
        };
        if !output.success() {
            tracing::debug!(
                exit_code = output.exit_code,
                "command failed: {}",
                output.stderr.trim()
            );
        }
        Ok(output)
    }
}

/// Poll until the child exits or `timeout` elapses (`Ok(None)`).
fn wait_with_deadline(
    child: &mut Child,
    timeout: Duration,
) -> std::io::Result<Option<std::process::ExitStatus>> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Read a pipe to completion on its own thread so a chatty child cannot
/// block on a full pipe buffer while we wait for it.
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<thread::JoinHandle<String>> {
    let mut pipe = pipe?;
    Some(thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }))
}

fn join(handle: Option<thread::JoinHandle<String>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default()
}
