//! Process runner with a bounded budget for network-bound commands
//!
//! Local commands (status, add, commit) run to completion. Network commands
//! (fetch, pull, push, provider calls) are waited on with `wait-timeout`; a
//! command that exceeds the budget is killed and retried once with the same
//! budget before [`Error::Timeout`] is reported.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread::JoinHandle;
use std::time::Duration;

use wait_timeout::ChildExt;

use crate::error::{Error, Result};
use crate::invocation::{CommandOutput, Invocation};

/// Default time budget for one attempt of a network-bound command
pub const DEFAULT_NETWORK_TIMEOUT: Duration = Duration::from_secs(60);

/// Attempts made for a network-bound command before reporting a timeout
const NETWORK_ATTEMPTS: u32 = 2;

/// Runs external commands.
///
/// Implementations return `Ok` for any process that ran, whatever its exit
/// code. Test doubles implement this trait to record or script invocations.
pub trait CommandRunner {
    fn run(&self, invocation: &Invocation) -> Result<CommandOutput>;
}

impl<T: CommandRunner + ?Sized> CommandRunner for &T {
    fn run(&self, invocation: &Invocation) -> Result<CommandOutput> {
        (**self).run(invocation)
    }
}

/// [`CommandRunner`] backed by `std::process`.
///
/// This is the only place where PATH lookup and environment handling happen.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    network_timeout: Duration,
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new(DEFAULT_NETWORK_TIMEOUT)
    }
}

impl ProcessRunner {
    pub fn new(network_timeout: Duration) -> Self {
        Self { network_timeout }
    }

    /// Locate `program` on PATH.
    pub fn resolve(program: &str) -> Result<PathBuf> {
        which::which(program).map_err(|_| Error::ToolMissing {
            program: program.to_string(),
        })
    }

    fn command(program: &Path, invocation: &Invocation) -> Command {
        let mut cmd = Command::new(program);
        cmd.current_dir(invocation.working_dir())
            .args(invocation.args_slice())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        for (key, value) in invocation.env_vars() {
            cmd.env(key, value);
        }
        cmd
    }

    fn run_to_completion(&self, program: &Path, invocation: &Invocation) -> Result<CommandOutput> {
        let output = Self::command(program, invocation)
            .output()
            .map_err(|e| Error::spawn(invocation.program(), e))?;

        Ok(CommandOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    /// Run one attempt; `Ok(None)` means the budget ran out and the child was
    /// killed.
    fn run_with_deadline(
        &self,
        program: &Path,
        invocation: &Invocation,
    ) -> Result<Option<CommandOutput>> {
        let mut child = Self::command(program, invocation)
            .spawn()
            .map_err(|e| Error::spawn(invocation.program(), e))?;

        // Drain both pipes concurrently so a chatty child cannot block on a
        // full pipe while we wait for it.
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = child
            .wait_timeout(self.network_timeout)
            .map_err(|e| Error::spawn(invocation.program(), e))?;

        match status {
            Some(status) => Ok(Some(CommandOutput {
                exit_code: status.code().unwrap_or(-1),
                stdout: collect(stdout),
                stderr: collect(stderr),
            })),
            None => {
                kill(&mut child);
                // Reader threads are left detached: grandchildren (ssh,
                // credential helpers) may still hold the pipes open.
                Ok(None)
            }
        }
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&self, invocation: &Invocation) -> Result<CommandOutput> {
        if !invocation.working_dir().is_dir() {
            return Err(Error::InvalidWorkingDir {
                path: invocation.working_dir().to_path_buf(),
            });
        }

        let program = Self::resolve(invocation.program())?;

        tracing::debug!(
            command = %invocation,
            cwd = %invocation.working_dir().display(),
            network = invocation.is_network(),
            "Spawning command"
        );

        if !invocation.is_network() {
            return self.run_to_completion(&program, invocation);
        }

        for attempt in 1..=NETWORK_ATTEMPTS {
            if let Some(output) = self.run_with_deadline(&program, invocation)? {
                return Ok(output);
            }
            tracing::warn!(
                command = %invocation,
                attempt,
                timeout_secs = self.network_timeout.as_secs(),
                "Command timed out"
            );
        }

        Err(Error::Timeout {
            command: invocation.to_string(),
            timeout: self.network_timeout,
            attempts: NETWORK_ATTEMPTS,
        })
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<Vec<u8>>> {
    pipe.map(|mut reader| {
        std::thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = reader.read_to_end(&mut buf);
            buf
        })
    })
}

fn collect(handle: Option<JoinHandle<Vec<u8>>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .map(|buf| String::from_utf8_lossy(&buf).into_owned())
        .unwrap_or_default()
}

fn kill(child: &mut Child) {
    if let Err(e) = child.kill() {
        tracing::warn!(error = %e, "Failed to kill timed-out child");
    }
    let _ = child.wait();
}
