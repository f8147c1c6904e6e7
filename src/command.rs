//! Real command execution with an optional deadline.

use crate::error::Result;
use crate::traits::{CommandOutput, CommandRunner};
use std::io::Read;
use std::process::{Child, Command, Stdio};
use std::thread::JoinHandle;
use std::time::Duration;
use wait_timeout::ChildExt;

/// ETXTBSY error code (errno 26 on Linux).
const ETXTBSY: i32 = 26;

/// Spawn a command, retrying while the executable is still busy being written.
///
/// ETXTBSY shows up on overlay filesystems when a script is run right after
/// it was created.
fn spawn_with_etxtbsy_retry<F>(mut spawn_fn: F) -> std::io::Result<Child>
where
    F: FnMut() -> std::io::Result<Child>,
{
    loop {
        match spawn_fn() {
            Ok(child) => return Ok(child),
            Err(e) if e.raw_os_error() == Some(ETXTBSY) => {
                std::thread::sleep(Duration::from_millis(1));
            }
            Err(e) => return Err(e),
        }
    }
}

/// Drain a pipe on its own thread so a chatty child cannot block on a full pipe
/// while we wait for it.
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<String> {
    std::thread::spawn(move || {
        let mut buffer = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buffer);
        }
        String::from_utf8_lossy(&buffer).into_owned()
    })
}

/// Real command runner that executes external programs.
#[derive(Debug, Default, Clone)]
pub struct RealCommandRunner;

impl RealCommandRunner {
    /// Create a new command runner.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl CommandRunner for RealCommandRunner {
    fn run(
        &self,
        program: &str,
        args: &[&str],
        timeout: Option<Duration>,
    ) -> Result<CommandOutput> {
        let mut command = Command::new(program);
        command.args(args).stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::piped());

        let mut child = spawn_with_etxtbsy_retry(|| command.spawn())?;
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let (status, timed_out) = match timeout {
            Some(limit) => match child.wait_timeout(limit)? {
                Some(status) => (Some(status), false),
                None => {
                    tracing::warn!(program, timeout_secs = limit.as_secs(), "command timed out");
                    let _ = child.kill();
                    let _ = child.wait();
                    (None, true)
                }
            },
            None => (Some(child.wait()?), false),
        };

        let exit_code = status.and_then(|s| s.code()).unwrap_or(-1);
        let stdout = stdout.join().unwrap_or_default();
        let stderr = stderr.join().unwrap_or_default();

        tracing::debug!(program, exit_code, timed_out, "command finished");
        Ok(CommandOutput { exit_code, stdout, stderr, timed_out })
    }

    fn is_available(&self, program: &str) -> bool {
        Command::new("which")
            .arg(program)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }
}
