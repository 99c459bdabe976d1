//! Subprocess execution utilities.
//!
//! External tools are always started directly from an argument vector,
//! never through a shell, so manifest-supplied text cannot be reinterpreted
//! as shell syntax.

use std::ffi::OsStr;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::debug;
use wait_timeout::ChildExt;

use crate::util::errors::{FreightError, Result};

/// Size of the chunks read from a child's output streams.
const OUTPUT_CHUNK: usize = 128;

/// Builder for subprocess execution.
#[derive(Debug, Clone)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<String>,
}

impl ProcessBuilder {
    /// Create a new process builder for the given program.
    pub fn new(program: impl AsRef<Path>) -> Self {
        ProcessBuilder {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
        }
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_string_lossy().into_owned());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(
            args.into_iter()
                .map(|s| s.as_ref().to_string_lossy().into_owned()),
        );
        self
    }

    /// Get the program path.
    pub fn get_program(&self) -> &Path {
        &self.program
    }

    /// Get the arguments.
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }

    /// Display the command for diagnostics.
    ///
    /// Arguments containing whitespace are wrapped in double quotes so the
    /// rendered line reads the way it would be typed.
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().map(|arg| {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                format!("\"{}\"", arg)
            } else {
                arg.clone()
            }
        }));
        parts.join(" ")
    }
}

/// Normalized outcome of a finished external command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandResult {
    /// Exit code, or `None` when the process was terminated by a signal.
    pub code: Option<i32>,
}

impl CommandResult {
    /// Result for a process that exited with `code`.
    pub fn exited(code: i32) -> Self {
        CommandResult { code: Some(code) }
    }

    /// Whether the process exited with status zero.
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs external commands to completion.
///
/// The runner reports how the process ended; deciding which exit codes
/// count as success is left to the caller.
pub trait CommandRunner {
    /// Run `cmd`, forwarding its combined output to stderr when `echo` is set.
    fn run(&mut self, cmd: &ProcessBuilder, echo: bool) -> Result<CommandResult>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for Box<R> {
    fn run(&mut self, cmd: &ProcessBuilder, echo: bool) -> Result<CommandResult> {
        (**self).run(cmd, echo)
    }
}

/// Runs commands on the host, optionally bounded by a timeout.
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    timeout: Option<Duration>,
}

impl SystemRunner {
    /// Create a runner without a timeout.
    pub fn new() -> Self {
        SystemRunner { timeout: None }
    }

    /// Kill any command that runs longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// The configured timeout, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl CommandRunner for SystemRunner {
    fn run(&mut self, cmd: &ProcessBuilder, echo: bool) -> Result<CommandResult> {
        let command_line = cmd.display_command();
        debug!("running `{}`", command_line);

        let mut command = cmd.build_command();
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let spawn_error = |source: io::Error| FreightError::Spawn {
            program: cmd.get_program().display().to_string(),
            source,
        };

        let mut child = command.spawn().map_err(spawn_error)?;

        let pumps = [
            child.stdout.take().map(|out| pump(out, echo)),
            child.stderr.take().map(|err| pump(err, echo)),
        ];

        let status = match self.timeout {
            Some(timeout) => match child.wait_timeout(timeout).map_err(spawn_error)? {
                Some(status) => status,
                None => {
                    // Grandchildren may still hold the pipes open, so the
                    // output threads are left to finish on their own.
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(FreightError::Timeout {
                        command: command_line,
                        timeout,
                    });
                }
            },
            None => child.wait().map_err(spawn_error)?,
        };

        for handle in pumps.into_iter().flatten() {
            let _ = handle.join();
        }

        debug!("`{}` exited with {:?}", command_line, status.code());
        Ok(CommandResult {
            code: status.code(),
        })
    }
}

/// Drain a child output stream on its own thread until end-of-stream or a
/// read error.
fn pump<R>(mut reader: R, echo: bool) -> JoinHandle<()>
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let mut buf = [0u8; OUTPUT_CHUNK];
        loop {
            match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => forward(&buf[..n], echo),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    debug!("stopped reading command output: {}", e);
                    break;
                }
            }
        }
    })
}

fn forward(chunk: &[u8], echo: bool) {
    if echo {
        let mut stderr = io::stderr().lock();
        let _ = stderr.write_all(chunk);
    } else {
        debug!("{}", String::from_utf8_lossy(chunk));
    }
}

/// Find an executable in PATH.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}
