use crate::envelope::{self, Captured};
use crate::error::Error;
use crate::invocation::{Invocation, Mode};
use crate::signal::{ProcessGroup, Signals};
use log::{debug, trace, warn};
use std::ffi::OsString;
use std::io::{self, Write as _};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::AsyncReadExt as _;
use tokio::process::{Child, ChildStdout, Command};

pub const GIT: &str = "git";

/// How long a signalled child gets to exit before it is killed.
const GRACE_PERIOD: Duration = Duration::from_secs(5);

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Outcome {
    /// git's own exit code: raw mode, or git failed before an archive arrived
    Exited(i32),
    Captured(Captured),
}

impl Outcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            Outcome::Exited(code) => *code,
            Outcome::Captured(captured) => captured.exit_code,
        }
    }

    pub fn into_captured(self) -> Result<Captured, Error> {
        match self {
            Outcome::Captured(captured) => Ok(captured),
            Outcome::Exited(code) => Err(Error::RemoteExecution { code }),
        }
    }

    /// Writes captured output to this process's streams. Raw output has
    /// already been relayed through the inherited streams.
    pub fn relay(&self) -> io::Result<()> {
        if let Outcome::Captured(captured) = self {
            let mut stderr = io::stderr().lock();
            stderr.write_all(&captured.stderr)?;
            stderr.flush()?;

            let mut stdout = io::stdout().lock();
            stdout.write_all(&captured.stdout)?;
            stdout.flush()?;
        }

        Ok(())
    }
}

enum Event {
    Finished(io::Result<(ExitStatus, Vec<u8>)>),
    Signal(i32),
}

#[derive(Clone, Debug)]
pub struct Dispatcher {
    program: OsString,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Dispatcher::with_program(GIT)
    }
}

impl Dispatcher {
    pub fn with_program(program: impl Into<OsString>) -> Self {
        Dispatcher {
            program: program.into(),
        }
    }

    pub fn command(&self, invocation: &Invocation) -> Command {
        let stdout = match invocation.mode() {
            Mode::Raw => Stdio::null(),
            Mode::Captured => Stdio::piped(),
        };

        let mut command = Command::new(&self.program);
        command
            .args(invocation.git_args())
            .stdin(Stdio::inherit())
            .stdout(stdout)
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        // Its own group, so that a signal reaches the transport and whatever
        // it started, not only git.
        #[cfg(unix)]
        command.process_group(0);

        command
    }

    /// Runs the invocation to completion, or until a termination signal
    /// arrives, in which case the signal is forwarded to git's process group.
    pub async fn dispatch(&self, invocation: &Invocation) -> Result<Outcome, Error> {
        trace!("invocation: {:#?}", invocation);

        let mut signals = Signals::register()?;

        let mut child = self
            .command(invocation)
            .spawn()
            .map_err(|source| Error::Spawn {
                program: self.program.to_string_lossy().into_owned(),
                source,
            })?;

        debug!("spawned {:?} (pid {:?})", self.program, child.id());

        let group = ProcessGroup::of(&child);
        let stdout = child.stdout.take();

        let event = tokio::select! {
            result = wait_with_output(&mut child, stdout) => Event::Finished(result),
            signal = signals.recv() => Event::Signal(signal),
        };

        match event {
            Event::Finished(result) => {
                let (status, output) = result?;
                debug!("{:?} exited with {}", self.program, status);

                // Killed by a signal sent to the group directly, such as a
                // Ctrl-C while git held the terminal.
                if status.code().is_none() {
                    if let Err(err) = group.kill() {
                        warn!("failed to kill what is left of the process group: {}", err);
                    }
                }

                outcome(invocation.mode(), status, &output)
            }
            Event::Signal(signal) => {
                interrupt(&mut child, &group, signal).await;
                Err(Error::Interrupted { signal })
            }
        }
    }
}

async fn wait_with_output(
    child: &mut Child,
    stdout: Option<ChildStdout>,
) -> io::Result<(ExitStatus, Vec<u8>)> {
    let read = async {
        let mut output = Vec::new();
        if let Some(mut stdout) = stdout {
            stdout.read_to_end(&mut output).await?;
        }
        Ok::<_, io::Error>(output)
    };

    tokio::try_join!(child.wait(), read)
}

async fn interrupt(child: &mut Child, group: &ProcessGroup, signal: i32) {
    debug!("forwarding signal {} to the process group", signal);

    if let Err(err) = group.signal(signal) {
        warn!("failed to forward signal {}: {}", signal, err);
    }

    match tokio::time::timeout(GRACE_PERIOD, child.wait()).await {
        Ok(Ok(status)) => debug!("child exited with {}", status),
        Ok(Err(err)) => warn!("failed to wait for child: {}", err),
        Err(_) => {
            warn!("child still running after {:?}, killing it", GRACE_PERIOD);
            if let Err(err) = child.kill().await {
                warn!("failed to kill child: {}", err);
            }
        }
    }

    if let Err(err) = group.kill() {
        warn!("failed to kill what is left of the process group: {}", err);
    }
}

fn outcome(mode: Mode, status: ExitStatus, output: &[u8]) -> Result<Outcome, Error> {
    let code = exit_code(status);

    match mode {
        Mode::Raw => Ok(Outcome::Exited(code)),
        // git reported the failure on the inherited stderr.
        Mode::Captured if code != 0 => Ok(Outcome::Exited(code)),
        Mode::Captured => {
            let captured = envelope::unpack(output)?;
            trace!("captured: exit code {}", captured.exit_code);
            Ok(Outcome::Captured(captured))
        }
    }
}

#[cfg(unix)]
fn exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt as _;

    status
        .code()
        .or_else(|| status.signal().map(|signal| 128 + signal))
        .unwrap_or(1)
}

#[cfg(not(unix))]
fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(1)
}
