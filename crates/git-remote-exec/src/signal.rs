//! Termination signals received while the child runs, and the process group
//! they are forwarded to.

use std::io;
use tokio::process::Child;

#[cfg(unix)]
pub use unix::*;

#[cfg(windows)]
pub use windows::*;

#[cfg(unix)]
mod unix {
    use super::*;
    use log::{trace, warn};
    use tokio::signal::unix::{signal, Signal, SignalKind};

    pub struct Signals {
        interrupt: Signal,
        terminate: Signal,
        hangup: Signal,
    }

    impl Signals {
        /// Must be called before spawning so no signal slips through.
        pub fn register() -> io::Result<Self> {
            Ok(Signals {
                interrupt: signal(SignalKind::interrupt())?,
                terminate: signal(SignalKind::terminate())?,
                hangup: signal(SignalKind::hangup())?,
            })
        }

        /// Resolves with the number of the first signal received.
        pub async fn recv(&mut self) -> i32 {
            tokio::select! {
                _ = self.interrupt.recv() => libc::SIGINT,
                _ = self.terminate.recv() => libc::SIGTERM,
                _ = self.hangup.recv() => libc::SIGHUP,
            }
        }
    }

    /// The process group a child was spawned into with `process_group(0)`.
    ///
    /// While the group lives, it holds the terminal when this process did, so
    /// that prompts from the transport (ssh asking for a password) can read
    /// it. The terminal is handed back on drop.
    pub struct ProcessGroup {
        pgid: Option<libc::pid_t>,
        terminal: Option<libc::pid_t>,
    }

    impl ProcessGroup {
        pub fn of(child: &Child) -> Self {
            let pgid = child.id().and_then(|pid| libc::pid_t::try_from(pid).ok());
            let terminal = pgid.and_then(hand_terminal_to);

            ProcessGroup { pgid, terminal }
        }

        /// Sends `signal` to every process in the group. A group with no
        /// processes left is not an error.
        pub fn signal(&self, signal: i32) -> io::Result<()> {
            let pgid = match self.pgid {
                Some(pgid) => pgid,
                None => return Ok(()),
            };

            if unsafe { libc::kill(-pgid, signal) } == 0 {
                return Ok(());
            }

            match io::Error::last_os_error() {
                err if err.raw_os_error() == Some(libc::ESRCH) => Ok(()),
                err => Err(err),
            }
        }

        /// Kills whatever is left in the group once git is gone.
        pub fn kill(&self) -> io::Result<()> {
            self.signal(libc::SIGKILL)
        }
    }

    impl Drop for ProcessGroup {
        fn drop(&mut self) {
            if let Some(foreground) = self.terminal {
                // A background process changing the foreground group is sent
                // SIGTTOU, which would stop it.
                unsafe {
                    let previous = libc::signal(libc::SIGTTOU, libc::SIG_IGN);
                    if libc::tcsetpgrp(libc::STDIN_FILENO, foreground) != 0 {
                        warn!(
                            "failed to take back the terminal: {}",
                            io::Error::last_os_error()
                        );
                    }
                    libc::signal(libc::SIGTTOU, previous);
                }
            }
        }
    }

    // Returns the group to give the terminal back to, when it was handed over.
    fn hand_terminal_to(pgid: libc::pid_t) -> Option<libc::pid_t> {
        unsafe {
            if libc::isatty(libc::STDIN_FILENO) != 1 {
                return None;
            }

            let foreground = libc::tcgetpgrp(libc::STDIN_FILENO);
            if foreground < 0 || foreground != libc::getpgrp() {
                return None;
            }

            let previous = libc::signal(libc::SIGTTOU, libc::SIG_IGN);
            let result = libc::tcsetpgrp(libc::STDIN_FILENO, pgid);
            libc::signal(libc::SIGTTOU, previous);

            if result != 0 {
                warn!(
                    "failed to hand the terminal to git: {}",
                    io::Error::last_os_error()
                );
                return None;
            }

            trace!("terminal handed to process group {}", pgid);
            Some(foreground)
        }
    }
}

#[cfg(windows)]
mod windows {
    use super::*;
    use tokio::signal::windows::{ctrl_c, CtrlC};

    const SIGINT: i32 = 2;

    pub struct Signals {
        ctrl_c: CtrlC,
    }

    impl Signals {
        pub fn register() -> io::Result<Self> {
            Ok(Signals { ctrl_c: ctrl_c()? })
        }

        pub async fn recv(&mut self) -> i32 {
            // None only once no further Ctrl-C can be delivered.
            match self.ctrl_c.recv().await {
                Some(()) => SIGINT,
                None => std::future::pending::<i32>().await,
            }
        }
    }

    /// Console processes receive Ctrl-C themselves, so there is nothing to
    /// forward; a child that ignores it is killed after the grace period.
    pub struct ProcessGroup;

    impl ProcessGroup {
        pub fn of(_child: &Child) -> Self {
            ProcessGroup
        }

        pub fn signal(&self, _signal: i32) -> io::Result<()> {
            Ok(())
        }

        pub fn kill(&self) -> io::Result<()> {
            Ok(())
        }
    }

}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_kill_ends_the_group() {
        // The shell and its background sleep share the group.
        let mut child = tokio::process::Command::new("sh")
            .arg("-c")
            .arg("sleep 30 & wait")
            .process_group(0)
            .stdin(std::process::Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .unwrap();

        let group = ProcessGroup::of(&child);
        group.kill().unwrap();

        let status = child.wait().await.unwrap();
        assert!(!status.success());

        // Nothing left in the group to signal.
        group.signal(libc::SIGTERM).unwrap();
    }
}
