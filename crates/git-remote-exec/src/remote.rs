use crate::actions::Sudo;
use crate::dispatch::{Dispatcher, Outcome};
use crate::error::Error;
use crate::git;
use crate::invocation::{Invocation, Mode, RemoteName};
use log::debug;

/// Runs scripts on one git remote.
#[derive(Clone, Debug)]
pub struct Remote {
    name: RemoteName,
    mode: Mode,
    shell: String,
    git_args: Vec<String>,
    dispatcher: Dispatcher,
}

impl Remote {
    /// A remote in captured mode using the configured shell.
    pub fn new(name: impl Into<RemoteName>) -> Self {
        Remote {
            name: name.into(),
            mode: Mode::Captured,
            shell: git::config::shell(),
            git_args: Vec::new(),
            dispatcher: Dispatcher::default(),
        }
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = shell.into();
        self
    }

    pub fn with_git_args(mut self, git_args: Vec<String>) -> Self {
        self.git_args = git_args;
        self
    }

    pub fn with_dispatcher(mut self, dispatcher: Dispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    pub fn name(&self) -> &RemoteName {
        &self.name
    }

    pub fn invocation(&self, script: &str) -> Result<Invocation, Error> {
        Invocation::new(
            self.name.clone(),
            script,
            self.git_args.clone(),
            self.mode,
            self.shell.clone(),
        )
    }

    /// Fails when git would take the remote for a local path that does not
    /// exist. When git cannot be asked, dispatching reports that instead.
    pub fn verify(&self) -> Result<(), Error> {
        let name = self.name.as_ref();

        match git::remote::get_url(name) {
            Ok(url) if !git::remote::is_reachable(name, &url) => {
                Err(Error::UnknownRemote(name.to_string()))
            }
            Ok(_) => Ok(()),
            Err(err) => {
                debug!("could not resolve {}: {:#}", name, err);
                Ok(())
            }
        }
    }

    pub async fn execute(&self, script: &str) -> Result<Outcome, Error> {
        let invocation = self.invocation(script)?;
        self.dispatcher.dispatch(&invocation).await
    }

    pub async fn sudo(&self, script: &str, sudo: &Sudo) -> Result<Outcome, Error> {
        self.execute(&sudo.wrap(script)).await
    }

    /// Runs the script as the connecting user first and only falls back to
    /// sudo when the script itself fails. git failures are not retried.
    pub async fn execute_or_sudo(&self, script: &str, sudo: &Sudo) -> Result<Outcome, Error> {
        if self.mode == Mode::Raw {
            return Err(Error::Usage(
                "falling back to sudo needs captured mode".to_string(),
            ));
        }

        match self.execute(script).await? {
            Outcome::Captured(captured) if captured.exit_code != 0 => {
                debug!(
                    "script exited with {} on {}, retrying with sudo",
                    captured.exit_code, self.name
                );
                self.sudo(script, sudo).await
            }
            outcome => Ok(outcome),
        }
    }
}
