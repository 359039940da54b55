#![deny(rust_2018_idioms)]

//! Runs scripts on git remotes by handing them to `git archive --remote`
//! as the `--exec` command that would normally be git-upload-archive.

pub mod actions;
pub mod cli;
pub mod dispatch;
pub mod envelope;
pub mod error;
pub mod git;
pub mod invocation;
pub mod remote;
pub mod script;
pub mod signal;

#[cfg(all(test, unix))]
mod testing;

pub use dispatch::{Dispatcher, Outcome};
pub use envelope::Captured;
pub use error::Error;
pub use invocation::{Invocation, Mode, RemoteName};
pub use remote::Remote;

use actions::Sudo;
use cli::Args;
use log::trace;
use script::ScriptSource;
use std::path::Path;

/// Runs `git-remote-run` for the parsed arguments. A non-zero exit code from
/// the remote comes back as [`Error::RemoteExecution`].
pub async fn run(args: Args) -> Result<(), Error> {
    run_with(args, Dispatcher::default()).await
}

pub async fn run_with(args: Args, dispatcher: Dispatcher) -> Result<(), Error> {
    if !args.sudo_shell && !args.uses_sudo() {
        return Err(Error::Usage(
            "--no-sudo-shell only makes sense with --sudo or --sudo-if-needed".to_string(),
        ));
    }

    // Resolved before anything is spawned, config reads included.
    let script = ScriptSource::from_options(args.command.clone(), args.file.clone())?.resolve()?;

    let mut steps = args
        .uploads()
        .map(|(source, target)| actions::upload(Path::new(source), target))
        .collect::<Result<Vec<_>, _>>()?;
    steps.push(script);
    let script = actions::compose(&steps);
    trace!("script: {:?}", script);

    let mode = match args.mode {
        Some(mode) => mode,
        None => git::config::mode()?,
    };
    trace!("mode: {}", mode);

    let remote = Remote::new(args.remote)
        .with_mode(mode)
        .with_git_args(args.git_args)
        .with_dispatcher(dispatcher);

    remote.verify()?;

    let sudo = Sudo {
        shell: args.sudo_shell,
        user: args.sudo_user,
    };

    let outcome = if args.sudo_if_needed {
        remote.execute_or_sudo(&script, &sudo).await?
    } else if args.sudo {
        remote.sudo(&script, &sudo).await?
    } else {
        remote.execute(&script).await?
    };

    outcome.relay()?;

    match outcome.exit_code() {
        0 => Ok(()),
        code => Err(Error::RemoteExecution { code }),
    }
}
