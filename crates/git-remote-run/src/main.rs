use clap::error::ErrorKind;
use clap::{CommandFactory as _, Parser as _};
use git_remote_exec::cli::Args;
use git_remote_exec::Error;
use log::trace;
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
pub async fn main() -> ExitCode {
    env_logger::init();

    // Exits with 2 on malformed arguments, before anything is spawned.
    let args = Args::parse();
    trace!("args: {:#?}", args);

    match git_remote_exec::run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::from(err.exit_code())
        }
    }
}

fn report(err: &Error) {
    match err {
        err if err.is_already_reported() => trace!("{}", err),
        Error::Usage(message) => {
            let usage = Args::command().error(ErrorKind::ArgumentConflict, message);
            if let Err(err) = usage.print() {
                trace!("failed to print usage: {}", err);
                eprintln!("git-remote-run: {}", message);
            }
        }
        err => eprintln!("git-remote-run: {}", err),
    }
}
