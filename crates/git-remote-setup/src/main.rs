mod setup;

use clap::Parser;
use git_remote_exec::Error;
use log::trace;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(about = "Set up a bare repository on a git remote.", version)]
pub struct Args {
    /// A remote repository; either the name of a configured remote or a URL
    pub remote: String,

    /// Install the hooks found in this directory
    #[arg(short = 'H', long, value_name = "PATH")]
    pub hooks: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
pub async fn main() -> ExitCode {
    env_logger::init();

    let args = Args::parse();
    trace!("args: {:#?}", args);

    match setup::run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => match err.downcast_ref::<Error>() {
            Some(err) if err.is_already_reported() => ExitCode::from(err.exit_code()),
            Some(inner) => {
                eprintln!("git-remote-setup: {:#}", err);
                ExitCode::from(inner.exit_code())
            }
            None => {
                eprintln!("git-remote-setup: {:#}", err);
                ExitCode::FAILURE
            }
        },
    }
}
