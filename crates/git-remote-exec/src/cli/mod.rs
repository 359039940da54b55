use crate::invocation::Mode;
use clap::{ArgAction, ArgGroup, Parser};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "git-remote-run", about = "Run commands on a git remote.", version)]
#[command(group(ArgGroup::new("script").required(true).args(["command", "file"])))]
#[command(group(ArgGroup::new("sudo_mode").args(["sudo", "sudo_if_needed"])))]
pub struct Args {
    /// A remote repository; either the name of a configured remote or a URL
    pub remote: String,

    /// Run this script on the remote
    #[arg(short = 'c', long = "command", value_name = "SCRIPT")]
    pub command: Option<String>,

    /// Run the script in this file on the remote ("-" reads standard input)
    #[arg(short = 'f', long = "file", value_name = "SCRIPT_FILE")]
    pub file: Option<PathBuf>,

    /// Upload a local file to the remote before running the script
    #[arg(
        short = 'u',
        long = "upload",
        num_args = 2,
        value_names = ["LOCAL_PATH", "REMOTE_PATH"],
        action = ArgAction::Append
    )]
    pub upload: Vec<String>,

    /// How output and exit code travel back [default: remoteRun.mode or captured]
    #[arg(long, value_enum)]
    pub mode: Option<Mode>,

    /// Run the script with sudo
    #[arg(short = 'S', long)]
    pub sudo: bool,

    /// Run the script normally and retry with sudo if it fails
    #[arg(short = 'I', long)]
    pub sudo_if_needed: bool,

    /// Run the script as this user
    #[arg(short = 'U', long, value_name = "USER", requires = "sudo_mode")]
    pub sudo_user: Option<String>,

    /// Hand the script to sudo directly instead of through `bash -c`
    #[arg(short = 'N', long = "no-sudo-shell", action = ArgAction::SetFalse)]
    pub sudo_shell: bool,

    /// Extra arguments for `git archive`
    #[arg(
        value_name = "GIT_ARCHIVE_ARGS",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub git_args: Vec<String>,
}

impl Args {
    pub fn uses_sudo(&self) -> bool {
        self.sudo || self.sudo_if_needed
    }

    /// (LOCAL_PATH, REMOTE_PATH) pairs in the order given.
    pub fn uploads(&self) -> impl Iterator<Item = (&str, &str)> {
        self.upload
            .chunks_exact(2)
            .map(|pair| (pair[0].as_str(), pair[1].as_str()))
    }
}
