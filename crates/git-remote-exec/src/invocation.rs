use crate::envelope;
use crate::error::Error;
use derive_more::Display;
use std::ffi::OsString;
use strum::{EnumString, EnumVariantNames};

/// The tree git-archive is asked for. Its contents are never used.
pub const TREE_ISH: &str = "HEAD";

/// How the script's results travel back from the remote.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Display,
    EnumString,
    EnumVariantNames,
    Eq,
    PartialEq,
    clap::ValueEnum,
)]
#[strum(serialize_all = "kebab_case")]
pub enum Mode {
    /// Wrap the script so its stdout, stderr and exit code come back inside the archive
    #[default]
    #[display(fmt = "captured")]
    Captured,
    /// Pass the script to --exec untouched and discard the archive stream
    #[display(fmt = "raw")]
    Raw,
}

/// A remote as git knows it; passed through without validation.
#[derive(Clone, Debug, Display, Eq, PartialEq)]
pub struct RemoteName(String);

impl From<String> for RemoteName {
    fn from(name: String) -> Self {
        RemoteName(name)
    }
}

impl AsRef<str> for RemoteName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Invocation {
    remote: RemoteName,
    script: String,
    extra_git_args: Vec<String>,
    mode: Mode,
    shell: String,
}

impl Invocation {
    pub fn new(
        remote: impl Into<RemoteName>,
        script: impl Into<String>,
        extra_git_args: Vec<String>,
        mode: Mode,
        shell: impl Into<String>,
    ) -> Result<Self, Error> {
        let script = script.into();

        if script.trim().is_empty() {
            return Err(Error::Usage("the script must not be empty".to_string()));
        }

        Ok(Invocation {
            remote: remote.into(),
            script,
            extra_git_args,
            mode,
            shell: shell.into(),
        })
    }

    pub fn remote(&self) -> &RemoteName {
        &self.remote
    }

    pub fn script(&self) -> &str {
        &self.script
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// The same invocation running a different script.
    pub fn with_script(&self, script: impl Into<String>) -> Result<Self, Error> {
        Invocation::new(
            self.remote.clone(),
            script,
            self.extra_git_args.clone(),
            self.mode,
            self.shell.clone(),
        )
    }

    /// The command handed to the remote in place of git-upload-archive.
    pub fn exec_text(&self) -> String {
        match self.mode {
            Mode::Raw => self.script.clone(),
            Mode::Captured => envelope::wrap(&self.script, &self.shell),
        }
    }

    /// Arguments following the git program name.
    pub fn git_args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "archive".into(),
            format!("--remote={}", self.remote).into(),
            format!("--exec={}", self.exec_text()).into(),
        ];
        args.extend(self.extra_git_args.iter().map(OsString::from));
        args.push(TREE_ISH.into());
        args
    }
}
