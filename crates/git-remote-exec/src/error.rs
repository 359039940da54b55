use std::io;
use std::path::PathBuf;

pub const EXIT_INPUT: u8 = 1;
pub const EXIT_USAGE: u8 = 2;
pub const EXIT_SPAWN: u8 = 127;
/// What git itself exits with on a fatal error.
pub const EXIT_GIT_FATAL: u8 = 128;
const EXIT_SIGNAL_BASE: i32 = 128;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Usage(String),

    #[error("failed to read {}: {source}", path.display())]
    Input {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} is empty", path.display())]
    EmptyInput { path: PathBuf },

    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("'{0}' does not appear to be a git repository or a configured remote")]
    UnknownRemote(String),

    #[error("remote execution exited with code {code}")]
    RemoteExecution { code: i32 },

    #[error("interrupted by signal {signal}")]
    Interrupted { signal: i32 },

    #[error("malformed result archive: {0}")]
    MalformedResult(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    /// The process exit code this error maps to.
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::Usage(_) => EXIT_USAGE,
            Error::Input { .. } | Error::EmptyInput { .. } => EXIT_INPUT,
            Error::Spawn { .. } => EXIT_SPAWN,
            Error::UnknownRemote(_) => EXIT_GIT_FATAL,
            Error::RemoteExecution { code } => clamp(*code),
            Error::Interrupted { signal } => clamp(EXIT_SIGNAL_BASE + signal),
            Error::MalformedResult(_) | Error::Io(_) => EXIT_INPUT,
        }
    }

    /// Remote failures have already had their stderr relayed.
    pub fn is_already_reported(&self) -> bool {
        matches!(self, Error::RemoteExecution { .. })
    }
}

// A non-zero code that wraps to 0 as a u8 must still signal failure.
fn clamp(code: i32) -> u8 {
    match u8::try_from(code) {
        Ok(0) | Err(_) => 1,
        Ok(code) => code,
    }
}
