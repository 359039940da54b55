//! The remote side of captured mode.
//!
//! git-archive only accepts an archive from whatever runs in place of
//! git-upload-archive, so anything the script prints directly would be read as
//! protocol data and rejected. The envelope instead runs the script with its
//! output redirected into files, commits those files to a throwaway repository
//! and serves that repository with the real `git upload-archive`. The tar
//! archive that comes back carries three entries: `stdout`, `stderr` and
//! `exitcode`.
//!
//! git appends the quoted repository path to the exec command, which is why the
//! envelope ends with the interpreter invocation: the path becomes `$1` of the
//! wrapper and is exported as `$REPO_DIR` for the script.

use crate::error::Error;
use log::trace;
use std::io::Read as _;

#[cfg(test)]
mod tests;

const STDOUT: &str = "stdout";
const STDERR: &str = "stderr";
const EXITCODE: &str = "exitcode";

const DELIMITER: &str = "GIT_REMOTE_RUN_EOF";

const PRELUDE: &str = r#"REPO_DIR="$1"
case "$REPO_DIR" in
    "~") REPO_DIR="$HOME" ;;
    "~/"*) REPO_DIR="$HOME/${REPO_DIR#"~/"}" ;;
esac
export REPO_DIR
result="$(mktemp -d "${TMPDIR:-/tmp}/git-remote-run-XXXXXX")" || exit 1
trap 'rm -rf "$result" "$0"' EXIT
(
"#;

const EPILOGUE: &str = r#"
) </dev/null >"$result/stdout" 2>"$result/stderr"
printf '%s' "$?" >"$result/exitcode"
cd "$result" || exit 1
git -c init.defaultBranch=main init -q . &&
    git add stdout stderr exitcode &&
    git -c user.name=git-remote-run -c user.email=git-remote-run@localhost \
        -c commit.gpgSign=false -c core.hooksPath=/dev/null commit -q -m result &&
    git upload-archive ."#;

/// What the script left behind on the remote.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Captured {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub exit_code: i32,
}

/// Wraps `script` in the envelope, to be run by `shell` on the remote.
pub fn wrap(script: &str, shell: &str) -> String {
    let delimiter = delimiter_for(script);

    let mut text = String::new();
    text.push_str(r#"f="$(mktemp "${TMPDIR:-/tmp}/git-remote-run-XXXXXX")" && cat >"$f" <<'"#);
    text.push_str(&delimiter);
    text.push_str("'\n");
    text.push_str(PRELUDE);
    text.push_str(script);
    text.push_str(EPILOGUE);
    text.push('\n');
    text.push_str(&delimiter);
    text.push('\n');
    // git appends the repository path to this line.
    text.push_str(shell);
    text.push_str(r#" "$f""#);
    text
}

// The quoted here-document ends at the first line equal to the delimiter, so
// pick one that no line of the script matches.
fn delimiter_for(script: &str) -> String {
    let mut delimiter = DELIMITER.to_string();
    let mut n = 0;

    while script.lines().any(|line| line == delimiter) {
        n += 1;
        delimiter = format!("{}_{}", DELIMITER, n);
    }

    delimiter
}

/// Reads the result entries out of the archive sent back by the envelope.
pub fn unpack(archive: &[u8]) -> Result<Captured, Error> {
    let mut archive = tar::Archive::new(archive);
    let mut stdout = None;
    let mut stderr = None;
    let mut exit_code = None;

    let entries = archive
        .entries()
        .map_err(|err| Error::MalformedResult(format!("failed to read entries: {}", err)))?;

    for entry in entries {
        let mut entry =
            entry.map_err(|err| Error::MalformedResult(format!("bad entry: {}", err)))?;

        // Skips the pax global header git puts in front.
        if !entry.header().entry_type().is_file() {
            continue;
        }

        let path = entry
            .path()
            .map_err(|err| Error::MalformedResult(format!("bad entry path: {}", err)))?
            .to_string_lossy()
            .into_owned();

        let mut value = Vec::new();
        entry.read_to_end(&mut value)?;
        trace!("entry {}: {} bytes", path, value.len());

        match path.as_str() {
            STDOUT => stdout = Some(value),
            STDERR => stderr = Some(value),
            EXITCODE => exit_code = Some(parse_exit_code(&value)?),
            _ => trace!("ignoring unexpected entry {}", path),
        }
    }

    let exit_code = exit_code
        .ok_or_else(|| Error::MalformedResult(format!("no {} entry", EXITCODE)))?;

    Ok(Captured {
        stdout: stdout.unwrap_or_default(),
        stderr: stderr.unwrap_or_default(),
        exit_code,
    })
}

fn parse_exit_code(value: &[u8]) -> Result<i32, Error> {
    std::str::from_utf8(value)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .ok_or_else(|| {
            Error::MalformedResult(format!(
                "{} is not a number: {:?}",
                EXITCODE,
                String::from_utf8_lossy(value)
            ))
        })
}
