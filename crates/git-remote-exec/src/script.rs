use crate::error::Error;
use std::io::Read as _;
use std::path::{Path, PathBuf};

/// Path that makes `--file` read standard input.
pub const STDIN: &str = "-";

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ScriptSource {
    Inline(String),
    File(PathBuf),
}

impl ScriptSource {
    /// Exactly one of `command` and `file` has to be given.
    pub fn from_options(command: Option<String>, file: Option<PathBuf>) -> Result<Self, Error> {
        match (command, file) {
            (Some(command), None) => Ok(ScriptSource::Inline(command)),
            (None, Some(file)) => Ok(ScriptSource::File(file)),
            (None, None) => Err(Error::Usage(
                "a script is required: --command or --file".to_string(),
            )),
            (Some(_), Some(_)) => Err(Error::Usage(
                "--command and --file cannot be used together".to_string(),
            )),
        }
    }

    pub fn resolve(self) -> Result<String, Error> {
        match self {
            ScriptSource::Inline(script) => {
                if script.trim().is_empty() {
                    Err(Error::Usage("the script must not be empty".to_string()))
                } else {
                    Ok(script)
                }
            }
            ScriptSource::File(path) => {
                let script = read(&path)?;
                if script.trim().is_empty() {
                    Err(Error::EmptyInput { path })
                } else {
                    Ok(script)
                }
            }
        }
    }
}

fn read(path: &Path) -> Result<String, Error> {
    let input_error = |source| Error::Input {
        path: path.to_path_buf(),
        source,
    };

    if path == Path::new(STDIN) {
        let mut script = String::new();
        std::io::stdin()
            .read_to_string(&mut script)
            .map_err(input_error)?;
        Ok(script)
    } else {
        std::fs::read_to_string(path).map_err(input_error)
    }
}
