use crate::error::Error;
use crate::invocation::Mode;
use anyhow::anyhow;
use log::trace;
use std::str::FromStr as _;

pub fn get(key: &str) -> anyhow::Result<String> {
    let output = std::process::Command::new("git")
        .arg("config")
        .arg("--get")
        .arg(key)
        .output()?;

    // `git config --get` exits with 1 when the key is unset.
    if !output.status.success() {
        return Err(anyhow!("{} is not set", key));
    }

    let config_value = String::from_utf8(output.stdout)?;
    let config_value = config_value.trim().to_string();
    trace!("{} = {:?}", key, config_value);

    Ok(config_value)
}

const MODE_KEY: &str = "remoteRun.mode";

/// The configured mode. Only an unset key, or no git to ask, falls back to
/// the default; a value that is not a mode is a usage error.
pub fn mode() -> Result<Mode, Error> {
    match get(MODE_KEY) {
        Ok(config_value) => parse_mode(&config_value),
        Err(err) => {
            trace!("using the default mode: {:#}", err);
            Ok(Mode::default())
        }
    }
}

fn parse_mode(config_value: &str) -> Result<Mode, Error> {
    Mode::from_str(config_value).map_err(|_| {
        Error::Usage(format!(
            "{} must be one of: captured, raw (found {:?})",
            MODE_KEY, config_value
        ))
    })
}

const SHELL_KEY: &str = "remoteRun.shell";
const DEFAULT_SHELL: &str = "bash";

pub fn shell() -> String {
    get(SHELL_KEY)
        .ok()
        .filter(|config_value| !config_value.is_empty())
        .unwrap_or_else(|| DEFAULT_SHELL.to_string())
}
