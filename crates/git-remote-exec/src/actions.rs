use crate::error::Error;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use shell_escape::unix::escape;
use std::borrow::Cow;
use std::path::Path;

/// Separates actions in the composed script.
const SEPARATOR: &str = "\n\n";

/// A command that recreates the local file at `target` on the remote.
///
/// `target` is inserted as shell text, so it may refer to `$REPO_DIR`.
pub fn upload(source: &Path, target: &str) -> Result<String, Error> {
    let content = std::fs::read(source).map_err(|source_err| Error::Input {
        path: source.to_path_buf(),
        source: source_err,
    })?;

    Ok(format!(
        "printf '%s' {} | base64 -d > {}",
        BASE64.encode(content),
        target
    ))
}

/// Joins the actions into one script, in order.
pub fn compose<I, S>(actions: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    actions
        .into_iter()
        .map(|action| action.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Sudo {
    /// Run the script through `bash -c` rather than handing it to sudo as is
    pub shell: bool,
    pub user: Option<String>,
}

impl Default for Sudo {
    fn default() -> Self {
        Sudo {
            shell: true,
            user: None,
        }
    }
}

impl Sudo {
    /// Wraps the script so the remote runs it under sudo without prompting.
    pub fn wrap(&self, script: &str) -> String {
        let mut command = String::from("sudo -n --preserve-env");

        if let Some(user) = &self.user {
            command.push_str(" -u ");
            command.push_str(&escape(Cow::Borrowed(user.as_str())));
        }

        command.push(' ');

        if self.shell {
            command.push_str("bash -c ");
            command.push_str(&escape(Cow::Borrowed(script)));
        } else {
            command.push_str(script);
        }

        command
    }
}
