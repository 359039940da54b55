use crate::Args;
use anyhow::{anyhow, bail, Context};
use git_remote_exec::actions::{self, Sudo};
use git_remote_exec::{Error, Remote};
use log::{debug, trace};
use shell_escape::unix::escape;
use std::borrow::Cow;
use std::path::Path;

// Prints the first missing directory on the way to $REPO_DIR and the
// user:group that should own it, or nothing when $REPO_DIR exists.
const FIND_MISSING_PARENT: &str = r#"[ -d "$REPO_DIR" ] || (
    cur="$(realpath -m "$REPO_DIR")"
    par="$(dirname "$cur")"
    while [ ! -d "$par" ]; do
        cur="$par"
        par="$(dirname "$cur")"
    done
    echo "$cur"
    echo "$(id -un):$(id -gn)"
)"#;

const INIT: &str = r#"mkdir -p "$REPO_DIR" && git init --bare -q "$REPO_DIR""#;

pub async fn run(args: Args) -> anyhow::Result<()> {
    let mut steps = vec![INIT.to_string()];
    if let Some(hooks) = &args.hooks {
        steps.extend(hook_steps(hooks)?);
    }

    let remote = Remote::new(args.remote);
    let sudo = Sudo::default();

    let inspected = remote
        .execute(FIND_MISSING_PARENT)
        .await?
        .into_captured()
        .context("failed to inspect the remote")?;

    if let Some((dir, owner)) = parse_missing_parent(&inspected.stdout)? {
        debug!("creating {} owned by {} on {}", dir, owner, remote.name());

        let create = format!(
            "mkdir {dir} && chown {owner} {dir}",
            dir = escape(Cow::Borrowed(dir.as_str())),
            owner = escape(Cow::Borrowed(owner.as_str()))
        );

        let created = remote.execute_or_sudo(&create, &sudo).await?;

        if created.exit_code() != 0 {
            created.relay()?;
            bail!("failed to create {}", dir);
        }
    }

    let outcome = remote.execute(&actions::compose(&steps)).await?;
    outcome.relay()?;

    match outcome.exit_code() {
        0 => Ok(()),
        code => Err(Error::RemoteExecution { code }.into()),
    }
}

fn parse_missing_parent(stdout: &[u8]) -> anyhow::Result<Option<(String, String)>> {
    let stdout = std::str::from_utf8(stdout).context("inspection output is not UTF-8")?;
    trace!("missing parent: {:?}", stdout);

    let stdout = stdout.trim();
    if stdout.is_empty() {
        return Ok(None);
    }

    let (dir, owner) = stdout
        .rsplit_once('\n')
        .ok_or_else(|| anyhow!("unexpected inspection output: {:?}", stdout))?;

    Ok(Some((dir.to_string(), owner.to_string())))
}

/// Uploads every file in `dir` into the repository's hooks and marks it
/// executable.
fn hook_steps(dir: &Path) -> anyhow::Result<Vec<String>> {
    let mut paths = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read hooks directory {}", dir.display()))?
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<Result<Vec<_>, _>>()?;
    paths.sort();

    let mut steps = Vec::new();

    for path in paths.into_iter().filter(|path| path.is_file()) {
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| anyhow!("hook name is not UTF-8: {}", path.display()))?;

        let target = format!(r#""$REPO_DIR"/hooks/{}"#, escape(Cow::Borrowed(name)));
        steps.push(actions::upload(&path, &target)?);
        steps.push(format!("chmod +x {}", target));
    }

    Ok(steps)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_missing_parent() {
        assert_eq!(parse_missing_parent(b"").unwrap(), None);
        assert_eq!(parse_missing_parent(b"\n").unwrap(), None);
        assert_eq!(
            parse_missing_parent(b"/srv/git\ngit:git\n").unwrap(),
            Some(("/srv/git".to_string(), "git:git".to_string()))
        );
        assert!(parse_missing_parent(b"/srv/git\n").is_err());
    }

    #[test]
    fn test_hook_steps() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("pre-receive"), "#!/bin/sh\nexit 0\n").unwrap();
        std::fs::write(dir.path().join("post-receive"), "#!/bin/sh\necho ok\n").unwrap();
        std::fs::create_dir(dir.path().join("lib")).unwrap();

        let steps = hook_steps(dir.path()).unwrap();

        assert_eq!(steps.len(), 4);
        assert!(steps[0].ends_with(r#"> "$REPO_DIR"/hooks/post-receive"#));
        assert_eq!(steps[1], r#"chmod +x "$REPO_DIR"/hooks/post-receive"#);
        assert!(steps[2].ends_with(r#"> "$REPO_DIR"/hooks/pre-receive"#));
        assert_eq!(steps[3], r#"chmod +x "$REPO_DIR"/hooks/pre-receive"#);
    }

    #[test]
    fn test_hook_steps_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(hook_steps(&dir.path().join("missing")).is_err());
    }
}
