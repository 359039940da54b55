use anyhow::anyhow;
use log::trace;
use std::path::Path;

/// The URL git connects to for `remote`, with `insteadOf` rewrites applied.
/// git prints the name back unchanged when no remote by that name exists.
pub fn get_url(remote: &str) -> anyhow::Result<String> {
    let output = std::process::Command::new("git")
        .arg("ls-remote")
        .arg("--get-url")
        .arg(remote)
        .output()?;

    if !output.status.success() {
        return Err(anyhow!("git ls-remote --get-url {} failed", remote));
    }

    let url = String::from_utf8(output.stdout)?;
    let url = url.trim().to_string();
    trace!("{} -> {:?}", remote, url);

    Ok(url)
}

/// Whether git reads `url` as a URL rather than a local path: it has a scheme,
/// or it is scp-like with a colon before any slash.
pub fn is_url(url: &str) -> bool {
    if url.contains("://") {
        return true;
    }

    match url.find(':') {
        Some(0) | None => false,
        Some(colon) => !url[..colon].contains('/'),
    }
}

/// Whether `remote` names something git can reach: a configured remote, a
/// URL, or an existing local path. Anything else git would run as a local
/// path, executing the script on this machine.
pub fn is_reachable(remote: &str, url: &str) -> bool {
    url != remote || is_url(url) || Path::new(url).exists()
}
