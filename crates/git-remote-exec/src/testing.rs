//! Stand-ins for git in unit tests.

use std::path::{Path, PathBuf};

/// Writes an executable shell script named `git` into `dir`. It is run with
/// the archive arguments, so `$3` is the `--exec=` argument.
pub fn stub_git(dir: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt as _;

    let path = dir.join("git");
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// A result archive as the envelope sends it back.
pub fn result_archive(stdout: &[u8], stderr: &[u8], exit_code: i32) -> Vec<u8> {
    let exit_code = exit_code.to_string();
    let mut builder = tar::Builder::new(Vec::new());

    for (name, value) in [
        ("stdout", stdout),
        ("stderr", stderr),
        ("exitcode", exit_code.as_bytes()),
    ] {
        let mut header = tar::Header::new_ustar();
        header.set_size(value.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, name, value).unwrap();
    }

    builder.into_inner().unwrap()
}
