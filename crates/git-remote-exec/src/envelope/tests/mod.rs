use super::*;

fn archive(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());

    // git-archive leads with a pax global header carrying the commit id.
    let comment = b"52 comment=0123456789abcdef0123456789abcdef01234567\n";
    let mut header = tar::Header::new_ustar();
    header.set_entry_type(tar::EntryType::XGlobalHeader);
    header.set_size(comment.len() as u64);
    header.set_cksum();
    builder
        .append_data(&mut header, "pax_global_header", &comment[..])
        .unwrap();

    for &(path, data) in entries {
        let mut header = tar::Header::new_ustar();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, path, data).unwrap();
    }

    builder.into_inner().unwrap()
}

#[test]
fn test_unpack() {
    let bytes = archive(&[
        ("exitcode", b"0"),
        ("stderr", b""),
        ("stdout", b"it works!\n"),
    ]);

    assert_eq!(
        unpack(&bytes).unwrap(),
        Captured {
            stdout: b"it works!\n".to_vec(),
            stderr: Vec::new(),
            exit_code: 0,
        }
    );
}

#[test]
fn test_unpack_nonzero_exit_code_and_binary_output() {
    let bytes = archive(&[
        ("exitcode", b"42"),
        ("stderr", b"boom\n"),
        ("stdout", &[0xff, 0x00, 0xfe]),
    ]);

    let captured = unpack(&bytes).unwrap();
    assert_eq!(captured.exit_code, 42);
    assert_eq!(captured.stderr, b"boom\n");
    assert_eq!(captured.stdout, vec![0xff, 0x00, 0xfe]);
}

#[test]
fn test_unpack_missing_exit_code() {
    let bytes = archive(&[("stdout", b"hello\n")]);
    assert!(matches!(unpack(&bytes), Err(Error::MalformedResult(_))));
}

#[test]
fn test_unpack_garbage_exit_code() {
    let bytes = archive(&[("exitcode", b"zero")]);
    assert!(matches!(unpack(&bytes), Err(Error::MalformedResult(_))));
}

#[test]
fn test_unpack_empty_input() {
    assert!(matches!(unpack(&[]), Err(Error::MalformedResult(_))));
}

#[test]
fn test_wrap_ends_with_interpreter() {
    let text = wrap("echo hello", "bash");
    assert!(text.ends_with(r#"bash "$f""#));
    assert!(text.contains("\necho hello\n"));
    assert!(text.contains("git upload-archive ."));
}

#[test]
fn test_wrap_uses_configured_shell() {
    assert!(wrap("true", "/usr/local/bin/bash").ends_with(r#"/usr/local/bin/bash "$f""#));
}

#[test]
fn test_delimiter_avoids_script_lines() {
    assert_eq!(delimiter_for("echo hi"), "GIT_REMOTE_RUN_EOF");

    let script = "cat <<GIT_REMOTE_RUN_EOF\nhi\nGIT_REMOTE_RUN_EOF\necho GIT_REMOTE_RUN_EOF_1";
    assert_eq!(delimiter_for(script), "GIT_REMOTE_RUN_EOF_1");

    let script = "GIT_REMOTE_RUN_EOF\nGIT_REMOTE_RUN_EOF_1";
    assert_eq!(delimiter_for(script), "GIT_REMOTE_RUN_EOF_2");

    let text = wrap(script, "bash");
    assert!(text.contains("<<'GIT_REMOTE_RUN_EOF_2'\n"));
    assert!(text.contains("\nGIT_REMOTE_RUN_EOF_2\nbash"));
}
