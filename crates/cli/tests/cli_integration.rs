use std::io::Write;
use std::process::{Command, Output, Stdio};

fn argh() -> Command {
    Command::new(env!("CARGO_BIN_EXE_argh"))
}

fn assert_success(out: &Output, what: &str) {
    assert!(
        out.status.success(),
        "{what} failed:\nstatus: {}\nstdout:\n{}\nstderr:\n{}",
        out.status,
        String::from_utf8_lossy(&out.stdout),
        String::from_utf8_lossy(&out.stderr),
    );
}

fn stdout_json(out: &Output) -> serde_json::Value {
    serde_json::from_slice(&out.stdout).unwrap_or_else(|e| {
        panic!(
            "stdout is not JSON ({e}):\n{}",
            String::from_utf8_lossy(&out.stdout)
        )
    })
}

#[test]
fn help_works() {
    let out = argh()
        .arg("--help")
        .output()
        .expect("failed to run argh --help");
    assert_success(&out, "argh --help");
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(
        stdout.contains("--pretty") && stdout.contains("--key") && stdout.contains("TOKENS"),
        "unexpected help output:\n{stdout}"
    );
}

#[test]
fn no_tokens_prints_empty_object() {
    let out = argh().output().expect("failed to run argh");
    assert_success(&out, "argh");
    assert_eq!(stdout_json(&out), serde_json::json!({}));
}

#[test]
fn parses_tokens_after_separator() {
    let out = argh()
        .args(["--", "--foo", "bar", "-abc", "--redis.port", "9999", "file.txt"])
        .output()
        .expect("failed to run argh");
    assert_success(&out, "argh -- ...");
    assert_eq!(
        stdout_json(&out),
        serde_json::json!({
            "foo": "bar",
            "a": true,
            "b": true,
            "c": true,
            "redis": { "port": 9999 },
            "argv": ["file.txt"],
        })
    );
}

#[test]
fn inner_separator_is_kept_for_the_parser() {
    let out = argh()
        .args(["--", "--foo", "--", "--bar"])
        .output()
        .expect("failed to run argh");
    assert_success(&out, "argh -- --foo -- --bar");
    assert_eq!(
        stdout_json(&out),
        serde_json::json!({ "foo": true, "argv": ["--bar"] })
    );
}

#[test]
fn key_prints_scalars_bare() {
    let out = argh()
        .args(["--key", "redis.host", "--", "--redis.host='localhost'"])
        .output()
        .expect("failed to run argh --key");
    assert_success(&out, "argh --key");
    assert_eq!(String::from_utf8_lossy(&out.stdout).trim(), "localhost");
}

#[test]
fn key_prints_positionals_as_json() {
    let out = argh()
        .args(["--key", "argv", "--", "one", "two"])
        .output()
        .expect("failed to run argh --key argv");
    assert_success(&out, "argh --key argv");
    assert_eq!(stdout_json(&out), serde_json::json!(["one", "two"]));
}

#[test]
fn key_argv_falls_back_to_flag_without_positionals() {
    let out = argh()
        .args(["--key", "argv", "--", "--argv", "x"])
        .output()
        .expect("failed to run argh --key argv");
    assert_success(&out, "argh --key argv -- --argv x");
    assert_eq!(String::from_utf8_lossy(&out.stdout).trim(), "x");

    let out = argh()
        .args(["--", "--argv", "x"])
        .output()
        .expect("failed to run argh");
    assert_success(&out, "argh -- --argv x");
    assert_eq!(stdout_json(&out), serde_json::json!({ "argv": "x" }));
}

#[test]
fn missing_key_fails() {
    let out = argh()
        .args(["--key", "nope", "--", "--foo"])
        .output()
        .expect("failed to run argh --key nope");
    assert!(!out.status.success(), "expected failure for missing key");
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("key not found: nope"), "stderr:\n{stderr}");
}

#[test]
fn reads_tokens_from_stdin() {
    let mut child = argh()
        .arg("--stdin")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn argh --stdin");
    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(b"--require\nfoo\n--require\nbar\n")
        .expect("failed to write tokens");
    let out = child.wait_with_output().expect("failed to wait for argh");
    assert_success(&out, "argh --stdin");
    assert_eq!(
        stdout_json(&out),
        serde_json::json!({ "require": ["foo", "bar"] })
    );
}
