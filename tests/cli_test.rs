use std::process::Command;

fn binary() -> Command {
    Command::new(env!("CARGO_BIN_EXE_sub-enum"))
}

#[test]
fn test_missing_domain_is_a_usage_error() {
    let output = binary().output().unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Usage"), "stderr: {}", stderr);
}

#[test]
fn test_invalid_domain_fails_before_network() {
    let output = binary()
        .args(["--no-color", "not_a_domain!!"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("'not_a_domain!!' does not appear to be a valid domain."),
        "stderr: {}",
        stderr
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("Gathering subdomains"));
}

#[test]
fn test_invalid_config_value_exits_with_config_error() {
    let output = binary()
        .args(["--no-color", "--concurrency", "0", "example.com"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("concurrency"), "stderr: {}", stderr);
}

#[cfg(unix)]
#[test]
fn test_interrupt_exits_without_table() {
    use std::io::Write;
    use std::net::TcpListener;
    use std::process::Stdio;
    use std::time::Duration;

    // 接受連線但從不回應
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());

    let mut config = tempfile::NamedTempFile::new().unwrap();
    write!(
        config,
        r#"
[sources]
enabled = ["archive", "crtsh", "certspotter"]

[http]
timeout_secs = 60

[endpoints]
archive = "{base}/cdx"
crtsh = "{base}/crtsh"
certspotter = "{base}/issuances"
"#
    )
    .unwrap();

    let child = binary()
        .arg("--no-color")
        .arg("--config")
        .arg(config.path())
        .arg("example.com")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    std::thread::sleep(Duration::from_millis(1000));
    let status = Command::new("kill")
        .args(["-INT", &child.id().to_string()])
        .status()
        .unwrap();
    assert!(status.success());

    let output = child.wait_with_output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(output.status.code(), Some(130), "stderr: {}", stderr);
    assert!(stderr.contains("-- Exited --"), "stderr: {}", stderr);
    assert!(stdout.contains("Gathering subdomains"));
    assert!(!stdout.contains("+---"), "stdout: {}", stdout);

    drop(listener);
}
