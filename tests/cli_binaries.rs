use std::process::Command;

fn binary_output(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_goanysync"))
        .args(args)
        .output()
        .unwrap_or_else(|error| panic!("failed to run goanysync: {error}"))
}

fn combined_utf8(output: &std::process::Output) -> String {
    let mut data = output.stdout.clone();
    data.extend_from_slice(&output.stderr);
    String::from_utf8(data).expect("binary output should be valid UTF-8")
}

#[test]
fn help_lists_usage_and_commands() {
    let output = binary_output(&["--help"]);
    assert!(output.status.success(), "--help should succeed");
    assert!(
        output.stderr.is_empty(),
        "help output should not write to stderr"
    );
    let stdout = String::from_utf8(output.stdout).expect("stdout is UTF-8");
    assert!(stdout.contains("Usage:"));
    for command in ["check", "prepare", "flush", "restore", "start", "stop", "info"] {
        assert!(stdout.contains(command), "help should mention {command}");
    }
}

#[test]
fn version_reports_package_version() {
    let output = binary_output(&["--version"]);
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("stdout is UTF-8");
    assert_eq!(stdout.trim(), format!("goanysync {}", env!("CARGO_PKG_VERSION")));
}

#[test]
fn without_command_shows_usage_and_fails() {
    let output = binary_output(&[]);
    assert_eq!(output.status.code(), Some(1));
    assert!(combined_utf8(&output).contains("Usage:"));
}

#[test]
fn missing_configuration_exits_with_config_status() {
    let temp = tempfile::tempdir().expect("tempdir");
    let missing = temp.path().join("absent.conf");
    let output = binary_output(&[
        "-c",
        missing.to_str().expect("utf-8 path"),
        "--no-syslog",
        "check",
    ]);
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_utf8(&output).contains("absent.conf"));
}
