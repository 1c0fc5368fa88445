//! In-process tests of `cli::run` against scratch configurations.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use cli::{ExitCode, run};
use metadata::Owner;

const COPY_TOOL: &str = "#!/bin/sh\n\
    # called as: copy-tool -a --delete SRC/ DST\n\
    src=\"$3\"\n\
    dst=\"$4\"\n\
    find \"$dst\" -mindepth 1 -delete\n\
    cp -a \"$src.\" \"$dst/\"\n";

struct Setup {
    _temp: tempfile::TempDir,
    base: PathBuf,
    config: PathBuf,
    source: PathBuf,
}

impl Setup {
    fn new() -> Self {
        let temp = tempfile::tempdir().expect("tempdir");
        let base = temp.path().to_path_buf();
        fs::set_permissions(&base, fs::Permissions::from_mode(0o755)).expect("chmod");

        let tool = base.join("copy-tool");
        fs::write(&tool, COPY_TOOL).expect("write tool");
        fs::set_permissions(&tool, fs::Permissions::from_mode(0o755)).expect("chmod tool");

        let lock = base.join("lock");
        fs::create_dir(&lock).expect("mkdir lock");
        fs::set_permissions(&lock, fs::Permissions::from_mode(0o755)).expect("chmod lock");

        let source = base.join("data");
        fs::create_dir(&source).expect("mkdir source");
        fs::write(source.join("a.txt"), "alpha").expect("write");

        let config = base.join("goanysync.conf");
        fs::write(
            &config,
            format!(
                "TMPFS = {base}/vol\nRSYNC_BIN = {tool}\nWHATTOSYNC = {source}\nLOCK_DIR = {lock}\n",
                base = base.display(),
                tool = tool.display(),
                source = source.display(),
                lock = lock.display()
            ),
        )
        .expect("write config");

        Self {
            _temp: temp,
            base,
            config,
            source,
        }
    }

    fn run(&self, args: &[&str]) -> (i32, String, String) {
        let config = self.config.to_string_lossy().into_owned();
        let mut argv = vec!["goanysync", "-c", config.as_str(), "--no-syslog"];
        argv.extend_from_slice(args);
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let code = run(argv, &mut stdout, &mut stderr);
        (
            code,
            String::from_utf8_lossy(&stdout).into_owned(),
            String::from_utf8_lossy(&stderr).into_owned(),
        )
    }

    fn volatile(&self) -> PathBuf {
        let owner = Owner::current();
        let mut path = self
            .base
            .join("vol")
            .join(format!("goanysync-{}-{}", owner.uid, owner.gid));
        path.push(self.source.strip_prefix("/").expect("absolute"));
        path
    }
}

fn is_symlink(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok_and(|metadata| metadata.file_type().is_symlink())
}

#[test]
fn help_goes_to_stdout_and_succeeds() {
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let code = run(["goanysync", "--help"], &mut stdout, &mut stderr);
    assert_eq!(code, ExitCode::Ok.as_i32());
    let text = String::from_utf8_lossy(&stdout);
    assert!(text.contains("prepare"), "{text}");
    assert!(text.contains("--no-syslog"), "{text}");
    assert!(stderr.is_empty());
}

#[test]
fn unknown_command_is_a_usage_error() {
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let code = run(["goanysync", "frobnicate"], &mut stdout, &mut stderr);
    assert_eq!(code, ExitCode::Syntax.as_i32());
    assert!(!stderr.is_empty());
}

#[test]
fn missing_configuration_is_a_config_error() {
    let temp = tempfile::tempdir().expect("tempdir");
    let missing = temp.path().join("absent.conf");
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let code = run(
        [
            "goanysync",
            "-c",
            missing.to_str().expect("utf-8"),
            "--no-syslog",
            "check",
        ],
        &mut stdout,
        &mut stderr,
    );
    assert_eq!(code, ExitCode::Config.as_i32());
    assert!(String::from_utf8_lossy(&stderr).contains("absent.conf"));
}

#[test]
fn untrusted_lock_location_is_a_lock_error() {
    let setup = Setup::new();
    fs::set_permissions(setup.base.join("lock"), fs::Permissions::from_mode(0o777))
        .expect("chmod");
    let (code, _, stderr) = setup.run(&["check"]);
    assert_eq!(code, ExitCode::Lock.as_i32(), "{stderr}");
    assert!(stderr.contains("writable"), "{stderr}");
}

#[test]
fn prepare_info_and_stop_round_trip() {
    let setup = Setup::new();

    let (code, _, stderr) = setup.run(&["prepare"]);
    assert_eq!(code, 0, "{stderr}");
    assert!(is_symlink(&setup.source));
    assert_eq!(fs::read_link(&setup.source).expect("readlink"), setup.volatile());
    assert_eq!(
        fs::read_to_string(setup.volatile().join("a.txt")).expect("read"),
        "alpha"
    );

    let (code, stdout, stderr) = setup.run(&["info", "--json"]);
    assert_eq!(code, 0, "{stderr}");
    let json: serde_json::Value = serde_json::from_str(&stdout).expect("valid json");
    assert_eq!(json["sources"][0]["relocated"], serde_json::Value::Bool(true));

    fs::write(setup.source.join("b.txt"), "beta").expect("write through link");
    let (code, _, stderr) = setup.run(&["stop"]);
    assert_eq!(code, 0, "{stderr}");
    assert!(!is_symlink(&setup.source));
    assert_eq!(
        fs::read_to_string(setup.source.join("b.txt")).expect("read"),
        "beta"
    );
    assert!(!setup.volatile().exists());
    assert!(!setup.base.join("lock/process.lock").exists());
}

#[test]
fn verbose_prints_resolved_configuration() {
    let setup = Setup::new();
    let (code, stdout, stderr) = setup.run(&["-v", "check"]);
    assert_eq!(code, 0, "{stderr}");
    assert!(stdout.contains("TMPFS = "), "{stdout}");
    assert!(stdout.contains("LOCK_TIMEOUT = 0"), "{stdout}");
}

#[test]
fn start_with_orphans_is_a_verb_failure() {
    let setup = Setup::new();
    let owner = Owner::current();
    let stale = setup
        .base
        .join("vol")
        .join(format!("goanysync-{}-{}", owner.uid, owner.gid))
        .join(setup.base.strip_prefix("/").expect("absolute"))
        .join("dropped");
    fs::create_dir_all(&stale).expect("mkdir stale");

    let (code, _, stderr) = setup.run(&["start"]);
    assert_eq!(code, ExitCode::Verb.as_i32(), "{stderr}");
    assert!(stderr.contains("orphan"), "{stderr}");
    assert!(!is_symlink(&setup.source));
}

#[test]
fn per_source_skips_keep_success_status() {
    let setup = Setup::new();
    let (code, _, stderr) = setup.run(&["flush"]);
    assert_eq!(code, 0, "{stderr}");
}

#[test]
fn stop_with_failing_copy_tool_keeps_the_source_relocated() {
    let setup = Setup::new();
    let (code, _, stderr) = setup.run(&["prepare"]);
    assert_eq!(code, 0, "{stderr}");

    fs::write(setup.base.join("copy-tool"), "#!/bin/sh\necho 'disk full' >&2\nexit 11\n")
        .expect("rewrite tool");
    fs::write(setup.source.join("b.txt"), "beta").expect("write through link");

    let (code, _, stderr) = setup.run(&["stop"]);
    assert_eq!(code, ExitCode::Verb.as_i32(), "{stderr}");
    assert!(stderr.contains("still relocated"), "{stderr}");
    assert_eq!(fs::read_link(&setup.source).expect("readlink"), setup.volatile());
    assert_eq!(
        fs::read_to_string(setup.volatile().join("b.txt")).expect("read"),
        "beta"
    );
}
