//! The `common-log` binary end to end.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn common_log(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_common-log"))
        .args(args)
        .current_dir(dir)
        .env_remove("POD_NAME")
        .output()
        .unwrap()
}

#[test]
fn test_fatal_exits_after_first_message() {
    let dir = tempfile::tempdir().unwrap();
    let out = common_log(dir.path(), &["log", "--level", "fatal", "boom", "never"]);

    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8(out.stderr).unwrap();
    let lines: Vec<&str> = stderr.lines().collect();
    assert_eq!(lines.len(), 1, "{stderr}");
    assert!(lines[0].contains(" FATAL "), "{stderr}");
    assert!(lines[0].ends_with("[[[((DEFAULT)) boom ]]]"), "{stderr}");
    assert!(!stderr.contains("never"));

    // missing settings file is created empty
    assert!(dir.path().join("setting-local.yml").is_file());
}

#[test]
fn test_messages_reach_log_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("setting-local.yml"),
        "env:\n  level: debug\n  gid: g-9\n  printType: [f]\n",
    )
    .unwrap();

    let out = common_log(dir.path(), &["log", "--level", "warn", "first", "second"]);
    assert!(out.status.success(), "{:?}", out);

    let logs: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "log"))
        .collect();
    assert_eq!(logs.len(), 1, "{logs:?}");
    let name = logs[0].file_name().unwrap().to_str().unwrap();
    assert!(name.starts_with("_DEFAULT__debug_"), "{name}");

    let text = fs::read_to_string(&logs[0]).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2, "{text}");
    assert!(lines[0].contains(" WARN main.rs:"));
    assert!(lines[0].ends_with("[[[((g-9)) first ]]]"));
    assert!(lines[1].ends_with("[[[((g-9)) second ]]]"));

    let stderr = String::from_utf8(out.stderr).unwrap();
    assert_eq!(stderr.lines().collect::<Vec<_>>(), lines);
}

#[test]
fn test_show_config_prints_effective_settings() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("custom.yml"),
        "env:\n  level: warn\n  gid: g-3\n",
    )
    .unwrap();

    let out = common_log(dir.path(), &["--config", "custom.yml", "show-config"]);
    assert!(out.status.success());
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(stdout.starts_with("env:"), "{stdout}");
    assert!(stdout.contains("level: warn"));
    assert!(stdout.contains("gid: g-3"));
}
