use std::path::Path;
use std::process::{Command, Output};

/// `todo` command pinned to a data directory, isolated from the caller's
/// environment and user config.
pub fn todo_cmd(dir: &Path) -> Command {
    let bin = assert_cmd::cargo::cargo_bin!("todo");
    let mut cmd = Command::new(bin.as_os_str());
    cmd.current_dir(dir)
        .env("HOME", dir)
        .env_remove("TODO_DIR")
        .env_remove("TODO_BACKEND")
        .env_remove("TODO_DB")
        .env_remove("TODO_KV_DIR")
        .env_remove("RUST_LOG")
        .arg("--dir")
        .arg(dir.join(".todos"));
    cmd
}

/// Run with `--json` and parse stdout.
pub fn run_json(dir: &Path, args: &[&str]) -> serde_json::Value {
    let output = todo_cmd(dir)
        .args(args)
        .arg("--json")
        .output()
        .expect("run todo");
    assert!(output.status.success(), "todo {args:?} failed: {output:?}");
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

pub fn run(dir: &Path, args: &[&str]) -> Output {
    todo_cmd(dir).args(args).output().expect("run todo")
}
