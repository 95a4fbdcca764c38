use std::process::Command;

#[test]
fn cli_compiles_without_warnings() {
    let status = Command::new(env!("CARGO"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args(["check", "--quiet", "--bin", "maze-shooter"])
        .status()
        .expect("failed to invoke cargo check for maze-shooter CLI binary");

    assert!(status.success(), "cargo check --bin maze-shooter should succeed");
}

#[test]
fn cli_runs_the_demo_arena() {
    let output = Command::new(env!("CARGO_BIN_EXE_maze-shooter"))
        .args(["--ticks", "120", "--json"])
        .output()
        .expect("failed to run maze-shooter");

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let summary: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("summary is JSON");
    assert_eq!(summary["ticks"], 120);
}

#[test]
fn cli_rejects_missing_level_file() {
    let output = Command::new(env!("CARGO_BIN_EXE_maze-shooter"))
        .args(["--level", "no/such/level.json"])
        .output()
        .expect("failed to run maze-shooter");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("no/such/level.json"));
}
