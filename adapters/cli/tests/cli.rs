use std::{path::PathBuf, process::Command};

fn manifest_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(relative)
}

#[test]
fn street_level_is_cleared_by_walking_right() {
    let output = Command::new(env!("CARGO_BIN_EXE_last-bus"))
        .arg(manifest_path("levels/street.lvl"))
        .arg("--config")
        .arg(manifest_path("last-bus.toml"))
        .arg("--mute")
        .output()
        .expect("failed to run the last-bus binary");

    assert!(output.status.success(), "last-bus should exit cleanly");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("level 1 (Normal): cleared"), "{stdout}");
}

#[test]
fn unreadable_levels_fail_with_context() {
    let output = Command::new(env!("CARGO_BIN_EXE_last-bus"))
        .arg(manifest_path("levels/missing.lvl"))
        .arg("--mute")
        .output()
        .expect("failed to run the last-bus binary");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to load level"), "{stderr}");
}
