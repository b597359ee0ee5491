//! Integration tests for top-level CLI behavior.

use std::process::Command;

const DEAD_BACKEND: &str = "http://127.0.0.1:9";

fn run_pantry(args: &[&str]) -> std::process::Output {
    let bin = env!("CARGO_BIN_EXE_pantry");
    Command::new(bin)
        .args(args)
        .env("PANTRY_API_BASE", DEAD_BACKEND)
        .env_remove("PANTRY_SCAN_INTERVAL_MS")
        .env_remove("PANTRY_DECODE_FAILURE_LIMIT")
        .output()
        .expect("failed to run pantry binary")
}

#[test]
fn help_lists_subcommands() {
    let output = run_pantry(&["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("lookup"));
    assert!(stdout.contains("scan"));
    assert!(stdout.contains("shell"));
}

#[test]
fn unknown_subcommand_fails() {
    let output = run_pantry(&["dance"]);
    assert!(!output.status.success());
}

#[test]
fn scan_without_source_shows_error() {
    let output = run_pantry(&["scan"]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(stderr.contains("--test") || stderr.contains("--image"));
}

#[test]
fn lookup_falls_back_to_barcode_name_when_backend_is_down() {
    let output = run_pantry(&["lookup", "12345"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("Product 12345"));
}

#[test]
fn test_scan_adds_sample_ingredient_offline() {
    let output = run_pantry(&["scan", "--test"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("Test mode: Looking up sample product..."));
    assert!(stdout.contains("049000028911"));
}

#[test]
fn scan_with_missing_image_reports_camera_failure() {
    let output = run_pantry(&["scan", "--image", "/nonexistent/code.png", "--timeout", "1"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!output.status.success());
    assert!(stdout.contains("Failed to start camera"));
}

#[test]
fn shell_reads_commands_until_end_of_input() {
    use std::io::Write;
    use std::process::Stdio;

    let mut child = Command::new(env!("CARGO_BIN_EXE_pantry"))
        .arg("shell")
        .env("PANTRY_API_BASE", DEAD_BACKEND)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("failed to run pantry binary");
    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(b"test\nlist\nclear-cart\nquit\n")
        .expect("failed to write commands");
    let output = child.wait_with_output().expect("shell did not exit");
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("Ingredient added to your list!"));
    assert!(stdout.contains("Type 'clear-cart yes' to empty the cart"));
}
