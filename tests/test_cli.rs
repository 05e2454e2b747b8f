// CLI integration tests for exifbatch

#[cfg(unix)]
mod helpers;

use std::process::Command;

/// Command for the binary under test.
///
/// On Unix the fake executables are installed first so no script is still
/// being written while another test spawns a process.
fn exifbatch_command() -> Command {
    #[cfg(unix)]
    helpers::fake_exiftool::fake_exiftools();
    Command::new(env!("CARGO_BIN_EXE_exifbatch"))
}

/// Test that --help lists the subcommands
#[test]
fn test_help_flag_shows_help_message() {
    let output = exifbatch_command()
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "Help should exit with success");
    assert!(
        stdout.contains("exifbatch"),
        "Help should contain program name. Got: {}",
        stdout
    );
    for subcommand in ["version", "read", "write", "delete-originals", "exec"] {
        assert!(
            stdout.contains(subcommand),
            "Help should list {}. Got: {}",
            subcommand,
            stdout
        );
    }
}

/// Test that a write without assignments is rejected by argument parsing
#[test]
fn test_write_requires_tag_assignment() {
    let output = exifbatch_command()
        .args(["write", "a.jpg", "NotAnAssignment"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("TAG=VALUE"),
        "Should explain the expected format. Got: {}",
        stderr
    );
}

/// Test that a missing executable exits with status 1
#[test]
fn test_missing_executable_exits_with_failure() {
    let output = exifbatch_command()
        .args(["--exiftool", "/nonexistent/exiftool", "version"])
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("/nonexistent/exiftool"),
        "Should name the missing executable. Got: {}",
        stderr
    );
}

#[cfg(unix)]
mod with_fake_exiftool {
    use super::*;
    use crate::helpers::fake_exiftool::{FAKE_VERSION, fake_exiftools};

    fn exifbatch() -> Command {
        let mut command = exifbatch_command();
        command
            .arg("--exiftool")
            .arg(&fake_exiftools().standard)
            // Keep a developer's own settings out of the test.
            .arg("--config")
            .arg(empty_config());
        command
    }

    fn empty_config() -> std::path::PathBuf {
        static CONFIG: std::sync::OnceLock<tempfile::NamedTempFile> = std::sync::OnceLock::new();
        CONFIG
            .get_or_init(|| tempfile::NamedTempFile::new().expect("Failed to create config"))
            .path()
            .to_path_buf()
    }

    #[test]
    fn test_version_prints_fake_version() {
        let output = exifbatch().arg("version").output().unwrap();

        assert!(output.status.success());
        assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), FAKE_VERSION);
    }

    #[test]
    fn test_read_prints_sorted_tags() {
        let output = exifbatch().args(["read", "/photos/a.jpg"]).output().unwrap();

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        let lines: Vec<&str> = stdout.lines().collect();
        assert_eq!(
            lines,
            vec![
                "FileName: a.jpg",
                "ISO: 100",
                "Make: Canon",
                "Model: Canon EOS R5"
            ]
        );
    }

    #[test]
    fn test_read_json_prints_object() {
        let output = exifbatch()
            .args(["read", "--json", "/photos/a.jpg"])
            .output()
            .unwrap();

        assert!(output.status.success());
        let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(value["Make"], "Canon");
        assert_eq!(value["FileName"], "a.jpg");
    }

    #[test]
    fn test_failed_write_exits_with_failure() {
        let output = exifbatch()
            .args(["write", "/photos/readonly.jpg", "Artist=Jane"])
            .output()
            .unwrap();

        assert_eq!(output.status.code(), Some(1));
    }

    #[test]
    fn test_delete_originals_prints_totals() {
        let output = exifbatch()
            .args(["delete-originals", "/photos/2020", "/photos/2021"])
            .output()
            .unwrap();

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("6 directories scanned"), "Got: {}", stdout);
        assert!(stdout.contains("2 original files deleted"), "Got: {}", stdout);
    }

    #[test]
    fn test_delete_originals_json_prints_totals() {
        let output = exifbatch()
            .args(["delete-originals", "--json", "/photos/2020", "/photos/2021"])
            .output()
            .unwrap();

        assert!(output.status.success());
        let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(value["directories_scanned"], 6);
        assert_eq!(value["image_files_found"], 4);
        assert_eq!(value["original_files_deleted"], 2);
    }

    #[test]
    fn test_exec_json_prints_parsed_result() {
        let output = exifbatch()
            .args(["exec", "--json", "-Artist=Jane", "/photos/a.jpg"])
            .output()
            .unwrap();

        assert!(output.status.success());
        let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(value["updates"], 1);
        assert_eq!(value["errors"], 0);
        assert_eq!(value["output"], "1 image files updated");
    }
}
