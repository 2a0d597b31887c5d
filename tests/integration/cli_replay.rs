//! End-to-end runs of the `buildpulse` binary.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

fn buildpulse(workspace: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_buildpulse"))
        .arg("--quiet")
        .arg("--workspace")
        .arg(workspace)
        .args(args)
        .env_remove("BUILDPULSE_ENV")
        .output()
        .expect("failed to run buildpulse")
}

fn write_transcript(dir: &Path) -> PathBuf {
    let path = dir.join("transcript.json");
    std::fs::write(
        &path,
        r#"{
  "start_ms": 1700000000000,
  "requested_tasks": ["assemble"],
  "root_project_name": "demo",
  "events": [
    {"path": ":app:compile", "start_ms": 1700000000100, "end_ms": 1700000000400, "display_name": "Task :app:compile"},
    {"path": ":app:test", "start_ms": 1700000000400, "end_ms": 1700000000450, "display_name": "Task :app:test failed"},
    {"path": ":app:assemble", "start_ms": 1700000000450, "end_ms": 1700000000460, "display_name": "Task :app:assemble UP-TO-DATE"}
  ]
}"#,
    )
    .unwrap();
    path
}

fn write_config(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("pulse.toml");
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn replay_prints_output_table_and_summary() {
    let dir = TempDir::new().unwrap();
    let transcript = write_transcript(dir.path());
    let config = write_config(
        dir.path(),
        r#"
[[publishers]]
type = "output"
order = "desc"

[metrics]
git_metrics = false
environment_metrics = false
"#,
    );

    let output = buildpulse(
        dir.path(),
        &[
            "--config",
            config.to_str().unwrap(),
            "replay",
            transcript.to_str().unwrap(),
        ],
    );
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Duration (ms)"));
    assert!(stdout.contains(":app:compile"));
    assert!(stdout.contains("FAILED"));
    assert!(stdout.contains("Build failed in 460 ms (configuration 100 ms, 3 tasks)"));
    assert!(stdout.contains("Duration: 460 ms"));
    assert!(stdout.contains("Configuration: 100 ms"));
    assert!(stdout.contains("Tasks: 3"));
    assert!(stdout.contains("Success: false"));
    assert!(stdout.contains("Failed tasks: :app:test"));
    assert!(stdout.contains("Published to 1 of 1 publishers"));

    let compile = stdout.find(":app:compile").unwrap();
    let assemble = stdout.find(":app:assemble").unwrap();
    assert!(compile < assemble, "descending order expected:\n{stdout}");
}

#[test]
fn replay_with_unreachable_backend_still_succeeds() {
    let dir = TempDir::new().unwrap();
    let transcript = write_transcript(dir.path());
    let config = write_config(
        dir.path(),
        r#"
[[publishers]]
type = "influxdb"
url = "http://127.0.0.1:1"
db_name = "tracking"
"#,
    );

    let output = buildpulse(
        dir.path(),
        &[
            "--config",
            config.to_str().unwrap(),
            "replay",
            "--detached",
            transcript.to_str().unwrap(),
        ],
    );
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Published to 0 of 1 publishers"));
    assert!(stdout.contains("InfluxDbPublisher"));
}

#[test]
fn replay_publishes_despite_invalid_hybrid_sibling() {
    let dir = TempDir::new().unwrap();
    let transcript = write_transcript(dir.path());
    let config = write_config(
        dir.path(),
        r#"
[[publishers]]
type = "output"

[[publishers]]
type = "hybrid"

[publishers.build_publisher]
type = "output"

[publishers.task_publisher]
type = "pushgateway"
url = "http://127.0.0.1:1"

[metrics]
git_metrics = false
environment_metrics = false
"#,
    );

    let output = buildpulse(
        dir.path(),
        &[
            "--config",
            config.to_str().unwrap(),
            "replay",
            transcript.to_str().unwrap(),
        ],
    );
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Build failed in 460 ms"));
    assert!(stdout.contains("Published to 1 of 2 publishers"));
}

#[test]
fn check_lists_publishers_from_workspace_file() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("buildpulse.toml"),
        r#"
[[publishers]]
type = "pushgateway"
url = "http://localhost:9091"
"#,
    )
    .unwrap();

    let output = buildpulse(dir.path(), &["check"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("PushGatewayPublisher"));
    assert!(stdout.contains("Configuration valid"));
}

#[test]
fn check_rejects_invalid_configuration() {
    let dir = TempDir::new().unwrap();
    let config = write_config(
        dir.path(),
        r#"
[[publishers]]
type = "hybrid"
"#,
    );

    let output = buildpulse(dir.path(), &["--config", config.to_str().unwrap(), "check"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error["), "stderr: {stderr}");
}

#[test]
fn replay_missing_transcript_fails() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), "");
    let missing = dir.path().join("missing.json");

    let output = buildpulse(
        dir.path(),
        &[
            "--config",
            config.to_str().unwrap(),
            "replay",
            missing.to_str().unwrap(),
        ],
    );
    assert!(!output.status.success());
}
