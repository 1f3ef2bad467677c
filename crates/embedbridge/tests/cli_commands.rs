#![cfg(feature = "cli")]

use std::path::PathBuf;
use std::process::Command;

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "embedbridge-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

fn embedbridge() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_embedbridge"));
    command.env_remove("EMBEDBRIDGE_LOG");
    command.env_remove("EMBEDBRIDGE_HOST_ORIGIN");
    command
}

fn json_lines(stdout: &[u8]) -> Vec<serde_json::Value> {
    String::from_utf8_lossy(stdout)
        .lines()
        .map(|line| serde_json::from_str(line).expect("stdout line should be JSON"))
        .collect()
}

#[test]
fn encode_resize_prints_wire_message() {
    let output = embedbridge()
        .args([
            "encode", "resize", "--page-id", "p1", "--height", "480", "--format", "json",
        ])
        .output()
        .expect("embedbridge should run");

    assert!(output.status.success());
    let lines = json_lines(&output.stdout);
    assert_eq!(
        lines,
        vec![serde_json::json!({"type": "embed_resize", "pageId": "p1", "height": 480})]
    );
}

#[test]
fn encode_data_without_json_is_usage_error() {
    let output = embedbridge()
        .args(["encode", "data", "--format", "json"])
        .output()
        .expect("embedbridge should run");

    assert_eq!(output.status.code(), Some(64));
    assert!(String::from_utf8_lossy(&output.stderr).contains("--json"));
}

#[test]
fn decode_accepts_command_and_rejects_garbage() {
    let accepted = embedbridge()
        .args([
            "decode",
            r#"{"type":"parent_command","command":"reset"}"#,
            "--format",
            "json",
        ])
        .output()
        .expect("embedbridge should run");
    assert!(accepted.status.success());
    let report = &json_lines(&accepted.stdout)[0];
    assert_eq!(report["accepted"], true);
    assert_eq!(report["command"], "reset");
    assert_eq!(report["direction"], "to_page");
    assert_eq!(report["params"], serde_json::Value::Null);

    let rejected = embedbridge()
        .args(["decode", r#"{"command":"reset"}"#, "--format", "json"])
        .output()
        .expect("embedbridge should run");
    assert_eq!(rejected.status.code(), Some(60));
    assert_eq!(json_lines(&rejected.stdout)[0]["accepted"], false);
}

#[test]
fn replay_script_reports_posts_in_order() {
    let dir = unique_temp_dir("replay");
    let script = dir.join("session.jsonl");
    std::fs::write(
        &script,
        r#"# queued until the host is ready
{"op":"send_data","data":{"step":1}}
{"op":"send_message","text":"saved","kind":"success"}
{"op":"resize","height":200}
{"op":"deliver","message":{"type":"parent_ready"}}
{"op":"close"}
"#,
    )
    .expect("script should be writable");

    let output = embedbridge()
        .args(["replay", "--page-id", "p1", "--format", "json"])
        .arg(&script)
        .output()
        .expect("embedbridge should run");
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let posted: Vec<String> = json_lines(&output.stdout)
        .iter()
        .filter(|event| event["event"] == "posted")
        .map(|event| event["detail"]["message"]["type"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(
        posted,
        vec!["embed_resize", "embed_ready", "embed_data", "embed_data", "embed_close"]
    );

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn replay_top_level_posts_nothing() {
    let dir = unique_temp_dir("replay-top");
    let script = dir.join("session.jsonl");
    std::fs::write(&script, "{\"op\":\"resize\",\"height\":10}\n{\"op\":\"close\"}\n")
        .expect("script should be writable");

    let output = embedbridge()
        .args(["replay", "--top-level", "--format", "json"])
        .arg(&script)
        .output()
        .expect("embedbridge should run");
    assert!(output.status.success());

    let events = json_lines(&output.stdout);
    assert_eq!(events[0]["event"], "initialized");
    assert_eq!(events[0]["detail"]["embedded"], false);
    assert!(events.iter().all(|event| event["event"] != "posted"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn replay_without_wildcard_reports_errors() {
    let dir = unique_temp_dir("replay-strict");
    let script = dir.join("session.jsonl");
    let config = dir.join("options.json");
    std::fs::write(&script, "{\"op\":\"close\"}\n").expect("script should be writable");
    std::fs::write(&config, r#"{"allowWildcard": false}"#).expect("config should be writable");

    let output = embedbridge()
        .args(["replay", "--no-referrer", "--format", "json", "--config"])
        .arg(&config)
        .arg(&script)
        .output()
        .expect("embedbridge should run");

    assert_eq!(output.status.code(), Some(1));
    assert!(json_lines(&output.stdout)
        .iter()
        .any(|event| event["event"] == "error"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn version_reports_package_version() {
    let output = embedbridge()
        .arg("version")
        .output()
        .expect("embedbridge should run");
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        format!("embedbridge {}", env!("CARGO_PKG_VERSION"))
    );
}
