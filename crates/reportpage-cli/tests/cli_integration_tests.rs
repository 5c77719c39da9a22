//! CLI integration tests
//!
//! Drive the `reportpage` binary against a catalogue written to a temp dir.

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

const CATALOGUE: &str = r#"
[[report]]
name = "Shortpages"
rows = [
  { ns = 0, title = "Stub", value = 12 },
  { ns = 0, title = "Tiny_article", value = 48 },
  { ns = 1, title = "Stub", value = 60 },
]

[[report]]
name = "Unwatchedpages"
permission = "unwatchedpages"
rows = [ { title = "Forgotten", value = 1 } ]

[[report]]
name = "Wantedpages"
cached = true
cacheable = false

[[report]]
name = "MIMEsearch"
rows = [ { title = "X", value = 1 } ]
"#;

const CONFIG: &str = r#"
[permissions]
sysop = ["unwatchedpages"]
"#;

fn setup(temp_dir: &TempDir) -> (PathBuf, PathBuf) {
    let catalogue = temp_dir.path().join("catalogue.toml");
    let config = temp_dir.path().join("config.toml");
    fs::write(&catalogue, CATALOGUE).unwrap();
    fs::write(&config, CONFIG).unwrap();
    (catalogue, config)
}

fn reportpage(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_reportpage"))
        .args(["--log-profile", "test"])
        .args(args)
        .output()
        .expect("Failed to execute CLI")
}

fn stdout_json(output: &Output) -> serde_json::Value {
    assert!(
        output.status.success(),
        "CLI command should succeed. Stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

#[test]
fn test_list_hides_superseded_reports() {
    let temp_dir = TempDir::new().unwrap();
    let (catalogue, _) = setup(&temp_dir);

    let output = reportpage(&["list", "--catalogue", catalogue.to_str().unwrap()]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<_> = stdout.lines().collect();
    assert_eq!(
        lines,
        vec![
            "Shortpages\tpublic",
            "Unwatchedpages\tprivate",
            "Wantedpages\tpublic",
        ]
    );
}

#[test]
fn test_run_pages_through_report() {
    let temp_dir = TempDir::new().unwrap();
    let (catalogue, _) = setup(&temp_dir);
    let path = catalogue.to_str().unwrap();

    let first = stdout_json(&reportpage(&[
        "run", "--catalogue", path, "--page", "Shortpages", "--limit", "2",
    ]));
    assert_eq!(first["name"], "Shortpages");
    assert_eq!(first["results"].as_array().unwrap().len(), 2);
    assert_eq!(first["results"][1]["title"], "Tiny article");
    assert_eq!(first["continue"]["offset"], 2);

    let second = stdout_json(&reportpage(&[
        "run", "--catalogue", path, "--page", "Shortpages", "--limit", "2", "--offset", "2",
    ]));
    assert_eq!(second["results"][0]["title"], "Talk:Stub");
    assert!(second.get("continue").is_none());
}

#[test]
fn test_run_identifiers_mode() {
    let temp_dir = TempDir::new().unwrap();
    let (catalogue, _) = setup(&temp_dir);

    let json = stdout_json(&reportpage(&[
        "run",
        "--catalogue",
        catalogue.to_str().unwrap(),
        "--page",
        "Shortpages",
        "--identifiers",
    ]));
    assert!(json.get("results").is_none());
    assert_eq!(json["titles"].as_array().unwrap().len(), 3);
    assert_eq!(json["titles"][2], serde_json::json!({ "ns": 1, "title": "Talk:Stub" }));
}

#[test]
fn test_run_disabled_report() {
    let temp_dir = TempDir::new().unwrap();
    let (catalogue, _) = setup(&temp_dir);

    let json = stdout_json(&reportpage(&[
        "run",
        "--catalogue",
        catalogue.to_str().unwrap(),
        "--page",
        "Wantedpages",
    ]));
    assert_eq!(json, serde_json::json!({ "name": "Wantedpages", "disabled": true }));
}

#[test]
fn test_run_permission_gate() {
    let temp_dir = TempDir::new().unwrap();
    let (catalogue, config) = setup(&temp_dir);
    let catalogue = catalogue.to_str().unwrap();
    let config = config.to_str().unwrap();

    let denied = reportpage(&[
        "run", "--catalogue", catalogue, "--config", config, "--page", "Unwatchedpages",
    ]);
    assert!(!denied.status.success());
    let stderr = String::from_utf8_lossy(&denied.stderr);
    assert!(stderr.contains("ERR_FORBIDDEN"), "stderr: {}", stderr);

    let allowed = stdout_json(&reportpage(&[
        "run",
        "--catalogue",
        catalogue,
        "--config",
        config,
        "--page",
        "Unwatchedpages",
        "--user",
        "Admin",
        "--group",
        "sysop",
    ]));
    assert_eq!(allowed["results"][0]["title"], "Forgotten");
}

#[test]
fn test_run_unknown_page_fails() {
    let temp_dir = TempDir::new().unwrap();
    let (catalogue, _) = setup(&temp_dir);

    let output = reportpage(&[
        "run",
        "--catalogue",
        catalogue.to_str().unwrap(),
        "--page",
        "MIMEsearch",
    ]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERR_INVALID_INPUT"), "stderr: {}", stderr);
}

#[test]
fn test_describe_outputs_parameters() {
    let temp_dir = TempDir::new().unwrap();
    let (catalogue, _) = setup(&temp_dir);

    let json = stdout_json(&reportpage(&[
        "describe",
        "--catalogue",
        catalogue.to_str().unwrap(),
    ]));
    assert_eq!(
        json["params"][0]["allowed"],
        serde_json::json!(["Shortpages", "Unwatchedpages", "Wantedpages"])
    );
}
