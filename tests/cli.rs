//! Integration tests driving the `fre` binary.

use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

const CONFIG_VARS: &[&str] = &[
    "FRE_WORKER_THREADS",
    "FRE_QUEUE_CAPACITY",
    "FRE_DEADLINE_SECS",
    "FRE_MAX_CONTENT_BYTES",
    "FRE_FOLLOW_LINKS",
];

/// Run fre with given args; returns (stdout, stderr, success).
///
/// Unless the caller passes `--config`, an empty config file is used so the
/// user's own config.toml never leaks into a run. `FRE_*` overrides are
/// cleared either way.
fn run_fre(args: &[&str]) -> (String, String, bool) {
    let config_dir = TempDir::new().unwrap();
    let empty_config = config_dir.path().join("empty.toml");
    fs::write(&empty_config, "").unwrap();

    let mut command = Command::new(env!("CARGO_BIN_EXE_fre"));
    command.args(args).arg("--no-progress").env_remove("RUST_LOG");
    if !args.contains(&"--config") {
        command.arg("--config").arg(&empty_config);
    }
    for var in CONFIG_VARS {
        command.env_remove(var);
    }

    let output = command.output().expect("Failed to run fre");

    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.success(),
    )
}

fn create_dataset() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.txt"), "hello world").unwrap();
    fs::write(dir.path().join("b.txt"), "hello").unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();
    fs::write(dir.path().join("sub/c.md"), "Hello from a nested markdown file").unwrap();
    dir
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

/// File names from plain output lines of the form `<path>\t<size>`
fn listed_names(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .filter_map(|line| line.split('\t').next())
        .filter_map(|p| Path::new(p).file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .collect()
}

#[test]
fn test_search_content_plain() {
    let dir = create_dataset();
    let root = path_str(dir.path());

    let (stdout, stderr, ok) = run_fre(&["search", root, "--content", "hello", "--color", "never"]);
    assert!(ok, "stderr: {}", stderr);
    assert_eq!(listed_names(&stdout), vec!["a.txt", "b.txt", "c.md"]);
    assert!(stdout.contains("\t11"));
}

#[test]
fn test_search_combined_filters() {
    let dir = create_dataset();
    let root = path_str(dir.path());

    let (stdout, _, ok) = run_fre(&["search", root, "--content", "hello", "--max-size", "5", "--color", "never"]);
    assert!(ok);
    assert_eq!(listed_names(&stdout), vec!["b.txt"]);

    let (stdout, _, ok) = run_fre(&["search", root, "--type", "MD", "--color", "never"]);
    assert!(ok);
    assert_eq!(listed_names(&stdout), vec!["c.md"]);
}

#[test]
fn test_search_json_output() {
    let dir = create_dataset();
    let root = path_str(dir.path());

    let (stdout, stderr, ok) = run_fre(&["search", root, "--name", "a.txt", "--json"]);
    assert!(ok, "stderr: {}", stderr);

    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let list = value.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["name"], "a.txt");
    assert_eq!(list[0]["sizeBytes"], 11);
}

#[test]
fn test_search_criteria_file() {
    let dir = create_dataset();
    let criteria_dir = TempDir::new().unwrap();
    let criteria = criteria_dir.path().join("criteria.json");
    fs::write(&criteria, r#"{"contentSearchTerm":"hello world","minSize":6}"#).unwrap();

    let (stdout, stderr, ok) = run_fre(&[
        "search",
        path_str(dir.path()),
        "--criteria",
        path_str(&criteria),
        "--color",
        "never",
    ]);
    assert!(ok, "stderr: {}", stderr);
    assert_eq!(listed_names(&stdout), vec!["a.txt"]);
}

#[test]
fn test_search_rejects_date_filters() {
    let dir = create_dataset();
    let criteria_dir = TempDir::new().unwrap();
    let criteria = criteria_dir.path().join("criteria.json");
    fs::write(&criteria, r#"{"fileName":"a.txt","createdAfter":"2024-01-01"}"#).unwrap();

    let (_, stderr, ok) = run_fre(&["search", path_str(dir.path()), "--criteria", path_str(&criteria)]);
    assert!(!ok);
    assert!(stderr.contains("createdAfter"), "stderr: {}", stderr);
}

#[test]
fn test_search_without_filters_prints_nothing() {
    let dir = create_dataset();
    let (stdout, _, ok) = run_fre(&["search", path_str(dir.path())]);
    assert!(ok);
    assert!(stdout.is_empty());
}

#[test]
fn test_empty_dataset_fails() {
    let dir = TempDir::new().unwrap();
    let (_, stderr, ok) = run_fre(&["index", path_str(dir.path())]);
    assert!(!ok);
    assert!(stderr.contains("dataset is empty"), "stderr: {}", stderr);
}

#[test]
fn test_stats_json() {
    let dir = create_dataset();
    let (stdout, stderr, ok) = run_fre(&["stats", path_str(dir.path()), "--json"]);
    assert!(ok, "stderr: {}", stderr);

    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(value["records"], 3);
    assert_eq!(value["distinct_names"], 3);
}

#[test]
fn test_index_prints_summary() {
    let dir = create_dataset();
    let (stdout, stderr, ok) = run_fre(&["index", path_str(dir.path())]);
    assert!(ok, "stderr: {}", stderr);
    assert!(stdout.contains("Files found:      3"));
    assert!(stderr.contains("Finished indexing!"));
}

#[test]
fn test_explicit_config_file() {
    let dir = create_dataset();
    let config_dir = TempDir::new().unwrap();
    let config = config_dir.path().join("fre.toml");
    fs::write(&config, "worker_threads = 1\nmax_content_bytes = 6\n").unwrap();

    let (stdout, stderr, ok) = run_fre(&[
        "search",
        path_str(dir.path()),
        "--content",
        "hello",
        "--config",
        path_str(&config),
        "--color",
        "never",
    ]);
    assert!(ok, "stderr: {}", stderr);
    // Only b.txt (5 bytes) is small enough for the content index
    assert_eq!(listed_names(&stdout), vec!["b.txt"]);
}

#[test]
fn test_negative_size_bounds() {
    let dir = create_dataset();
    let root = path_str(dir.path());

    let (stdout, stderr, ok) = run_fre(&["search", root, "--min-size", "-1", "--color", "never"]);
    assert!(ok, "stderr: {}", stderr);
    assert_eq!(listed_names(&stdout), vec!["a.txt", "b.txt", "c.md"]);

    let (stdout, stderr, ok) = run_fre(&["search", root, "--max-size", "-1", "--color", "never"]);
    assert!(ok, "stderr: {}", stderr);
    assert!(stdout.is_empty());
}
