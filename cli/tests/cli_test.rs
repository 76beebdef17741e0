use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;

fn tjls() -> Command {
    let mut cmd = Command::cargo_bin("tjls").expect("tjls binary");
    cmd.env_remove("TJLS_LOG").env_remove("RUST_LOG");
    cmd
}

fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create dir");
    }
    fs::write(&path, contents).expect("write file");
    path
}

const PLAN: &str = r#"resource team "Team" {
  resource alice "Alice"
}
task release "Release" {
  task design "Design" {
    effort 10d
    allocate alice
  }
  task build "Build" {
    depends !design
  }
}
"#;

#[test]
fn check_reports_errors_and_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "plan.tjp", "task a \"A\" {\n  depends ghost\n}\n");

    tjls()
        .arg("check")
        .arg(&path)
        .assert()
        .failure()
        .stdout(predicate::str::contains(
            "plan.tjp:2:11: error [undefined-reference] Undefined task 'ghost' referenced in depends",
        ))
        .stdout(predicate::str::contains("1 error(s), 0 warning(s) in 1 file(s)"));
}

#[test]
fn check_clean_file_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "plan.tjp", PLAN);

    tjls()
        .arg("check")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("0 error(s), 0 warning(s) in 1 file(s)"));
}

#[test]
fn check_account_references_can_be_disabled() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "plan.tjp", "task a \"A\" {\n  chargeset ghost\n}\n");

    tjls()
        .arg("check")
        .arg(&path)
        .assert()
        .failure()
        .stdout(predicate::str::contains("Undefined account 'ghost'"));

    tjls()
        .args(["check", "--no-account-refs"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Undefined account").not());
}

#[test]
fn check_json_lists_each_file() {
    let dir = tempfile::tempdir().unwrap();
    let bad = write_file(dir.path(), "bad.tjp", "task a \"A\" {\n  depends ghost\n}\n");
    let good = write_file(dir.path(), "good.tji", PLAN);

    let output = tjls()
        .args(["check", "--json"])
        .arg(&bad)
        .arg(&good)
        .output()
        .expect("run tjls");
    assert!(!output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json output");
    let reports = json.as_array().expect("array of reports");
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0]["diagnostics"][0]["code"], "undefined-reference");
    assert_eq!(reports[0]["diagnostics"][0]["severity"], "error");
    assert_eq!(reports[1]["diagnostics"].as_array().unwrap().len(), 0);
}

#[test]
fn check_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    tjls()
        .arg("check")
        .arg(dir.path().join("absent.tjp"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read file"));
}

#[test]
fn symbols_prints_nested_outline() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "plan.tjp", PLAN);

    tjls()
        .arg("symbols")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("task release \"Release\" 4:6"))
        .stdout(predicate::str::contains("  task design \"Design\" 5:8  (effort 10d, allocate alice)"))
        .stdout(predicate::str::contains("  resource alice \"Alice\" 2:12"));
}

#[test]
fn symbols_json_is_the_symbol_table() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "plan.tjp", PLAN);

    let output = tjls().args(["symbols", "--json"]).arg(&path).output().expect("run tjls");
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json output");
    assert_eq!(json["tasks"].as_array().unwrap().len(), 3);
    assert_eq!(json["tasks"][1]["id"], "design");
    assert_eq!(json["tasks"][1]["parent"], "release");
}

#[test]
fn context_uses_one_based_positions() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "plan.tjp", PLAN);

    let output = tjls()
        .args(["context"])
        .arg(&path)
        .args(["7", "5"])
        .output()
        .expect("run tjls");
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json output");
    assert_eq!(json["block_kind"], "task");
    assert_eq!(json["block_id"], "design");
    assert_eq!(json["parent_block_kinds"], serde_json::json!(["task", "task"]));
}

#[test]
fn search_walks_the_tree_and_skips_excluded_dirs() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "plan.tjp", PLAN);
    write_file(dir.path(), "sub/extra.tji", "task deploy \"Deploy\"\n");
    write_file(dir.path(), "node_modules/pkg/vendored.tjp", "task deploy_vendored \"Vendored\"\n");

    tjls()
        .arg("search")
        .arg(dir.path())
        .arg("dep")
        .assert()
        .success()
        .stdout(predicate::str::contains("task deploy \"Deploy\""))
        .stdout(predicate::str::contains("deploy_vendored").not());
}

#[test]
fn rename_prints_edits_without_write() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "plan.tjp", PLAN);

    tjls()
        .arg("rename")
        .arg(&path)
        .args(["5", "9", "design_phase"])
        .assert()
        .success()
        .stdout(predicate::str::contains("5:8-14 design_phase"))
        .stdout(predicate::str::contains("10:14-20 design_phase"));
    assert_eq!(fs::read_to_string(&path).unwrap(), PLAN);
}

#[test]
fn rename_write_rewrites_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "plan.tjp", PLAN);

    tjls()
        .args(["rename", "--write"])
        .arg(&path)
        .args(["2", "13", "bob"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Renamed 2 occurrence(s)"));
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("resource bob \"Alice\""));
    assert!(text.contains("allocate bob"));
    assert!(!text.contains("alice"));
}

#[test]
fn rename_to_existing_id_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "plan.tjp", PLAN);

    tjls()
        .arg("rename")
        .arg(&path)
        .args(["5", "9", "build"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
    assert_eq!(fs::read_to_string(&path).unwrap(), PLAN);
}
