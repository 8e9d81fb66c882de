use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use tempfile::NamedTempFile;

fn write_temp(suffix: &str, content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn run_json(args: &[&str]) -> Value {
    let output = Command::cargo_bin("tabkit")
        .unwrap()
        .args(args)
        .output()
        .unwrap();
    assert!(output.status.success(), "{:?}", output);
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_inspect_csv() {
    let file = write_temp(".csv", "id,name\n1,a\n2,b\n");
    let out = run_json(&["inspect", file.path().to_str().unwrap()]);

    assert_eq!(out["rowCount"], 2);
    assert_eq!(out["columnCount"], 2);
    assert_eq!(out["columns"], json!(["id", "name"]));
    assert_eq!(out["previewData"][0], json!({"id": 1, "name": "a"}));
}

#[test]
fn test_preview_rows_flag() {
    let file = write_temp(".csv", "x\n1\n2\n3\n4\n");
    let out = run_json(&["inspect", "--preview-rows", "2", file.path().to_str().unwrap()]);
    assert_eq!(out["previewData"].as_array().unwrap().len(), 2);
}

#[test]
fn test_types() {
    let file = write_temp(".csv", "id,when\n1,2024-01-01\n2,2024-02-01\n");
    let out = run_json(&["types", file.path().to_str().unwrap()]);

    assert_eq!(out["typeInfo"]["id"]["detected"], "integer");
    assert_eq!(out["typeInfo"]["when"]["detected"], "datetime");
}

#[test]
fn test_normalize() {
    let file = write_temp(".csv", "x\n0\n10\n");
    let out = run_json(&["normalize", file.path().to_str().unwrap()]);
    assert_eq!(out["normalizedData"], json!([{"x": 0.0}, {"x": 1.0}]));
}

#[test]
fn test_nulls_with_fill_value() {
    let file = write_temp(".json", r#"[{"a": 1, "b": null}, {"a": null, "b": "y"}]"#);
    let out = run_json(&[
        "nulls",
        file.path().to_str().unwrap(),
        "--strategy",
        "value",
        "--columns",
        "b",
        "--fill-value",
        "missing",
    ]);

    assert_eq!(
        out["processedData"],
        json!([{"a": 1, "b": "missing"}, {"a": null, "b": "y"}])
    );
}

#[test]
fn test_sql_from_csv() {
    let file = write_temp(".csv", "id,name\n1,A\n2,B\n");
    let out = run_json(&["sql", file.path().to_str().unwrap(), "--table", "users"]);

    assert_eq!(
        out["createTableStatement"],
        "CREATE TABLE `users` (\n  `id` INTEGER,\n  `name` TEXT\n);"
    );
    assert_eq!(
        out["insertStatements"],
        json!([
            "INSERT INTO `users` (`id`, `name`) VALUES (1, 'A');",
            "INSERT INTO `users` (`id`, `name`) VALUES (2, 'B');"
        ])
    );
}

#[test]
fn test_split() {
    let file = write_temp(".sql", "SELECT 1;\nSELECT 2;\nSELECT 3;\n");
    let out = run_json(&["split", file.path().to_str().unwrap(), "--max-lines", "2"]);

    assert_eq!(out["chunkCount"], 2);
    assert_eq!(out["originalStatementCount"], 3);
    assert_eq!(out["chunks"][0], "SELECT 1;\nSELECT 2;");
}

#[test]
fn test_empty_file_is_client_error() {
    let file = write_temp(".csv", "");
    Command::cargo_bin("tabkit")
        .unwrap()
        .args(["inspect", file.path().to_str().unwrap()])
        .assert()
        .code(1)
        .stderr(predicate::str::starts_with("Error:"));
}

#[test]
fn test_unknown_strategy_is_client_error() {
    let file = write_temp(".csv", "a\n1\n\n");
    Command::cargo_bin("tabkit")
        .unwrap()
        .args(["nulls", file.path().to_str().unwrap(), "--strategy", "guess"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("guess"));
}

#[test]
fn test_missing_file_fails() {
    Command::cargo_bin("tabkit")
        .unwrap()
        .args(["inspect", "/nonexistent/input.csv"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Failed to read file"));
}
