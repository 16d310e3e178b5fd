mod common;

use assert_cmd::Command;
use predicates::str::contains;

use common::{TestWorkspace, write_standard_fixtures};

fn write_manifest(workspace: &TestWorkspace) -> std::path::PathBuf {
    write_standard_fixtures(workspace);
    // Relative paths resolve against the manifest's own directory.
    workspace.write(
        "sources.yaml",
        "sources:\n  - May_Data_Matrix.csv\n  - May_Items.csv\n  - June_Data_Matrix.csv\n  - June_Items.csv\ningredients: ingredients.csv\nshipments: shipments.csv\n",
    )
}

#[test]
fn run_prints_the_merged_item_columns() {
    let workspace = TestWorkspace::new();
    let manifest = write_manifest(&workspace);
    Command::cargo_bin("menu-metrics")
        .expect("binary exists")
        .args(["run", "-M", manifest.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("Merged item columns:"))
        .stdout(contains("Items with Ingredient Counts"));
}

#[test]
fn run_summary_emits_json_counts() {
    let workspace = TestWorkspace::new();
    let manifest = write_manifest(&workspace);
    let output = Command::cargo_bin("menu-metrics")
        .expect("binary exists")
        .args(["run", "-M", manifest.to_str().unwrap(), "--summary"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let summary: serde_json::Value =
        serde_json::from_slice(&output).expect("summary is valid JSON");
    assert_eq!(summary["item_rows"], 9);
    assert_eq!(summary["group_rows"], 3);
    assert_eq!(summary["diagnostics"]["unmatched_shipments"], 1);
}

#[test]
fn run_writes_output_tables() {
    let workspace = TestWorkspace::new();
    let manifest = write_manifest(&workspace);
    let out_dir = workspace.path().join("out");
    Command::cargo_bin("menu-metrics")
        .expect("binary exists")
        .args([
            "run",
            "-M",
            manifest.to_str().unwrap(),
            "-o",
            out_dir.to_str().unwrap(),
        ])
        .assert()
        .success();
    for name in ["group.csv", "category.csv", "item.csv"] {
        assert!(out_dir.join(name).exists(), "missing output {name}");
    }
    let item = std::fs::read_to_string(out_dir.join("item.csv")).expect("read item.csv");
    assert!(item.lines().count() > 1);
}

#[test]
fn columns_lists_one_name_per_line() {
    let workspace = TestWorkspace::new();
    let manifest = write_manifest(&workspace);
    Command::cargo_bin("menu-metrics")
        .expect("binary exists")
        .args(["columns", "-M", manifest.to_str().unwrap(), "--kind", "group"])
        .assert()
        .success()
        .stdout(contains("Group"))
        .stdout(contains("type"))
        .stdout(contains("cost"));
}

#[test]
fn preview_renders_a_table_header() {
    let workspace = TestWorkspace::new();
    let manifest = write_manifest(&workspace);
    Command::cargo_bin("menu-metrics")
        .expect("binary exists")
        .args([
            "preview",
            "-M",
            manifest.to_str().unwrap(),
            "--kind",
            "item",
            "--rows",
            "3",
        ])
        .assert()
        .success()
        .stdout(contains("Item Name"))
        .stdout(contains("more row(s) not shown"));
}

#[test]
fn missing_source_fails_with_a_structured_error() {
    let workspace = TestWorkspace::new();
    write_standard_fixtures(&workspace);
    Command::cargo_bin("menu-metrics")
        .expect("binary exists")
        .args([
            "run",
            "--source",
            workspace.path().join("Nope_Data.csv").to_str().unwrap(),
            "--ingredients",
            workspace.path().join("ingredients.csv").to_str().unwrap(),
            "--shipments",
            workspace.path().join("shipments.csv").to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(contains("failed to load source"));
}

#[test]
fn flags_require_sources_without_a_manifest() {
    let workspace = TestWorkspace::new();
    write_standard_fixtures(&workspace);
    Command::cargo_bin("menu-metrics")
        .expect("binary exists")
        .args([
            "run",
            "--ingredients",
            workspace.path().join("ingredients.csv").to_str().unwrap(),
            "--shipments",
            workspace.path().join("shipments.csv").to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(contains("no source workbooks configured"));
}
