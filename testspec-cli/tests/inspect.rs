use assert_cmd::cargo::cargo_bin_cmd;
use std::path::PathBuf;
use tempfile::tempdir;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("testspec-babel")
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn inspect_prints_the_row_table_as_json() {
    let dir = tempdir().unwrap();
    let mut cmd = cargo_bin_cmd!("testspec");
    cmd.current_dir(dir.path())
        .arg("inspect")
        .arg(fixture_path("kitchensink.md"));

    let output = cmd.assert().success().get_output().stdout.clone();
    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();

    let spec = &json["output"];
    assert_eq!(spec["sheet_name"], "kitchensink");
    assert_eq!(spec["category"], "製品A");
    assert_eq!(spec["environments"][1], "macOS");
    assert_eq!(spec["rows"].as_array().unwrap().len(), 6);
    assert_eq!(spec["rows"][2]["mark"], "number");
    assert!(json["warnings"].as_array().unwrap().is_empty());
}
