use std::path::PathBuf;
use std::process::Command;

fn bin() -> &'static str {
    env!("CARGO_BIN_EXE_atlas")
}

fn fixture_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/master")
}

fn atlas() -> Command {
    let mut command = Command::new(bin());
    command
        .env_remove("ATLAS_CONFIG")
        .env("ATLAS_DATA_DIR", fixture_dir())
        .env("ATLAS_REGIONS", "JP")
        .env("RUST_LOG", "warn");
    command
}

#[test]
fn decode_command_emits_named_fields() {
    let output = atlas()
        .args(["decode", "addState", "[1000,3,-1,300]"])
        .output()
        .expect("decode should run");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let payload: serde_json::Value =
        serde_json::from_str(&stdout).expect("decode should emit json");
    assert_eq!(payload["Rate"], 1000);
    assert_eq!(payload["Count"], -1);
    assert_eq!(payload["Value"], 300);
}

#[test]
fn decode_command_rejects_malformed_input() {
    let output = atlas()
        .args(["decode", "gainNp", "[1000,oops]"])
        .output()
        .expect("decode should run");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("decode failed"));
}

#[test]
fn decode_command_resolves_dependent_functions_from_master_data() {
    let output = atlas()
        .args([
            "decode",
            "subState",
            "[1000,1,DependFuncId1:201,DependFuncVals1:[500,3,-1,200]]",
        ])
        .output()
        .expect("decode should run");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let payload: serde_json::Value =
        serde_json::from_str(&stdout).expect("decode should emit json");
    assert_eq!(payload["DependFuncId"], 201);
    assert_eq!(payload["DependFuncVals"]["Turn"], 3);
    assert_eq!(payload["DependFuncVals"]["Value"], 200);
}

#[test]
fn decode_command_rejects_unknown_region() {
    let output = atlas()
        .args(["decode", "addState", "[1000,3,-1,300]", "EU"])
        .output()
        .expect("decode should run");

    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn lookup_command_hydrates_reverse_references() {
    let output = atlas()
        .args(["lookup", "JP", "skill", "301", "--reverse"])
        .output()
        .expect("lookup should run");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let payload: serde_json::Value =
        serde_json::from_str(&stdout).expect("lookup should emit json");
    assert_eq!(payload["id"], 301);
    assert_eq!(payload["reverse"]["servant"][0]["id"], 100100);
}

#[test]
fn lookup_command_reports_missing_entity() {
    let output = atlas()
        .args(["lookup", "JP", "buff", "999"])
        .output()
        .expect("lookup should run");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("buff 999 not found"));
}

#[test]
fn validate_command_passes_on_fixture_data() {
    let output = atlas()
        .args(["validate", "JP"])
        .output()
        .expect("validate should run");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("validation passed: JP"));
}

#[test]
fn unknown_command_returns_usage() {
    let output = atlas()
        .arg("simulate")
        .output()
        .expect("atlas should run");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("usage: atlas"));
}

#[test]
fn lookup_command_returns_usage_on_bad_flag() {
    let output = atlas()
        .args(["lookup", "JP", "skill", "301", "--depth=everything"])
        .output()
        .expect("lookup should run");

    assert_eq!(output.status.code(), Some(2));
}
