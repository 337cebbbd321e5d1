//! End-to-end tests driving the `cloud-patrol` binary.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const TREE: &str = r#"
[[resources]]
id = "Stack"
kind = "AWS::CloudFormation::Stack"

[[resources.children]]
id = "Logs"
kind = "AWS::S3::Bucket"

[resources.children.properties]
versioning_configuration = { status = "Enabled" }
bucket_encryption = "${Token[LogsEncryption]}"

[[resources.children]]
id = "Scratch"
kind = "AWS::S3::Bucket"
"#;

const CLEAN_TREE: &str = r#"
[[resources]]
id = "Logs"
kind = "AWS::S3::Bucket"
properties = { versioning_configuration = { status = "Enabled" }, bucket_encryption = { server_side_encryption_configuration = [{ sse_algorithm = "AES256" }] } }
"#;

fn project(tree: &str, config: Option<&str>) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("resources.toml"), tree).unwrap();
    if let Some(config) = config {
        fs::write(dir.path().join("cloud-patrol.toml"), config).unwrap();
    }
    fs::create_dir(dir.path().join("global")).unwrap();
    dir
}

fn cloud_patrol(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_cloud-patrol"))
        .args(args)
        .current_dir(dir)
        .env("CLOUD_PATROL_CONFIG_DIR", dir.join("global"))
        .env_remove("CLOUD_PATROL_HOST")
        .env_remove("NO_COLOR")
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn violations_exit_with_one_and_print_grouped_report() {
    let dir = project(TREE, None);
    let output = cloud_patrol(dir.path(), &["check", "--no-color"]);

    assert_eq!(output.status.code(), Some(1));
    let out = stdout(&output);
    assert!(out.starts_with("Cloud Patrol Report\n\n"));
    assert!(out.contains("Stack/Scratch (AWS::S3::Bucket):"));
    assert!(out.contains("[WARNING]  Bucket Versioning: Bucket versioning is not enabled"));
    assert!(out.contains("[ERROR]    Bucket Encryption:"));
    assert!(!out.contains("Stack/Logs"));
    assert!(out.contains("resources.toml:"));
    assert!(out.contains("Found 1 error(s), 1 warning(s), 0 info(s) in 3 resource(s)"));
}

#[test]
fn clean_tree_exits_with_zero() {
    let dir = project(CLEAN_TREE, None);
    let output = cloud_patrol(dir.path(), &["check", "--no-color"]);
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn json_output_serializes_the_violation_list() {
    let dir = project(TREE, Some("preset = \"minimal\"\n"));
    let output = cloud_patrol(dir.path(), &["check", "--format", "json"]);

    assert_eq!(output.status.code(), Some(1));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let items = json["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["scope"], "Stack/Scratch");
    assert_eq!(items[0]["violations"][0]["policy"], "Bucket Encryption");
    assert_eq!(items[0]["violations"][0]["severity"], "error");
}

#[test]
fn host_mode_from_environment_prints_annotations() {
    let dir = project(TREE, None);
    let output = Command::new(env!("CARGO_BIN_EXE_cloud-patrol"))
        .arg("check")
        .current_dir(dir.path())
        .env("CLOUD_PATROL_CONFIG_DIR", dir.path().join("global"))
        .env("CLOUD_PATROL_HOST", "1")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let out = stdout(&output);
    assert_eq!(
        out.lines().collect::<Vec<_>>(),
        vec![
            "Stack/Scratch [WARNING] Bucket versioning is not enabled",
            "Stack/Scratch [ERROR] Bucket encryption is not enabled. Please consider to add encryption",
        ]
    );
}

#[test]
fn disabled_policy_and_declarative_entries_apply() {
    let config = r#"
[policies."Bucket Versioning"]
enabled = false

[policies."Bucket Encryption"]
enabled = false

[[allowed-values]]
name = "Versioning Status"
kind = "AWS::S3::Bucket"
attribute = "versioning_configuration.status"
values = ["Enabled"]
severity = "info"
"#;
    let dir = project(TREE, Some(config));
    let output = cloud_patrol(dir.path(), &["check", "--no-color"]);

    assert_eq!(output.status.code(), Some(1));
    let out = stdout(&output);
    assert!(!out.contains("Bucket Versioning:"));
    assert!(!out.contains("Bucket Encryption:"));
    assert!(out.contains(
        "[INFO]     Versioning Status: `versioning_configuration.status` is not set, expected one of: Enabled"
    ));
}

#[test]
fn fatal_errors_exit_with_two() {
    let dir = project(TREE, Some("preset = \"unknown\"\n"));
    let output = cloud_patrol(dir.path(), &["check"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown preset `unknown`"));

    let missing = cloud_patrol(dir.path(), &["check", "absent.toml"]);
    assert_eq!(missing.status.code(), Some(2));
}

#[test]
fn list_policies_names_the_catalog() {
    let dir = project(TREE, None);
    let output = cloud_patrol(dir.path(), &["list-policies"]);

    assert_eq!(output.status.code(), Some(0));
    let out = stdout(&output);
    for name in ["Bucket Versioning", "Bucket Encryption", "Ec2InstanceType", "Required Tags"] {
        assert!(out.contains(name), "missing {name}");
    }
    assert!(out.contains("aws-defaults"));
}
