//! CLI surface tests.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const SPEC: &str = r#"---
name: demo
cidr: 10.0.0.0/16
zones: [us-east-1a, us-east-1b]
public_subnets: [10.0.16.0/21, 10.0.24.0/21]
private_subnets: [10.0.0.0/21, 10.0.8.0/21]
nat_mode: per-zone
"#;

fn write_spec(contents: &str) -> (TempDir, std::path::PathBuf) {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("network.yml");
    fs::write(&path, contents).unwrap();
    (temp, path)
}

#[test]
fn validate_accepts_a_good_spec() {
    let (_temp, path) = write_spec(SPEC);
    let mut cmd = Command::cargo_bin("netforge").unwrap();
    cmd.arg("validate")
        .arg(&path)
        .arg("--no-color")
        .assert()
        .success()
        .stdout(predicate::str::contains("valid: demo"))
        .stdout(predicate::str::contains("nat: per-zone"));
}

#[test]
fn synth_human_summary_lists_the_plan() {
    let (_temp, path) = write_spec(SPEC);
    let mut cmd = Command::cargo_bin("netforge").unwrap();
    cmd.arg("synth")
        .arg(&path)
        .arg("--no-color")
        .assert()
        .success()
        .stdout(predicate::str::contains("public subnets: 2"))
        .stdout(predicate::str::contains("NAT gateways: 2 (per-zone)"))
        .stdout(predicate::str::contains("+ aws_vpc.demo"));
}

#[test]
fn synth_outputs_format_emits_stable_keys() {
    let (_temp, path) = write_spec(SPEC);
    let mut cmd = Command::cargo_bin("netforge").unwrap();
    cmd.arg("synth")
        .arg(&path)
        .arg("--format")
        .arg("outputs")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"vpc_id\": \"${aws_vpc.demo.id}\""))
        .stdout(predicate::str::contains("\"nat_gateway_ids\""));
}

#[test]
fn synth_dot_format_renders_the_graph() {
    let (_temp, path) = write_spec(SPEC);
    let mut cmd = Command::cargo_bin("netforge").unwrap();
    cmd.arg("synth")
        .arg(&path)
        .arg("--cloud")
        .arg("azure")
        .arg("--format")
        .arg("dot")
        .assert()
        .success()
        .stdout(predicate::str::contains("digraph plan"))
        .stdout(predicate::str::contains("azurerm_virtual_network.demo-vnet"));
}

#[test]
fn configuration_errors_exit_with_code_2() {
    let (_temp, path) = write_spec(
        r#"---
name: demo
cidr: 10.0.0.0/16
zones: [us-east-1a]
private_subnets: [10.0.0.0/21]
nat_mode: single
"#,
    );
    let mut cmd = Command::cargo_bin("netforge").unwrap();
    cmd.arg("synth")
        .arg(&path)
        .arg("--no-color")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains(
            "NAT gateway requested with no public subnet",
        ));
}

#[test]
fn missing_spec_file_exits_with_code_3() {
    let mut cmd = Command::cargo_bin("netforge").unwrap();
    cmd.arg("validate")
        .arg("/nonexistent/network.yml")
        .arg("--no-color")
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("Failed to load network spec"));
}
