//! Network spec loading and boundary validation.

use std::fs;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use netforge::prelude::*;

const VALID_SPEC: &str = r#"---
name: demo
cidr: 10.0.0.0/16
zones:
  - us-east-1a
  - us-east-1b
public_subnets:
  - 10.0.16.0/21
  - 10.0.24.0/21
private_subnets:
  - 10.0.0.0/21
  - 10.0.8.0/21
nat_mode: single
tags:
  CreatedBy: netforge
"#;

#[test]
fn loads_a_valid_spec_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("network.yml");
    fs::write(&path, VALID_SPEC).unwrap();

    let spec = NetworkSpec::from_file(&path).unwrap();
    assert_eq!(spec.name, "demo");
    assert_eq!(spec.zones.len(), 2);
    assert_eq!(spec.nat_mode, NatMode::Single);
    assert_eq!(spec.subnets_for(Tier::Public).len(), 2);
    assert_eq!(spec.tags.get("CreatedBy").map(String::as_str), Some("netforge"));
}

#[test]
fn missing_file_reports_the_path() {
    let err = NetworkSpec::from_file("/nonexistent/network.yml").unwrap_err();
    assert!(err.is_configuration());
    assert!(err.to_string().contains("/nonexistent/network.yml"));
}

#[test]
fn malformed_yaml_is_a_load_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("network.yml");
    fs::write(&path, "name: [unclosed").unwrap();

    let err = NetworkSpec::from_file(&path).unwrap_err();
    assert!(err.to_string().contains("network.yml"));
}

#[test]
fn missing_required_fields_are_rejected() {
    let err = NetworkSpec::from_str("name: demo\n").unwrap_err();
    assert!(err.to_string().contains("cidr"));
}

#[test]
fn invalid_cidr_text_is_rejected() {
    let err = NetworkSpec::from_str(
        "name: demo\ncidr: not-a-cidr\nzones: [a]\n",
    )
    .unwrap_err();
    assert!(!err.to_string().is_empty());
}

#[test]
fn more_cidrs_than_zones_is_rejected_at_load() {
    let err = NetworkSpec::from_str(
        r#"
name: demo
cidr: 10.0.0.0/16
zones: [us-east-1a]
public_subnets: [10.0.16.0/21, 10.0.24.0/21]
"#,
    )
    .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Configuration error: public CIDR count exceeds zone count (2 > 1)"
    );
}

#[test]
fn overlapping_blocks_are_rejected_at_load() {
    let err = NetworkSpec::from_str(
        r#"
name: demo
cidr: 10.0.0.0/16
zones: [us-east-1a, us-east-1b]
public_subnets: [10.0.16.0/21]
private_subnets: [10.0.16.0/22]
"#,
    )
    .unwrap_err();
    assert!(err.to_string().contains("overlapping CIDR blocks"));
}

#[test]
fn a_loaded_spec_synthesizes() {
    let spec = NetworkSpec::from_str(VALID_SPEC).unwrap();
    let (topology, _) = synthesize_plan(&spec, Cloud::Aws).unwrap();
    assert_eq!(topology.nat_gateway_ids.len(), 1);
}

#[test]
fn empty_tier_lists_are_valid() {
    let spec = NetworkSpec::from_str(
        "name: demo\ncidr: 10.0.0.0/16\nzones: [a]\nnat_mode: none\n",
    )
    .unwrap();
    let (topology, plan) = synthesize_plan(&spec, Cloud::Aws).unwrap();
    assert!(topology.public_subnet_ids.is_empty());
    // just the VPC and the internet gateway
    assert_eq!(plan.len(), 2);
}
