//! Exported topology outputs.
//!
//! The contract with downstream provisioners is "stable key names, opaque
//! string values": every key is present on every run (absent entities export
//! `null`), and the values are the provisioning engine's references, never
//! inspected here.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::Result;
use crate::spec::Tier;
use crate::synth::Topology;

/// Named key/value outputs of one synthesized topology.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct TopologyOutputs {
    entries: IndexMap<String, Value>,
}

impl TopologyOutputs {
    /// Builds the output map from a topology. Key order is fixed.
    pub fn from_topology(topology: &Topology) -> Self {
        let mut entries = IndexMap::new();
        entries.insert("vpc_id".to_string(), json!(topology.network_id));
        entries.insert(
            "secondary_cidr_association_id".to_string(),
            topology
                .secondary_association_id
                .as_ref()
                .map(|id| json!(id))
                .unwrap_or(Value::Null),
        );
        for tier in Tier::all() {
            entries.insert(
                format!("{tier}_subnet_ids"),
                json!(topology.subnet_ids(tier)),
            );
        }
        entries.insert(
            "internet_gateway_id".to_string(),
            topology
                .internet_gateway_id
                .as_ref()
                .map(|id| json!(id))
                .unwrap_or(Value::Null),
        );
        entries.insert(
            "nat_gateway_ids".to_string(),
            json!(topology.nat_gateway_ids),
        );
        for tier in Tier::all() {
            entries.insert(
                format!("{tier}_route_table_ids"),
                json!(topology.route_table_ids(tier)),
            );
        }
        Self { entries }
    }

    /// Looks up one output by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Output keys in export order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Key/value pairs in export order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pretty JSON rendering for the CLI and for engine handoff.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.entries)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloud::Cloud;
    use crate::spec::{NetworkSpec, Tier};
    use crate::synth::synthesize_plan;

    fn topology() -> Topology {
        let spec = NetworkSpec::new("demo", "10.0.0.0/16".parse().unwrap())
            .with_zones(["us-east-1a", "us-east-1b"])
            .with_subnets(
                Tier::Public,
                vec!["10.0.16.0/21".parse().unwrap(), "10.0.24.0/21".parse().unwrap()],
            );
        synthesize_plan(&spec, Cloud::Aws).unwrap().0
    }

    #[test]
    fn every_key_is_always_present() {
        let outputs = topology().outputs();
        let keys: Vec<_> = outputs.keys().collect();
        assert_eq!(
            keys,
            [
                "vpc_id",
                "secondary_cidr_association_id",
                "public_subnet_ids",
                "private_subnet_ids",
                "isolated_subnet_ids",
                "internet_gateway_id",
                "nat_gateway_ids",
                "public_route_table_ids",
                "private_route_table_ids",
                "isolated_route_table_ids",
            ]
        );
    }

    #[test]
    fn absent_entities_export_null() {
        let outputs = topology().outputs();
        assert_eq!(outputs.get("secondary_cidr_association_id"), Some(&Value::Null));
    }

    #[test]
    fn values_are_opaque_references() {
        let outputs = topology().outputs();
        let vpc = outputs.get("vpc_id").unwrap().as_str().unwrap();
        assert_eq!(vpc, "${aws_vpc.demo.id}");
    }

    #[test]
    fn json_rendering_round_trips() {
        let outputs = topology().outputs();
        let text = outputs.to_json().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["public_subnet_ids"].as_array().unwrap().len(), 2);
    }
}
