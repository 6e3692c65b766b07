//! Thin downstream consumer: a managed cluster wired to the topology.
//!
//! This module contains no placement logic. It exists to exercise the
//! outputs contract end to end: it reads the topology's exported subnet
//! references, declares a cluster and a node pool through the same provider
//! seam, and never mutates the registries it reads from.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::cloud::Cloud;
use crate::error::{Error, Result};
use crate::provider::{Declaration, ResourceHandle, ResourceProvider};
use crate::synth::Topology;

/// Declarative input for one managed cluster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterSpec {
    /// Cluster name.
    pub name: String,
    /// Kubernetes version.
    pub version: String,
    /// Node instance type / VM size.
    pub instance_type: String,
    /// Node count.
    pub instance_count: u32,
}

/// Declares a managed cluster into the private subnets of a topology.
pub struct ClusterProvisioner;

impl ClusterProvisioner {
    /// Declares the cluster and its default node pool, returning the cluster
    /// handle. The topology is consumed read-only.
    pub fn provision(
        provider: &mut dyn ResourceProvider,
        topology: &Topology,
        cluster: &ClusterSpec,
    ) -> Result<ResourceHandle> {
        let subnets = &topology.handles().private_subnets;
        if subnets.is_empty() {
            return Err(Error::configuration(
                "cluster provisioning requires at least one private subnet",
            ));
        }

        match topology.cloud {
            Cloud::Aws => Self::provision_eks(provider, topology, cluster),
            Cloud::Azure => Self::provision_aks(provider, topology, cluster),
        }
    }

    fn provision_eks(
        provider: &mut dyn ResourceProvider,
        topology: &Topology,
        cluster: &ClusterSpec,
    ) -> Result<ResourceHandle> {
        let handles = topology.handles();

        let mut declaration = Declaration::new("aws_eks_cluster", cluster.name.clone())
            .with_properties(json!({
                "name": cluster.name,
                "version": cluster.version,
                "vpc_config": {
                    "subnet_ids": topology.private_subnet_ids,
                },
            }))
            .depends_on(&handles.network);
        for subnet in &handles.private_subnets {
            declaration = declaration.depends_on(subnet);
        }
        let eks = provider.declare(declaration)?;

        let mut node_group =
            Declaration::new("aws_eks_node_group", format!("{}-default", cluster.name))
                .with_properties(json!({
                    "cluster_name": cluster.name,
                    "instance_types": [cluster.instance_type],
                    "subnet_ids": topology.private_subnet_ids,
                    "scaling_config": {
                        "desired_size": cluster.instance_count,
                        "min_size": 1,
                        "max_size": cluster.instance_count.max(1),
                    },
                }))
                .depends_on(&eks);
        for subnet in &handles.private_subnets {
            node_group = node_group.depends_on(subnet);
        }
        provider.declare(node_group)?;

        Ok(eks)
    }

    fn provision_aks(
        provider: &mut dyn ResourceProvider,
        topology: &Topology,
        cluster: &ClusterSpec,
    ) -> Result<ResourceHandle> {
        let handles = topology.handles();

        let mut declaration =
            Declaration::new("azurerm_kubernetes_cluster", cluster.name.clone())
                .with_properties(json!({
                    "name": cluster.name,
                    "kubernetes_version": cluster.version,
                    "dns_prefix": format!("{}-kubernetes", topology.name),
                    "identity": { "type": "SystemAssigned" },
                    "network_profile": {
                        "network_plugin": "azure",
                        "network_policy": "calico",
                    },
                    "default_node_pool": {
                        "name": "default",
                        "vm_size": cluster.instance_type,
                        "node_count": cluster.instance_count,
                        "vnet_subnet_id": topology.private_subnet_ids[0],
                    },
                }))
                .depends_on(&handles.network);
        for subnet in &handles.private_subnets {
            declaration = declaration.depends_on(subnet);
        }
        provider.declare(declaration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::PlanRecorder;
    use crate::spec::{NetworkSpec, Tier};
    use crate::synth::TopologySynthesizer;

    fn cluster() -> ClusterSpec {
        ClusterSpec {
            name: "demo-cluster".to_string(),
            version: "1.28".to_string(),
            instance_type: "m5.large".to_string(),
            instance_count: 2,
        }
    }

    fn spec() -> NetworkSpec {
        NetworkSpec::new("demo", "10.0.0.0/16".parse().unwrap())
            .with_zones(["us-east-1a", "us-east-1b"])
            .with_subnets(
                Tier::Public,
                vec!["10.0.16.0/21".parse().unwrap(), "10.0.24.0/21".parse().unwrap()],
            )
            .with_subnets(
                Tier::Private,
                vec!["10.0.0.0/21".parse().unwrap(), "10.0.8.0/21".parse().unwrap()],
            )
    }

    #[test]
    fn eks_cluster_depends_on_private_subnets() {
        let mut recorder = PlanRecorder::new();
        let topology = TopologySynthesizer::new(Cloud::Aws)
            .synthesize(&spec(), &mut recorder)
            .unwrap();
        let eks = ClusterProvisioner::provision(&mut recorder, &topology, &cluster()).unwrap();

        let deps = recorder.graph().dependencies_of(eks.address());
        assert!(deps.iter().any(|d| d.starts_with("aws_subnet.demo-private-")));
        assert!(recorder.graph().get("aws_eks_node_group.demo-cluster-default").is_some());
    }

    #[test]
    fn cluster_without_private_subnets_is_rejected() {
        let mut recorder = PlanRecorder::new();
        let spec = NetworkSpec::new("demo", "10.0.0.0/16".parse().unwrap())
            .with_zones(["us-east-1a"])
            .with_subnets(Tier::Public, vec!["10.0.16.0/21".parse().unwrap()]);
        let topology = TopologySynthesizer::new(Cloud::Aws)
            .synthesize(&spec, &mut recorder)
            .unwrap();
        let err =
            ClusterProvisioner::provision(&mut recorder, &topology, &cluster()).unwrap_err();
        assert!(err.to_string().contains("private subnet"));
    }
}
