//! Cloud dialects.
//!
//! The synthesizer computes one neutral topology; a dialect lowers each
//! neutral entity into the primitives its cloud actually has. AWS models
//! routing with route tables and routes; Azure models the same reachability
//! with subnet/NAT-gateway associations and relies on default outbound for
//! public subnets. Same semantics, different primitive sets.

pub mod aws;
pub mod azure;

pub use aws::AwsDialect;
pub use azure::AzureDialect;

use indexmap::IndexMap;
use ipnet::Ipv4Net;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;
use crate::provider::{ResourceHandle, ResourceProvider};
use crate::registry::{GatewayRecord, SubnetRecord};
use crate::spec::{NetworkSpec, Tier, Zone};

/// Supported clouds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cloud {
    Aws,
    Azure,
}

impl Cloud {
    pub fn as_str(&self) -> &'static str {
        match self {
            Cloud::Aws => "aws",
            Cloud::Azure => "azure",
        }
    }

    /// The downstream engine's provider name.
    pub fn provider_name(&self) -> &'static str {
        match self {
            Cloud::Aws => "aws",
            Cloud::Azure => "azurerm",
        }
    }

    /// The dialect implementation for this cloud.
    pub fn dialect(&self) -> Box<dyn CloudDialect> {
        match self {
            Cloud::Aws => Box::new(AwsDialect),
            Cloud::Azure => Box::new(AzureDialect),
        }
    }
}

impl fmt::Display for Cloud {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Handles produced by the network declaration.
#[derive(Debug, Clone)]
pub struct NetworkHandles {
    /// The VPC / virtual network.
    pub network: ResourceHandle,
    /// The secondary CIDR association, when the spec carries one and the
    /// cloud models it as a separate resource.
    pub secondary_association: Option<ResourceHandle>,
}

/// Lowers neutral topology entities into cloud primitives.
///
/// Implementations declare resources through the provider and never make
/// placement decisions - those belong to the synthesizer. A method returning
/// `Ok(None)` means the cloud needs no primitive for that entity.
pub trait CloudDialect {
    fn cloud(&self) -> Cloud;

    /// Declares the network (VPC / virtual network) and, if applicable, the
    /// secondary CIDR association.
    fn declare_network(
        &self,
        provider: &mut dyn ResourceProvider,
        spec: &NetworkSpec,
    ) -> Result<NetworkHandles>;

    /// Declares one subnet bound to a zone.
    #[allow(clippy::too_many_arguments)]
    fn declare_subnet(
        &self,
        provider: &mut dyn ResourceProvider,
        spec: &NetworkSpec,
        network: &NetworkHandles,
        tier: Tier,
        cidr: &Ipv4Net,
        zone: &Zone,
        display_name: &str,
        tags: &IndexMap<String, String>,
    ) -> Result<ResourceHandle>;

    /// Declares the internet gateway, or `None` when the cloud's public
    /// subnets are internet-reachable without one.
    fn declare_internet_gateway(
        &self,
        provider: &mut dyn ResourceProvider,
        spec: &NetworkSpec,
        network: &NetworkHandles,
    ) -> Result<Option<ResourceHandle>>;

    /// Declares the elastic/public address backing one NAT gateway.
    fn declare_nat_address(
        &self,
        provider: &mut dyn ResourceProvider,
        spec: &NetworkSpec,
        suffix: &str,
    ) -> Result<ResourceHandle>;

    /// Declares one NAT gateway bound to a public subnet and an address.
    fn declare_nat_gateway(
        &self,
        provider: &mut dyn ResourceProvider,
        spec: &NetworkSpec,
        suffix: &str,
        subnet: &ResourceHandle,
        address: &ResourceHandle,
    ) -> Result<ResourceHandle>;

    /// Lowers one route table: its default route toward `default_target` (if
    /// any) and its subnet associations. Returns the table handle, or `None`
    /// when the cloud lowers the table to association primitives.
    fn declare_route_table(
        &self,
        provider: &mut dyn ResourceProvider,
        spec: &NetworkSpec,
        network: &NetworkHandles,
        tier: Tier,
        index: usize,
        default_target: Option<&GatewayRecord>,
        subnets: &[&SubnetRecord],
    ) -> Result<Option<ResourceHandle>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cloud_names() {
        assert_eq!(Cloud::Aws.as_str(), "aws");
        assert_eq!(Cloud::Azure.provider_name(), "azurerm");
    }

    #[test]
    fn cloud_parses_lowercase() {
        let cloud: Cloud = serde_yaml::from_str("azure").unwrap();
        assert_eq!(cloud, Cloud::Azure);
    }
}
