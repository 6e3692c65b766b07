//! AWS dialect: VPC, subnets, internet/NAT gateways, route tables.

use indexmap::IndexMap;
use ipnet::Ipv4Net;
use serde_json::json;

use crate::cloud::{Cloud, CloudDialect, NetworkHandles};
use crate::error::Result;
use crate::ident::derive_short_id;
use crate::provider::{Declaration, ResourceHandle, ResourceProvider};
use crate::registry::{GatewayKind, GatewayRecord, SubnetRecord};
use crate::spec::{NetworkSpec, Tier, Zone};

/// Lowers the neutral topology onto the AWS provider's primitives.
#[derive(Debug, Clone, Copy, Default)]
pub struct AwsDialect;

/// `{ "Name": <name>, ...spec tags }`, the shape the provider console expects.
fn name_tags(spec: &NetworkSpec, name: &str) -> IndexMap<String, String> {
    let mut tags = IndexMap::new();
    tags.insert("Name".to_string(), name.to_string());
    for (k, v) in &spec.tags {
        tags.insert(k.clone(), v.clone());
    }
    tags
}

impl CloudDialect for AwsDialect {
    fn cloud(&self) -> Cloud {
        Cloud::Aws
    }

    fn declare_network(
        &self,
        provider: &mut dyn ResourceProvider,
        spec: &NetworkSpec,
    ) -> Result<NetworkHandles> {
        let network = provider.declare(
            Declaration::new("aws_vpc", &spec.name).with_properties(json!({
                "cidr_block": spec.cidr.to_string(),
                "enable_dns_hostnames": spec.enable_dns_hostnames,
                "enable_dns_support": spec.enable_dns_support,
                "tags": serde_json::to_value(name_tags(spec, &spec.name))?,
            })),
        )?;

        let secondary_association = match &spec.cidr_secondary {
            Some(cidr) => Some(
                provider.declare(
                    Declaration::new(
                        "aws_vpc_ipv4_cidr_block_association",
                        format!("{}-secondary", spec.name),
                    )
                    .with_properties(json!({
                        "vpc_id": network.id(),
                        "cidr_block": cidr.to_string(),
                    }))
                    .depends_on(&network),
                )?,
            ),
            None => None,
        };

        Ok(NetworkHandles {
            network,
            secondary_association,
        })
    }

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
    ) -> Result<ResourceHandle> {
        let _ = display_name; // carried inside `tags` as the Name tag
        let name = format!("{}-{}-{}", spec.name, tier, derive_short_id(&cidr.to_string()));
        let mut declaration = Declaration::new("aws_subnet", name)
            .with_properties(json!({
                "vpc_id": network.network.id(),
                "cidr_block": cidr.to_string(),
                "availability_zone": zone.name(),
                "tags": serde_json::to_value(tags)?,
            }))
            .depends_on(&network.network);

        // A subnet carved out of the secondary block cannot exist before the
        // block is associated.
        if let (Some(secondary), Some(association)) =
            (&spec.cidr_secondary, &network.secondary_association)
        {
            if secondary.contains(cidr) {
                declaration = declaration.depends_on(association);
            }
        }

        provider.declare(declaration)
    }

    fn declare_internet_gateway(
        &self,
        provider: &mut dyn ResourceProvider,
        spec: &NetworkSpec,
        network: &NetworkHandles,
    ) -> Result<Option<ResourceHandle>> {
        let handle = provider.declare(
            Declaration::new("aws_internet_gateway", &spec.name)
                .with_properties(json!({
                    "vpc_id": network.network.id(),
                    "tags": serde_json::to_value(name_tags(spec, &spec.name))?,
                }))
                .depends_on(&network.network),
        )?;
        Ok(Some(handle))
    }

    fn declare_nat_address(
        &self,
        provider: &mut dyn ResourceProvider,
        spec: &NetworkSpec,
        suffix: &str,
    ) -> Result<ResourceHandle> {
        let name = format!("{}-nat-{}", spec.name, suffix);
        provider.declare(Declaration::new("aws_eip", name.clone()).with_properties(json!({
            "vpc": true,
            "tags": serde_json::to_value(name_tags(spec, &name))?,
        })))
    }

    fn declare_nat_gateway(
        &self,
        provider: &mut dyn ResourceProvider,
        spec: &NetworkSpec,
        suffix: &str,
        subnet: &ResourceHandle,
        address: &ResourceHandle,
    ) -> Result<ResourceHandle> {
        let name = format!("{}-nat-{}", spec.name, suffix);
        provider.declare(
            Declaration::new("aws_nat_gateway", name.clone())
                .with_properties(json!({
                    "allocation_id": address.id(),
                    "subnet_id": subnet.id(),
                    "tags": serde_json::to_value(name_tags(spec, &name))?,
                }))
                .depends_on(address)
                .depends_on(subnet),
        )
    }

    fn declare_route_table(
        &self,
        provider: &mut dyn ResourceProvider,
        spec: &NetworkSpec,
        network: &NetworkHandles,
        tier: Tier,
        index: usize,
        default_target: Option<&GatewayRecord>,
        subnets: &[&SubnetRecord],
    ) -> Result<Option<ResourceHandle>> {
        let table_name = match tier {
            Tier::Public => format!("{}-public", spec.name),
            Tier::Private => format!("{}-private-{}", spec.name, index),
            Tier::Isolated => format!("{}-isolated", spec.name),
        };

        let table = provider.declare(
            Declaration::new("aws_route_table", table_name.clone())
                .with_properties(json!({
                    "vpc_id": network.network.id(),
                    "tags": serde_json::to_value(name_tags(spec, &table_name))?,
                }))
                .depends_on(&network.network),
        )?;

        if let Some(target) = default_target {
            let properties = match target.kind {
                GatewayKind::Internet => json!({
                    "route_table_id": table.id(),
                    "destination_cidr_block": "0.0.0.0/0",
                    "gateway_id": target.handle.id(),
                }),
                GatewayKind::Nat => json!({
                    "route_table_id": table.id(),
                    "destination_cidr_block": "0.0.0.0/0",
                    "nat_gateway_id": target.handle.id(),
                }),
            };
            provider.declare(
                Declaration::new("aws_route", format!("{table_name}-default"))
                    .with_properties(properties)
                    .depends_on(&table)
                    .depends_on(&target.handle),
            )?;
        }

        for subnet in subnets {
            let association_name = format!(
                "{}-{}",
                table_name,
                derive_short_id(&subnet.cidr.to_string())
            );
            provider.declare(
                Declaration::new("aws_route_table_association", association_name)
                    .with_properties(json!({
                        "subnet_id": subnet.handle.id(),
                        "route_table_id": table.id(),
                    }))
                    .depends_on(&table)
                    .depends_on(&subnet.handle),
            )?;
        }

        Ok(Some(table))
    }
}
